mod cli;
mod config;
mod db;
mod load;
mod workbook;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
