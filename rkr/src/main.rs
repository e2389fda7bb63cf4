use anyhow::Context;
use clap::Parser;
use libpodcidr::XlineNodeStore;
use log::error;
use rkr::cli::{Cli, Commands};
use rkr::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Start { config } => {
            let cfg = load_config(config.to_str().unwrap())?;
            let endpoints: Vec<&str> = cfg
                .xline_config
                .endpoints
                .iter()
                .map(|s| s.as_str())
                .collect();
            let store = XlineNodeStore::new(&endpoints)
                .await
                .context("failed to connect to xline")?;
            if let Err(e) = rkr::bootstrap::run(&cfg, &store).await {
                error!("bootstrap failed: {e:?}");
                return Err(e);
            }
        }
    }

    Ok(())
}
