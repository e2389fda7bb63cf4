use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rkr", version, about = "RKR node bootstrap CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the pod CIDR and sync the CNI spec with config file
    Start {
        #[arg(short, long)]
        config: PathBuf,
    },
}
