//! CLI argument parsing using clap.

use clap::Parser;
use ctd_actors::constants::link::DEFAULT_ADDRESS;
use std::path::PathBuf;

/// CTD driver - keeps a CTD logger logging over a serial bridge
#[derive(Parser, Debug, Clone)]
#[command(name = "ctd")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Serial bridge address (host:port), overrides [link].address
    #[arg(short = 'l', long)]
    pub link: Option<String>,

    /// Ignore operator commands on stdin
    #[arg(long)]
    pub no_stdin: bool,

    /// Show verbose output (every inbound sentence)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// CTD simulator - answers START/STOP commands like a logger would
#[derive(Parser, Debug, Clone)]
#[command(name = "ctd-sim")]
#[command(version, about, long_about = None)]
pub struct SimArgs {
    /// Address to listen on
    #[arg(short = 'l', long, default_value = DEFAULT_ADDRESS)]
    pub listen: String,

    /// Show verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
