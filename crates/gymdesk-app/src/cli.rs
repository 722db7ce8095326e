use std::path::PathBuf;

use clap::Parser;

/// gymdesk: password-gated terminal chat for gym customer service.
#[derive(Parser, Debug)]
#[command(name = "gymdesk", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter directive override (e.g. gymdesk=debug).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Model name override.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
