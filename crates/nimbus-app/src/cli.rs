use clap::Parser;

/// Nimbus — an embedded browser with a local automation control plane.
#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about)]
pub struct Args {
    /// URL to open in the first tab at startup.
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
