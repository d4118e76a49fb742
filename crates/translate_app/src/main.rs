mod platform;

use std::path::PathBuf;

use clap::Parser;

/// Terminal client for the document translation server.
#[derive(Debug, Parser)]
#[command(name = "translate_client")]
#[command(version)]
#[command(about = "Upload documents, start translations and fetch the results", long_about = None)]
pub struct Args {
    /// RON configuration file
    #[arg(short, long, default_value = platform::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Server base URL, overrides `server_url` from the configuration
    #[arg(short, long)]
    pub server: Option<String>,

    /// Log file path
    #[arg(long, default_value = platform::logging::DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Also log to the terminal
    #[arg(long)]
    pub log_to_terminal: bool,

    /// Log at trace level
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    platform::run_app(args)
}
