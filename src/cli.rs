use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Chat with a personal shopping assistant", long_about = None)]
pub struct Args {
    /// Opening message to send before the interactive session starts
    pub query: Option<String>,

    /// Base address of the shopping-assistant backend
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    /// Cart poll interval in milliseconds (0 disables polling)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Path to the configuration file [default: ~/.shopchat/config.yaml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
