use clap::Parser;
use std::path::PathBuf;

/// HTTP service exposing CRUD operations on jobs
#[derive(Debug, Parser)]
#[command(name = "job-api", version)]
pub struct Cli {
    /// Path to a JSON config file. Without it, configuration comes from
    /// the environment (and `.env`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on, overriding the configured one
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for rotated log files
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}
