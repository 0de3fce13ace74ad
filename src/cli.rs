use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "probekit")]
#[command(author, version, about = "Inspect media files with ffprobe")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Probe tool to run instead of ffprobe from PATH
    #[arg(long, global = true, env = "FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Seconds to wait for the probe tool before killing it
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a media file, or every file in a directory, and print a summary
    Probe {
        /// File or directory to probe
        #[arg(required = true)]
        path: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the probe tool is available
    CheckTools,
}
