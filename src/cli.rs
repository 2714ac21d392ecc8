//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use gofile_core::config::{DEFAULT_API_BASE_URL, DEFAULT_WEBSITE_BASE_URL};

/// Download files and folders shared on Gofile.
///
/// Accepts a content id (`abc123`) or a share link
/// (`https://gofile.io/d/abc123`). Failed transfers fall back through several
/// transport strategies before giving up.
#[derive(Parser, Debug)]
#[command(name = "gofile-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Content id or share link
    pub content: String,

    /// Output directory, or a file path to save a single file under
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Custom filename for a single-file download
    #[arg(short, long)]
    pub filename: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Account token
    #[arg(short, long, env = "GOFILE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Password for protected content
    #[arg(short, long)]
    pub password: Option<String>,

    /// Download every file of a folder instead of the first one
    #[arg(short, long)]
    pub all: bool,

    /// With --all, also download sub-folders into matching directories
    #[arg(short, long, requires = "all")]
    pub recursive: bool,

    /// Do not request a guest account token when no token is given
    #[arg(long)]
    pub no_guest: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// API base URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL, hide = true)]
    pub api_url: String,

    /// Website base URL
    #[arg(long, default_value = DEFAULT_WEBSITE_BASE_URL, hide = true)]
    pub website_url: String,
}
