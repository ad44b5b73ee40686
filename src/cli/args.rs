//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::StyleArg;

/// Turn short real-world videos into cartoons with the Veo video model
#[derive(Parser, Debug)]
#[command(name = "toon-reel")]
#[command(version, about = "Stylize short videos as animation", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stylize a video (MP4 or MOV, up to 15 seconds and 100MB)
    Animate(AnimateArgs),
    /// List available animation styles
    Styles,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct AnimateArgs {
    /// Source video
    pub input: PathBuf,

    /// Animation style (default: config file, then classic-anime)
    #[arg(long, short)]
    pub style: Option<StyleArg>,

    /// Where to write the generated video (default: <input>_animated.mp4)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Generation model
    #[arg(long)]
    pub model: Option<String>,

    /// Seconds between status checks
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Status checks before giving up (0 = wait forever)
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// Never prompt for an API key
    #[arg(long)]
    pub no_prompt: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
