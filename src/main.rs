use clap::Parser;

use toon_reel::animate::{API_KEY_ENV, GEMINI_API_KEY_ENV};
use toon_reel::cli::{self, Args, Command};

/// Load .env file and check for an API key
///
/// Loads environment variables from .env file in the working directory.
/// Does not override existing environment variables.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    if std::env::var(GEMINI_API_KEY_ENV).is_err() && std::env::var(API_KEY_ENV).is_err() {
        log::debug!(
            "Neither {} nor {} is set; the key must come from the config file or the prompt",
            GEMINI_API_KEY_ENV,
            API_KEY_ENV
        );
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    load_env();

    let args = Args::parse();
    let config_path = args.config.as_deref();

    match args.command {
        Command::Animate(animate) => {
            if let Err(failure) = cli::run_animate(animate, config_path) {
                eprintln!("Error: {}", failure.message);
                std::process::exit(failure.exit_code);
            }
        }
        Command::Styles => cli::list_styles(),
        Command::Config { action } => {
            if let Err(e) = cli::handle_config_action(action, config_path) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
