//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{AnimateArgs, Args, Command, ConfigAction};
pub use commands::{
    default_output_path, handle_config_action, list_styles, resolve_client_config, run_animate,
    CommandFailure, EXIT_AUTH,
};
pub use enums::StyleArg;
