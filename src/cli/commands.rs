//! Subcommand handlers for animate, styles and config actions.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::args::{AnimateArgs, ConfigAction};
use crate::animate::{
    loading_message, ApiKey, ClientConfig, FfprobeProbe, GenerationClient, Progress, Style,
    LOADING_MESSAGE_INTERVAL_SECS, STYLE_CATALOG,
};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG_TEMPLATE};
use crate::credential::EnvCredentialGate;
use crate::session::Session;

/// Exit code used when the API key was missing or rejected.
pub const EXIT_AUTH: i32 = 2;

/// A failed command: message for the user plus the process exit code.
#[derive(Debug)]
pub struct CommandFailure {
    pub message: String,
    pub exit_code: i32,
}

impl CommandFailure {
    fn auth(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: EXIT_AUTH,
        }
    }
}

impl From<String> for CommandFailure {
    fn from(message: String) -> Self {
        Self {
            message,
            exit_code: 1,
        }
    }
}

/// Print the style catalog.
pub fn list_styles() {
    println!("Available styles:");
    for option in STYLE_CATALOG.iter() {
        println!(
            "  {:<18} {:<16} {}",
            option.id.slug(),
            option.name,
            option.id.label()
        );
    }
    println!();
    println!("Use --style <name> to select a style.");
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) -> Result<(), String> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(path.as_path())).map_err(|e| e.to_string())?;
            let client = config.client_config();
            let limits = config.source_limits();
            let style = config.style().map_err(|e| e.to_string())?.unwrap_or_default();

            println!("Current configuration:");
            println!("  Base URL: {}", client.base_url);
            println!("  Model: {}", client.model);
            println!("  Style: {}", style.slug());
            println!("  Poll interval: {}s", client.poll_interval.as_secs());
            match client.max_poll_attempts {
                Some(n) => println!("  Max status checks: {}", n),
                None => println!("  Max status checks: unlimited"),
            }
            println!("  Max file size: {} bytes", limits.max_file_bytes);
            println!("  Max duration: {}s", limits.max_duration_secs);
            println!("  Max result size: {} bytes", client.max_result_bytes);
            println!(
                "  API key: {}",
                if config.api.api_key.is_some() {
                    "set in config"
                } else {
                    "from environment"
                }
            );
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'toon-reel config show' to view current settings.",
                    path.display()
                ));
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}

/// Merge CLI flags over the config file's client settings.
pub fn resolve_client_config(config: &Config, args: &AnimateArgs) -> ClientConfig {
    let mut client = config.client_config();
    if let Some(model) = &args.model {
        client.model = model.clone();
    }
    if let Some(secs) = args.poll_interval {
        client.poll_interval = Duration::from_secs(secs);
    }
    if let Some(max) = args.max_polls {
        client.max_poll_attempts = (max > 0).then_some(max);
    }
    client
}

/// Where the generated video goes when `--output` is not given.
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "animated_video".to_string());
    let file_name = format!("{}_animated.mp4", stem);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// Run the animate command end to end.
pub fn run_animate(args: AnimateArgs, config_path: Option<&Path>) -> Result<(), CommandFailure> {
    let config = Config::load(config_path).map_err(|e| e.to_string())?;
    let style: Style = match args.style {
        Some(s) => s.into(),
        None => config
            .style()
            .map_err(|e| e.to_string())?
            .unwrap_or_default(),
    };

    let mut gate = EnvCredentialGate::new(config.api.api_key.clone().map(ApiKey::new));
    if !args.no_prompt && std::io::stdin().is_terminal() {
        gate = gate.interactive();
    }

    let mut session = Session::new(gate, config.source_limits());
    let api_key = session
        .ensure_credential()
        .map_err(|e| CommandFailure::auth(e.to_string()))?;

    session
        .select_source(&args.input, &FfprobeProbe::default())
        .map_err(|e| e.to_string())?;
    session.select_style(style);

    let client = GenerationClient::new(api_key, resolve_client_config(&config, &args)).map_err(
        |e| {
            if e.is_auth() {
                CommandFailure::auth(e.to_string())
            } else {
                CommandFailure::from(e.to_string())
            }
        },
    )?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, config.output.dir.as_deref()));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    rt.block_on(async {
        eprintln!("Animating {} as {}...", args.input.display(), style.option().name);

        let ticker = tokio::spawn(async {
            let mut interval =
                tokio::time::interval(Duration::from_secs(LOADING_MESSAGE_INTERVAL_SECS));
            let mut tick = 0usize;
            loop {
                interval.tick().await;
                eprintln!("  {}", loading_message(tick));
                tick += 1;
            }
        });

        let mut report = |progress: &Progress| {
            log::info!("Progress: {}", progress);
            eprintln!("{}", progress);
        };
        let outcome = session.submit(&client, &mut report).await;
        ticker.abort();

        match outcome {
            Ok(result) => {
                let saved = match result.save(&output).await {
                    Ok(path) => path,
                    Err(e) => {
                        return Err(CommandFailure::from(format!(
                            "Failed to save video to {}: {}",
                            output.display(),
                            e
                        )))
                    }
                };
                println!("Animation complete!");
                println!("  Output: {}", saved.display());
                println!("  Size: {} bytes", result.len());
                println!("  SHA-256: {}", result.sha256_hex());
                Ok(())
            }
            Err(e) if e.is_auth() => Err(CommandFailure::auth(format!(
                "{}\nSet a new key in GEMINI_API_KEY or the config file and try again.",
                e
            ))),
            Err(e) => Err(CommandFailure::from(e.to_string())),
        }
    })
}
