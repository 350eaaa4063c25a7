//! gstplay - Simple GStreamer-based media player
//!
//! Features:
//! - Playback of local files and URIs in a window or on the console
//! - Selectable decode paths (playbin, decodebin, explicit demux/decode)
//! - Custom video and audio sinks
//! - Interrupt and fault supervision in console mode

use anyhow::Context;
use clap::error::ErrorKind;
use gstplay_core::{Error as CoreError, Gui, PlayerConfig};
use gstplay_desktop::{check_gstreamer_installation, detect_gui, GstPlayer};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{describe_error, Cli};

fn main() {
    let cli = match Cli::try_parse_normalized(std::env::args()) {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                std::process::exit(0);
            }
            _ => {
                println!("{}", describe_error(&e).trim_end());
                std::process::exit(1);
            }
        },
    };

    // Initialize tracing; logs go to stderr, user messages to stdout
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
    gstplay_core::init();

    match play(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("gstplay: {e:#}");
            std::process::exit(1);
        }
    }
}

/// What to do once the mode is known
#[derive(Debug)]
enum Startup {
    Run(PlayerConfig),
    Exit { message: String, code: i32 },
}

/// Decide between playing and exiting early. `console` is true when no
/// window could be opened or `--nogui` was given.
fn plan(cli: &Cli, console: bool) -> Startup {
    if !console {
        if let Some(option) = cli.console_only_option() {
            return Startup::Exit {
                message: format!("gstplay: {option} is only compatible with console (X detected)."),
                code: 1,
            };
        }
    }

    let config = cli.to_config(console);
    if cli.input.is_none() && config.console {
        return Startup::Exit {
            message: format!("gstplay: {}.", CoreError::NoInput),
            code: CoreError::NoInput.exit_code(),
        };
    }
    Startup::Run(config)
}

/// Run the player and return the process exit status
fn play(cli: Cli) -> anyhow::Result<i32> {
    let player = GstPlayer::new().context("Failed to initialize the media framework")?;
    let gui = detect_gui(&player, cli.nogui);

    let config = match plan(&cli, !gui.is_available()) {
        Startup::Run(config) => config,
        Startup::Exit { message, code } => {
            println!("{message}");
            return Ok(code);
        }
    };

    if config.verbose {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => debug!("Configuration:\n{json}"),
            Err(e) => warn!(error = %e, "Failed to serialize configuration"),
        }
        match check_gstreamer_installation() {
            Ok(info) if !info.is_complete() => {
                warn!(version = %info.version, missing = ?info.missing_elements, "Incomplete GStreamer installation");
            }
            Ok(info) => debug!(version = %info.version, "GStreamer installation complete"),
            Err(e) => warn!(error = %e, "GStreamer check failed"),
        }
    }

    match gstplay_desktop::run(config, player, gui, cli.input.as_deref()) {
        Ok(()) => Ok(0),
        Err(e) => match e.downcast_ref::<CoreError>() {
            Some(err) if err.is_input_error() => {
                debug!(code = err.error_code(), "Input rejected");
                println!("Error: {err}.");
                Ok(err.exit_code())
            }
            _ => Err(e),
        },
    }
}
