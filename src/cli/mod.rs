//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod generate;
mod info;
#[cfg(feature = "server")]
mod serve;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::color::{parse_color, Rgb};
use crate::config::{load_config, merge_cli_overrides, CliOverrides, PjskConfig};
use crate::generate::Generator;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// PJSK sticker generator - draw text on Project Sekai character stickers
#[derive(Parser)]
#[command(name = "pjsk")]
#[command(about = "Generate Project Sekai style stickers with custom text")]
#[command(version)]
pub struct Cli {
    /// Path to pjsk.toml (default: search upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a sticker and print the path of the PNG
    Generate {
        /// Character or team name (e.g. miku, ichika, l/n)
        character: String,

        /// Text to draw; "\n" starts a new line
        text: String,

        /// 1-based sticker index (random if omitted)
        #[arg(long)]
        index: Option<i64>,

        /// Top-left text position as X,Y
        #[arg(long, value_parser = parse_position, allow_hyphen_values = true, default_value = "20,10")]
        position: (i32, i32),

        /// Text color as #RRGGBB or R,G,B (default: the character's color)
        #[arg(long, value_parser = parse_color)]
        text_color: Option<Rgb>,

        /// Font size in pixels
        #[arg(long, default_value = "50")]
        font_size: u32,

        /// Outline color as #RRGGBB or R,G,B
        #[arg(long, value_parser = parse_color, default_value = "255,255,255")]
        stroke_color: Rgb,

        /// Outline width in pixels
        #[arg(long, default_value = "4")]
        stroke_width: u32,

        /// Font name, matched approximately against the fonts directory
        #[arg(long)]
        font: Option<String>,

        /// Counter-clockwise rotation in degrees
        #[arg(long, allow_hyphen_values = true, default_value = "15")]
        rotation: i32,

        /// Output file (default: a new file in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for sticker selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(long)]
        port: Option<u16>,

        /// Directory for rendered stickers
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// List teams and characters with their aliases
    Characters {
        /// Only show this team
        team: Option<String>,
    },

    /// List fonts available to --font
    Fonts,
}

/// Parse `X,Y` into a position.
fn parse_position(s: &str) -> Result<(i32, i32), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let parse = |v: &str| v.trim().parse::<i32>().map_err(|_| format!("invalid coordinate '{}'", v.trim()));
    Ok((parse(x)?, parse(y)?))
}

/// Install the stderr log subscriber. `RUST_LOG` wins unless `verbose` is set.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Load the configuration, applying CLI overrides, or report the failure.
fn load_settings(path: Option<&Path>, overrides: &CliOverrides) -> Result<PjskConfig, ExitCode> {
    match load_config(path) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, overrides);
            let problems = config.validate();
            if problems.is_empty() {
                Ok(config)
            } else {
                for problem in problems {
                    eprintln!("Error: {}", problem);
                }
                Err(ExitCode::from(EXIT_INVALID_ARGS))
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Load configuration and the generator state, or report the failure.
fn load_generator(path: Option<&Path>, overrides: &CliOverrides) -> Result<(PjskConfig, Generator), ExitCode> {
    let config = load_settings(path, overrides)?;
    match Generator::from_config(&config) {
        Ok(generator) => Ok((config, generator)),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Generate {
            character,
            text,
            index,
            position,
            text_color,
            font_size,
            stroke_color,
            stroke_width,
            font,
            rotation,
            output,
            seed,
        } => generate::run_generate(
            config,
            generate::GenerateArgs {
                character,
                text,
                index,
                position,
                text_color,
                font_size,
                stroke_color,
                stroke_width,
                font,
                rotation,
                output,
                seed,
            },
        ),
        #[cfg(feature = "server")]
        Commands::Serve { host, port, output_dir } => {
            serve::run_serve(config, CliOverrides { host, port, output_dir })
        }
        Commands::Characters { team } => info::run_characters(config, team.as_deref()),
        Commands::Fonts => info::run_fonts(config),
    }
}
