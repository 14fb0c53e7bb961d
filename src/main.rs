//! Binary entry point for wordlink.
//!
//! This binary drives the association and guess pipelines against a
//! directory of notes and prints results to the terminal.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wordlink::cli::{TerminalDisplay, build_openai_client, render_config};
use wordlink::host::{FixedSelection, FsVault, Vault};
use wordlink::observability;
use wordlink::sampler::Sampler;
use wordlink::{Dispatcher, WordlinkConfig};

/// Wordlink - word-association prompts built from a note vault.
#[derive(Parser)]
#[command(name = "wordlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run one association, or a guess when text is selected.
    Trigger {
        /// Vault directory.
        #[arg(long)]
        vault: PathBuf,

        /// Name of the note currently open.
        #[arg(short, long)]
        active: Option<String>,

        /// Selected text; runs a guess instead of an association.
        #[arg(short, long, default_value = "")]
        selection: String,
    },

    /// Print a random candidate subset without calling the service.
    Sample {
        /// Vault directory.
        #[arg(long)]
        vault: PathBuf,

        /// Subset size (defaults to the configured size).
        #[arg(short = 'n', long)]
        size: Option<usize>,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Save the API token.
    SetToken {
        /// Bearer token for the service.
        token: String,
    },

    /// Save the organization identifier.
    SetOrganization {
        /// Organization identifier.
        organization: String,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: WordlinkConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Trigger {
            vault,
            active,
            selection,
        } => cmd_trigger(config.with_env_overrides(), &vault, active, selection),

        Commands::Sample { vault, size } => cmd_sample(&config, &vault, size),

        Commands::Config { action } => cmd_config(config, action),
    }
}

/// Loads configuration from the file only; environment overrides are applied
/// by the commands that use them so they are never written back.
fn load_config(path: Option<&str>) -> Result<WordlinkConfig, Box<dyn std::error::Error>> {
    if let Some(config_path) = path {
        return WordlinkConfig::load_from_file(Path::new(config_path))
            .map_err(std::convert::Into::into);
    }

    if let Ok(config_path) = std::env::var("WORDLINK_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return WordlinkConfig::load_from_file(Path::new(&config_path))
                .map_err(std::convert::Into::into);
        }
    }

    WordlinkConfig::load_default().map_err(std::convert::Into::into)
}

/// Trigger command.
///
/// Results and pipeline failures are printed by the display, so a failed
/// pipeline only sets the exit code.
fn cmd_trigger(
    config: WordlinkConfig,
    vault: &Path,
    active: Option<String>,
    selection: String,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut vault = FsVault::open(vault)?;
    if let Some(active) = active {
        vault = vault.with_active(active);
    }

    let dispatcher = Dispatcher::from_config(build_openai_client(&config), &config);
    let outcome = dispatcher.trigger(
        &vault,
        &FixedSelection::new(selection),
        &TerminalDisplay::new(),
    );

    Ok(match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

/// Sample command.
fn cmd_sample(
    config: &WordlinkConfig,
    vault: &Path,
    size: Option<usize>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut sampler_config = config.sampler.clone();
    if let Some(size) = size {
        sampler_config = sampler_config.with_subset_size(size);
    }

    let pool = FsVault::open(vault)?.files()?;
    let subset = Sampler::from_config(&sampler_config).draw(&pool, &mut rand::thread_rng())?;

    for note in &subset {
        println!("{note}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Config command.
fn cmd_config(
    config: WordlinkConfig,
    action: ConfigAction,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            println!("{}", render_config(&config.with_env_overrides()));
        },
        ConfigAction::SetToken { token } => {
            let mut settings = config.settings.clone();
            settings.api_token = SecretString::from(token);
            save_settings(&config, &settings)?;
            println!("API token saved");
        },
        ConfigAction::SetOrganization { organization } => {
            let mut settings = config.settings.clone();
            settings.organization_id = organization;
            save_settings(&config, &settings)?;
            println!("Organization saved");
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn save_settings(
    config: &WordlinkConfig,
    settings: &wordlink::Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = config
        .settings_path()
        .ok_or("no configuration directory available")?;
    settings.save(&path)?;
    Ok(())
}
