//! Crudcap CLI - issue, inspect and execute CRUD capability tokens.
//!
//! Every command reads the layered configuration first. The signing secret,
//! entity schemas and the store directory all come from there.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crudcap_capabilities::{CombinedOptions, CrudCommand};
use crudcap_config::{Config, ConfigResult, ResolvedConfig};

mod commands;
mod config_bridge;
mod theme;

use commands::{config, execute, inspect, issue, keys};

/// Crudcap - signed capability tokens for CRUD operations
#[derive(Parser)]
#[command(name = "crudcap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file, layered over the user config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the signing secret
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Issue tokens
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },

    /// Verify a token and show what it grants
    Inspect {
        /// The signed token
        token: String,
    },

    /// Run a token against the configured store
    Execute {
        /// The signed token
        token: String,
        /// Params as JSON text, or `-` to read them from stdin
        #[arg(short, long)]
        params: Option<String>,
        /// Entity type to serve (defaults to the token's namespace)
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// View and check configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Generate a random secret (printed as hex unless --out is given)
    Generate {
        /// Write the secret to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the key ID of the configured secret
    Show,
}

#[derive(Subcommand)]
enum IssueCommands {
    /// Issue a single token
    Token {
        /// Entity type (token namespace)
        entity: String,
        /// create, read, update, delete or duplicate
        command: CrudCommand,
        /// Target record id (all commands except create)
        #[arg(long)]
        id: Option<i64>,
        /// Allowed field (repeatable, or comma-separated)
        #[arg(short, long = "field", value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Issue read/update/duplicate/delete tokens for several records
    Combined {
        /// Entity type (token namespace)
        entity: String,
        /// Record ids (repeatable, or comma-separated)
        #[arg(long = "id", value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        /// Fields readable through read tokens
        #[arg(short, long = "field", value_delimiter = ',')]
        fields: Vec<String>,
        /// Fields writable through create/update/duplicate tokens
        /// (defaults to --field)
        #[arg(short, long = "write-field", value_delimiter = ',')]
        write_fields: Vec<String>,
        /// Also issue a create token
        #[arg(long)]
        create: bool,
        /// Skip read tokens
        #[arg(long)]
        no_read: bool,
        /// Skip update tokens
        #[arg(long)]
        no_update: bool,
        /// Skip duplicate tokens
        #[arg(long)]
        no_duplicate: bool,
        /// Skip delete tokens
        #[arg(long)]
        no_delete: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Validate the current configuration
    Validate,
    /// Show config file paths and env fallbacks
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(cli.config.as_deref());

    // Set up logging from config, with --verbose override.
    let log_config = match &loaded {
        Ok(resolved) => {
            let mut lc = config_bridge::to_log_config(&resolved.config);
            if cli.verbose {
                "debug".clone_into(&mut lc.level);
            }
            lc
        },
        Err(_) => {
            let level = if cli.verbose { "debug" } else { "warn" };
            crudcap_telemetry::LogConfig::new(level)
        },
    };
    if let Err(e) = crudcap_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Keys {
            command: KeyCommands::Generate { out, force },
        } => keys::generate(out.as_deref(), force),
        Commands::Keys {
            command: KeyCommands::Show,
        } => keys::show(&require(loaded)?),
        Commands::Issue { command } => handle_issue(&require(loaded)?, command),
        Commands::Inspect { token } => inspect::inspect(&require(loaded)?, &token),
        Commands::Execute {
            token,
            params,
            entity,
        } => {
            let response = execute::execute(
                &require(loaded)?,
                &token,
                params.as_deref(),
                entity.as_deref(),
            )?;
            if !response.is_success() {
                std::process::exit(1);
            }
            Ok(())
        },
        Commands::Config { command } => handle_config(loaded, command),
    }
}

fn require(loaded: ConfigResult<ResolvedConfig>) -> Result<ResolvedConfig> {
    Ok(loaded?)
}

fn handle_issue(resolved: &ResolvedConfig, command: IssueCommands) -> Result<()> {
    match command {
        IssueCommands::Token {
            entity,
            command,
            id,
            fields,
        } => issue::issue_token(resolved, &entity, command, id, &fields),
        IssueCommands::Combined {
            entity,
            ids,
            fields,
            write_fields,
            create,
            no_read,
            no_update,
            no_duplicate,
            no_delete,
        } => {
            let options = CombinedOptions {
                create,
                read: !no_read,
                update: !no_update,
                duplicate: !no_duplicate,
                delete: !no_delete,
            };
            issue::issue_combined(resolved, &entity, &ids, &fields, &write_fields, options)
        },
    }
}

fn handle_config(loaded: ConfigResult<ResolvedConfig>, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { format } => config::show_config(&require(loaded)?, &format),
        ConfigCommands::Validate => {
            if !config::validate_config(&loaded) {
                std::process::exit(1);
            }
            Ok(())
        },
        ConfigCommands::Paths => {
            config::show_paths(&require(loaded)?);
            Ok(())
        },
    }
}
