// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Eleuthia - a local-first encrypted credential vault.
//!
//! This is the binary entry point for the Eleuthia CLI.

mod app;
mod backup;
mod entries;
mod status;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eleuthia_config::EleuthiaConfig;
use eleuthia_core::EleuthiaError;
use eleuthia_vault::{SearchFilters, prompt};
use tracing::error;

use crate::app::App;
use crate::entries::{ENTRY_PASSWORD_ENV_VAR, EntryFields};

/// Eleuthia - a local-first encrypted credential vault.
#[derive(Parser, Debug)]
#[command(name = "eleuthia", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this TOML file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new vault.
    Init {
        /// Overwrite an existing vault. Its entries become unrecoverable.
        #[arg(long)]
        replace: bool,
    },
    /// Show whether a vault exists and its KDF parameters.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List every entry.
    List,
    /// Search entries by title, username, URL or notes.
    Search {
        /// Case-insensitive substring; empty matches everything.
        #[arg(default_value = "")]
        query: String,
        /// Only entries whose URL hostname equals this site.
        #[arg(long)]
        site: Option<String>,
        /// Only entries with a password.
        #[arg(long)]
        has_password: bool,
    },
    /// List the distinct site hostnames.
    Sites,
    /// Add an entry, or replace one when --id names an existing entry.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Show one entry.
    Show {
        id: String,
        /// Print the password in clear.
        #[arg(long)]
        reveal: bool,
    },
    /// Delete an entry.
    Delete { id: String },
    /// Import entries from a browser CSV export.
    ImportCsv { file: PathBuf },
    /// Write an encrypted backup file.
    Export {
        /// Directory to write into.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Replace the vault with an encrypted backup file.
    RestoreBackup {
        file: PathBuf,
        #[arg(long)]
        yes: bool,
    },
    /// Manage encrypted snapshots.
    Snapshot {
        #[command(subcommand)]
        action: SnapshotCommands,
    },
    /// Erase the vault records. Snapshots are kept.
    Destroy {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum SnapshotCommands {
    /// Capture the current ciphertext.
    Create {
        #[arg(long)]
        name: Option<String>,
    },
    /// List snapshots, newest first.
    List,
    /// Replace the vault with a snapshot.
    Restore {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Delete a snapshot.
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => eleuthia_config::load_and_validate_path(path),
        None => eleuthia_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            eleuthia_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let Some(command) = cli.command else {
        println!("eleuthia: use --help for available commands");
        return;
    };

    if let Err(e) = run(config, command).await {
        error!(kind = %e.kind(), "command failed: {e}");
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(config: EleuthiaConfig, command: Commands) -> Result<(), EleuthiaError> {
    let app = App::open(config).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let manager = &app.manager;

    match command {
        Commands::Init { replace } => {
            let (passphrase, confirm) = prompt::get_new_passphrase()?;
            if replace {
                app.gate.create_replacing(&passphrase, &confirm).await?;
            } else {
                app.gate.create(&passphrase, &confirm).await?;
            }
            writeln!(out, "Vault created.").map_err(entries::io_err)?;
        }
        Commands::Status { json } => {
            status::run_status(&app.config, manager, json, &mut out).await?;
        }
        Commands::List => {
            app.unlock().await?;
            entries::run_list(manager, &mut out).await?;
        }
        Commands::Search {
            query,
            site,
            has_password,
        } => {
            app.unlock().await?;
            let filters = SearchFilters {
                site,
                require_password: has_password,
            };
            entries::run_search(manager, &query, &filters, &mut out).await?;
        }
        Commands::Sites => {
            app.unlock().await?;
            entries::run_sites(manager, &mut out).await?;
        }
        Commands::Add {
            title,
            username,
            url,
            notes,
            id,
        } => {
            app.unlock().await?;
            let password = entry_password()?;
            let fields = EntryFields {
                id,
                title,
                username,
                password,
                url,
                notes,
            };
            entries::run_add(manager, fields, &mut out).await?;
        }
        Commands::Show { id, reveal } => {
            app.unlock().await?;
            entries::run_show(manager, &id, reveal, &mut out).await?;
        }
        Commands::Delete { id } => {
            app.unlock().await?;
            entries::run_delete(manager, &id, &mut out).await?;
        }
        Commands::ImportCsv { file } => {
            app.unlock().await?;
            entries::run_import(manager, &file, &mut out).await?;
        }
        Commands::Export { out: dir } => {
            app.authorize().await?;
            backup::run_export(manager, &dir, &mut out).await?;
        }
        Commands::RestoreBackup { file, yes } => {
            app.authorize().await?;
            backup::run_restore_backup(manager, &file, yes, &mut out).await?;
        }
        Commands::Snapshot { action } => {
            app.authorize().await?;
            match action {
                SnapshotCommands::Create { name } => {
                    backup::run_snapshot_create(manager, name.as_deref(), &mut out).await?
                }
                SnapshotCommands::List => backup::run_snapshot_list(manager, &mut out).await?,
                SnapshotCommands::Restore { id, yes } => {
                    backup::run_snapshot_restore(manager, &id, yes, &mut out).await?
                }
                SnapshotCommands::Delete { id } => {
                    backup::run_snapshot_delete(manager, &id, &mut out).await?
                }
            }
        }
        Commands::Destroy { yes } => {
            if !yes {
                return Err(EleuthiaError::Validation(
                    "destroy erases the vault permanently; pass --yes to confirm".into(),
                ));
            }
            app.authorize().await?;
            app.gate.clear_vault().await?;
            writeln!(out, "Vault destroyed.").map_err(entries::io_err)?;
        }
    }
    Ok(())
}

/// Entry password from the environment, else a hidden prompt.
fn entry_password() -> Result<Option<String>, EleuthiaError> {
    if let Ok(value) = std::env::var(ENTRY_PASSWORD_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(Some(value));
    }
    prompt::read_secret_field("Entry password (empty for none)")
}

/// Initialize the tracing subscriber with an env-filter.
///
/// Logs go to stderr so command output on stdout stays scriptable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("eleuthia={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
