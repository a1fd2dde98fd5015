// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stocktake - inventory reconciliation with access control and correction
//! tracking.
//!
//! The CLI is the thin I/O layer: it parses arguments, loads and validates
//! configuration, and hands pre-authenticated identities (`--as <email>`)
//! to the core services. Sign-in itself is an external collaborator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stocktake::app::App;
use stocktake::ingest;
use stocktake_core::fields::ItemFields;
use stocktake_core::{AuditFilter, Identity, StocktakeError};
use tracing_subscriber::EnvFilter;

/// Stocktake - inventory reconciliation engine.
#[derive(Parser, Debug)]
#[command(name = "stocktake", version, about, long_about = None)]
struct Cli {
    /// Authenticated identity to act as (email).
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    identity: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an inventory from a CSV file; the acting identity becomes owner.
    Import {
        /// Unique inventory name.
        name: String,
        /// CSV file with a header row and one item per record.
        file: PathBuf,
        /// Human-readable title (defaults to the name).
        #[arg(long, default_value = "")]
        display_name: String,
    },
    /// List all inventories.
    List,
    /// Show the access decision for a user on an inventory.
    CheckAccess {
        inventory: String,
        email: String,
    },
    /// Grant delegated access (owner only).
    Grant {
        inventory: String,
        email: String,
    },
    /// Revoke delegated access (owner only).
    Revoke {
        inventory: String,
        email: String,
    },
    /// List all grants of an inventory (owner only).
    Grants {
        inventory: String,
    },
    /// Record a correction against an item.
    Correct {
        inventory: String,
        number: String,
        /// Field to submit, repeatable: --set ROOM=A2
        #[arg(long = "set", value_name = "NAME=VALUE")]
        fields: Vec<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Show the correction history and effective values of an item.
    History {
        inventory: String,
        number: String,
    },
    /// Show the reconciliation status of every item.
    Status {
        inventory: String,
    },
    /// Confirm an item was physically sighted.
    Confirm {
        inventory: String,
        number: String,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        found_status: Option<String>,
    },
    /// Register an item discovered during the walkthrough.
    Register {
        inventory: String,
        number: String,
        /// Field to record, repeatable: --set ROOM=A2
        #[arg(long = "set", value_name = "NAME=VALUE")]
        fields: Vec<String>,
    },
    /// Show the audit trail.
    Audit {
        #[arg(long)]
        inventory: Option<String>,
        /// Filter by acting user email.
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Delete an inventory and everything in it (owner only).
    Delete {
        inventory: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match stocktake_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            stocktake_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = match App::open(&config).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("stocktake: {e}");
            std::process::exit(2);
        }
    };

    let result = run(&cli, &app, &config).await;
    if let Err(e) = app.close().await {
        eprintln!("stocktake: {e}");
    }
    if let Err(e) = result {
        eprintln!("stocktake: {e}");
        std::process::exit(if e.is_client_error() { 1 } else { 2 });
    }
}

async fn run(
    cli: &Cli,
    app: &App,
    config: &stocktake_config::StocktakeConfig,
) -> Result<(), StocktakeError> {
    match &cli.command {
        Commands::Import {
            name,
            file,
            display_name,
        } => {
            let identity = require_identity(cli)?;
            let rows = ingest::read_rows(file, &config.ingest)?;
            let count = rows.len();
            let inventory = app.inventory.create(&identity, name, display_name, rows).await?;
            println!("imported {} items into {}", count, inventory.name);
        }
        Commands::List => {
            for inventory in app.inventory.list().await? {
                println!("{}\t{}", inventory.name, inventory.display_name);
            }
        }
        Commands::CheckAccess { inventory, email } => {
            let decision = app.access.check_access(inventory, email).await?;
            println!(
                "access={} owner={}",
                decision.has_access, decision.is_owner
            );
        }
        Commands::Grant { inventory, email } => {
            let identity = require_identity(cli)?;
            app.access.grant(inventory, &identity.email, email).await?;
            println!("granted {email} access to {inventory}");
        }
        Commands::Revoke { inventory, email } => {
            let identity = require_identity(cli)?;
            app.access.revoke(inventory, &identity.email, email).await?;
            println!("revoked {email} from {inventory}");
        }
        Commands::Grants { inventory } => {
            let identity = require_identity(cli)?;
            for grant in app.access.list_grants(inventory, &identity.email).await? {
                println!(
                    "{}\t{}\t{}",
                    grant.grantee.email,
                    if grant.permission.active { "active" } else { "revoked" },
                    grant.permission.granted_at,
                );
            }
        }
        Commands::Correct {
            inventory,
            number,
            fields,
            note,
        } => {
            let identity = require_identity(cli)?;
            let submitted = parse_field_args(fields)?;
            let correction = app
                .corrections
                .record(inventory, number, &identity.email, &submitted, note.clone())
                .await?;
            for (name, change) in &correction.changed_fields {
                println!(
                    "{}: {} -> {}",
                    name,
                    change.original.as_deref().unwrap_or("(blank)"),
                    change.new,
                );
            }
        }
        Commands::History { inventory, number } => {
            for correction in app.corrections.history(inventory, number).await? {
                let fields: Vec<String> = correction
                    .changed_fields
                    .iter()
                    .map(|(name, change)| {
                        format!(
                            "{}: {} -> {}",
                            name,
                            change.original.as_deref().unwrap_or("(blank)"),
                            change.new,
                        )
                    })
                    .collect();
                println!("{}\t{}", correction.created_at, fields.join(", "));
            }
            let effective = app.corrections.effective_fields(inventory, number).await?;
            let current: Vec<String> = effective
                .field_names()
                .iter()
                .filter_map(|name| effective.get(name).map(|v| format!("{name}={v}")))
                .collect();
            println!("effective: {}", current.join(" "));
        }
        Commands::Status { inventory } => {
            let identity = require_identity(cli)?;
            for view in app.inventory.item_statuses(inventory, &identity.email).await? {
                println!(
                    "{}\t{}{}",
                    view.item.number,
                    view.status.state,
                    if view.status.has_corrections { " (corrected)" } else { "" },
                );
            }
        }
        Commands::Confirm {
            inventory,
            number,
            room,
            found_status,
        } => {
            let identity = require_identity(cli)?;
            let item = app
                .recon
                .confirm(
                    inventory,
                    number,
                    &identity.email,
                    room.clone(),
                    found_status.clone(),
                )
                .await?;
            let has_corrections = app.corrections.has_corrections(inventory, number).await?;
            println!(
                "{}\t{}",
                item.number,
                stocktake_recon::classify(&item, has_corrections).state,
            );
        }
        Commands::Register {
            inventory,
            number,
            fields,
        } => {
            let identity = require_identity(cli)?;
            let item_fields = parse_field_args(fields)?;
            app.inventory
                .register_item(inventory, &identity.email, number, item_fields)
                .await?;
            println!("registered {number} in {inventory}");
        }
        Commands::Audit {
            inventory,
            user,
            limit,
        } => {
            let inventory_id = match inventory {
                Some(name) => Some(
                    app.store
                        .get_inventory_by_name(name)
                        .await?
                        .ok_or_else(|| StocktakeError::NotFound(format!("inventory {name}")))?
                        .id,
                ),
                None => None,
            };
            // Denial entries for unknown users carry the raw email, so fall
            // back to it when no user row exists.
            let user_id = match user {
                Some(email) => Some(
                    app.store
                        .get_user_by_email(email)
                        .await?
                        .map(|u| u.id)
                        .unwrap_or_else(|| email.clone()),
                ),
                None => None,
            };
            let filter = AuditFilter {
                inventory_id,
                user_id,
                limit: *limit,
            };
            for entry in app.audit.entries(&filter).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.created_at, entry.action, entry.user_id, entry.details,
                );
            }
        }
        Commands::Delete { inventory } => {
            let identity = require_identity(cli)?;
            app.inventory.delete(inventory, &identity.email).await?;
            println!("deleted {inventory}");
        }
    }
    Ok(())
}

fn require_identity(cli: &Cli) -> Result<Identity, StocktakeError> {
    let email = cli
        .identity
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| StocktakeError::Invalid("missing --as <email>".to_string()))?;
    Ok(Identity {
        email: email.to_string(),
        display_name: None,
    })
}

/// Turn repeated `--set NAME=VALUE` arguments into a field set.
fn parse_field_args(args: &[String]) -> Result<ItemFields, StocktakeError> {
    let mut pairs = Vec::with_capacity(args.len());
    for arg in args {
        let (name, value) = arg.split_once('=').ok_or_else(|| {
            StocktakeError::Invalid(format!("expected NAME=VALUE, got {arg}"))
        })?;
        pairs.push((name.to_string(), value.to_string()));
    }
    Ok(ItemFields::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn field_args_parse_and_normalize() {
        let fields =
            parse_field_args(&["room=A2".to_string(), "Serial=SN-9".to_string()]).unwrap();
        assert_eq!(fields.get("ROOM"), Some("A2"));
        assert_eq!(fields.get("SERIAL"), Some("SN-9"));

        let err = parse_field_args(&["no-equals".to_string()]).unwrap_err();
        assert!(matches!(err, StocktakeError::Invalid(_)));
    }

    #[test]
    fn missing_identity_is_invalid() {
        let cli = Cli {
            identity: None,
            command: Commands::List,
        };
        assert!(matches!(
            require_identity(&cli),
            Err(StocktakeError::Invalid(_))
        ));
    }
}
