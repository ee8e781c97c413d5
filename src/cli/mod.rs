use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{LedgerService, OpStatus};
use crate::domain::{EntryId, EntryPatch, NewEntry};
use crate::io::Exporter;
use crate::server;

/// Spesa - Personal Expense Ledger
#[derive(Parser)]
#[command(name = "spesa")]
#[command(about = "A local-first expense ledger with a tool-call server interface")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "spesa.db")]
    pub database: String,

    /// Category catalog file path
    #[arg(long, default_value = "categories.json")]
    pub categories: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record an expense (debit) entry
    Record {
        /// Entry date (ISO 8601 format: YYYY-MM-DD)
        date: String,

        /// Amount (e.g. 12.50)
        amount: f64,

        /// Category label
        category: String,

        /// Subcategory label
        #[arg(short, long, default_value = "")]
        subcategory: String,

        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Record an incoming-money (credit) entry
    Credit {
        /// Entry date (ISO 8601 format: YYYY-MM-DD)
        date: String,

        /// Amount (e.g. 1500.00)
        amount: f64,

        /// Category label
        category: String,

        /// Subcategory label
        #[arg(short, long, default_value = "")]
        subcategory: String,

        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// List entries in an inclusive date range
    Entries {
        /// Range start (YYYY-MM-DD, inclusive)
        start_date: String,

        /// Range end (YYYY-MM-DD, inclusive)
        end_date: String,
    },

    /// Summarize amounts per category over a date range
    Summarize {
        /// Range start (YYYY-MM-DD, inclusive)
        start_date: String,

        /// Range end (YYYY-MM-DD, inclusive)
        end_date: String,

        /// Restrict the summary to a single category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Edit fields of an existing entry
    Edit {
        /// Entry id
        id: EntryId,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New amount
        #[arg(long)]
        amount: Option<f64>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New subcategory
        #[arg(long)]
        subcategory: Option<String>,

        /// New note
        #[arg(long)]
        note: Option<String>,
    },

    /// Delete an entry by id
    Delete {
        /// Entry id
        id: EntryId,
    },

    /// Print the category catalog
    Categories,

    /// Export entries in a date range to CSV or JSON
    Export {
        /// Range start (YYYY-MM-DD, inclusive)
        start_date: String,

        /// Range end (YYYY-MM-DD, inclusive)
        end_date: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Run the tool-call request loop on stdin/stdout
    Serve,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Record {
                date,
                amount,
                category,
                subcategory,
                note,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let entry = NewEntry::new(date, amount, category)
                    .with_subcategory(subcategory)
                    .with_note(note);
                let outcome = service.record_entry(entry).await?;
                println!("Recorded entry {}", outcome.id);
            }

            Commands::Credit {
                date,
                amount,
                category,
                subcategory,
                note,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let entry = NewEntry::new(date, amount, category)
                    .with_subcategory(subcategory)
                    .with_note(note);
                let outcome = service.record_credit_entry(entry).await?;
                println!("Recorded credit entry {}", outcome.id);
            }

            Commands::Entries {
                start_date,
                end_date,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_entries_command(&service, &start_date, &end_date).await?;
            }

            Commands::Summarize {
                start_date,
                end_date,
                category,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_summarize_command(&service, &start_date, &end_date, category.as_deref())
                    .await?;
            }

            Commands::Edit {
                id,
                date,
                amount,
                category,
                subcategory,
                note,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let patch = EntryPatch {
                    date,
                    amount,
                    category,
                    subcategory,
                    note,
                };
                let outcome = service.update_entry(id, patch).await?;
                match outcome.status {
                    OpStatus::Ok => match service.get_entry(id).await? {
                        Some(entry) => println!(
                            "Updated entry {}: {} {:.2} {}",
                            entry.id, entry.date, entry.amount, entry.category
                        ),
                        None => println!("Updated entry {}", id),
                    },
                    OpStatus::NoChanges => println!("Nothing to update"),
                    OpStatus::NotFound => println!("Entry {} not found", id),
                }
            }

            Commands::Delete { id } => {
                let service = LedgerService::connect(&self.database).await?;
                let outcome = service.delete_entry(id).await?;
                match outcome.status {
                    OpStatus::NotFound => println!("Entry {} not found", id),
                    _ => println!("Deleted entry {}", id),
                }
            }

            Commands::Categories => {
                let catalog = server::read_categories(Path::new(&self.categories))?;
                io::stdout().write_all(&catalog.bytes)?;
            }

            Commands::Export {
                start_date,
                end_date,
                output,
                format,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, &start_date, &end_date, output, &format).await?;
            }

            Commands::Serve => {
                let level = if self.verbose { "debug" } else { "info" };
                tracing_subscriber::fmt()
                    .with_env_filter(format!("spesa={level}"))
                    .init();

                // Idempotent: creates the schema when missing, never
                // touches existing rows
                let service = LedgerService::init(&self.database).await?;
                server::serve(&service, Path::new(&self.categories)).await?;
            }
        }
        Ok(())
    }
}

async fn run_entries_command(
    service: &LedgerService,
    start_date: &str,
    end_date: &str,
) -> Result<()> {
    let entries = service.list_entries(start_date, end_date).await?;

    if entries.is_empty() {
        println!("No entries between {} and {}", start_date, end_date);
        return Ok(());
    }

    for entry in &entries {
        let label = if entry.subcategory.is_empty() {
            entry.category.clone()
        } else {
            format!("{}/{}", entry.category, entry.subcategory)
        };

        println!(
            "{:>5}  {}  {:>10.2}  {:<6}  {}  {}",
            entry.id,
            entry.date,
            entry.amount,
            entry.entry_type.as_str(),
            label,
            entry.note
        );
    }

    Ok(())
}

async fn run_summarize_command(
    service: &LedgerService,
    start_date: &str,
    end_date: &str,
    category: Option<&str>,
) -> Result<()> {
    let totals = service.summarize(start_date, end_date, category).await?;

    if totals.is_empty() {
        println!("No entries between {} and {}", start_date, end_date);
        return Ok(());
    }

    for total in &totals {
        println!("{:<24} {:>10.2}", total.category, total.total_amount);
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    start_date: &str,
    end_date: &str,
    output: Option<String>,
    format: &str,
) -> Result<()> {
    let exporter = Exporter::new(service);

    match output {
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("Failed to create {}", path))?;
            let count = write_export(&exporter, file, start_date, end_date, format).await?;
            println!("Exported {} entries to {}", count, path);
        }
        None => {
            write_export(&exporter, io::stdout().lock(), start_date, end_date, format).await?;
        }
    }

    Ok(())
}

async fn write_export<W: Write>(
    exporter: &Exporter<'_>,
    writer: W,
    start_date: &str,
    end_date: &str,
    format: &str,
) -> Result<usize> {
    match format {
        "csv" => exporter.export_entries_csv(writer, start_date, end_date).await,
        "json" => exporter.export_entries_json(writer, start_date, end_date).await,
        other => anyhow::bail!("Unknown export format: {} (expected csv or json)", other),
    }
}
