use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::Entry;

/// Snapshot wrapper for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub start_date: String,
    pub end_date: String,
    pub entries: Vec<Entry>,
}

/// Exporter for converting ledger data to external formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export entries in an inclusive date range to CSV format
    pub async fn export_entries_csv<W: Write>(
        &self,
        writer: W,
        start_date: &str,
        end_date: &str,
    ) -> Result<usize> {
        let entries = self.service.list_entries(start_date, end_date).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "id",
            "date",
            "amount",
            "category",
            "subcategory",
            "note",
            "type",
        ])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record(&[
                entry.id.to_string(),
                entry.date.clone(),
                entry.amount.to_string(),
                entry.category.clone(),
                entry.subcategory.clone(),
                entry.note.clone(),
                entry.entry_type.as_str().to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export entries in an inclusive date range as a JSON snapshot
    pub async fn export_entries_json<W: Write>(
        &self,
        mut writer: W,
        start_date: &str,
        end_date: &str,
    ) -> Result<usize> {
        let entries = self.service.list_entries(start_date, end_date).await?;
        let count = entries.len();

        let snapshot = EntriesSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            entries,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(count)
    }
}
