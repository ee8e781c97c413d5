// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use spesa::application::LedgerService;
use spesa::domain::NewEntry;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Record a plain debit entry and return its assigned id
pub async fn record(
    service: &LedgerService,
    date: &str,
    amount: f64,
    category: &str,
) -> Result<i64> {
    let outcome = service
        .record_entry(NewEntry::new(date, amount, category))
        .await?;
    Ok(outcome.id)
}
