use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::domain::{Entry, EntryId, EntryPatch, EntryType, NewEntry};

use super::MIGRATION_001_INITIAL;

/// One aggregation row produced by `sum_by_category`: the total of all
/// entry amounts (debit and credit alike) for a single category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total_amount: f64,
}

/// Repository for persisting and querying ledger entries.
///
/// Holds a single pooled connection handle for the lifetime of the
/// process; every operation is one SQL statement that acquires a
/// connection for its duration and releases it on all exit paths.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to invoke on every startup: the
    /// schema is created with IF NOT EXISTS and existing rows are
    /// never touched.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Insert a new entry and return the id assigned by the store.
    /// AUTOINCREMENT makes concurrent inserts collision-free.
    pub async fn insert_entry(&self, entry: &NewEntry) -> Result<EntryId> {
        let result = sqlx::query(
            r#"
            INSERT INTO entries (date, amount, category, subcategory, note, type)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.date)
        .bind(entry.amount)
        .bind(&entry.category)
        .bind(&entry.subcategory)
        .bind(&entry.note)
        .bind(entry.entry_type.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to insert entry")?;

        Ok(result.last_insert_rowid())
    }

    /// Get a single entry by id.
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, amount, category, subcategory, note, type
            FROM entries
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// List entries with dates in `[start_date, end_date]`, both ends
    /// inclusive, compared as ISO strings. Ordered by ascending id so
    /// entries recorded on the same date keep their insertion order.
    /// An inverted range matches nothing and yields an empty vec.
    pub async fn list_entries_between(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, date, amount, category, subcategory, note, type
            FROM entries
            WHERE date BETWEEN ? AND ?
            ORDER BY id ASC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Sum entry amounts per category over an inclusive date range,
    /// optionally restricted to a single category. Categories with no
    /// matching rows do not appear. Ordered by category ascending.
    pub async fn sum_by_category(
        &self,
        start_date: &str,
        end_date: &str,
        category: Option<&str>,
    ) -> Result<Vec<CategoryTotal>> {
        let rows = match category {
            Some(cat) => {
                sqlx::query(
                    r#"
                    SELECT category, SUM(amount) AS total_amount
                    FROM entries
                    WHERE date BETWEEN ? AND ? AND category = ?
                    GROUP BY category
                    ORDER BY category ASC
                    "#,
                )
                .bind(start_date)
                .bind(end_date)
                .bind(cat)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT category, SUM(amount) AS total_amount
                    FROM entries
                    WHERE date BETWEEN ? AND ?
                    GROUP BY category
                    ORDER BY category ASC
                    "#,
                )
                .bind(start_date)
                .bind(end_date)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to summarize entries")?;

        Ok(rows
            .iter()
            .map(|row| CategoryTotal {
                category: row.get("category"),
                total_amount: row.get("total_amount"),
            })
            .collect())
    }

    /// Apply a patch to the entry with the given id and return the
    /// number of rows affected (0 when the id does not exist).
    ///
    /// The update is a single atomic statement: absent fields keep
    /// their stored value via COALESCE, so there is no read-merge-write
    /// window and no string-built SQL. The entry type is never touched.
    pub async fn update_entry(&self, id: EntryId, patch: &EntryPatch) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE entries
            SET date = COALESCE(?, date),
                amount = COALESCE(?, amount),
                category = COALESCE(?, category),
                subcategory = COALESCE(?, subcategory),
                note = COALESCE(?, note)
            WHERE id = ?
            "#,
        )
        .bind(&patch.date)
        .bind(patch.amount)
        .bind(&patch.category)
        .bind(&patch.subcategory)
        .bind(&patch.note)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update entry")?;

        Ok(result.rows_affected())
    }

    /// Delete the entry with the given id and return the number of
    /// rows removed (0 when the id does not exist).
    pub async fn delete_entry(&self, id: EntryId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;

        Ok(result.rows_affected())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<Entry> {
        let type_str: String = row.get("type");

        Ok(Entry {
            id: row.get("id"),
            date: row.get("date"),
            amount: row.get("amount"),
            category: row.get("category"),
            subcategory: row.get("subcategory"),
            note: row.get("note"),
            entry_type: EntryType::from_str(&type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid entry type: {}", type_str))?,
        })
    }
}
