use serde::Serialize;

use crate::domain::{normalize_date, Entry, EntryId, EntryPatch, EntryType, NewEntry};
use crate::storage::{CategoryTotal, Repository};

use super::AppError;

/// Structured status marker returned alongside every write outcome,
/// so clients can react without inspecting error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NO_CHANGES")]
    NoChanges,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
}

impl OpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpStatus::Ok => "OK",
            OpStatus::NoChanges => "NO_CHANGES",
            OpStatus::NotFound => "NOT_FOUND",
        }
    }
}

/// Outcome of a write operation: the status marker plus the id the
/// operation targeted (or assigned, for inserts).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OpOutcome {
    pub status: OpStatus,
    pub id: EntryId,
}

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, tool-call
/// adapter, exporter).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path (creates the file and
    /// the schema when missing; a no-op for existing data).
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Record a new entry. The entry is persisted with whatever type
    /// the draft carries, which defaults to debit.
    pub async fn record_entry(&self, entry: NewEntry) -> Result<OpOutcome, AppError> {
        let entry = Self::validate_new(entry)?;
        let id = self.repo.insert_entry(&entry).await?;
        Ok(OpOutcome {
            status: OpStatus::Ok,
            id,
        })
    }

    /// Record an incoming-money entry. The type is always forced to
    /// credit, regardless of what the draft carries.
    pub async fn record_credit_entry(&self, entry: NewEntry) -> Result<OpOutcome, AppError> {
        self.record_entry(entry.with_type(EntryType::Credit)).await
    }

    /// Get a single entry by id.
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>, AppError> {
        Ok(self.repo.get_entry(id).await?)
    }

    /// List entries in an inclusive date range, ordered by ascending
    /// id. An inverted range yields an empty list, not an error.
    pub async fn list_entries(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Entry>, AppError> {
        let start = Self::require_date("start_date", start_date)?;
        let end = Self::require_date("end_date", end_date)?;
        Ok(self.repo.list_entries_between(&start, &end).await?)
    }

    /// Sum amounts per category over an inclusive date range. A
    /// non-empty `category` restricts the aggregation to that single
    /// category; debit and credit amounts are summed together as-is.
    pub async fn summarize(
        &self,
        start_date: &str,
        end_date: &str,
        category: Option<&str>,
    ) -> Result<Vec<CategoryTotal>, AppError> {
        let start = Self::require_date("start_date", start_date)?;
        let end = Self::require_date("end_date", end_date)?;
        // An empty filter string means "all categories", matching the
        // adapter's default argument
        let category = category.filter(|c| !c.is_empty());
        Ok(self.repo.sum_by_category(&start, &end, category).await?)
    }

    /// Apply a partial update to an entry. Only fields supplied as
    /// `Some` are applied; explicit zero and empty-string values count
    /// as supplied. Returns NO_CHANGES without touching storage when
    /// the patch is empty, NOT_FOUND when the id matches no row.
    pub async fn update_entry(
        &self,
        id: EntryId,
        mut patch: EntryPatch,
    ) -> Result<OpOutcome, AppError> {
        if patch.is_empty() {
            return Ok(OpOutcome {
                status: OpStatus::NoChanges,
                id,
            });
        }

        if let Some(date) = patch.date.take() {
            patch.date = Some(Self::require_date("date", &date)?);
        }
        if let Some(amount) = patch.amount {
            Self::check_amount(amount)?;
        }
        // Category stays mandatory: it can be changed but not cleared
        if let Some(category) = &patch.category {
            if category.trim().is_empty() {
                return Err(AppError::MissingField("category"));
            }
        }

        let affected = self.repo.update_entry(id, &patch).await?;
        let status = if affected == 0 {
            OpStatus::NotFound
        } else {
            OpStatus::Ok
        };
        Ok(OpOutcome { status, id })
    }

    /// Delete an entry by id. Hard delete: a second call with the same
    /// id reports NOT_FOUND.
    pub async fn delete_entry(&self, id: EntryId) -> Result<OpOutcome, AppError> {
        let removed = self.repo.delete_entry(id).await?;
        let status = if removed == 0 {
            OpStatus::NotFound
        } else {
            OpStatus::Ok
        };
        Ok(OpOutcome { status, id })
    }

    fn validate_new(mut entry: NewEntry) -> Result<NewEntry, AppError> {
        entry.date = Self::require_date("date", &entry.date)?;
        if entry.category.trim().is_empty() {
            return Err(AppError::MissingField("category"));
        }
        Self::check_amount(entry.amount)?;
        Ok(entry)
    }

    fn require_date(field: &'static str, value: &str) -> Result<String, AppError> {
        if value.trim().is_empty() {
            return Err(AppError::MissingField(field));
        }
        normalize_date(value).map_err(|_| AppError::InvalidDate {
            input: value.to_string(),
        })
    }

    fn check_amount(amount: f64) -> Result<(), AppError> {
        // NaN and infinity would poison SUM aggregates
        if !amount.is_finite() {
            return Err(AppError::InvalidAmount(amount.to_string()));
        }
        Ok(())
    }
}
