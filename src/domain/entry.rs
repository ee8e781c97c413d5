use serde::{Deserialize, Serialize};

/// Entry ids are surrogate keys assigned by the store on insert.
/// They are unique for the lifetime of the database and never reused.
pub type EntryId = i64;

/// Directional tag on an entry. It does not affect the stored sign of
/// the amount; debit and credit amounts are both kept as recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Debit,
    Credit,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Debit => "debit",
            EntryType::Credit => "credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "debit" => Some(EntryType::Debit),
            "credit" => Some(EntryType::Credit),
            _ => None,
        }
    }
}

/// One ledger line item as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    /// ISO-8601 date (`YYYY-MM-DD`); string order equals date order
    pub date: String,
    /// Signed amount; the sign does not encode direction, `entry_type` does
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
    pub note: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// A new entry before the store has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
    pub note: String,
    pub entry_type: EntryType,
}

impl NewEntry {
    /// Create a new draft entry with the mandatory fields.
    /// Subcategory and note default to empty, the type to debit.
    pub fn new(date: impl Into<String>, amount: f64, category: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            amount,
            category: category.into(),
            subcategory: String::new(),
            note: String::new(),
            entry_type: EntryType::Debit,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = subcategory.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }
}

/// Partial update for an entry. A field is applied only when it is
/// `Some`, so zero and the empty string are settable values; `None`
/// always means "leave the stored value untouched". The id and the
/// entry type are not alterable through a patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPatch {
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub note: Option<String>,
}

impl EntryPatch {
    /// True when no field is supplied at all.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.note.is_none()
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_defaults() {
        let entry = NewEntry::new("2024-01-05", 10.0, "food");

        assert_eq!(entry.date, "2024-01-05");
        assert_eq!(entry.amount, 10.0);
        assert_eq!(entry.category, "food");
        assert_eq!(entry.subcategory, "");
        assert_eq!(entry.note, "");
        assert_eq!(entry.entry_type, EntryType::Debit);
    }

    #[test]
    fn test_new_entry_builders() {
        let entry = NewEntry::new("2024-01-05", 10.0, "food")
            .with_subcategory("groceries")
            .with_note("weekly shop")
            .with_type(EntryType::Credit);

        assert_eq!(entry.subcategory, "groceries");
        assert_eq!(entry.note, "weekly shop");
        assert_eq!(entry.entry_type, EntryType::Credit);
    }

    #[test]
    fn test_entry_type_round_trip() {
        assert_eq!(EntryType::from_str("debit"), Some(EntryType::Debit));
        assert_eq!(EntryType::from_str("credit"), Some(EntryType::Credit));
        assert_eq!(EntryType::from_str("transfer"), None);
        assert_eq!(EntryType::Debit.as_str(), "debit");
        assert_eq!(EntryType::Credit.as_str(), "credit");
    }

    #[test]
    fn test_entry_serializes_type_key() {
        let entry = Entry {
            id: 1,
            date: "2024-01-05".to_string(),
            amount: 10.0,
            category: "food".to_string(),
            subcategory: String::new(),
            note: String::new(),
            entry_type: EntryType::Credit,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "credit");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(EntryPatch::default().is_empty());
        assert!(!EntryPatch::default().with_note("x").is_empty());
        // Explicit zero counts as supplied
        assert!(!EntryPatch::default().with_amount(0.0).is_empty());
    }

    #[test]
    fn test_patch_deserializes_missing_fields_as_absent() {
        let patch: EntryPatch = serde_json::from_str(r#"{"note": ""}"#).unwrap();
        assert_eq!(patch.note.as_deref(), Some(""));
        assert!(patch.date.is_none());
        assert!(patch.amount.is_none());
    }
}
