use std::fmt;

use chrono::NaiveDate;

/// Entry dates are stored as ISO-8601 `YYYY-MM-DD` strings. Keeping
/// them zero padded makes lexicographic ordering equal date ordering,
/// which the range queries rely on.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string and re-format it into canonical `YYYY-MM-DD`.
/// Example: "2024-1-5" -> "2024-01-05"
pub fn normalize_date(input: &str) -> Result<String, ParseDateError> {
    let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| ParseDateError::InvalidFormat(input.to_string()))?;
    Ok(date.format(DATE_FORMAT).to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDateError {
    InvalidFormat(String),
}

impl fmt::Display for ParseDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDateError::InvalidFormat(input) => {
                write!(f, "invalid date '{}', expected YYYY-MM-DD", input)
            }
        }
    }
}

impl std::error::Error for ParseDateError {}
