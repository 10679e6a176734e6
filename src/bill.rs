// 🧾 Bill Record - one expense entry
// Five plain string fields, positional in CSV, named in JSON

use serde::{Deserialize, Serialize};

/// Currency unit appended to every stored cost ("50 RMB")
pub const CURRENCY_SUFFIX: &str = "RMB";

/// Canonical date format for `Bill::date`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Categories offered by the add form. The set is open-ended:
/// imported or edited bills may carry any label.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Food", "Shopping", "Entertainment", "Others"];

/// Category used when the add form has nothing selected
pub const FALLBACK_CATEGORY: &str = "Others";

// ============================================================================
// BILL
// ============================================================================

/// A single expense record.
///
/// There is no identity field: the store addresses bills by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// `yyyy-MM-dd HH:mm`
    pub date: String,

    /// Payee or short title
    pub name: String,

    pub details: String,

    /// Decimal magnitude plus currency suffix, e.g. "50 RMB"
    pub cost: String,

    /// Category label (case-sensitive)
    #[serde(rename = "type")]
    pub kind: String,
}

impl Bill {
    pub fn new(
        date: impl Into<String>,
        name: impl Into<String>,
        details: impl Into<String>,
        cost: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Bill {
            date: date.into(),
            name: name.into(),
            details: details.into(),
            cost: cost.into(),
            kind: kind.into(),
        }
    }

    /// Build a bill from positional fields (date, name, details, cost, type).
    /// Returns None when fewer than five fields are given; extras are ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        if fields.len() < 5 {
            return None;
        }
        Some(Bill::new(
            fields[0].as_ref(),
            fields[1].as_ref(),
            fields[2].as_ref(),
            fields[3].as_ref(),
            fields[4].as_ref(),
        ))
    }

    /// Positional view used by the CSV writer
    pub fn to_fields(&self) -> [&str; 5] {
        [&self.date, &self.name, &self.details, &self.cost, &self.kind]
    }

    /// Calendar day of the bill: everything before the first space
    pub fn day(&self) -> &str {
        self.date.split(' ').next().unwrap_or("")
    }

    /// Numeric cost with the currency suffix stripped.
    ///
    /// Returns None for an empty cost and Err for text that is not a number.
    pub fn cost_amount(&self) -> Option<Result<f64, std::num::ParseFloatError>> {
        let numeric = strip_currency(&self.cost);
        if numeric.is_empty() {
            return None;
        }
        Some(numeric.parse::<f64>())
    }
}

// ============================================================================
// COST HELPERS
// ============================================================================

/// Remove the currency suffix (any case) and surrounding whitespace.
pub fn strip_currency(cost: &str) -> &str {
    let trimmed = cost.trim();
    let suffix_len = CURRENCY_SUFFIX.len();
    if trimmed.len() >= suffix_len {
        let split = trimmed.len() - suffix_len;
        if trimmed.is_char_boundary(split)
            && trimmed[split..].eq_ignore_ascii_case(CURRENCY_SUFFIX)
        {
            return trimmed[..split].trim_end();
        }
    }
    trimmed
}

/// Render a validated numeric cost the way it is stored ("50 RMB").
pub fn format_cost(numeric: &str) -> String {
    format!("{} {}", numeric.trim(), CURRENCY_SUFFIX)
}

// ============================================================================
// TESTS
// ============================================================================
