// ✅ Validation - gate in front of every add/edit
// Checks the date format and the numeric part of the cost before a bill
// reaches the store

use crate::bill::{format_cost, strip_currency, Bill, DATE_FORMAT};
use chrono::NaiveDateTime;

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Format error: Invalid date format. Please use yyyy-MM-dd HH:mm.")]
    InvalidDate(String),

    #[error("Format error: Invalid cost format. Please enter a valid number.")]
    InvalidCost(String),
}

impl ValidationError {
    /// Name of the form field that failed
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidDate(_) => "date",
            ValidationError::InvalidCost(_) => "cost",
        }
    }

    /// The rejected input, verbatim
    pub fn value(&self) -> &str {
        match self {
            ValidationError::InvalidDate(v) | ValidationError::InvalidCost(v) => v,
        }
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

/// True iff `date` is present, non-blank and matches `yyyy-MM-dd HH:mm`
/// exactly (two-digit fields, real calendar date). Never panics.
pub fn is_valid_date(date: Option<&str>) -> bool {
    let Some(date) = date.map(str::trim) else {
        return false;
    };
    if date.is_empty() {
        return false;
    }

    match NaiveDateTime::parse_from_str(date, DATE_FORMAT) {
        // chrono accepts single-digit fields; round-trip to insist on padding
        Ok(parsed) => parsed.format(DATE_FORMAT).to_string() == date,
        Err(_) => false,
    }
}

/// True iff `cost` is present, non-blank and parses as a finite decimal.
/// Negative values pass; a currency suffix does not.
pub fn is_valid_cost(cost: Option<&str>) -> bool {
    let Some(cost) = cost.map(str::trim) else {
        return false;
    };
    if cost.is_empty() {
        return false;
    }

    cost.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

// ============================================================================
// FORM DRAFT
// ============================================================================

/// Raw text of the add/edit form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillDraft {
    pub date: String,
    pub name: String,
    pub details: String,
    /// Number, optionally followed by the currency suffix
    pub cost: String,
    pub kind: String,
}

impl BillDraft {
    /// Pre-fill a draft from an existing bill (edit dialog)
    pub fn from_bill(bill: &Bill) -> Self {
        BillDraft {
            date: bill.date.clone(),
            name: bill.name.clone(),
            details: bill.details.clone(),
            cost: bill.cost.clone(),
            kind: bill.kind.clone(),
        }
    }

    /// Check date and cost, then produce the bill to store with its cost
    /// normalized to "<number> RMB".
    pub fn validate(&self) -> Result<Bill, ValidationError> {
        if !is_valid_date(Some(&self.date)) {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }

        let numeric = strip_currency(&self.cost);
        if !is_valid_cost(Some(numeric)) {
            return Err(ValidationError::InvalidCost(self.cost.clone()));
        }

        Ok(Bill {
            date: self.date.trim().to_string(),
            name: self.name.clone(),
            details: self.details.clone(),
            cost: format_cost(numeric),
            kind: self.kind.clone(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(date: &str, cost: &str) -> BillDraft {
        BillDraft {
            date: date.to_string(),
            name: "Lunch".to_string(),
            details: "Restaurant".to_string(),
            cost: cost.to_string(),
            kind: "Food".to_string(),
        }
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date(Some("2023-01-01 10:00")));
        assert!(is_valid_date(Some(" 2023-01-01 10:00 ")));

        assert!(!is_valid_date(Some("2023/01/01 10:00")));
        assert!(!is_valid_date(Some("2023-01-01")));
        assert!(!is_valid_date(Some("not a date")));
        assert!(!is_valid_date(Some("2023-13-01 10:00")));
        assert!(!is_valid_date(Some("2023-02-30 10:00")));
        assert!(!is_valid_date(Some("2023-1-1 10:00")));
        assert!(!is_valid_date(Some("2023-01-01 10:00:00")));
        assert!(!is_valid_date(None));
        assert!(!is_valid_date(Some(" ")));
    }

    #[test]
    fn test_is_valid_cost() {
        assert!(is_valid_cost(Some("100")));
        assert!(is_valid_cost(Some("123.45")));
        assert!(is_valid_cost(Some("0")));
        assert!(is_valid_cost(Some("-12.5")));

        assert!(!is_valid_cost(Some("abc")));
        assert!(!is_valid_cost(Some("100 RMB")));
        assert!(!is_valid_cost(Some("NaN")));
        assert!(!is_valid_cost(Some("inf")));
        assert!(!is_valid_cost(None));
        assert!(!is_valid_cost(Some(" ")));
    }

    #[test]
    fn test_validate_appends_suffix() {
        let bill = draft("2025-01-01 10:00", "50").validate().unwrap();
        assert_eq!(bill.cost, "50 RMB");
        assert_eq!(bill.kind, "Food");
    }

    #[test]
    fn test_validate_keeps_single_suffix() {
        let bill = draft("2025-01-01 10:00", "50 rmb").validate().unwrap();
        assert_eq!(bill.cost, "50 RMB");

        let bill = draft("2025-01-01 10:00", "12.5RMB").validate().unwrap();
        assert_eq!(bill.cost, "12.5 RMB");
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let err = draft("01/01/2025", "50").validate().unwrap_err();
        assert_eq!(err.field(), "date");
        assert_eq!(err.value(), "01/01/2025");
        assert_eq!(
            err.to_string(),
            "Format error: Invalid date format. Please use yyyy-MM-dd HH:mm."
        );
    }

    #[test]
    fn test_validate_rejects_bad_cost() {
        let err = draft("2025-01-01 10:00", "fifty").validate().unwrap_err();
        assert_eq!(err.field(), "cost");

        let err = draft("2025-01-01 10:00", "").validate().unwrap_err();
        assert_eq!(err.field(), "cost");
    }

    #[test]
    fn test_draft_from_bill_round_trips() {
        let bill = Bill::new("2025-01-02 15:00", "Groceries", "Supermarket", "150 RMB", "Shopping");
        let again = BillDraft::from_bill(&bill).validate().unwrap();
        assert_eq!(again, bill);
    }
}
