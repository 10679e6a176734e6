// 📊 Aggregator - totals and groupings behind the header label and charts
// Always recomputed from scratch; unparsable costs are skipped and logged

use crate::bill::{Bill, CURRENCY_SUFFIX};
use std::collections::BTreeMap;
use tracing::warn;

/// Numeric cost of a bill, or None when it should not count.
fn counted_cost(bill: &Bill) -> Option<f64> {
    match bill.cost_amount()? {
        Ok(amount) if amount.is_finite() => Some(amount),
        Ok(amount) => {
            warn!(cost = %bill.cost, name = %bill.name, "cost is not finite: {}", amount);
            None
        }
        Err(e) => {
            warn!(cost = %bill.cost, name = %bill.name, "could not parse cost: {}", e);
            None
        }
    }
}

/// Sum of every parsable cost.
pub fn total_cost(bills: &[Bill]) -> f64 {
    bills.iter().filter_map(counted_cost).fold(0.0, |acc, amount| acc + amount)
}

/// "Total Cost: 35.75 RMB"
pub fn format_total(total: f64) -> String {
    format!("Total Cost: {:.2} {}", total, CURRENCY_SUFFIX)
}

/// Summed cost per calendar day (date text before the first space).
pub fn by_date(bills: &[Bill]) -> BTreeMap<String, f64> {
    group_by(bills, |bill| bill.day())
}

/// Summed cost per literal category label.
pub fn by_category(bills: &[Bill]) -> BTreeMap<String, f64> {
    group_by(bills, |bill| bill.kind.as_str())
}

fn group_by<'a, F>(bills: &'a [Bill], key: F) -> BTreeMap<String, f64>
where
    F: Fn(&'a Bill) -> &'a str,
{
    let mut groups = BTreeMap::new();
    for bill in bills {
        if let Some(amount) = counted_cost(bill) {
            *groups.entry(key(bill).to_string()).or_insert(0.0) += amount;
        }
    }
    groups
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Everything the UI derives from the store, computed in one pass per change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total: f64,
    pub by_date: BTreeMap<String, f64>,
    pub by_category: BTreeMap<String, f64>,
}

impl Summary {
    pub fn compute(bills: &[Bill]) -> Self {
        Summary {
            total: total_cost(bills),
            by_date: by_date(bills),
            by_category: by_category(bills),
        }
    }

    pub fn total_label(&self) -> String {
        format_total(self.total)
    }

    /// Category totals with their share of the overall total (0-100),
    /// largest first.
    pub fn category_shares(&self) -> Vec<(String, f64, f64)> {
        let mut shares: Vec<(String, f64, f64)> = self
            .by_category
            .iter()
            .map(|(category, amount)| {
                let share = if self.total.abs() > f64::EPSILON {
                    amount / self.total * 100.0
                } else {
                    0.0
                };
                (category.clone(), *amount, share)
            })
            .collect();
        shares.sort_by(|a, b| b.1.total_cmp(&a.1));
        shares
    }
}

// ============================================================================
// TESTS
// ============================================================================
