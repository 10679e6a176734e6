// 🗂️ Bill Store - single source of truth for the session
// Ordered, duplicates allowed; every mutation notifies subscribers

use crate::bill::Bill;
use crate::validation::{BillDraft, ValidationError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("no bill at position {index} (store holds {len})")]
    OutOfRange { index: usize, len: usize },
}

type Listener = Box<dyn FnMut(&[Bill])>;

/// Owned, ordered collection of bills.
///
/// Insertion order is display order. Listeners registered with
/// [`BillStore::subscribe`] run after each successful mutation with the
/// full, current contents.
#[derive(Default)]
pub struct BillStore {
    bills: Vec<Bill>,
    listeners: Vec<Listener>,
    revision: u64,
}

impl BillStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bills(bills: Vec<Bill>) -> Self {
        BillStore {
            bills,
            ..Self::default()
        }
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn get(&self, index: usize) -> Option<&Bill> {
        self.bills.get(index)
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    /// Bumped once per successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback run after every successful mutation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&[Bill]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Validate the draft and append it. Returns the new bill's position.
    pub fn add(&mut self, draft: &BillDraft) -> Result<usize, ValidationError> {
        let bill = draft.validate()?;
        self.bills.push(bill);
        debug!(len = self.bills.len(), "bill added");
        self.changed();
        Ok(self.bills.len() - 1)
    }

    /// Validate the draft and overwrite all five fields of the bill at `index`.
    /// A rejected draft leaves the store untouched.
    pub fn update(&mut self, index: usize, draft: &BillDraft) -> Result<(), StoreError> {
        let len = self.bills.len();
        if index >= len {
            return Err(StoreError::OutOfRange { index, len });
        }

        let bill = draft.validate()?;
        self.bills[index] = bill;
        debug!(index, "bill updated");
        self.changed();
        Ok(())
    }

    /// Remove the bill at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Bill> {
        if index >= self.bills.len() {
            return None;
        }
        let removed = self.bills.remove(index);
        debug!(index, "bill removed");
        self.changed();
        Some(removed)
    }

    /// Drop every bill and take `bills` in their given order (CSV import).
    /// Imported rows are stored verbatim; they do not pass the form gate.
    pub fn replace_all(&mut self, bills: Vec<Bill>) {
        self.bills = bills;
        debug!(len = self.bills.len(), "store replaced");
        self.changed();
    }

    fn changed(&mut self) {
        self.revision += 1;
        let bills = &self.bills;
        for listener in self.listeners.iter_mut() {
            listener(bills);
        }
    }
}

impl std::fmt::Debug for BillStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillStore")
            .field("bills", &self.bills)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn draft(name: &str, cost: &str) -> BillDraft {
        BillDraft {
            date: "2025-01-01 10:00".to_string(),
            name: name.to_string(),
            details: String::new(),
            cost: cost.to_string(),
            kind: "Food".to_string(),
        }
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut store = BillStore::new();
        assert_eq!(store.add(&draft("Lunch", "50")).unwrap(), 0);
        assert_eq!(store.add(&draft("Dinner", "80")).unwrap(), 1);

        let names: Vec<&str> = store.bills().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Lunch", "Dinner"]);
        assert_eq!(store.get(1).unwrap().cost, "80 RMB");
    }

    #[test]
    fn test_add_allows_duplicates() {
        let mut store = BillStore::new();
        store.add(&draft("Coffee", "5")).unwrap();
        store.add(&draft("Coffee", "5")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rejected_add_leaves_store_untouched() {
        let mut store = BillStore::new();
        store.add(&draft("Lunch", "50")).unwrap();
        let before = store.revision();

        let err = store.add(&draft("Broken", "fifty")).unwrap_err();
        assert_eq!(err.field(), "cost");
        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn test_update_replaces_fields() {
        let mut store = BillStore::new();
        store.add(&draft("Lunch", "50")).unwrap();

        let mut edit = BillDraft::from_bill(store.get(0).unwrap());
        edit.name = "Brunch".to_string();
        edit.cost = "65.5 RMB".to_string();
        store.update(0, &edit).unwrap();

        let bill = store.get(0).unwrap();
        assert_eq!(bill.name, "Brunch");
        assert_eq!(bill.cost, "65.5 RMB");
    }

    #[test]
    fn test_update_rejects_invalid_and_out_of_range() {
        let mut store = BillStore::new();
        store.add(&draft("Lunch", "50")).unwrap();

        let mut bad = draft("Lunch", "50");
        bad.date = "yesterday".to_string();
        assert!(matches!(store.update(0, &bad), Err(StoreError::Invalid(_))));
        assert_eq!(store.get(0).unwrap().date, "2025-01-01 10:00");

        assert_eq!(
            store.update(3, &draft("Lunch", "50")),
            Err(StoreError::OutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_remove() {
        let mut store = BillStore::new();
        store.add(&draft("Lunch", "50")).unwrap();
        store.add(&draft("Dinner", "80")).unwrap();

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.name, "Lunch");
        assert_eq!(store.len(), 1);
        assert!(store.remove(5).is_none());
    }

    #[test]
    fn test_listeners_see_every_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut store = BillStore::new();
        store.subscribe(move |bills| sink.borrow_mut().push(bills.len()));

        store.add(&draft("Lunch", "50")).unwrap();
        store.add(&draft("Dinner", "80")).unwrap();
        let _ = store.add(&draft("Bad", "x"));
        store.remove(0);
        store.replace_all(Vec::new());

        assert_eq!(*seen.borrow(), vec![1, 2, 1, 0]);
        assert_eq!(store.revision(), 4);
    }
}
