// End-to-end flow through the library: edit bills, export, re-import,
// and check the totals the charts are built from.

use bills_manager::{
    export_to_csv, import_from_csv, BillDraft, BillStore, HeaderMode, StoreError, Summary,
    ValidationError,
};
use std::cell::Cell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

fn draft(date: &str, name: &str, cost: &str, kind: &str) -> BillDraft {
    BillDraft {
        date: date.to_string(),
        name: name.to_string(),
        details: String::new(),
        cost: cost.to_string(),
        kind: kind.to_string(),
    }
}

#[test]
fn export_then_import_preserves_bills_and_totals() {
    let dir = TempDir::new().unwrap();
    let mut store = BillStore::new();

    store.add(&draft("2025-01-01 10:00", "Lunch", "50", "Food")).unwrap();
    store.add(&draft("2025-01-01 19:30", "Movie", "80 RMB", "Entertainment")).unwrap();
    store.add(&draft("2025-01-02 09:15", "Shirt, blue", "120.5", "Shopping")).unwrap();

    let written = export_to_csv(store.bills(), &dir.path().join("january")).unwrap();
    assert_eq!(written, dir.path().join("january.csv"));

    let report = import_from_csv(&written, HeaderMode::NameSentinel).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.bills, store.bills());

    let summary = Summary::compute(&report.bills);
    assert_eq!(summary.total_label(), "Total Cost: 250.50 RMB");
    assert_eq!(summary.by_date["2025-01-01"], 130.0);
    assert_eq!(summary.by_date["2025-01-02"], 120.5);
    assert_eq!(summary.by_category.len(), 3);
}

#[test]
fn import_replaces_store_and_notifies_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bills.csv");
    fs::write(
        &path,
        "NAME,DETAILS,COST,TYPE,DATE\n\
         2025-03-01 08:00,Bus,,3 RMB,Others\n\
         2025-03-01 12:00,Noodles,Canteen,18 RMB\n\
         2025-03-02 20:00,Cinema,,45 RMB,Entertainment\n",
    )
    .unwrap();

    let mut store = BillStore::new();
    store.add(&draft("2025-01-01 10:00", "Old", "1", "Food")).unwrap();

    let notified = Rc::new(Cell::new(0));
    let counter = Rc::clone(&notified);
    store.subscribe(move |_| counter.set(counter.get() + 1));

    let report = import_from_csv(&path, HeaderMode::NameSentinel).unwrap();
    assert_eq!(report.skipped_headers, 1);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].line(), 3);

    store.replace_all(report.bills);
    assert_eq!(notified.get(), 1);
    assert_eq!(store.len(), 2);
    assert_eq!(Summary::compute(store.bills()).total, 48.0);
}

#[test]
fn invalid_edits_leave_store_untouched() {
    let mut store = BillStore::new();
    store.add(&draft("2025-01-01 10:00", "Lunch", "50", "Food")).unwrap();
    let before = store.revision();

    let bad_date = store.update(0, &draft("2025/01/01", "Lunch", "50", "Food"));
    assert!(matches!(
        bad_date,
        Err(StoreError::Invalid(ValidationError::InvalidDate(_)))
    ));

    let bad_cost = store.add(&draft("2025-01-01 10:00", "Lunch", "fifty", "Food"));
    assert!(matches!(bad_cost, Err(ValidationError::InvalidCost(_))));

    assert!(matches!(
        store.update(7, &draft("2025-01-01 10:00", "Lunch", "50", "Food")),
        Err(StoreError::OutOfRange { index: 7, len: 1 })
    ));

    assert_eq!(store.revision(), before);
    assert_eq!(store.bills()[0].cost, "50 RMB");
}
