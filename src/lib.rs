// Bills Manager - Core Library
// Bill store, CSV codec, aggregation, validation and the AI client,
// shared by the TUI binary and tests

pub mod bill;
pub mod validation;
pub mod store;
pub mod aggregate;
pub mod csv_codec;
pub mod config;
pub mod ai;
pub mod logging;

// Re-export commonly used types
pub use bill::{Bill, CURRENCY_SUFFIX, DATE_FORMAT, DEFAULT_CATEGORIES};
pub use validation::{is_valid_cost, is_valid_date, BillDraft, ValidationError};
pub use store::{BillStore, StoreError};
pub use aggregate::{by_category, by_date, format_total, total_cost, Summary};
pub use csv_codec::{
    export_to_csv, import_from_csv, read_bills, write_bills,
    HeaderMode, ImportReport, RowError,
};
pub use config::{AiSettings, Settings};
pub use ai::{AiClient, AiError, AiReply, spawn_query};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
