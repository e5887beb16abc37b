pub mod config;
pub mod record;
pub mod scan;
pub mod snapshots;
pub mod store;

pub use config::ScannerConfig;
pub use record::ValuationRecord;
pub use scan::{build_alert, ScanSummary, Scanner, SymbolOutcome};
pub use snapshots::{is_supported_symbol, load_snapshots, SnapshotEntry};
pub use store::RecordStore;
