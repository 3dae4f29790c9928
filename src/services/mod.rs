pub mod backfill;
pub mod locale;
pub mod merge;
pub mod mse;
pub mod store;
pub mod summary_sync;
pub mod translit;
pub mod updater;

pub use backfill::{backfill_instruments, resolve_targets, BackfillOptions, InstrumentTarget};
pub use merge::merge;
pub use mse::{HistorySource, MseClient};
pub use store::DataStore;
pub use summary_sync::{resync, ResyncStats};
pub use translit::transliterate;
pub use updater::{update_all, UpdateOptions};
