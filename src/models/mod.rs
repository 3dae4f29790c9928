mod archive;
mod daily_record;
mod issuer;
mod report;
mod summary;

pub use archive::StockArchive;
pub use daily_record::DailyRecord;
pub use issuer::{Issuer, ReportLink};
pub use report::{RunReport, SyncOutcome};
pub use summary::SummaryRow;
