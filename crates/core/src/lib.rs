pub mod money;
pub mod period;
pub mod record;

pub use money::Money;
pub use period::DateRange;
pub use record::{DataIssue, IssueKind, LedgerSide, TransactionRecord};
