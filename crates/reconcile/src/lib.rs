pub mod aggregate;
pub mod balance;
pub mod config;
pub mod matcher;
pub mod report;
pub mod result;
pub mod run;

pub use aggregate::MovementStats;
pub use balance::{
    extract_balances, filter_duplicate_day_balances, BalanceExtraction, BalanceKind,
    ExtractedBalances,
};
pub use config::{ConfigError, LedgerConfig, RunConfig};
pub use matcher::{Match, MatchKey, MatchStatus, Matcher};
pub use report::{
    build_report, Cell, ReportHeader, Row, RowKind, Sheet, Workbook, MATCHED_SHEET, UNMATCHED_SHEET,
};
pub use result::{ReconciliationResult, SideSummary};
pub use run::{prepare_ledger, run, CleanupCounts, PreparedLedger, RunContext, RunOutcome};
