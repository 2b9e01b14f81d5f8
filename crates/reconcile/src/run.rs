use chrono::NaiveDateTime;
use conciliador_core::{DataIssue, DateRange, LedgerSide, Money, TransactionRecord};
use conciliador_import::{sanitize, RawRow, DEFAULT_REQUIRED_COLUMNS};
use uuid::Uuid;

use crate::aggregate::MovementStats;
use crate::balance::{extract_balances, filter_duplicate_day_balances, ExtractedBalances};
use crate::config::{LedgerConfig, RunConfig};
use crate::matcher::Matcher;
use crate::report::{build_report, ReportHeader, Workbook};
use crate::result::ReconciliationResult;

/// Inputs that belong to one reconciliation run and nothing else.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Correlates log lines of one run.
    pub run_id: Uuid,
    pub user_name: String,
    pub opening_balance: Money,
    pub generated_at: NaiveDateTime,
    pub config: RunConfig,
}

impl RunContext {
    pub fn new(user_name: &str, opening_balance: Money, config: RunConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            user_name: user_name.to_string(),
            opening_balance,
            generated_at: chrono::Local::now().naive_local(),
            config,
        }
    }
}

/// One ledger after cleaning, ready for matching.
#[derive(Debug, Clone)]
pub struct PreparedLedger {
    pub side: LedgerSide,
    pub records: Vec<TransactionRecord>,
    pub balances: ExtractedBalances,
    pub issues: Vec<DataIssue>,
    pub dropped_blank: usize,
    pub dropped_excluded: usize,
    pub duplicate_balances_dropped: usize,
}

impl PreparedLedger {
    pub fn period(&self) -> Option<DateRange> {
        DateRange::spanning(self.records.iter().map(|r| r.date))
    }

    pub fn cleanup(&self) -> CleanupCounts {
        CleanupCounts {
            side: self.side,
            dropped_blank: self.dropped_blank,
            dropped_excluded: self.dropped_excluded,
            duplicate_balances_dropped: self.duplicate_balances_dropped,
        }
    }
}

/// Rows a ledger lost before matching, by reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupCounts {
    pub side: LedgerSide,
    pub dropped_blank: usize,
    pub dropped_excluded: usize,
    pub duplicate_balances_dropped: usize,
}

/// Sanitize → normalize → balance separation → record conversion. Rows that
/// fail to normalize become issues; nothing here aborts.
pub fn prepare_ledger(side: LedgerSide, rows: Vec<RawRow>, ledger: &LedgerConfig) -> PreparedLedger {
    let sanitized = sanitize(rows, DEFAULT_REQUIRED_COLUMNS, &ledger.rules());

    let format = ledger.source.amount_format();
    let normalized = sanitized.rows.into_iter().map(|r| r.normalize(format)).collect();
    let (normalized, duplicate_balances_dropped) = filter_duplicate_day_balances(normalized);
    let extraction = extract_balances(normalized);

    let mut records = Vec::with_capacity(extraction.movements.len());
    let mut issues = Vec::new();
    for row in extraction.movements {
        match row.into_record(side) {
            Ok(record) => records.push(record),
            Err(issue) => {
                tracing::warn!(%side, position = issue.position, raw = %issue.raw, "{}", issue.kind);
                issues.push(issue);
            }
        }
    }

    tracing::info!(
        %side,
        records = records.len(),
        issues = issues.len(),
        previous_balance = ?extraction.balances.previous,
        day_balance = ?extraction.balances.day,
        "ledger prepared"
    );

    PreparedLedger {
        side,
        records,
        balances: extraction.balances,
        issues,
        dropped_blank: sanitized.dropped_blank,
        dropped_excluded: sanitized.dropped_excluded,
        duplicate_balances_dropped,
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: ReconciliationResult,
    pub report: Workbook,
    /// Row-level parse failures from both ledgers, statement first.
    pub warnings: Vec<DataIssue>,
    /// Statement first, then control.
    pub cleanup: [CleanupCounts; 2],
}

/// Runs one reconciliation from raw rows to report.
pub fn run(ctx: &RunContext, statement_rows: Vec<RawRow>, control_rows: Vec<RawRow>) -> RunOutcome {
    let span = tracing::info_span!("run", run_id = %ctx.run_id);
    let _guard = span.enter();

    let statement = prepare_ledger(LedgerSide::Statement, statement_rows, &ctx.config.statement);
    let control = prepare_ledger(LedgerSide::Control, control_rows, &ctx.config.control);

    let statement_stats = MovementStats::from_records(&statement.records);
    let control_stats = MovementStats::from_records(&control.records);
    let statement_period = statement.period();
    let cleanup = [statement.cleanup(), control.cleanup()];

    let matcher = Matcher::new(ctx.config.match_key);
    let matches = matcher.reconcile(statement.records, control.records);

    let result = ReconciliationResult::new(
        ctx.config.match_key,
        matches,
        ctx.opening_balance,
        statement.balances,
        statement_stats,
        control_stats,
    );
    tracing::info!(
        matched = result.matched_count,
        statement_only = result.statement.unmatched_count,
        control_only = result.control.unmatched_count,
        "reconciliation finished"
    );

    let mut warnings = statement.issues;
    warnings.extend(control.issues);

    let header = ReportHeader {
        user_name: ctx.user_name.clone(),
        generated_at: ctx.generated_at,
        statement_period,
    };
    let report = build_report(&result, &warnings, &header);

    RunOutcome {
        result,
        report,
        warnings,
        cleanup,
    }
}
