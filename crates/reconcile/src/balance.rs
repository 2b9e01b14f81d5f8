use conciliador_core::Money;
use conciliador_import::LedgerRow;
use serde::{Deserialize, Serialize};

pub const PREVIOUS_BALANCE_LABEL: &str = "SALDO ANTERIOR";
pub const DAY_BALANCE_LABEL: &str = "SALDO DO DIA";

/// Running-balance snapshots a ledger prints between movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceKind {
    Previous,
    Day,
}

impl BalanceKind {
    /// Case-insensitive label lookup on a row description.
    pub fn classify(description: &str) -> Option<BalanceKind> {
        let upper = description.to_uppercase();
        if upper.contains(PREVIOUS_BALANCE_LABEL) {
            Some(BalanceKind::Previous)
        } else if upper.contains(DAY_BALANCE_LABEL) {
            Some(BalanceKind::Day)
        } else {
            None
        }
    }
}

/// Balances found in a ledger. `None` means "not identified", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBalances {
    pub previous: Option<Money>,
    pub day: Option<Money>,
}

#[derive(Debug, Clone, Default)]
pub struct BalanceExtraction {
    pub balances: ExtractedBalances,
    /// The input minus every balance-labelled row, in original order.
    pub movements: Vec<LedgerRow>,
}

/// Separates balance marker rows from movements. When a label repeats, the
/// last occurrence wins.
pub fn extract_balances(rows: Vec<LedgerRow>) -> BalanceExtraction {
    let mut balances = ExtractedBalances::default();
    let mut movements = Vec::with_capacity(rows.len());

    for row in rows {
        match BalanceKind::classify(&row.description) {
            Some(BalanceKind::Previous) => balances.previous = row.amount,
            Some(BalanceKind::Day) => balances.day = row.amount,
            None => movements.push(row),
        }
    }

    BalanceExtraction { balances, movements }
}

/// Keeps only the day-balance row with the highest position. Everything else
/// is untouched. Returns the filtered rows and how many snapshots were dropped.
pub fn filter_duplicate_day_balances(rows: Vec<LedgerRow>) -> (Vec<LedgerRow>, usize) {
    let is_day = |row: &LedgerRow| BalanceKind::classify(&row.description) == Some(BalanceKind::Day);

    let Some(last) = rows.iter().filter(|&r| is_day(r)).map(|r| r.position).max() else {
        return (rows, 0);
    };

    let before = rows.len();
    let kept: Vec<LedgerRow> = rows
        .into_iter()
        .filter(|r| !is_day(r) || r.position == last)
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept_position = last, "intermediate day balances dropped");
    }
    (kept, dropped)
}
