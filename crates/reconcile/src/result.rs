use conciliador_core::{LedgerSide, Money, TransactionRecord};
use serde::{Deserialize, Serialize};

use crate::aggregate::MovementStats;
use crate::balance::ExtractedBalances;
use crate::matcher::{Match, MatchKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSummary {
    pub movements: MovementStats,
    pub unmatched_count: usize,
    pub unmatched_total: Money,
}

/// Everything one run produced: the full partition plus the figures framing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub match_key: MatchKey,
    pub matches: Vec<Match>,
    pub opening_balance: Money,
    /// Opening balance plus every statement movement.
    pub closing_balance: Money,
    /// Balance markers found in the statement.
    pub statement_balances: ExtractedBalances,
    pub statement: SideSummary,
    pub control: SideSummary,
    pub matched_count: usize,
    pub matched_total: Money,
}

impl ReconciliationResult {
    pub fn new(
        match_key: MatchKey,
        matches: Vec<Match>,
        opening_balance: Money,
        statement_balances: ExtractedBalances,
        statement_movements: MovementStats,
        control_movements: MovementStats,
    ) -> Self {
        let summarize = |side: LedgerSide, movements: MovementStats| {
            let unmatched: Vec<&TransactionRecord> = unmatched_on(&matches, side).collect();
            SideSummary {
                movements,
                unmatched_count: unmatched.len(),
                unmatched_total: unmatched.iter().map(|r| r.amount).sum(),
            }
        };
        let statement = summarize(LedgerSide::Statement, statement_movements);
        let control = summarize(LedgerSide::Control, control_movements);

        let (matched_count, matched_total) = matches
            .iter()
            .filter_map(|m| match m {
                Match::Matched { statement, .. } => Some(statement.amount),
                _ => None,
            })
            .fold((0, Money::zero()), |(n, total), amount| (n + 1, total + amount));

        Self {
            match_key,
            closing_balance: opening_balance + statement_movements.sum,
            matches,
            opening_balance,
            statement_balances,
            statement,
            control,
            matched_count,
            matched_total,
        }
    }

    pub fn matched(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| m.is_matched())
    }

    /// Records of `side` that found no partner, in matcher order.
    pub fn unmatched(&self, side: LedgerSide) -> impl Iterator<Item = &TransactionRecord> {
        unmatched_on(&self.matches, side)
    }

    pub fn summary(&self, side: LedgerSide) -> &SideSummary {
        match side {
            LedgerSide::Statement => &self.statement,
            LedgerSide::Control => &self.control,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

fn unmatched_on(matches: &[Match], side: LedgerSide) -> impl Iterator<Item = &TransactionRecord> {
    matches.iter().filter_map(move |m| match (m, side) {
        (Match::StatementOnly { statement }, LedgerSide::Statement) => Some(statement),
        (Match::ControlOnly { control }, LedgerSide::Control) => Some(control),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Matcher;
    use chrono::NaiveDate;

    fn rec(position: usize, cents: i64) -> TransactionRecord {
        TransactionRecord::new(
            position,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "X",
            Money::from_cents(cents),
        )
    }

    fn build(s: Vec<TransactionRecord>, c: Vec<TransactionRecord>, opening: i64) -> ReconciliationResult {
        let (ss, cs) = (MovementStats::from_records(&s), MovementStats::from_records(&c));
        let matches = Matcher::default().reconcile(s, c);
        ReconciliationResult::new(
            MatchKey::AmountAndDate,
            matches,
            Money::from_cents(opening),
            ExtractedBalances::default(),
            ss,
            cs,
        )
    }

    #[test]
    fn duplicate_statement_amount_leaves_one_unmatched() {
        let result = build(vec![rec(0, 10_000), rec(1, 10_000)], vec![rec(0, 10_000)], 0);
        assert_eq!(result.matched_count, 1);
        assert_eq!(result.matched_total, Money::from_cents(10_000));
        assert_eq!(result.statement.unmatched_count, 1);
        assert_eq!(result.statement.unmatched_total, Money::from_cents(10_000));
        assert_eq!(result.control.unmatched_count, 0);
        assert_eq!(result.control.unmatched_total, Money::zero());
    }

    #[test]
    fn closing_balance_adds_statement_movements() {
        let result = build(vec![rec(0, 5_000), rec(1, -2_000)], vec![], 100_000);
        assert_eq!(result.closing_balance, Money::from_cents(103_000));
        assert_eq!(result.statement.movements.total, 2);
    }

    #[test]
    fn unmatched_iterates_one_side() {
        let result = build(vec![rec(0, 1)], vec![rec(0, 2), rec(1, 3)], 0);
        assert_eq!(result.unmatched(LedgerSide::Statement).count(), 1);
        assert_eq!(result.unmatched(LedgerSide::Control).count(), 2);
        assert_eq!(result.matched().count(), 0);
        assert_eq!(result.summary(LedgerSide::Control).unmatched_total, Money::from_cents(5));
    }

    #[test]
    fn empty_run_is_not_an_error() {
        let result = build(vec![], vec![], 0);
        assert!(result.is_empty());
        assert_eq!(result.matched_count, 0);
    }
}
