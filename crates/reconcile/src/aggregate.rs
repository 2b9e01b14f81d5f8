use conciliador_core::{Money, TransactionRecord};
use serde::{Deserialize, Serialize};

/// Counts and totals over a cleaned movement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementStats {
    pub total: usize,
    /// Strictly positive movements.
    pub entries: usize,
    /// Strictly negative movements.
    pub exits: usize,
    pub sum: Money,
    pub entries_total: Money,
    pub exits_total: Money,
}

impl Default for MovementStats {
    fn default() -> Self {
        Self {
            total: 0,
            entries: 0,
            exits: 0,
            sum: Money::zero(),
            entries_total: Money::zero(),
            exits_total: Money::zero(),
        }
    }
}

impl MovementStats {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, r| {
            stats.total += 1;
            stats.sum += r.amount;
            if r.amount.is_positive() {
                stats.entries += 1;
                stats.entries_total += r.amount;
            } else if r.amount.is_negative() {
                stats.exits += 1;
                stats.exits_total += r.amount;
            }
            stats
        })
    }

    /// Movements that are neither entries nor exits.
    pub fn zero_amount(&self) -> usize {
        self.total - self.entries - self.exits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use conciliador_import::AmountFormat;

    fn rec(cents: i64) -> TransactionRecord {
        TransactionRecord::new(
            0,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "X",
            Money::from_cents(cents),
        )
    }

    #[test]
    fn counts_entries_and_exits() {
        let stats = MovementStats::from_records(&[rec(10_000), rec(-2_500), rec(500), rec(-100)]);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.exits, 2);
        assert_eq!(stats.sum, Money::from_cents(7_900));
        assert_eq!(stats.entries_total, Money::from_cents(10_500));
        assert_eq!(stats.exits_total, Money::from_cents(-2_600));
    }

    #[test]
    fn zero_rows_count_only_toward_total() {
        let stats = MovementStats::from_records(&[rec(0), rec(100), rec(0)]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.entries + stats.exits, 1);
        assert_eq!(stats.zero_amount(), 2);
    }

    #[test]
    fn entries_plus_exits_equal_total_without_zeros() {
        let stats = MovementStats::from_records(&[rec(1), rec(-1), rec(7)]);
        assert_eq!(stats.entries + stats.exits, stats.total);
    }

    #[test]
    fn largest_parseable_amounts_sum_without_overflow() {
        let parsed = AmountFormat::SuffixSign.parse("999.999.999.999.999,99C").unwrap();
        let mut record = rec(0);
        record.amount = parsed;
        let records = vec![record; 1_000];
        let stats = MovementStats::from_records(&records);
        assert_eq!(stats.entries, 1_000);
        assert!(stats.sum.is_positive());
    }

    #[test]
    fn empty_set() {
        assert_eq!(MovementStats::from_records(&[]), MovementStats::default());
    }
}
