use std::cmp::Ordering;

use chrono::NaiveDate;
use conciliador_core::{Money, TransactionRecord};
use serde::{Deserialize, Serialize};

/// Which fields two records must share to be paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    /// Amount only. Coincidental equal amounts on different days will pair.
    Amount,
    /// Amount and date.
    #[default]
    AmountAndDate,
}

impl std::str::FromStr for MatchKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "amount" | "valor" => Ok(MatchKey::Amount),
            "amount_and_date" | "valor_data" => Ok(MatchKey::AmountAndDate),
            other => Err(format!("Unknown match key: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    UnmatchedStatementOnly,
    UnmatchedControlOnly,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Matched => write!(f, "MATCHED"),
            MatchStatus::UnmatchedStatementOnly => write!(f, "UNMATCHED_STATEMENT_ONLY"),
            MatchStatus::UnmatchedControlOnly => write!(f, "UNMATCHED_CONTROL_ONLY"),
        }
    }
}

/// One row of the reconciliation: a pair, or a record with no partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Match {
    #[serde(rename = "MATCHED")]
    Matched {
        statement: TransactionRecord,
        control: TransactionRecord,
    },
    #[serde(rename = "UNMATCHED_STATEMENT_ONLY")]
    StatementOnly { statement: TransactionRecord },
    #[serde(rename = "UNMATCHED_CONTROL_ONLY")]
    ControlOnly { control: TransactionRecord },
}

impl Match {
    pub fn status(&self) -> MatchStatus {
        match self {
            Match::Matched { .. } => MatchStatus::Matched,
            Match::StatementOnly { .. } => MatchStatus::UnmatchedStatementOnly,
            Match::ControlOnly { .. } => MatchStatus::UnmatchedControlOnly,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Match::Matched { .. })
    }

    pub fn statement(&self) -> Option<&TransactionRecord> {
        match self {
            Match::Matched { statement, .. } | Match::StatementOnly { statement } => Some(statement),
            Match::ControlOnly { .. } => None,
        }
    }

    pub fn control(&self) -> Option<&TransactionRecord> {
        match self {
            Match::Matched { control, .. } | Match::ControlOnly { control } => Some(control),
            Match::StatementOnly { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    amount: Money,
    date: Option<NaiveDate>,
}

struct Keyed {
    key: Key,
    record: TransactionRecord,
}

/// Exact-key one-to-one matcher.
///
/// Both sides are sorted by `(key, input index)` and merged in lockstep, so
/// among records sharing a key the earliest statement record pairs with the
/// earliest control record. Output is ordered by key; within a key, pairs come
/// first, then that key's surplus records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    pub key: MatchKey,
}

impl Matcher {
    pub fn new(key: MatchKey) -> Self {
        Self { key }
    }

    pub fn reconcile(
        &self,
        statement: Vec<TransactionRecord>,
        control: Vec<TransactionRecord>,
    ) -> Vec<Match> {
        let mut out = Vec::with_capacity(statement.len().max(control.len()));
        let mut left = self.keyed(statement).into_iter().peekable();
        let mut right = self.keyed(control).into_iter().peekable();

        loop {
            let order = match (left.peek(), right.peek()) {
                (Some(s), Some(c)) => s.key.cmp(&c.key),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };

            match order {
                Ordering::Less => {
                    if let Some(s) = left.next() {
                        out.push(Match::StatementOnly { statement: s.record });
                    }
                }
                Ordering::Greater => {
                    if let Some(c) = right.next() {
                        out.push(Match::ControlOnly { control: c.record });
                    }
                }
                Ordering::Equal => {
                    if let (Some(s), Some(c)) = (left.next(), right.next()) {
                        out.push(Match::Matched {
                            statement: s.record,
                            control: c.record,
                        });
                    }
                }
            }
        }

        out
    }

    fn key_of(&self, record: &TransactionRecord) -> Key {
        Key {
            amount: record.amount,
            date: match self.key {
                MatchKey::Amount => None,
                MatchKey::AmountAndDate => Some(record.date),
            },
        }
    }

    fn keyed(&self, records: Vec<TransactionRecord>) -> Vec<Keyed> {
        let mut keyed: Vec<(usize, Keyed)> = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let key = self.key_of(&record);
                (index, Keyed { key, record })
            })
            .collect();
        keyed.sort_by(|a, b| a.1.key.cmp(&b.1.key).then(a.0.cmp(&b.0)));
        keyed.into_iter().map(|(_, k)| k).collect()
    }
}
