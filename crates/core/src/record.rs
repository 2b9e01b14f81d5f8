use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Which ledger a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSide {
    /// The bank-issued statement (extrato).
    Statement,
    /// The internally maintained financial control (controle).
    Control,
}

impl fmt::Display for LedgerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerSide::Statement => write!(f, "Extrato"),
            LedgerSide::Control => write!(f, "Controle Financeiro"),
        }
    }
}

/// One normalized ledger movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Row index in the ingested file, after banner rows were skipped.
    pub position: usize,
    pub date: NaiveDate,
    pub description: String,
    pub document_id: Option<String>,
    pub amount: Money,
}

impl TransactionRecord {
    pub fn new(position: usize, date: NaiveDate, description: &str, amount: Money) -> Self {
        TransactionRecord {
            position,
            date,
            description: description.to_string(),
            document_id: None,
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    InvalidAmount,
    InvalidDate,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::InvalidAmount => write!(f, "valor inválido"),
            IssueKind::InvalidDate => write!(f, "data inválida"),
        }
    }
}

/// A row that could not be normalized and was left out of matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIssue {
    pub side: LedgerSide,
    pub position: usize,
    pub kind: IssueKind,
    pub raw: String,
    pub description: String,
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} linha {}: {} '{}' ({})",
            self.side, self.position, self.kind, self.raw, self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_no_document() {
        let r = TransactionRecord::new(
            0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "PIX",
            Money::from_cents(100),
        );
        assert_eq!(r.document_id, None);
        assert_eq!(r.description, "PIX");
    }

    #[test]
    fn side_serializes_snake_case() {
        let json = serde_json::to_string(&LedgerSide::Statement).unwrap();
        assert_eq!(json, "\"statement\"");
    }

    #[test]
    fn issue_display_names_row() {
        let issue = DataIssue {
            side: LedgerSide::Control,
            position: 7,
            kind: IssueKind::InvalidAmount,
            raw: "abc".to_string(),
            description: "TED".to_string(),
        };
        assert_eq!(issue.to_string(), "Controle Financeiro linha 7: valor inválido 'abc' (TED)");
    }
}
