use chrono::NaiveDate;
use conciliador_core::{DataIssue, IssueKind, LedgerSide, Money, TransactionRecord};
use serde::{Deserialize, Serialize};

use crate::normalize::{self, AmountFormat};

/// A named field of a raw ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Date,
    Description,
    Document,
    Amount,
}

/// One ingested row, still as text, in the common shape every source
/// extracts into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub position: usize,
    pub date: String,
    pub description: String,
    pub document_id: Option<String>,
    pub amount: String,
}

impl RawRow {
    pub fn new(position: usize, date: &str, description: &str, amount: &str) -> Self {
        RawRow {
            position,
            date: date.to_string(),
            description: description.to_string(),
            document_id: None,
            amount: amount.to_string(),
        }
    }

    pub fn field(&self, column: Column) -> Option<&str> {
        match column {
            Column::Date => Some(self.date.as_str()),
            Column::Description => Some(self.description.as_str()),
            Column::Document => self.document_id.as_deref(),
            Column::Amount => Some(self.amount.as_str()),
        }
    }

    /// Parses date and amount. Failures stay on the row as `None`.
    pub fn normalize(self, format: AmountFormat) -> LedgerRow {
        LedgerRow {
            position: self.position,
            date: normalize::parse_date(&self.date),
            amount: format.parse(&self.amount),
            description: self.description.trim().to_string(),
            document_id: self
                .document_id
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            raw_date: self.date,
            raw_amount: self.amount,
        }
    }
}

/// A row after normalization, before balance markers are separated and
/// unparseable rows are set aside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub position: usize,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub document_id: Option<String>,
    pub amount: Option<Money>,
    pub raw_date: String,
    pub raw_amount: String,
}

impl LedgerRow {
    /// Converts into a matchable record, or describes why it cannot be one.
    /// An invalid amount is reported ahead of an invalid date.
    pub fn into_record(self, side: LedgerSide) -> Result<TransactionRecord, DataIssue> {
        let Some(amount) = self.amount else {
            return Err(DataIssue {
                side,
                position: self.position,
                kind: IssueKind::InvalidAmount,
                raw: self.raw_amount,
                description: self.description,
            });
        };
        let Some(date) = self.date else {
            return Err(DataIssue {
                side,
                position: self.position,
                kind: IssueKind::InvalidDate,
                raw: self.raw_date,
                description: self.description,
            });
        };

        Ok(TransactionRecord {
            position: self.position,
            date,
            description: self.description,
            document_id: self.document_id,
            amount,
        })
    }
}
