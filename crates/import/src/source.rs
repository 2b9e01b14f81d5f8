use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::AmountFormat;
use crate::row::RawRow;
use crate::sanitize::ExclusionRules;

/// Boilerplate lines SICOOB prints between movements.
pub const SICOOB_EXCLUSIONS: &[&str] = &[
    "SALDO BLOQ.ANTERIOR",
    "SALDO BLOQ.C.CORRENTE:",
    "VENCTO CHEQUE ESPECIAL:",
    "TAXA CHEQUE ESPECIAL",
    "CUSTO EFETIVO TOTAL",
    "EXTRATOS EMITIDOS ATÉ",
    "SAC:",
    "OUVIDORIA",
    "LIMITE CHEQUE ESPECIAL",
    "SALDO DISPONÍVEL",
    "SALDO EM C.CORRENTE",
    "JUROS CHQ ESPECIAL",
];

/// Zero-based column positions of a ledger export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Banner rows to discard before the first movement.
    pub skip_rows: usize,
    pub date: usize,
    pub description: usize,
    pub document: Option<usize>,
    pub amount: usize,
}

impl ColumnLayout {
    /// Number of cells a row needs to carry every mapped column.
    pub fn width(&self) -> usize {
        [Some(self.date), Some(self.description), self.document, Some(self.amount)]
            .into_iter()
            .flatten()
            .max()
            .map_or(0, |m| m + 1)
    }

    /// Columns a file narrower than `file_width` cannot supply.
    pub fn missing_columns(&self, file_width: usize) -> Vec<(&'static str, usize)> {
        let mut missing = Vec::new();
        for (name, index) in [
            ("date", Some(self.date)),
            ("description", Some(self.description)),
            ("document", self.document),
            ("amount", Some(self.amount)),
        ] {
            if let Some(index) = index {
                if index >= file_width {
                    missing.push((name, index));
                }
            }
        }
        missing
    }
}

/// The ledger layouts the importer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSource {
    /// SICOOB statement export: three banner rows, `data | histórico | valor`
    /// with a `C`/`D` suffix on the amount.
    Sicoob,
    /// Internal control spreadsheet: `data | descrição | documento | valor`
    /// with `R$`-prefixed amounts.
    ControlSheet,
    /// Anything else shaped `data | descrição | valor`.
    #[default]
    Generic,
}

impl LedgerSource {
    pub fn layout(self) -> ColumnLayout {
        match self {
            LedgerSource::Sicoob => ColumnLayout {
                skip_rows: 3,
                date: 0,
                description: 1,
                document: None,
                amount: 2,
            },
            LedgerSource::ControlSheet => ColumnLayout {
                skip_rows: 0,
                date: 0,
                description: 1,
                document: Some(2),
                amount: 3,
            },
            LedgerSource::Generic => ColumnLayout {
                skip_rows: 0,
                date: 0,
                description: 1,
                document: None,
                amount: 2,
            },
        }
    }

    pub fn amount_format(self) -> AmountFormat {
        match self {
            LedgerSource::Sicoob => AmountFormat::SuffixSign,
            LedgerSource::ControlSheet => AmountFormat::PrefixedCurrency,
            LedgerSource::Generic => AmountFormat::ExtendedSuffix,
        }
    }

    pub fn default_exclusions(self) -> ExclusionRules {
        match self {
            LedgerSource::Sicoob => ExclusionRules::new(SICOOB_EXCLUSIONS),
            LedgerSource::ControlSheet | LedgerSource::Generic => ExclusionRules::default(),
        }
    }

    /// Maps one row of cells into the common raw shape. Cells beyond the end
    /// of a short row read as empty, leaving it to the sanitizer.
    pub fn extract(self, position: usize, cells: &[&str]) -> RawRow {
        let layout = self.layout();
        let cell = |i: usize| cells.get(i).map_or("", |c| c.trim());

        RawRow {
            position,
            date: cell(layout.date).to_string(),
            description: cell(layout.description).to_string(),
            document_id: layout.document.map(|i| cell(i).to_string()),
            amount: cell(layout.amount).to_string(),
        }
    }
}

impl fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerSource::Sicoob => write!(f, "sicoob"),
            LedgerSource::ControlSheet => write!(f, "control_sheet"),
            LedgerSource::Generic => write!(f, "generic"),
        }
    }
}

impl std::str::FromStr for LedgerSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sicoob" => Ok(LedgerSource::Sicoob),
            "control_sheet" | "controle" => Ok(LedgerSource::ControlSheet),
            "generic" => Ok(LedgerSource::Generic),
            other => Err(format!("Unknown ledger source: '{other}'")),
        }
    }
}
