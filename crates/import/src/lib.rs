pub mod csv;
pub mod normalize;
pub mod row;
pub mod sanitize;
pub mod source;

pub use crate::csv::{read_ledger, read_ledger_file, CsvOptions, ImportError};
pub use normalize::{parse_date, parse_typed_amount, AmountFormat};
pub use row::{Column, LedgerRow, RawRow};
pub use sanitize::{sanitize, ExclusionRules, Sanitized, DEFAULT_REQUIRED_COLUMNS};
pub use source::{ColumnLayout, LedgerSource, SICOOB_EXCLUSIONS};
