use serde::{Deserialize, Serialize};

use crate::row::{Column, RawRow};

/// Columns checked for blanks when the caller has no better idea.
pub const DEFAULT_REQUIRED_COLUMNS: &[Column] = &[Column::Description, Column::Amount];

const PLACEHOLDER_TOKENS: &[&str] = &["NAN", "NONE"];

/// A case-insensitive substring blocklist applied to row descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRules {
    keywords: Vec<String>,
}

impl ExclusionRules {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// The first keyword contained in `text`, if any.
    pub fn matching_keyword(&self, text: &str) -> Option<&str> {
        let text = text.to_uppercase();
        self.keywords
            .iter()
            .find(|k| text.contains(k.as_str()))
            .map(|k| k.as_str())
    }

    pub fn is_excluded(&self, text: &str) -> bool {
        self.matching_keyword(text).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sanitized {
    pub rows: Vec<RawRow>,
    pub dropped_blank: usize,
    pub dropped_excluded: usize,
}

fn is_blank(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None => true,
        Some(v) => v.is_empty() || PLACEHOLDER_TOKENS.iter().any(|t| v.eq_ignore_ascii_case(t)),
    }
}

/// Drops rows where any of `columns` is missing, blank, or a placeholder
/// token. Returns the surviving rows in order and the number dropped.
pub fn drop_blank_rows(rows: Vec<RawRow>, columns: &[Column]) -> (Vec<RawRow>, usize) {
    let before = rows.len();
    let kept: Vec<RawRow> = rows
        .into_iter()
        .filter(|row| !columns.iter().any(|&c| is_blank(row.field(c))))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Drops rows whose description hits the blocklist.
pub fn drop_excluded_rows(rows: Vec<RawRow>, rules: &ExclusionRules) -> (Vec<RawRow>, usize) {
    let before = rows.len();
    let kept: Vec<RawRow> = rows
        .into_iter()
        .filter(|row| match rules.matching_keyword(&row.description) {
            Some(keyword) => {
                tracing::debug!(position = row.position, keyword, "row excluded");
                false
            }
            None => true,
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

pub fn sanitize(rows: Vec<RawRow>, columns: &[Column], rules: &ExclusionRules) -> Sanitized {
    let (rows, dropped_blank) = drop_blank_rows(rows, columns);
    let (rows, dropped_excluded) = drop_excluded_rows(rows, rules);
    tracing::info!(
        kept = rows.len(),
        dropped_blank,
        dropped_excluded,
        "rows sanitized"
    );
    Sanitized {
        rows,
        dropped_blank,
        dropped_excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(position: usize, desc: &str, amount: &str) -> RawRow {
        RawRow::new(position, "01/01/2024", desc, amount)
    }

    #[test]
    fn blank_and_placeholder_rows_dropped() {
        let rows = vec![
            row(0, "PIX", "10,00C"),
            row(1, "   ", "10,00C"),
            row(2, "TED", ""),
            row(3, "nan", "1,00"),
            row(4, "DOC", "None"),
            row(5, "BOLETO", "5,00D"),
        ];
        let (kept, dropped) = drop_blank_rows(rows, DEFAULT_REQUIRED_COLUMNS);
        assert_eq!(dropped, 4);
        assert_eq!(kept.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0, 5]);
    }

    #[test]
    fn missing_optional_column_counts_as_blank() {
        let (kept, dropped) = drop_blank_rows(vec![row(0, "PIX", "1,00")], &[Column::Document]);
        assert!(kept.is_empty());
        assert_eq!(dropped, 1);
    }

    #[test]
    fn exclusion_is_case_insensitive_substring() {
        let rules = ExclusionRules::new(["taxa cheque especial", "OUVIDORIA"]);
        let rows = vec![
            row(0, "Taxa Cheque Especial 8,5%", "1,00"),
            row(1, "PIX RECEBIDO", "1,00"),
            row(2, "ouvidoria: 0800 000", "1,00"),
        ];
        let (kept, dropped) = drop_excluded_rows(rows, &rules);
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].description, "PIX RECEBIDO");
    }

    #[test]
    fn empty_rules_keep_everything() {
        let rules = ExclusionRules::new(Vec::<String>::new());
        assert!(rules.is_empty());
        let (kept, dropped) = drop_excluded_rows(vec![row(0, "SAC", "1,00")], &rules);
        assert_eq!((kept.len(), dropped), (1, 0));
    }

    #[test]
    fn blank_keywords_ignored() {
        assert!(ExclusionRules::new(["", "  "]).is_empty());
        let rules = ExclusionRules::new(["", "  ", "sac:"]);
        assert!(rules.is_excluded("SAC: 0800 724 4420"));
        assert!(!rules.is_excluded("PIX RECEBIDO"));
    }

    #[test]
    fn sanitize_reports_both_counts_and_keeps_order() {
        let rules = ExclusionRules::new(["SALDO DISPONÍVEL"]);
        let rows = vec![
            row(0, "PIX", "1,00"),
            row(1, "", "1,00"),
            row(2, "Saldo disponível", "9,00"),
            row(3, "TED", "2,00"),
        ];
        let result = sanitize(rows, DEFAULT_REQUIRED_COLUMNS, &rules);
        assert_eq!(result.dropped_blank, 1);
        assert_eq!(result.dropped_excluded, 1);
        assert_eq!(result.rows.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0, 3]);
    }
}
