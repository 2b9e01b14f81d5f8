use std::path::{Path, PathBuf};

use anyhow::Context;
use conciliador_reconcile::{Sheet, Workbook, MATCHED_SHEET, UNMATCHED_SHEET};

fn file_suffix(sheet_name: &str) -> String {
    match sheet_name {
        MATCHED_SHEET => "conciliadas".to_string(),
        UNMATCHED_SHEET => "nao-conciliadas".to_string(),
        other => other
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join("-"),
    }
}

fn write_sheet(path: &Path, sheet: &Sheet) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    let width = sheet.width();
    for row in &sheet.rows {
        let mut record: Vec<String> = row.cells.iter().map(|c| c.render()).collect();
        record.resize(width, String::new());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one `;`-separated file per sheet as `<stem>-<sheet>.csv` and
/// returns the paths in sheet order.
pub fn write_workbook(dir: &Path, stem: &str, workbook: &Workbook) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        let path = dir.join(format!("{stem}-{}.csv", file_suffix(&sheet.name)));
        write_sheet(&path, sheet).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(sheet = %sheet.name, path = %path.display(), rows = sheet.rows.len(), "sheet exported");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conciliador_core::Money;
    use conciliador_reconcile::{Cell, Row, RowKind};

    fn workbook() -> Workbook {
        Workbook {
            sheets: vec![
                Sheet {
                    name: MATCHED_SHEET.to_string(),
                    rows: vec![
                        Row {
                            kind: RowKind::Title,
                            cells: vec![Cell::Text("TÍTULO".to_string())],
                        },
                        Row {
                            kind: RowKind::Blank,
                            cells: vec![],
                        },
                        Row {
                            kind: RowKind::Data,
                            cells: vec![
                                Cell::Text("Valor Total:".to_string()),
                                Cell::Amount(Money::from_cents(-325_600)),
                                Cell::Count(2),
                            ],
                        },
                    ],
                },
                Sheet {
                    name: UNMATCHED_SHEET.to_string(),
                    rows: vec![],
                },
            ],
        }
    }

    #[test]
    fn writes_one_file_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_workbook(dir.path(), "conciliacao", &workbook()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("conciliacao-conciliadas.csv"));
        assert!(paths[1].ends_with("conciliacao-nao-conciliadas.csv"));
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn rows_padded_and_amounts_localized() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_workbook(dir.path(), "r", &workbook()).unwrap();
        let content = std::fs::read_to_string(&paths[0]).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "TÍTULO;;");
        assert_eq!(lines[1], ";;");
        assert_eq!(lines[2], "Valor Total:;-3.256,00;2");
    }

    #[test]
    fn unknown_sheet_name_is_slugged() {
        assert_eq!(file_suffix("Resumo Geral"), "resumo-geral");
    }
}
