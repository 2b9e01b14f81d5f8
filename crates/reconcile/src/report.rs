use chrono::{NaiveDate, NaiveDateTime};
use conciliador_core::{DataIssue, DateRange, LedgerSide, Money, TransactionRecord};
use serde::Serialize;

use crate::matcher::{Match, MatchKey};
use crate::result::ReconciliationResult;

pub const MATCHED_SHEET: &str = "Transações Conciliadas";
pub const UNMATCHED_SHEET: &str = "Transações Não Conciliadas";

const REPORT_TITLE: &str = "RELATÓRIO FINAL DE CONCILIAÇÃO BANCÁRIA";
const NOT_IDENTIFIED: &str = "Não identificado";

/// What a row is, so the exporter can style it without inspecting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Title,
    Section,
    Header,
    Label,
    Data,
    Subtotal,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Text(String),
    Date(NaiveDate),
    Amount(Money),
    Count(usize),
}

impl Cell {
    fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }

    /// Display form used by plain-text exporters.
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Date(d) => d.format("%d/%m/%Y").to_string(),
            Cell::Amount(m) => m.to_br_string(),
            Cell::Count(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    fn new(name: &str, preamble: Vec<Row>) -> Self {
        Self {
            name: name.to_string(),
            rows: preamble,
        }
    }

    fn push(&mut self, kind: RowKind, cells: Vec<Cell>) {
        self.rows.push(Row { kind, cells });
    }

    fn blank(&mut self) {
        self.push(RowKind::Blank, Vec::new());
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Run facts shown in the report preamble.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub user_name: String,
    pub generated_at: NaiveDateTime,
    pub statement_period: Option<DateRange>,
}

/// Lays out the result as a matched sheet and an unmatched sheet. Amounts are
/// copied from the result as-is; only order and subtotals are computed here.
pub fn build_report(
    result: &ReconciliationResult,
    issues: &[DataIssue],
    header: &ReportHeader,
) -> Workbook {
    let preamble = preamble(result, header);

    let mut matched = Sheet::new(MATCHED_SHEET, preamble.clone());
    write_matched(&mut matched, result);

    let mut unmatched = Sheet::new(UNMATCHED_SHEET, preamble);
    write_unmatched(&mut unmatched, result);
    if !issues.is_empty() {
        write_issues(&mut unmatched, issues);
    }

    Workbook {
        sheets: vec![matched, unmatched],
    }
}

fn optional_amount(value: Option<Money>) -> Cell {
    value.map_or_else(|| Cell::text(NOT_IDENTIFIED), Cell::Amount)
}

fn preamble(result: &ReconciliationResult, header: &ReportHeader) -> Vec<Row> {
    let mut sheet = Sheet::new("", Vec::new());
    let criterion = match result.match_key {
        MatchKey::Amount => "Valor",
        MatchKey::AmountAndDate => "Valor e data",
    };

    sheet.push(RowKind::Title, vec![Cell::text(REPORT_TITLE)]);
    sheet.blank();
    sheet.push(
        RowKind::Label,
        vec![Cell::text("Usuário Responsável:"), Cell::Text(header.user_name.clone())],
    );
    sheet.push(
        RowKind::Label,
        vec![
            Cell::text("Data da Realização:"),
            Cell::Text(header.generated_at.format("%d/%m/%Y %H:%M").to_string()),
        ],
    );
    sheet.push(
        RowKind::Label,
        vec![Cell::text("Critério de Conciliação:"), Cell::text(criterion)],
    );
    sheet.blank();

    sheet.push(RowKind::Section, vec![Cell::text("DADOS GERAIS DA CONCILIAÇÃO")]);
    sheet.push(
        RowKind::Label,
        vec![Cell::text("Saldo Inicial da Conta:"), Cell::Amount(result.opening_balance)],
    );
    sheet.push(
        RowKind::Label,
        vec![Cell::text("Saldo Final da Conta:"), Cell::Amount(result.closing_balance)],
    );
    sheet.push(
        RowKind::Label,
        vec![
            Cell::text("Saldo Anterior (Extrato):"),
            optional_amount(result.statement_balances.previous),
        ],
    );
    sheet.push(
        RowKind::Label,
        vec![
            Cell::text("Saldo do Dia (Extrato):"),
            optional_amount(result.statement_balances.day),
        ],
    );
    sheet.push(
        RowKind::Label,
        vec![
            Cell::text("Período do Extrato:"),
            header
                .statement_period
                .map_or_else(|| Cell::text(NOT_IDENTIFIED), |p| Cell::Text(p.to_string())),
        ],
    );
    sheet.blank();

    let (s, c) = (&result.statement.movements, &result.control.movements);
    sheet.push(RowKind::Section, vec![Cell::text("RESUMO DE MOVIMENTAÇÕES")]);
    sheet.push(
        RowKind::Header,
        vec![Cell::Empty, Cell::text("EXTRATO"), Cell::text("CONTROLE FINANCEIRO")],
    );
    sheet.push(
        RowKind::Data,
        vec![Cell::text("Total de Movimentações:"), Cell::Count(s.total), Cell::Count(c.total)],
    );
    sheet.push(
        RowKind::Data,
        vec![Cell::text("Entradas:"), Cell::Count(s.entries), Cell::Count(c.entries)],
    );
    sheet.push(
        RowKind::Data,
        vec![Cell::text("Saídas:"), Cell::Count(s.exits), Cell::Count(c.exits)],
    );
    sheet.push(
        RowKind::Data,
        vec![Cell::text("Valor Total:"), Cell::Amount(s.sum), Cell::Amount(c.sum)],
    );
    sheet.blank();

    sheet.rows
}

fn by_date_then_amount(a: &TransactionRecord, b: &TransactionRecord) -> std::cmp::Ordering {
    (a.date, a.amount, a.position).cmp(&(b.date, b.amount, b.position))
}

fn record_cells(r: &TransactionRecord) -> [Cell; 3] {
    [
        Cell::Date(r.date),
        Cell::Text(r.description.clone()),
        Cell::Amount(r.amount),
    ]
}

fn subtotal(count: usize, total: Money) -> Vec<Cell> {
    vec![Cell::text("Subtotal:"), Cell::Count(count), Cell::Amount(total)]
}

fn write_matched(sheet: &mut Sheet, result: &ReconciliationResult) {
    let mut pairs: Vec<(&TransactionRecord, &TransactionRecord)> = result
        .matched()
        .filter_map(|m| match m {
            Match::Matched { statement, control } => Some((statement, control)),
            _ => None,
        })
        .collect();

    if pairs.is_empty() {
        sheet.push(RowKind::Section, vec![Cell::text("NENHUMA OPERAÇÃO CONCILIADA ENCONTRADA")]);
        return;
    }
    pairs.sort_by(|a, b| by_date_then_amount(a.0, b.0));

    sheet.push(RowKind::Section, vec![Cell::text("OPERAÇÕES CONVERGENTES (CONCILIADAS)")]);
    sheet.blank();
    sheet.push(
        RowKind::Header,
        [
            "Data Extrato",
            "Descrição Extrato",
            "Valor Extrato (R$)",
            "Data Controle",
            "Descrição Controle",
            "Valor Controle (R$)",
        ]
        .iter()
        .map(|h| Cell::text(h))
        .collect(),
    );
    for (statement, control) in &pairs {
        let mut cells = Vec::with_capacity(6);
        cells.extend(record_cells(statement));
        cells.extend(record_cells(control));
        sheet.push(RowKind::Data, cells);
    }
    sheet.push(RowKind::Subtotal, subtotal(result.matched_count, result.matched_total));
}

fn write_unmatched(sheet: &mut Sheet, result: &ReconciliationResult) {
    if result.statement.unmatched_count == 0 && result.control.unmatched_count == 0 {
        sheet.push(RowKind::Section, vec![Cell::text("NENHUMA OPERAÇÃO DIVERGENTE ENCONTRADA")]);
        return;
    }

    sheet.push(RowKind::Section, vec![Cell::text("OPERAÇÕES DIVERGENTES (NÃO CONCILIADAS)")]);
    sheet.blank();

    for (side, label) in [
        (LedgerSide::Statement, "Transações Não Conciliadas Presentes no Extrato:"),
        (
            LedgerSide::Control,
            "Transações Não Conciliadas Presentes no Controle Financeiro:",
        ),
    ] {
        let mut records: Vec<&TransactionRecord> = result.unmatched(side).collect();
        records.sort_by(|a, b| by_date_then_amount(a, b));

        sheet.push(RowKind::Label, vec![Cell::text(label)]);
        if records.is_empty() {
            sheet.push(RowKind::Label, vec![Cell::text("Nenhuma transação.")]);
            sheet.blank();
            continue;
        }
        sheet.push(
            RowKind::Header,
            vec![Cell::text("Data"), Cell::text("Descrição"), Cell::text("Valor (R$)")],
        );
        for r in records {
            sheet.push(RowKind::Data, record_cells(r).to_vec());
        }
        let summary = result.summary(side);
        sheet.push(RowKind::Subtotal, subtotal(summary.unmatched_count, summary.unmatched_total));
        sheet.blank();
    }
}

fn write_issues(sheet: &mut Sheet, issues: &[DataIssue]) {
    sheet.push(RowKind::Section, vec![Cell::text("PROBLEMAS DE QUALIDADE DOS DADOS")]);
    sheet.push(
        RowKind::Header,
        ["Origem", "Linha", "Problema", "Valor Original", "Descrição"]
            .iter()
            .map(|h| Cell::text(h))
            .collect(),
    );
    for issue in issues {
        sheet.push(
            RowKind::Data,
            vec![
                Cell::Text(issue.side.to_string()),
                Cell::Count(issue.position),
                Cell::Text(issue.kind.to_string()),
                Cell::Text(issue.raw.clone()),
                Cell::Text(issue.description.clone()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MovementStats;
    use crate::balance::ExtractedBalances;
    use crate::matcher::Matcher;
    use conciliador_core::IssueKind;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn rec(position: usize, day: u32, desc: &str, cents: i64) -> TransactionRecord {
        TransactionRecord::new(position, date(day), desc, Money::from_cents(cents))
    }

    fn result(s: Vec<TransactionRecord>, c: Vec<TransactionRecord>) -> ReconciliationResult {
        let (ss, cs) = (MovementStats::from_records(&s), MovementStats::from_records(&c));
        ReconciliationResult::new(
            MatchKey::AmountAndDate,
            Matcher::default().reconcile(s, c),
            Money::from_cents(100_000),
            ExtractedBalances {
                previous: Some(Money::from_cents(100_000)),
                day: None,
            },
            ss,
            cs,
        )
    }

    fn header() -> ReportHeader {
        ReportHeader {
            user_name: "Maria".to_string(),
            generated_at: date(31).and_hms_opt(14, 5, 0).unwrap(),
            statement_period: Some(DateRange::new(date(1), date(31))),
        }
    }

    fn rows_of(sheet: &Sheet, kind: RowKind) -> Vec<&Row> {
        sheet.rows.iter().filter(|r| r.kind == kind).collect()
    }

    fn has_text(sheet: &Sheet, text: &str) -> bool {
        sheet
            .rows
            .iter()
            .any(|r| r.cells.iter().any(|c| *c == Cell::Text(text.to_string())))
    }

    #[test]
    fn two_sheets_with_shared_preamble() {
        let wb = build_report(&result(vec![], vec![]), &[], &header());
        assert_eq!(wb.sheets.len(), 2);
        let matched = wb.sheet(MATCHED_SHEET).unwrap();
        let unmatched = wb.sheet(UNMATCHED_SHEET).unwrap();
        assert_eq!(matched.rows[0].kind, RowKind::Title);
        assert_eq!(matched.rows[..10], unmatched.rows[..10]);
        assert!(has_text(matched, "Maria"));
        assert!(has_text(matched, "31/01/2024 14:05"));
        assert!(has_text(matched, "01/01/2024 a 31/01/2024"));
    }

    #[test]
    fn missing_balance_reads_not_identified() {
        let wb = build_report(&result(vec![], vec![]), &[], &header());
        let sheet = wb.sheet(MATCHED_SHEET).unwrap();
        let row = sheet
            .rows
            .iter()
            .find(|r| r.cells.first() == Some(&Cell::text("Saldo do Dia (Extrato):")))
            .unwrap();
        assert_eq!(row.cells[1], Cell::text(NOT_IDENTIFIED));
    }

    #[test]
    fn empty_run_emits_placeholders() {
        let wb = build_report(&result(vec![], vec![]), &[], &header());
        assert!(has_text(wb.sheet(MATCHED_SHEET).unwrap(), "NENHUMA OPERAÇÃO CONCILIADA ENCONTRADA"));
        assert!(has_text(wb.sheet(UNMATCHED_SHEET).unwrap(), "NENHUMA OPERAÇÃO DIVERGENTE ENCONTRADA"));
    }

    #[test]
    fn matched_rows_carry_both_sides() {
        let wb = build_report(
            &result(vec![rec(0, 2, "PIX", 10_000)], vec![rec(0, 2, "Cliente", 10_000)]),
            &[],
            &header(),
        );
        let sheet = wb.sheet(MATCHED_SHEET).unwrap();
        let data: Vec<&Row> = rows_of(sheet, RowKind::Data)
            .into_iter()
            .filter(|r| r.cells.len() == 6)
            .collect();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].cells[1], Cell::text("PIX"));
        assert_eq!(data[0].cells[4], Cell::text("Cliente"));
        let subtotal = rows_of(sheet, RowKind::Subtotal);
        assert_eq!(subtotal[0].cells[1], Cell::Count(1));
        assert_eq!(subtotal[0].cells[2], Cell::Amount(Money::from_cents(10_000)));
    }

    #[test]
    fn unmatched_sorted_by_date_then_amount_per_side() {
        let s = vec![
            rec(0, 5, "late", 100),
            rec(1, 2, "early big", 900),
            rec(2, 2, "early small", -50),
        ];
        let c = vec![rec(0, 9, "only control", 7)];
        let wb = build_report(&result(s, c), &[], &header());
        let sheet = wb.sheet(UNMATCHED_SHEET).unwrap();

        let start = sheet
            .rows
            .iter()
            .position(|r| r.cells.first() == Some(&Cell::text("Transações Não Conciliadas Presentes no Extrato:")))
            .unwrap();
        let descriptions: Vec<&Cell> = sheet.rows[start + 2..start + 5]
            .iter()
            .map(|r| &r.cells[1])
            .collect();
        assert_eq!(
            descriptions,
            vec![&Cell::text("early small"), &Cell::text("early big"), &Cell::text("late")]
        );

        let subtotals = rows_of(sheet, RowKind::Subtotal);
        assert_eq!(subtotals.len(), 2);
        assert_eq!(subtotals[0].cells[2], Cell::Amount(Money::from_cents(950)));
        assert_eq!(subtotals[1].cells[2], Cell::Amount(Money::from_cents(7)));
    }

    #[test]
    fn one_sided_divergence_notes_empty_side() {
        let wb = build_report(&result(vec![rec(0, 2, "X", 1)], vec![]), &[], &header());
        assert!(has_text(wb.sheet(UNMATCHED_SHEET).unwrap(), "Nenhuma transação."));
    }

    #[test]
    fn issues_listed_on_unmatched_sheet() {
        let issues = vec![DataIssue {
            side: LedgerSide::Statement,
            position: 4,
            kind: IssueKind::InvalidAmount,
            raw: "1,2,3".to_string(),
            description: "TED".to_string(),
        }];
        let wb = build_report(&result(vec![], vec![]), &issues, &header());
        let sheet = wb.sheet(UNMATCHED_SHEET).unwrap();
        assert!(has_text(sheet, "PROBLEMAS DE QUALIDADE DOS DADOS"));
        assert!(has_text(sheet, "1,2,3"));
        assert!(!has_text(wb.sheet(MATCHED_SHEET).unwrap(), "1,2,3"));
    }

    #[test]
    fn report_does_not_alter_amounts() {
        let r = result(vec![rec(0, 2, "A", -12_345)], vec![]);
        let wb = build_report(&r, &[], &header());
        let sheet = wb.sheet(UNMATCHED_SHEET).unwrap();
        assert!(sheet
            .rows
            .iter()
            .any(|row| row.kind == RowKind::Data && row.cells.get(2) == Some(&Cell::Amount(Money::from_cents(-12_345)))));
    }

    #[test]
    fn cell_render() {
        assert_eq!(Cell::Date(date(3)).render(), "03/01/2024");
        assert_eq!(Cell::Amount(Money::from_cents(-120_454)).render(), "-1.204,54");
        assert_eq!(Cell::Count(3).render(), "3");
        assert_eq!(Cell::Empty.render(), "");
    }
}
