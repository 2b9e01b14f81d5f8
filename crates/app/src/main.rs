use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use conciliador_core::{LedgerSide, Money};
use conciliador_import::{parse_typed_amount, read_ledger_file};
use conciliador_reconcile::{run, MatchKey, RunConfig, RunContext, RunOutcome};
use tracing_subscriber::EnvFilter;

mod export;

#[derive(Parser, Debug)]
#[command(
    name = "conciliador",
    version,
    about = "Conciliação entre extrato bancário e controle financeiro"
)]
struct Cli {
    /// Extrato bancário exportado em CSV
    #[arg(long)]
    extrato: PathBuf,

    /// Controle financeiro exportado em CSV
    #[arg(long)]
    controle: PathBuf,

    /// Responsável pela conciliação
    #[arg(long, default_value = "")]
    usuario: String,

    /// Saldo inicial da conta no formato brasileiro, ex.: "R$ 1.500,00" ou
    /// "-1500,50". O ponto só separa milhares.
    #[arg(long, default_value = "0,00", allow_hyphen_values = true, value_parser = parse_opening_balance)]
    saldo_inicial: Money,

    /// Arquivo TOML de configuração
    #[arg(long)]
    config: Option<PathBuf>,

    /// Critério de pareamento: amount | amount_and_date
    #[arg(long)]
    match_key: Option<MatchKey>,

    /// Diretório onde os relatórios CSV são gravados
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Imprime o resultado completo em JSON
    #[arg(long)]
    json: bool,
}

fn parse_opening_balance(raw: &str) -> Result<Money, String> {
    parse_typed_amount(raw).ok_or_else(|| {
        format!("invalid amount '{raw}': use ',' for decimals and '.' only between thousands, e.g. 1.500,50")
    })
}

fn print_summary(outcome: &RunOutcome, paths: &[PathBuf]) {
    let result = &outcome.result;
    println!("Conciliadas: {} ({})", result.matched_count, result.matched_total);
    for side in [LedgerSide::Statement, LedgerSide::Control] {
        let summary = result.summary(side);
        println!(
            "{side}: {} movimentações, {} não conciliadas ({})",
            summary.movements.total, summary.unmatched_count, summary.unmatched_total
        );
    }
    println!("Saldo final: {}", result.closing_balance);
    for counts in &outcome.cleanup {
        println!(
            "{}: {} linhas vazias removidas, {} linhas excluídas, {} saldos do dia duplicados",
            counts.side, counts.dropped_blank, counts.dropped_excluded, counts.duplicate_balances_dropped
        );
    }
    if !outcome.warnings.is_empty() {
        println!("Avisos ({}):", outcome.warnings.len());
        for warning in &outcome.warnings {
            println!("  {warning}");
        }
    }
    for path in paths {
        println!("Relatório: {}", path.display());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(key) = cli.match_key {
        config.match_key = key;
    }

    // Both files must load before anything is matched.
    let options = config.csv_options();
    let statement = read_ledger_file(&cli.extrato, config.statement.source, &options)
        .with_context(|| format!("failed to read statement {}", cli.extrato.display()))?;
    let control = read_ledger_file(&cli.controle, config.control.source, &options)
        .with_context(|| format!("failed to read control {}", cli.controle.display()))?;

    let ctx = RunContext::new(&cli.usuario, cli.saldo_inicial, config);
    let outcome = run(&ctx, statement, control);

    let paths = export::write_workbook(&cli.out_dir, "conciliacao", &outcome.report)?;
    tracing::info!(run_id = %ctx.run_id, files = paths.len(), "report written");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    } else {
        print_summary(&outcome, &paths);
    }
    Ok(())
}
