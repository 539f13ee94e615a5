//! Ledger command - inspect and maintain the accounts-payable ledger.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use console::style;

use boleto_core::boleto::rules::format_brl_amount;
use boleto_core::ledger::{LEDGER_COLUMNS, SPARSE_COLUMN_PERCENT};
use boleto_core::{summarize, CsvLedger, LedgerRow, LedgerStore, DATE_FORMAT};

use super::load_config;

/// Arguments for the ledger command.
#[derive(Args)]
pub struct LedgerArgs {
    /// Ledger file (default: from configuration)
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand)]
enum LedgerCommand {
    /// List ledger rows
    List {
        /// Only rows without a payment date
        #[arg(long)]
        pending: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },

    /// Mark rows as paid
    Pay {
        /// Row numbers ("52" matches "000052")
        #[arg(required = true)]
        numbers: Vec<String>,

        /// Payment date, DD/MM/YYYY or YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Clear the payment date of rows
    Unpay {
        #[arg(required = true)]
        numbers: Vec<String>,
    },

    /// Delete rows
    Delete {
        #[arg(required = true)]
        numbers: Vec<String>,
    },

    /// Show totals and status counts
    Summary {
        /// Number of suppliers to list
        #[arg(long, default_value = "5")]
        top: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ListFormat {
    Text,
    Json,
    Csv,
}

pub async fn run(args: LedgerArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = match args.file {
        Some(path) => path,
        None => load_config(config_path)?.paths.ledger,
    };
    let mut ledger = CsvLedger::new(&path);

    match args.command {
        LedgerCommand::List { pending, format } => list_rows(&ledger, pending, format),
        LedgerCommand::Pay { numbers, date } => {
            let day = match date {
                Some(raw) => parse_payment_date(&raw)?,
                None => Local::now().date_naive(),
            };
            let changed = ledger.set_payment_date(&numbers, Some(day))?;
            report_changes(changed, &format!("marked as paid on {}", day.format(DATE_FORMAT)));
            Ok(())
        }
        LedgerCommand::Unpay { numbers } => {
            let changed = ledger.set_payment_date(&numbers, None)?;
            report_changes(changed, "marked as pending");
            Ok(())
        }
        LedgerCommand::Delete { numbers } => {
            let removed = ledger.delete(&numbers)?;
            report_changes(removed, "deleted");
            Ok(())
        }
        LedgerCommand::Summary { top, json } => show_summary(&ledger, top, json),
    }
}

/// Accepts DD/MM/YYYY and ISO dates.
fn parse_payment_date(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| anyhow::anyhow!("Invalid date: {} (expected DD/MM/YYYY)", raw))
}

fn report_changes(count: usize, action: &str) {
    if count == 0 {
        println!("{} No matching rows", style("ℹ").blue());
    } else {
        println!("{} {} rows {}", style("✓").green(), count, action);
    }
}

fn list_rows(ledger: &CsvLedger, pending_only: bool, format: ListFormat) -> anyhow::Result<()> {
    let rows: Vec<LedgerRow> = ledger
        .rows()?
        .into_iter()
        .filter(|row| !pending_only || !row.is_paid())
        .collect();

    match format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        ListFormat::Csv => {
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(vec![]);
            wtr.write_record(LEDGER_COLUMNS)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            print!("{}", String::from_utf8(wtr.into_inner()?)?);
        }
        ListFormat::Text => {
            if rows.is_empty() {
                println!("{} Ledger is empty", style("ℹ").blue());
                return Ok(());
            }
            let today = Local::now().date_naive();
            for row in &rows {
                println!("{}", format_row(row, today));
            }
        }
    }

    Ok(())
}

fn format_row(row: &LedgerRow, today: NaiveDate) -> String {
    let amount = row
        .title_amount
        .map(format_brl_amount)
        .unwrap_or_else(|| "-".to_string());

    let status = if row.is_paid() {
        style(format!("pago {}", row.payment_date.as_deref().unwrap_or(""))).green()
    } else if row.is_overdue(today) {
        style("vencido".to_string()).red()
    } else {
        style("pendente".to_string()).yellow()
    };

    format!(
        "{}  {:<40}  {:>16}  venc. {}  {}",
        row.number, row.supplier, amount, row.due_date, status
    )
}

fn show_summary(ledger: &CsvLedger, top: usize, json: bool) -> anyhow::Result<()> {
    let rows = ledger.rows()?;
    let summary = summarize(&rows, Local::now().date_naive(), top);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", style("Ledger summary").bold());
    println!("  Rows:            {}", summary.total_rows);
    println!("  Total (título):  {}", format_brl_amount(summary.total_title));
    println!("  Total (pago):    {}", format_brl_amount(summary.total_paid));
    println!("  Paid:            {}", style(summary.paid).green());
    println!("  Pending:         {}", style(summary.pending).yellow());
    println!(
        "  Overdue:         {} ({})",
        style(summary.overdue).red(),
        format_brl_amount(summary.overdue_amount)
    );

    println!(
        "  Suppliers:       {} identified, {} rows without supplier",
        summary.unique_suppliers, summary.missing_suppliers
    );

    if !summary.top_suppliers.is_empty() {
        println!();
        println!("{}", style("Top suppliers").bold());
        for (supplier, count) in &summary.top_suppliers {
            println!("  {:>4}  {}", count, supplier);
        }
    }

    if !summary.payment_methods.is_empty() {
        println!();
        println!("{}", style("Payment methods").bold());
        for (method, count) in &summary.payment_methods {
            let share = *count as f64 * 100.0 / summary.total_rows as f64;
            println!("  {:>4}  {} ({:.1}%)", count, method, share);
        }
    }

    if !summary.column_gaps.is_empty() {
        println!();
        println!("{}", style("Empty cells").bold());
        for gap in &summary.column_gaps {
            let line = format!("  {:>4}  {:<20} {:>5.1}%", gap.empty, gap.column, gap.percent);
            if gap.is_sparse() {
                println!("{}", style(line).red());
            } else {
                println!("{}", line);
            }
        }

        let sparse = summary.sparse_columns().count();
        if sparse > 0 {
            println!(
                "{} {} columns more than {}% empty",
                style("⚠").yellow(),
                sparse,
                SPARSE_COLUMN_PERCENT
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payment_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        assert_eq!(parse_payment_date("15/09/2025").unwrap(), expected);
        assert_eq!(parse_payment_date("2025-09-15").unwrap(), expected);
        assert!(parse_payment_date("15.09.2025").is_err());
    }
}
