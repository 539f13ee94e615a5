//! Process command - extract a single boleto.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use boleto_core::boleto::rules::format_brl_amount;
use boleto_core::{
    AmountPolicy, BoletoExtractor, BoletoParser, BoletoRecord, CsvLedger, DocumentSource,
    LedgerStore,
};

use super::{file_name, load_config, read_document_text};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or extracted text as .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Append the record to the ledger
    #[arg(long)]
    append: bool,

    /// Ledger file (default: from configuration)
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Amount selection policy (default: from configuration)
    #[arg(long, value_enum)]
    amount_policy: Option<PolicyArg>,

    /// Print extraction warnings
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PolicyArg {
    /// Most frequent candidate across all patterns
    MostFrequent,
    /// First candidate of the highest-priority pattern
    FirstValid,
}

impl From<PolicyArg> for AmountPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::MostFrequent => AmountPolicy::MostFrequent,
            PolicyArg::FirstValid => AmountPolicy::FirstValid,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(policy) = args.amount_policy {
        config.extraction.amount_policy = policy.into();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("static progress template"),
    );

    pb.set_message("Reading document...");
    let text = read_document_text(&args.input)?;

    pb.set_message("Extracting boleto fields...");
    let parser = BoletoParser::from_config(&config.extraction)?;
    let source = DocumentSource::now(file_name(&args.input));

    let result = match parser.parse(&text, &source) {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            anyhow::bail!("Could not extract boleto from {}: {}", args.input.display(), e);
        }
    };

    pb.finish_and_clear();

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.append {
        let ledger_path = args.ledger.clone().unwrap_or(config.paths.ledger.clone());
        let mut ledger = CsvLedger::new(&ledger_path);
        let row = ledger.append(&result.record)?;
        eprintln!(
            "{} Ledger row {} added to {}",
            style("✓").green(),
            row.number,
            ledger_path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_record(record: &BoletoRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &BoletoRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "supplier",
        "amount",
        "issue_date",
        "due_date",
        "document_number",
        "issue_date_defaulted",
        "source_filename",
        "processed_at",
    ])?;

    wtr.write_record([
        record.supplier.as_str(),
        &record.amount.to_string(),
        &record.issue_date,
        &record.due_date,
        record.document_number.as_deref().unwrap_or(""),
        if record.issue_date_defaulted { "true" } else { "false" },
        &record.source_filename,
        &record.processed_at,
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &BoletoRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Supplier: {}\n", record.supplier));
    output.push_str(&format!("Amount:   {}\n", format_brl_amount(record.amount)));
    output.push_str(&format!("Due:      {}\n", record.due_date));
    if record.issue_date_defaulted {
        output.push_str(&format!("Issued:   {} (processing date)\n", record.issue_date));
    } else {
        output.push_str(&format!("Issued:   {}\n", record.issue_date));
    }
    if let Some(number) = &record.document_number {
        output.push_str(&format!("Document: {}\n", number));
    }
    output.push_str(&format!("\nSource: {} ({})\n", record.source_filename, record.processed_at));

    output
}
