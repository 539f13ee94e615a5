//! Batch command - process every PDF waiting in the inbox folder.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::{glob_with, MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use boleto_core::{BoletoExtractor, BoletoParser, BoletoRecord, CsvLedger, DocumentSource, LedgerStore};

use super::{append_log, file_name, load_config, move_to_processed, read_document_text};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Inbox folder (default: from configuration)
    inbox: Option<PathBuf>,

    /// Number of parallel workers (default: from configuration)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Leave processed PDFs in the inbox
    #[arg(long)]
    no_move: bool,

    /// Ledger file (default: from configuration)
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Also write a per-file summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

/// Outcome of one inbox file.
struct FileOutcome {
    path: PathBuf,
    record: Option<BoletoRecord>,
    number: Option<String>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let inbox = args.inbox.clone().unwrap_or(config.paths.inbox.clone());
    let ledger_path = args.ledger.clone().unwrap_or(config.paths.ledger.clone());
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    let move_files = config.batch.move_processed && !args.no_move;

    fs::create_dir_all(&inbox)?;
    fs::create_dir_all(&config.paths.processed)?;

    let files = find_pdfs(&inbox)?;
    if files.is_empty() {
        println!(
            "{} No PDF files found in {}",
            style("ℹ").blue(),
            inbox.display()
        );
        return Ok(());
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .expect("static progress template")
            .progress_chars("=>-"),
    );

    let parser = Arc::new(BoletoParser::from_config(&config.extraction)?);
    let mut ledger = CsvLedger::new(&ledger_path);
    let log_path = config.paths.log.clone();

    // Decoding and extraction run in parallel; results arrive in input order
    // so ledger numbers follow the sorted file list.
    let mut extractions = stream::iter(files.into_iter().map(|path| {
        let parser = Arc::clone(&parser);
        tokio::task::spawn_blocking(move || {
            let extraction = extract_file(&path, &parser);
            (path, extraction)
        })
    }))
    .buffered(jobs);

    let settings = Bookkeeping {
        processed_dir: move_files.then(|| config.paths.processed.clone()),
        log_path: log_path.clone(),
    };

    let mut outcomes = Vec::new();
    while let Some(joined) = extractions.next().await {
        let (path, (extraction, processing_time_ms)) = joined?;
        let now = Local::now().naive_local();

        outcomes.push(settle(&mut ledger, &settings, path, extraction, processing_time_ms, now));
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful: Vec<_> = outcomes.iter().filter(|o| o.record.is_some()).collect();
    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );
    println!("   Ledger: {}", ledger_path.display());
    println!("   Log:    {}", log_path.display());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    info!("Batch finished: {} ok, {} failed", successful.len(), failed.len());

    Ok(())
}

/// Where a settled file goes after extraction.
struct Bookkeeping {
    /// Destination folder, or `None` to leave files in the inbox.
    processed_dir: Option<PathBuf>,
    log_path: PathBuf,
}

/// Append one extraction result to the ledger, then move the file and log
/// the outcome. Move and log failures are reported but never stop the batch.
fn settle<L: LedgerStore>(
    ledger: &mut L,
    settings: &Bookkeeping,
    path: PathBuf,
    extraction: anyhow::Result<BoletoRecord>,
    processing_time_ms: u64,
    now: NaiveDateTime,
) -> FileOutcome {
    let name = file_name(&path);
    let mut outcome = FileOutcome {
        path,
        record: None,
        number: None,
        error: None,
        processing_time_ms,
    };

    let message = match extraction {
        Ok(record) => match ledger.append(&record) {
            Ok(row) => {
                if let Some(dir) = &settings.processed_dir {
                    if let Err(e) = move_to_processed(&outcome.path, dir, now) {
                        warn!("Could not move {}: {}", outcome.path.display(), e);
                    }
                }
                let message = format!("✓ Processado: {} - R$ {:.2}", name, record.amount);
                outcome.number = Some(row.number);
                outcome.record = Some(record);
                message
            }
            Err(e) => {
                error!("Failed to append {} to the ledger: {}", name, e);
                outcome.error = Some(e.to_string());
                format!("✗ Erro ao adicionar na planilha: {}", name)
            }
        },
        Err(e) => {
            warn!("Failed to process {}: {}", outcome.path.display(), e);
            outcome.error = Some(e.to_string());
            format!("✗ Erro ao extrair dados: {}", name)
        }
    };

    if let Err(e) = append_log(&settings.log_path, now, &message) {
        warn!("Could not write to log {}: {}", settings.log_path.display(), e);
    }

    outcome
}

/// PDFs directly inside `inbox`, any extension case, sorted by path.
fn find_pdfs(inbox: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.pdf", Pattern::escape(&inbox.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut files: Vec<PathBuf> = glob_with(&pattern, options)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    debug!("{} PDFs found with pattern {}", files.len(), pattern);
    Ok(files)
}

/// Decode and extract one file, with the time spent.
fn extract_file(path: &Path, parser: &BoletoParser) -> (anyhow::Result<BoletoRecord>, u64) {
    let file_start = Instant::now();

    let result = read_document_text(path).and_then(|text| {
        let source = DocumentSource::now(file_name(path));
        let extraction = parser.parse(&text, &source)?;
        for warning in &extraction.warnings {
            debug!("{}: {}", source.filename, warning);
        }
        Ok(extraction.record)
    });

    (result, file_start.elapsed().as_millis() as u64)
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "number",
        "supplier",
        "amount",
        "due_date",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in outcomes {
        let filename = file_name(&outcome.path);

        if let Some(record) = &outcome.record {
            wtr.write_record([
                filename.as_str(),
                "success",
                outcome.number.as_deref().unwrap_or(""),
                &record.supplier,
                &record.amount.to_string(),
                &record.due_date,
                &outcome.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename.as_str(),
                "error",
                "",
                "",
                "",
                "",
                &outcome.processing_time_ms.to_string(),
                outcome.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
