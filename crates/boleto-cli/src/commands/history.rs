//! History command - files already moved to the processed folder.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::warn;

use super::{file_name, load_config};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List processed files
    List,

    /// Delete every processed file (the ledger is untouched)
    Clear,
}

pub async fn run(args: HistoryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let processed = load_config(config_path)?.paths.processed;

    match args.command {
        HistoryCommand::List => {
            let files = processed_files(&processed)?;
            if files.is_empty() {
                println!("{} No processed files in {}", style("ℹ").blue(), processed.display());
            }
            for file in &files {
                println!("{}", file_name(file));
            }
        }
        HistoryCommand::Clear => {
            let removed = clear_processed(&processed)?;
            println!(
                "{} Removed {} files from {}",
                style("✓").green(),
                removed,
                processed.display()
            );
        }
    }

    Ok(())
}

/// Regular files directly inside `dir`, sorted. A missing folder has none.
fn processed_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Delete the processed files, skipping any that cannot be removed.
/// Returns the number deleted.
fn clear_processed(dir: &Path) -> anyhow::Result<usize> {
    let mut removed = 0;
    for file in processed_files(dir)? {
        match fs::remove_file(&file) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not remove {}: {}", file.display(), e),
        }
    }
    Ok(removed)
}
