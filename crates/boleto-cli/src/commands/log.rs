//! Log command - view or clear the processing log.

use std::fs;
use std::path::Path;

use clap::{Args, Subcommand};
use console::style;

use super::load_config;

/// Arguments for the log command.
#[derive(Args)]
pub struct LogArgs {
    #[command(subcommand)]
    command: LogCommand,
}

#[derive(Subcommand)]
enum LogCommand {
    /// Print the most recent log lines
    Show {
        /// Number of lines to print
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },

    /// Empty the log file
    Clear,
}

pub async fn run(args: LogArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let log_path = load_config(config_path)?.paths.log;

    match args.command {
        LogCommand::Show { lines } => {
            let tail = read_log_tail(&log_path, lines)?;
            if tail.is_empty() {
                println!("{} Log is empty ({})", style("ℹ").blue(), log_path.display());
            }
            for line in tail {
                println!("{}", line);
            }
        }
        LogCommand::Clear => {
            if clear_log(&log_path)? {
                println!("{} Cleared {}", style("✓").green(), log_path.display());
            } else {
                println!("{} No log at {}", style("ℹ").blue(), log_path.display());
            }
        }
    }

    Ok(())
}

/// Last `lines` non-empty lines of the log. A missing log reads as empty.
fn read_log_tail(path: &Path, lines: usize) -> anyhow::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let all: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = all.len().saturating_sub(lines);
    Ok(all[skip..].iter().map(|l| l.to_string()).collect())
}

/// Truncate the log. Returns false when there was no log file.
fn clear_log(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::write(path, "")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log.txt");

        assert!(read_log_tail(&log, 50).unwrap().is_empty());
        assert!(!clear_log(&log).unwrap());

        let content: String = (1..=60).map(|n| format!("[16/10/2025 09:00:00] linha {}\n", n)).collect();
        fs::write(&log, content).unwrap();

        let tail = read_log_tail(&log, 50).unwrap();
        assert_eq!(tail.len(), 50);
        assert_eq!(tail[0], "[16/10/2025 09:00:00] linha 11");
        assert_eq!(tail[49], "[16/10/2025 09:00:00] linha 60");

        assert!(clear_log(&log).unwrap());
        assert!(log.exists());
        assert!(read_log_tail(&log, 50).unwrap().is_empty());
    }
}
