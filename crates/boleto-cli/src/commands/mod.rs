//! Subcommands and the file bookkeeping they share.

pub mod batch;
pub mod config;
pub mod history;
pub mod ledger;
pub mod log;
pub mod process;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use boleto_core::{BoletoConfig, PdfExtractor, TIMESTAMP_FORMAT};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("boleto")
        .join("config.json")
}

/// Configuration file to use: the explicit path or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration. An explicit path must exist; the default one may be absent.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<BoletoConfig> {
    if let Some(path) = explicit {
        return Ok(BoletoConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(BoletoConfig::from_file(&path)?)
    } else {
        Ok(BoletoConfig::default())
    }
}

/// Text of a boleto file. PDFs are decoded, `.txt` files read as-is.
pub fn read_document_text(path: &Path) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let content = PdfExtractor::extract_file(path)?;
            debug!("{}: {} pages", path.display(), content.page_count);
            Ok(content.text)
        }
        "txt" => Ok(fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// File name component of a path, for ledger descriptions and logs.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Append `[DD/MM/YYYY HH:MM:SS] message` to the processing log.
pub fn append_log(log_path: &Path, at: NaiveDateTime, message: &str) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "[{}] {}", at.format(TIMESTAMP_FORMAT), message)?;
    Ok(())
}

/// Move a processed file into `dest_dir`. An existing file of the same name
/// is kept and the moved one gets a `_YYYYMMDD_HHMMSS` suffix.
pub fn move_to_processed(file: &Path, dest_dir: &Path, at: NaiveDateTime) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dest_dir)?;

    let mut destination = dest_dir.join(file_name(file));
    if destination.exists() {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = at.format("%Y%m%d_%H%M%S");
        let renamed = match file.extension() {
            Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
            None => format!("{}_{}", stem, suffix),
        };
        destination = dest_dir.join(renamed);
    }

    // rename fails across filesystems; fall back to copy and remove
    if fs::rename(file, &destination).is_err() {
        fs::copy(file, &destination)?;
        fs::remove_file(file)?;
    }

    debug!("Moved {} to {}", file.display(), destination.display());
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 16)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_append_log_format() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("dados").join("log.txt");

        append_log(&log, at(), "first").unwrap();
        append_log(&log, at(), "second").unwrap();

        let content = fs::read_to_string(&log).unwrap();
        assert_eq!(content, "[16/10/2025 09:05:07] first\n[16/10/2025 09:05:07] second\n");
    }

    #[test]
    fn test_move_with_collision_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let inbox = dir.path().join("inbox");
        let processed = dir.path().join("processed");
        fs::create_dir_all(&inbox).unwrap();
        fs::create_dir_all(&processed).unwrap();

        fs::write(processed.join("boleto.pdf"), b"old").unwrap();
        let source = inbox.join("boleto.pdf");
        fs::write(&source, b"new").unwrap();

        let moved = move_to_processed(&source, &processed, at()).unwrap();
        assert_eq!(moved, processed.join("boleto_20251016_090507.pdf"));
        assert!(!source.exists());
        assert_eq!(fs::read(processed.join("boleto.pdf")).unwrap(), b"old");
        assert_eq!(fs::read(&moved).unwrap(), b"new");
    }

    #[test]
    fn test_read_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boleto.TXT");
        fs::write(&path, "Valor do Documento: 10,00").unwrap();
        assert_eq!(read_document_text(&path).unwrap(), "Valor do Documento: 10,00");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = read_document_text(Path::new("boleto.docx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        assert!(load_config(Some("/nonexistent/boleto/config.json")).is_err());
    }
}
