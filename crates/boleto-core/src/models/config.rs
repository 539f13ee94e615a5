//! Configuration structures for boleto processing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::boleto::rules::{AmountPolicy, AmountRange, PatternSpec};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoletoConfig {
    /// Folder and file locations.
    pub paths: PathsConfig,

    /// Field extraction settings.
    pub extraction: ExtractionConfig,

    /// Batch processing settings.
    pub batch: BatchConfig,
}

/// Folder and file locations used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder scanned for new boleto PDFs.
    pub inbox: PathBuf,

    /// Folder processed PDFs are moved into.
    pub processed: PathBuf,

    /// Accounts-payable ledger (CSV).
    pub ledger: PathBuf,

    /// Processing log.
    pub log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            inbox: PathBuf::from("dados/boletos"),
            processed: PathBuf::from("dados/boletos_processados"),
            ledger: PathBuf::from("dados/contasapagar_automacao.csv"),
            log: PathBuf::from("dados/log_processamento.txt"),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How the amount is chosen among candidates.
    pub amount_policy: AmountPolicy,

    /// Accepted amount range (inclusive).
    pub amount_range: AmountRange,

    /// Patterns appended after the built-in ones, at the lowest priority.
    pub extra_patterns: Vec<PatternSpec>,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents decoded and extracted in parallel.
    pub jobs: usize,

    /// Move successfully processed PDFs to the processed folder.
    pub move_processed: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            move_processed: true,
        }
    }
}

impl BoletoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
