//! Core library for boleto processing.
//!
//! This crate provides:
//! - Boleto field extraction (amount, issue date, due date, supplier, document number)
//!   driven by a priority-ordered pattern catalog
//! - Value normalization for Brazilian amounts and dates
//! - Record assembly with a completeness gate
//! - PDF text extraction and an accounts-payable ledger used by the CLI

pub mod error;
pub mod models;
pub mod pdf;
pub mod boleto;
pub mod ledger;

pub use error::{BoletoError, ExtractionError, LedgerError, PdfError, Result};
pub use models::config::{BatchConfig, BoletoConfig, ExtractionConfig, PathsConfig};
pub use models::record::{BoletoRecord, DocumentSource, DATE_FORMAT, TIMESTAMP_FORMAT};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor};
pub use boleto::{assemble_record, BoletoExtractor, BoletoParser, ExtractedFields, ExtractionResult};
pub use boleto::rules::{AmountPolicy, AmountRange, Field, PatternCatalog, PatternSpec};
pub use ledger::{ingest, summarize, ColumnGap, CsvLedger, LedgerRow, LedgerStore, LedgerSummary, MemoryLedger};
