//! Error types for the boleto-core library.

use thiserror::Error;

/// Main error type for the boleto library.
#[derive(Error, Debug)]
pub enum BoletoError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Boleto field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Ledger read/write error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Reasons a document could not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The document text was empty or only whitespace.
    #[error("document text is empty")]
    EmptyInput,

    /// No amount pattern produced a value inside the accepted range.
    #[error("amount missing")]
    MissingAmount,

    /// No due date pattern matched.
    #[error("due date missing")]
    MissingDueDate,

    /// A catalog pattern failed to compile.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },
}

impl ExtractionError {
    /// Name of the required field this failure refers to, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            Self::MissingAmount => Some("amount"),
            Self::MissingDueDate => Some("due_date"),
            _ => None,
        }
    }
}

/// Errors related to the accounts-payable ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The ledger header does not match the expected column layout.
    #[error("unexpected ledger columns: {0}")]
    Columns(String),

    /// I/O error while reading or writing the ledger file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The highest existing number has no successor.
    #[error("ledger number {0} cannot be incremented")]
    SequenceExhausted(String),
}

/// Result type for the boleto library.
pub type Result<T> = std::result::Result<T, BoletoError>;
