//! Boleto field extraction module.

mod parser;
pub mod rules;

pub use parser::{assemble_record, BoletoParser, ExtractedFields, ExtractionResult};

use crate::error::ExtractionError;
use crate::models::record::DocumentSource;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for boleto extractors.
pub trait BoletoExtractor {
    /// Run every field extractor over the text. Never fails.
    fn extract_fields(&self, text: &str) -> ExtractedFields;

    /// Extract a complete record, gated on amount and due date.
    fn parse(&self, text: &str, source: &DocumentSource) -> Result<ExtractionResult>;
}
