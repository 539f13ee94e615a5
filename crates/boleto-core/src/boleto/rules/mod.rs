//! Rule-based field extractors for boletos.

pub mod amounts;
pub mod catalog;
pub mod dates;
pub mod document;
pub mod patterns;
pub mod supplier;

pub use amounts::{parse_brl_amount, format_brl_amount, select_most_frequent, AmountExtractor, AmountPolicy, AmountRange};
pub use catalog::{Field, FieldPattern, GroupInterpretation, Layout, PatternCatalog, PatternSpec};
pub use dates::{assemble_date, month_number, normalize_date, DateExtractor};
pub use document::DocumentNumberExtractor;
pub use supplier::{clean_supplier, SupplierExtractor, UNIDENTIFIED_SUPPLIER};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all candidates for the field.
    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<Self::Output>>;
}

/// A candidate value together with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Normalized value.
    pub value: T,
    /// Priority rank of the originating pattern.
    pub rank: usize,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rank: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            rank,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
