//! Boleto parser: runs the field extractors and assembles the record.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::{BoletoRecord, DocumentSource};

use super::rules::{
    AmountExtractor, AmountPolicy, AmountRange, DateExtractor, DocumentNumberExtractor,
    FieldExtractor, PatternCatalog, SupplierExtractor,
};
use super::{BoletoExtractor, Result};

/// Raw outcome of the five field extractors, before the completeness gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub amount: Option<Decimal>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    /// Always present; the "not identified" sentinel when nothing matched.
    pub supplier: String,
    pub document_number: Option<String>,
}

/// Result of boleto extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Assembled record.
    pub record: BoletoRecord,
    /// Field values as extracted.
    pub fields: ExtractedFields,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Pattern-driven boleto parser.
///
/// Holds an immutable catalog, so one parser can be shared across threads.
#[derive(Debug, Clone)]
pub struct BoletoParser {
    catalog: Arc<PatternCatalog>,
    amount_policy: AmountPolicy,
    amount_range: AmountRange,
}

impl BoletoParser {
    /// Create a parser over the built-in catalog with default settings.
    pub fn new() -> Self {
        Self {
            catalog: PatternCatalog::builtin(),
            amount_policy: AmountPolicy::default(),
            amount_range: AmountRange::default(),
        }
    }

    /// Build a parser from extraction settings. Extra patterns are appended
    /// after the built-in ones.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let catalog = if config.extra_patterns.is_empty() {
            PatternCatalog::builtin()
        } else {
            Arc::new(PatternCatalog::builtin().with_additional(&config.extra_patterns)?)
        };

        Ok(Self::new()
            .with_catalog(catalog)
            .with_amount_policy(config.amount_policy)
            .with_amount_range(config.amount_range))
    }

    /// Use a different pattern catalog.
    pub fn with_catalog(mut self, catalog: Arc<PatternCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the amount selection policy.
    pub fn with_amount_policy(mut self, policy: AmountPolicy) -> Self {
        self.amount_policy = policy;
        self
    }

    /// Set the accepted amount range.
    pub fn with_amount_range(mut self, range: AmountRange) -> Self {
        self.amount_range = range;
        self
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn amount_policy(&self) -> AmountPolicy {
        self.amount_policy
    }
}

impl Default for BoletoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BoletoExtractor for BoletoParser {
    fn extract_fields(&self, text: &str) -> ExtractedFields {
        let catalog = self.catalog.as_ref();

        let amount = AmountExtractor::new(catalog)
            .with_policy(self.amount_policy)
            .with_range(self.amount_range)
            .extract(text);

        ExtractedFields {
            amount,
            issue_date: DateExtractor::issue(catalog).extract(text),
            due_date: DateExtractor::due(catalog).extract(text),
            supplier: SupplierExtractor::new(catalog).extract_or_default(text),
            document_number: DocumentNumberExtractor::new(catalog).extract(text),
        }
    }

    fn parse(&self, text: &str, source: &DocumentSource) -> Result<ExtractionResult> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        info!("Parsing boleto {} from {} characters of text", source.filename, text.len());

        let fields = self.extract_fields(text);
        debug!(
            "Fields for {}: amount={:?} issue={:?} due={:?} supplier={:?} doc={:?}",
            source.filename,
            fields.amount,
            fields.issue_date,
            fields.due_date,
            fields.supplier,
            fields.document_number
        );

        let record = assemble_record(&fields, source)?;
        let warnings = record.validate();

        Ok(ExtractionResult {
            record,
            fields,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Assemble a record from extracted fields.
///
/// Fails with `MissingAmount` before `MissingDueDate`. A missing issue date
/// falls back to the processing date.
pub fn assemble_record(fields: &ExtractedFields, source: &DocumentSource) -> Result<BoletoRecord> {
    let amount = fields.amount.ok_or(ExtractionError::MissingAmount)?;
    let due_date = fields.due_date.clone().ok_or(ExtractionError::MissingDueDate)?;

    let (issue_date, issue_date_defaulted) = match &fields.issue_date {
        Some(date) => (date.clone(), false),
        None => (source.processing_date(), true),
    };

    Ok(BoletoRecord {
        supplier: fields.supplier.clone(),
        amount,
        due_date,
        issue_date,
        issue_date_defaulted,
        document_number: fields.document_number.clone(),
        source_filename: source.filename.clone(),
        processed_at: source.timestamp(),
    })
}
