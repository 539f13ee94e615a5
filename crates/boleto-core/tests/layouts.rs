//! End-to-end extraction over text captured from real boleto layouts.
//!
//! Fixtures live in tests/fixtures and hold the text pdf-extract produces
//! for each layout, so these tests need no PDF files.

use boleto_core::boleto::rules::UNIDENTIFIED_SUPPLIER;
use boleto_core::{
    ingest, AmountPolicy, BoletoError, BoletoExtractor, BoletoParser, DocumentSource,
    ExtractedFields, ExtractionError, ExtractionResult, LedgerStore, MemoryLedger,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const BRASPRESS: &str = include_str!("fixtures/braspress.txt");
const SAFRA: &str = include_str!("fixtures/safra.txt");
const GENERIC: &str = include_str!("fixtures/generic.txt");
const NO_AMOUNT: &str = include_str!("fixtures/no_amount.txt");

fn source(filename: &str) -> DocumentSource {
    let at = NaiveDate::from_ymd_opt(2025, 10, 16)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    DocumentSource::new(filename, at)
}

// ---------------------------------------------------------------------------
// Braspress freight invoice: month-name issue date, "REAL" due date line
// ---------------------------------------------------------------------------
#[test]
fn braspress_invoice() {
    let result = BoletoParser::new().parse(BRASPRESS, &source("braspress.pdf")).unwrap();
    let record = result.record;

    assert_eq!(record.amount, dec!(1829.65));
    assert_eq!(record.supplier, "BRASPRESS TRANSPORTES URGENTES LTDA");
    assert_eq!(record.issue_date, "14/10/2025");
    assert_eq!(record.due_date, "13/11/2025");
    assert_eq!(record.document_number.as_deref(), Some("47191977"));
    assert!(!record.issue_date_defaulted);
}

// ---------------------------------------------------------------------------
// Banco Safra boleto: header row with issue and due date side by side
// ---------------------------------------------------------------------------
#[test]
fn safra_boleto() {
    let result = BoletoParser::new().parse(SAFRA, &source("safra.pdf")).unwrap();
    let record = result.record;

    assert_eq!(record.amount, dec!(1217.77));
    assert_eq!(record.supplier, "SUMAY DO BRASIL LTDA");
    assert_eq!(record.issue_date, "11/06/2025");
    assert_eq!(record.due_date, "11/08/2025");
    assert_eq!(record.document_number.as_deref(), Some("000123456/1"));
}

#[test]
fn generic_boleto() {
    let fields = BoletoParser::new().extract_fields(GENERIC);
    assert_eq!(
        fields,
        ExtractedFields {
            amount: Some(dec!(350.00)),
            issue_date: Some("05/09/2025".to_string()),
            due_date: Some("20/09/2025".to_string()),
            supplier: "ACME SERVICOS DE TECNOLOGIA LTDA".to_string(),
            document_number: Some("2025/0042".to_string()),
        }
    );
}

// The document number line under "Número do Documento" also feeds an amount
// candidate on Safra boletos; frequency voting outweighs it.
#[test]
fn safra_amount_survives_document_number_candidate() {
    let first_valid = BoletoParser::new()
        .with_amount_policy(AmountPolicy::FirstValid)
        .extract_fields(SAFRA);
    let most_frequent = BoletoParser::new().extract_fields(SAFRA);

    assert_eq!(first_valid.amount, Some(dec!(1217.77)));
    assert_eq!(most_frequent.amount, Some(dec!(1217.77)));
}

#[test]
fn out_of_range_amount_is_missing() {
    let err = BoletoParser::new().parse(NO_AMOUNT, &source("x.pdf")).unwrap_err();
    assert_eq!(err, ExtractionError::MissingAmount);
}

#[test]
fn ledger_numbers_follow_input_order() {
    let parser = BoletoParser::new();
    let mut ledger = MemoryLedger::new();

    for (name, text) in [("braspress.pdf", BRASPRESS), ("safra.pdf", SAFRA), ("generic.pdf", GENERIC)] {
        ingest(&parser, &mut ledger, text, &source(name)).unwrap();
    }
    let failed = ingest(&parser, &mut ledger, NO_AMOUNT, &source("no_amount.pdf"));
    assert!(matches!(
        failed,
        Err(BoletoError::Extraction(ExtractionError::MissingAmount))
    ));

    let rows = ledger.rows().unwrap();
    let numbers: Vec<&str> = rows.iter().map(|r| r.number.as_str()).collect();
    assert_eq!(numbers, vec!["000001", "000002", "000003"]);
    assert_eq!(
        rows[0].description,
        "Boleto processado automaticamente - Doc: 47191977 - braspress.pdf"
    );
}

// ---------------------------------------------------------------------------
// Any BoletoExtractor can feed the ledger
// ---------------------------------------------------------------------------
struct FixedExtractor {
    fields: ExtractedFields,
}

impl BoletoExtractor for FixedExtractor {
    fn extract_fields(&self, _text: &str) -> ExtractedFields {
        self.fields.clone()
    }

    fn parse(&self, _text: &str, source: &DocumentSource) -> Result<ExtractionResult, ExtractionError> {
        let record = boleto_core::assemble_record(&self.fields, source)?;
        Ok(ExtractionResult {
            warnings: record.validate(),
            record,
            fields: self.fields.clone(),
            processing_time_ms: 0,
        })
    }
}

#[test]
fn custom_extractor_feeds_ledger() {
    let extractor = FixedExtractor {
        fields: ExtractedFields {
            amount: Some(dec!(42.00)),
            due_date: Some("31/10/2025".to_string()),
            supplier: UNIDENTIFIED_SUPPLIER.to_string(),
            ..Default::default()
        },
    };
    let mut ledger = MemoryLedger::new();

    let (result, row) = ingest(&extractor, &mut ledger, "", &source("manual.pdf")).unwrap();
    assert!(result.record.issue_date_defaulted);
    assert_eq!(row.issue_date, "16/10/2025");
    assert_eq!(row.supplier, UNIDENTIFIED_SUPPLIER);
}
