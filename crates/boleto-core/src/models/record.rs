//! Boleto record produced by the extraction pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::boleto::rules::UNIDENTIFIED_SUPPLIER;

/// Date format used for every date field (DD/MM/YYYY).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Timestamp format of `processed_at` and of the processing log.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// One extracted boleto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoletoRecord {
    /// Supplier (beneficiário) name, or the "not identified" sentinel.
    pub supplier: String,

    /// Amount to pay, two decimal places.
    pub amount: Decimal,

    /// Due date (DD/MM/YYYY).
    pub due_date: String,

    /// Issue date (DD/MM/YYYY).
    pub issue_date: String,

    /// True when the issue date was not found and the processing date was used.
    #[serde(default)]
    pub issue_date_defaulted: bool,

    /// Document number, when printed on the boleto.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,

    /// File name of the source document.
    pub source_filename: String,

    /// Processing timestamp (DD/MM/YYYY HH:MM:SS).
    pub processed_at: String,
}

impl BoletoRecord {
    /// Parsed due date, if it is a valid calendar date.
    pub fn due(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.due_date, DATE_FORMAT).ok()
    }

    /// Parsed issue date, if it is a valid calendar date.
    pub fn issued(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.issue_date, DATE_FORMAT).ok()
    }

    /// Whether a supplier name was found.
    pub fn has_supplier(&self) -> bool {
        self.supplier != UNIDENTIFIED_SUPPLIER
    }

    /// Check the record for suspicious values. Returns human-readable issues.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.has_supplier() {
            issues.push("Supplier not identified".to_string());
        }

        if self.document_number.is_none() {
            issues.push("Missing document number".to_string());
        }

        if self.issue_date_defaulted {
            issues.push("Issue date not found, processing date used".to_string());
        }

        match (self.issued(), self.due()) {
            (Some(issued), Some(due)) if due < issued => {
                issues.push(format!(
                    "Due date {} is before issue date {}",
                    self.due_date, self.issue_date
                ));
            }
            (_, None) => {
                issues.push(format!("Due date {:?} is not a calendar date", self.due_date));
            }
            _ => {}
        }

        issues
    }
}

/// Where a document came from and when it is being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub filename: String,
    pub processed_at: NaiveDateTime,
}

impl DocumentSource {
    pub fn new(filename: impl Into<String>, processed_at: NaiveDateTime) -> Self {
        Self {
            filename: filename.into(),
            processed_at,
        }
    }

    /// Source stamped with the current local time.
    pub fn now(filename: impl Into<String>) -> Self {
        Self::new(filename, chrono::Local::now().naive_local())
    }

    /// Processing date as DD/MM/YYYY.
    pub fn processing_date(&self) -> String {
        self.processed_at.format(DATE_FORMAT).to_string()
    }

    /// Processing timestamp as DD/MM/YYYY HH:MM:SS.
    pub fn timestamp(&self) -> String {
        self.processed_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record() -> BoletoRecord {
        BoletoRecord {
            supplier: "SUMAY DO BRASIL LTDA".to_string(),
            amount: dec!(1217.77),
            due_date: "11/08/2025".to_string(),
            issue_date: "11/06/2025".to_string(),
            issue_date_defaulted: false,
            document_number: Some("000123456/1".to_string()),
            source_filename: "safra.pdf".to_string(),
            processed_at: "12/06/2025 09:30:00".to_string(),
        }
    }

    #[test]
    fn test_valid_record_has_no_issues() {
        assert!(record().validate().is_empty());
    }

    #[test]
    fn test_due_before_issue() {
        let mut r = record();
        r.due_date = "01/06/2025".to_string();
        let issues = r.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("before issue date"));
    }

    #[test]
    fn test_sentinel_supplier_flagged() {
        let mut r = record();
        r.supplier = UNIDENTIFIED_SUPPLIER.to_string();
        r.document_number = None;
        assert!(!r.has_supplier());
        assert_eq!(r.validate().len(), 2);
    }

    #[test]
    fn test_source_formats() {
        let at = NaiveDate::from_ymd_opt(2025, 10, 14)
            .unwrap()
            .and_hms_opt(8, 5, 3)
            .unwrap();
        let source = DocumentSource::new("a.pdf", at);
        assert_eq!(source.processing_date(), "14/10/2025");
        assert_eq!(source.timestamp(), "14/10/2025 08:05:03");
    }

    #[test]
    fn test_json_skips_missing_document_number() {
        let mut r = record();
        r.document_number = None;
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("document_number"));
        assert!(json.contains("\"amount\":\"1217.77\""));
    }
}
