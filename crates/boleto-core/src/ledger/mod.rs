//! Accounts-payable ledger.
//!
//! Each processed boleto becomes one row with a fixed Portuguese column
//! layout. Storage is abstracted behind [`LedgerStore`]; [`CsvLedger`] keeps
//! the rows in a CSV file and [`MemoryLedger`] in memory.

mod csv_store;
pub mod summary;

pub use csv_store::CsvLedger;
pub use summary::{summarize, ColumnGap, LedgerSummary, SPARSE_COLUMN_PERCENT};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

use crate::boleto::rules::parse_brl_amount;
use crate::boleto::{BoletoExtractor, ExtractionResult};
use crate::error::LedgerError;
use crate::models::record::{BoletoRecord, DocumentSource, DATE_FORMAT};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Column names in ledger order.
pub const LEDGER_COLUMNS: [&str; 11] = [
    "Número",
    "Fornecedor",
    "Plano de contas",
    "Histórico",
    "Dt. Emissão",
    "Dt. Vencimento",
    "Dt. Pagamento",
    "Vr. Título",
    "Vr. Dev/Pag",
    "Valor Total a Pagar",
    "Forma de Pgto.",
];

/// Value of "Plano de contas" for automatically created rows.
pub const ACCOUNT_PLAN: &str = "CONTAS A PAGAR";

/// Value of "Forma de Pgto." for automatically created rows.
pub const PAYMENT_METHOD_BOLETO: &str = "3 - BOLETO";

/// Width of the zero-padded sequence number.
const SEQUENCE_WIDTH: usize = 6;

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Número")]
    pub number: String,

    #[serde(rename = "Fornecedor")]
    pub supplier: String,

    #[serde(rename = "Plano de contas")]
    pub account_plan: String,

    #[serde(rename = "Histórico")]
    pub description: String,

    #[serde(rename = "Dt. Emissão")]
    pub issue_date: String,

    #[serde(rename = "Dt. Vencimento")]
    pub due_date: String,

    /// Empty until the bill is paid.
    #[serde(rename = "Dt. Pagamento", default)]
    pub payment_date: Option<String>,

    #[serde(rename = "Vr. Título", default, deserialize_with = "lenient_amount")]
    pub title_amount: Option<Decimal>,

    #[serde(rename = "Vr. Dev/Pag", default, deserialize_with = "lenient_amount")]
    pub paid_amount: Option<Decimal>,

    #[serde(rename = "Valor Total a Pagar", default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<Decimal>,

    #[serde(rename = "Forma de Pgto.")]
    pub payment_method: String,
}

impl LedgerRow {
    /// Build the row for a freshly extracted record.
    pub fn from_record(record: &BoletoRecord, number: String) -> Self {
        Self {
            number,
            supplier: record.supplier.clone(),
            account_plan: ACCOUNT_PLAN.to_string(),
            description: compose_description(
                record.document_number.as_deref(),
                &record.source_filename,
            ),
            issue_date: record.issue_date.clone(),
            due_date: record.due_date.clone(),
            payment_date: None,
            title_amount: Some(record.amount),
            paid_amount: Some(record.amount),
            total_amount: Some(record.amount),
            payment_method: PAYMENT_METHOD_BOLETO.to_string(),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_date
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }

    /// Parsed due date, if it is a valid calendar date.
    pub fn due(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.due_date.trim(), DATE_FORMAT).ok()
    }

    /// Unpaid and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid() && self.due().is_some_and(|due| due < today)
    }

    /// Which columns hold a value, in [`LEDGER_COLUMNS`] order.
    ///
    /// Amounts that could not be read count as empty.
    pub fn filled_columns(&self) -> [bool; LEDGER_COLUMNS.len()] {
        let text = |s: &str| !s.trim().is_empty();
        [
            text(&self.number),
            text(&self.supplier),
            text(&self.account_plan),
            text(&self.description),
            text(&self.issue_date),
            text(&self.due_date),
            self.is_paid(),
            self.title_amount.is_some(),
            self.paid_amount.is_some(),
            self.total_amount.is_some(),
            text(&self.payment_method),
        ]
    }

    /// Whether this row carries the given number. "52" matches "000052".
    pub fn has_number(&self, number: &str) -> bool {
        let (mine, wanted) = (self.number.trim(), number.trim());
        if mine == wanted {
            return true;
        }
        match (mine.parse::<u64>(), wanted.parse::<u64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Accepts plain decimals and Brazilian-formatted values; anything else reads as empty.
fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let s = s.trim();
        Decimal::from_str(s).ok().or_else(|| parse_brl_amount(s))
    }))
}

/// "Histórico" text for an automatically created row.
pub fn compose_description(document_number: Option<&str>, filename: &str) -> String {
    let mut description = String::from("Boleto processado automaticamente");
    if let Some(number) = document_number.filter(|n| !n.is_empty()) {
        description.push_str(" - Doc: ");
        description.push_str(number);
    }
    description.push_str(" - ");
    description.push_str(filename);
    description
}

/// Next sequence number: highest numeric "Número" plus one, zero-padded.
///
/// Non-numeric numbers are ignored. Without any numeric row the sequence starts at "000001".
/// Fails when the highest number is too large to have a successor.
pub fn next_sequence_number(rows: &[LedgerRow]) -> Result<String> {
    let mut max: Option<u64> = None;
    for row in rows {
        let n = row.number.trim();
        if n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let value = n
            .parse::<u64>()
            .map_err(|_| LedgerError::SequenceExhausted(n.to_string()))?;
        max = max.max(Some(value));
    }

    let next = match max {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| LedgerError::SequenceExhausted(max.to_string()))?,
        None => 1,
    };

    Ok(format!("{:0width$}", next, width = SEQUENCE_WIDTH))
}

/// Storage backend for ledger rows.
pub trait LedgerStore {
    /// All rows in ledger order.
    fn rows(&self) -> Result<Vec<LedgerRow>>;

    /// Replace the whole content.
    fn replace_all(&mut self, rows: &[LedgerRow]) -> Result<()>;

    /// Append a row for the record with the next sequence number.
    fn append(&mut self, record: &BoletoRecord) -> Result<LedgerRow> {
        let mut rows = self.rows()?;
        let row = LedgerRow::from_record(record, next_sequence_number(&rows)?);
        rows.push(row.clone());
        self.replace_all(&rows)?;

        info!("Ledger row {} added for {}", row.number, record.source_filename);
        Ok(row)
    }

    /// Set (or clear, with `None`) the payment date of the given rows.
    /// Returns the number of rows changed.
    fn set_payment_date(&mut self, numbers: &[String], date: Option<NaiveDate>) -> Result<usize> {
        let mut rows = self.rows()?;
        let formatted = date.map(|d| d.format(DATE_FORMAT).to_string());

        let mut changed = 0;
        for row in rows.iter_mut() {
            if numbers.iter().any(|n| row.has_number(n)) {
                row.payment_date = formatted.clone();
                changed += 1;
            }
        }

        if changed > 0 {
            self.replace_all(&rows)?;
        }
        debug!("Payment date {:?} set on {} rows", formatted, changed);
        Ok(changed)
    }

    /// Delete the given rows. Returns the number of rows removed.
    fn delete(&mut self, numbers: &[String]) -> Result<usize> {
        let rows = self.rows()?;
        let before = rows.len();
        let kept: Vec<LedgerRow> = rows
            .into_iter()
            .filter(|row| !numbers.iter().any(|n| row.has_number(n)))
            .collect();

        let removed = before - kept.len();
        if removed > 0 {
            self.replace_all(&kept)?;
        }
        debug!("Deleted {} ledger rows", removed);
        Ok(removed)
    }
}

/// In-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    rows: Vec<LedgerRow>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LedgerStore for MemoryLedger {
    fn rows(&self) -> Result<Vec<LedgerRow>> {
        Ok(self.rows.clone())
    }

    fn replace_all(&mut self, rows: &[LedgerRow]) -> Result<()> {
        self.rows = rows.to_vec();
        Ok(())
    }
}

/// Extract a record from text and append it to the ledger.
///
/// Nothing is written when extraction fails.
pub fn ingest<E, L>(
    extractor: &E,
    ledger: &mut L,
    text: &str,
    source: &DocumentSource,
) -> crate::Result<(ExtractionResult, LedgerRow)>
where
    E: BoletoExtractor + ?Sized,
    L: LedgerStore + ?Sized,
{
    let result = extractor.parse(text, source)?;
    let row = ledger.append(&result.record)?;
    Ok((result, row))
}
