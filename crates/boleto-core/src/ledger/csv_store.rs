//! CSV file ledger.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{LedgerRow, LedgerStore, Result, LEDGER_COLUMNS};
use crate::error::LedgerError;

/// Ledger stored as a CSV file with the fixed column header.
///
/// A missing file reads as an empty ledger. Writes go to a temporary file
/// that replaces the ledger once complete.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for CsvLedger {
    fn rows(&self) -> Result<Vec<LedgerRow>> {
        if !self.path.exists() {
            debug!("Ledger {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let missing: Vec<&str> = LEDGER_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h.trim() == *col))
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::Columns(format!("missing {}", missing.join(", "))));
        }

        let mut rows = Vec::new();
        for row in reader.deserialize::<LedgerRow>() {
            rows.push(row?);
        }

        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn replace_all(&mut self, rows: &[LedgerRow]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&temp)?;

            writer.write_record(LEDGER_COLUMNS)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        fs::rename(&temp, &self.path)?;
        debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{compose_description, ACCOUNT_PLAN, PAYMENT_METHOD_BOLETO};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn row(number: &str) -> LedgerRow {
        LedgerRow {
            number: number.to_string(),
            supplier: "BRASPRESS TRANSPORTES URGENTES LTDA".to_string(),
            account_plan: ACCOUNT_PLAN.to_string(),
            description: compose_description(Some("47191977"), "braspress.pdf"),
            issue_date: "14/10/2025".to_string(),
            due_date: "13/11/2025".to_string(),
            payment_date: None,
            title_amount: Some(dec!(1829.65)),
            paid_amount: Some(dec!(1829.65)),
            total_amount: Some(dec!(1829.65)),
            payment_method: PAYMENT_METHOD_BOLETO.to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CsvLedger::new(dir.path().join("ledger.csv"));
        assert!(ledger.rows().unwrap().is_empty());
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dados").join("ledger.csv");
        let mut ledger = CsvLedger::new(&path);

        let rows = vec![row("000001"), row("000002")];
        ledger.replace_all(&rows).unwrap();

        assert_eq!(ledger.rows().unwrap(), rows);
        assert!(!dir.path().join("dados").join("ledger.csv.tmp").exists());

        let content = fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, LEDGER_COLUMNS.join(","));
    }

    #[test]
    fn test_empty_ledger_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut ledger = CsvLedger::new(&path);

        ledger.replace_all(&[]).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("Número,Fornecedor"));
        assert!(ledger.rows().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

        let err = CsvLedger::new(&path).rows().unwrap_err();
        assert!(matches!(err, LedgerError::Columns(_)));
    }

    #[test]
    fn test_lenient_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let content = format!(
            "{}\n000009,FORNECEDOR X,CONTAS A PAGAR,Manual,01/09/2025,30/09/2025,,\"1.829,65\",abc,,3 - BOLETO\n",
            LEDGER_COLUMNS.join(",")
        );
        fs::write(&path, content).unwrap();

        let rows = CsvLedger::new(&path).rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title_amount, Some(dec!(1829.65)));
        assert_eq!(rows[0].paid_amount, None);
        assert_eq!(rows[0].total_amount, None);
        assert_eq!(rows[0].payment_date, None);
    }

    #[test]
    fn test_operations_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut ledger = CsvLedger::new(&path);
        ledger.replace_all(&[row("000001"), row("000002")]).unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        assert_eq!(ledger.set_payment_date(&["000001".to_string()], Some(day)).unwrap(), 1);
        assert_eq!(ledger.delete(&["000002".to_string()]).unwrap(), 1);

        let reopened = CsvLedger::new(&path).rows().unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened[0].payment_date.as_deref(), Some("10/11/2025"));
    }
}
