//! Summary figures over the ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{LedgerRow, LEDGER_COLUMNS};
use crate::boleto::rules::UNIDENTIFIED_SUPPLIER;

/// Columns with more than this share of empty cells (in percent) are flagged.
pub const SPARSE_COLUMN_PERCENT: f64 = 20.0;

/// Aggregate figures of a ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_rows: usize,
    /// Sum of "Vr. Título".
    pub total_title: Decimal,
    /// Sum of "Vr. Dev/Pag".
    pub total_paid: Decimal,
    pub paid: usize,
    pub pending: usize,
    /// Unpaid rows whose due date is before the reference day.
    pub overdue: usize,
    /// Sum of "Vr. Título" over overdue rows.
    pub overdue_amount: Decimal,
    /// Distinct identified suppliers.
    pub unique_suppliers: usize,
    /// Rows with an empty supplier or the "not identified" sentinel.
    pub missing_suppliers: usize,
    /// Suppliers with the most rows, most frequent first.
    pub top_suppliers: Vec<(String, usize)>,
    /// Row count per "Forma de Pgto.", most frequent first. Empty cells are not counted.
    pub payment_methods: Vec<(String, usize)>,
    /// Empty cells per column, in ledger column order.
    pub column_gaps: Vec<ColumnGap>,
}

/// Empty cells of one ledger column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnGap {
    pub column: String,
    pub empty: usize,
    /// Share of empty cells, 0 to 100.
    pub percent: f64,
}

impl ColumnGap {
    /// More than [`SPARSE_COLUMN_PERCENT`] of the column is empty.
    pub fn is_sparse(&self) -> bool {
        self.percent > SPARSE_COLUMN_PERCENT
    }
}

impl LedgerSummary {
    /// Columns flagged as sparse.
    pub fn sparse_columns(&self) -> impl Iterator<Item = &ColumnGap> {
        self.column_gaps.iter().filter(|gap| gap.is_sparse())
    }
}

/// Count occurrences keeping first-seen order, then sort by count descending.
fn ranked<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(name, _)| name == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn is_identified(supplier: &str) -> bool {
    let supplier = supplier.trim();
    !supplier.is_empty() && supplier != UNIDENTIFIED_SUPPLIER
}

/// Compute the summary of `rows` as of `today`, keeping `top_n` suppliers.
pub fn summarize(rows: &[LedgerRow], today: NaiveDate, top_n: usize) -> LedgerSummary {
    let mut summary = LedgerSummary {
        total_rows: rows.len(),
        ..Default::default()
    };
    let mut empty_cells = [0usize; LEDGER_COLUMNS.len()];

    for row in rows {
        let title = row.title_amount.unwrap_or_default();
        summary.total_title += title;
        summary.total_paid += row.paid_amount.unwrap_or_default();

        if row.is_paid() {
            summary.paid += 1;
        } else {
            summary.pending += 1;
        }

        if row.is_overdue(today) {
            summary.overdue += 1;
            summary.overdue_amount += title;
        }

        if !is_identified(&row.supplier) {
            summary.missing_suppliers += 1;
        }

        for (count, filled) in empty_cells.iter_mut().zip(row.filled_columns()) {
            if !filled {
                *count += 1;
            }
        }
    }

    let mut suppliers = ranked(
        rows.iter()
            .map(|row| row.supplier.trim())
            .filter(|s| is_identified(s)),
    );
    summary.unique_suppliers = suppliers.len();
    suppliers.truncate(top_n);
    summary.top_suppliers = suppliers;

    summary.payment_methods = ranked(
        rows.iter()
            .map(|row| row.payment_method.trim())
            .filter(|m| !m.is_empty()),
    );

    if !rows.is_empty() {
        summary.column_gaps = LEDGER_COLUMNS
            .iter()
            .zip(empty_cells)
            .map(|(column, empty)| ColumnGap {
                column: column.to_string(),
                empty,
                percent: empty as f64 * 100.0 / rows.len() as f64,
            })
            .collect();
    }

    summary
}
