//! Built-in patterns for boleto extraction.
//!
//! Order matters: within a field, earlier entries take precedence. Amount
//! patterns are all evaluated and their candidates pooled; every other field
//! stops at the first pattern that matches.

use std::sync::Arc;

use lazy_static::lazy_static;

use super::catalog::{Field, GroupInterpretation, Layout, PatternCatalog};

use Field::*;
use GroupInterpretation::*;
use Layout::*;

/// (field, layout, interpretation, pattern)
pub type BuiltinPattern = (Field, Layout, GroupInterpretation, &'static str);

pub const BUILTIN_PATTERNS: &[BuiltinPattern] = &[
    // Amount: net value lines first, loose "value alone on a line" last.
    (Amount, Braspress, Single, r"VALOR\s+L.QUIDO\s+R\$\s*\n?\s*([\d.,]+)"),
    (Amount, Safra, Single, r"\(=\)\s*Valor\s+do\s+Documento\s*\n.*?R\$\s*([\d.,]+)"),
    (Amount, Safra, Single, r"\(=\)\s*Valor\s+do\s+Documento\s*\n\s*([\d.,]+)"),
    (Amount, Safra, Single, r"Valor\s+do\s+Documento\s*\n.*?R\$\s*([\d.,]+)"),
    (Amount, Safra, Single, r"Valor\s+do\s+Documento\s*\n\s*([\d.,]+)"),
    (Amount, Generic, Single, r"\(=\)\s*Valor\s+do\s+Doc[.:]\s+([\d.,]+)"),
    (Amount, Generic, Single, r"Valor\s+do\s+Documento[:\s]*([\d.,]+)"),
    (Amount, Generic, Single, r"Valor\s+do\s+Doc[.:]\s*([\d.,]+)"),
    (Amount, Generic, Single, r"Valor\s+Cobrado.*?\n.*?([\d.,]+)"),
    (Amount, Generic, Single, r"Documento\s*\n\s*([\d.,]+)"),
    (Amount, Braspress, Single, r"^(\d+,\d{2})\s+DM"),
    (Amount, Generic, Single, r"^\s*([\d.]+,\d{2})\s*$"),
    // Issue date: the Safra header row carries issue and due date side by side.
    (IssueDate, Safra, Single, r"Data\s+Documento\s+Vencimento.*?\n.*?\n(\d{2}/\d{2}/\d{4})"),
    (IssueDate, Safra, Single, r"Data\s+do\s+Documento[^\n]*\n\s*(\d{2}/\d{2}/\d{4})"),
    (IssueDate, Braspress, DayMonthNameYear, r"Emiss[ãa]o:\s+(\d{1,2})\s+de\s+(\w+)\s+de\s+(\d{4})"),
    (IssueDate, Generic, DayMonthYear, r"Data\s+(?:de\s+)?Emiss[ãa]o[:\s]*(\d{2})[/-](\d{2})[/-](\d{4})"),
    (IssueDate, Generic, DayMonthYear, r"Data\s+Documento[:\s]*(\d{2})[/-](\d{2})[/-](\d{4})"),
    // Due date: second date of the Safra header row.
    (DueDate, Safra, Single, r"Data\s+Documento\s+Vencimento.*?\n.*?\n\d{2}/\d{2}/\d{4}\s+(\d{2}/\d{2}/\d{4})"),
    (DueDate, Safra, Single, r"Vencimento\s*\n\s*(\d{2}/\d{2}/\d{4})"),
    (DueDate, Braspress, Single, r"(\d{2}/\d{2}/\d{4})\s+(?:REAL|Ag\./Cód)"),
    (DueDate, Generic, DayMonthYear, r"Vencimento[:\s]*(\d{2})[/-](\d{2})[/-](\d{4})"),
    (DueDate, Generic, DayMonthYear, r"Data[:\s]*(?:de\s*)?Vencimento[:\s]*(\d{2})[/-](\d{2})[/-](\d{4})"),
    // Supplier: name on the line after the label before same-line layouts.
    (Supplier, Safra, Single, r"Benefici[áa]rio\s+CNPJ\s*/\s*CPF[^\n]+\n\s*([A-ZÀ-Ú][A-ZÀ-Ú\s&.-]+)"),
    (Supplier, Safra, Single, r"Benefici[áa]rio\s+Ag\./C[óo]d\.[^\n]+\n\s*([A-ZÀ-Ú][A-ZÀ-Ú\s&.-]+)"),
    (Supplier, Braspress, Single, r"Benefici[áa]rio\s+Final[^\n]*\n\s*([A-ZÀ-Ú][A-ZÀ-Ú\s&.-]+?)(?:\s+\d|\s+CNPJ)"),
    (Supplier, Safra, Single, r"Benefici[áa]rio\s*\n\s*([A-ZÀ-Ú][A-ZÀ-Ú\s&.-]+)"),
    (Supplier, Generic, Single, r"Benefici[áa]rio[:\s]*([A-ZÀ-Ú0-9.,\s&/-]+)"),
    (Supplier, Generic, Single, r"Cedente[:\s]*([A-ZÀ-Ú][A-ZÀ-Ú\s&.-]+)"),
    (Supplier, Generic, Single, r"Sacador[:\s]*([A-ZÀ-Ú][A-ZÀ-Ú\s&.-]+)"),
    // Document number
    (DocumentNumber, Safra, Single, r"N[úu]mero\s+do\s+Documento\s*\n\s*(\S+)"),
    (DocumentNumber, Generic, Single, r"N[úu]mero\s+do\s+Doc[.:]\s*([\w/.-]+)"),
    (DocumentNumber, Generic, Single, r"Nº\s+do\s+Doc[.:]\s*([\w/.-]+)"),
    (DocumentNumber, Generic, Single, r"N[úu]mero\s+do\s+Documento[:\s]*([\w/.-]+)"),
    (DocumentNumber, Generic, Single, r"N[úu]mero\s+da\s+Fatura[:\s]*([\w/.-]+)"),
    (DocumentNumber, Generic, Single, r"Nº\s+Fatura[:\s]*([\w/.-]+)"),
];

lazy_static! {
    pub static ref BUILTIN_CATALOG: Arc<PatternCatalog> =
        Arc::new(PatternCatalog::from_specs(&PatternCatalog::builtin_specs()).unwrap());
}
