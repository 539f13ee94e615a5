//! Date extraction for boletos.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::trace;

use super::catalog::{Field, FieldPattern, GroupInterpretation, PatternCatalog};
use super::{ExtractionMatch, FieldExtractor};

lazy_static! {
    /// DD/MM/YYYY or DD-MM-YYYY (single digit day accepted).
    static ref NUMERIC_DATE: Regex =
        Regex::new(r"^(\d{1,2})[/-](\d{2})[/-](\d{4})$").unwrap();

    /// "14 de Outubro de 2025"
    static ref LONG_DATE: Regex =
        Regex::new(r"(?i)^(\d{1,2})\s+de\s+(\w+)\s+de\s+(\d{4})$").unwrap();
}

/// Date field extractor. Used for both the issue date and the due date.
pub struct DateExtractor<'a> {
    catalog: &'a PatternCatalog,
    field: Field,
}

impl<'a> DateExtractor<'a> {
    /// Extractor for the issue (document) date.
    pub fn issue(catalog: &'a PatternCatalog) -> Self {
        Self {
            catalog,
            field: Field::IssueDate,
        }
    }

    /// Extractor for the due date.
    pub fn due(catalog: &'a PatternCatalog) -> Self {
        Self {
            catalog,
            field: Field::DueDate,
        }
    }

    fn interpret(&self, pattern: &FieldPattern, caps: &Captures<'_>) -> Option<String> {
        let group = |i: usize| caps.get(i).map(|m| m.as_str().trim());

        match pattern.interpretation {
            GroupInterpretation::Single => {
                let raw = group(1)?;
                if raw.is_empty() {
                    return None;
                }
                Some(normalize_date(raw))
            }
            GroupInterpretation::DayMonthYear => {
                Some(assemble_date(group(1)?, group(2)?, group(3)?))
            }
            GroupInterpretation::DayMonthNameYear => {
                let month = group(2)?;
                let month = month_number(month).unwrap_or(month);
                Some(assemble_date(group(1)?, month, group(3)?))
            }
        }
    }
}

impl FieldExtractor for DateExtractor<'_> {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for pattern in self.catalog.patterns(self.field) {
            let Some(caps) = pattern.matcher.captures(text) else {
                continue;
            };

            match self.interpret(pattern, &caps) {
                Some(date) => {
                    trace!("{} from pattern {} ({:?})", self.field, pattern.rank, pattern.layout);
                    return Some(date);
                }
                None => continue,
            }
        }

        None
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<Self::Output>> {
        let mut results = Vec::new();

        for pattern in self.catalog.patterns(self.field) {
            let Some(caps) = pattern.matcher.captures(text) else {
                continue;
            };

            if let (Some(date), Some(whole)) = (self.interpret(pattern, &caps), caps.get(0)) {
                results.push(
                    ExtractionMatch::new(date, pattern.rank, whole.as_str())
                        .with_position(whole.start(), whole.end()),
                );
            }
        }

        results
    }
}

/// Map a Portuguese month name to its two-digit number.
pub fn month_number(name: &str) -> Option<&'static str> {
    let number = match name.trim().to_lowercase().as_str() {
        "janeiro" => "01",
        "fevereiro" => "02",
        "março" | "marco" => "03",
        "abril" => "04",
        "maio" => "05",
        "junho" => "06",
        "julho" => "07",
        "agosto" => "08",
        "setembro" => "09",
        "outubro" => "10",
        "novembro" => "11",
        "dezembro" => "12",
        _ => return None,
    };
    Some(number)
}

/// Assemble a DD/MM/YYYY string. The day is zero-padded, month and year are kept as given.
pub fn assemble_date(day: &str, month: &str, year: &str) -> String {
    format!("{:0>2}/{}/{}", day.trim(), month.trim(), year.trim())
}

/// Normalize a raw date to DD/MM/YYYY.
///
/// Accepts DD/MM/YYYY, DD-MM-YYYY and "D de <mês> de YYYY". Anything else is
/// returned trimmed but otherwise unchanged, so the function is idempotent.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();

    if let Some(caps) = NUMERIC_DATE.captures(raw) {
        return assemble_date(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = LONG_DATE.captures(raw) {
        let month = month_number(&caps[2]).unwrap_or(&caps[2]);
        return assemble_date(&caps[1], month, &caps[3]);
    }

    raw.to_string()
}
