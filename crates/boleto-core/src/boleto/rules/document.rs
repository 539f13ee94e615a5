//! Document number extraction.

use tracing::trace;

use super::catalog::{Field, PatternCatalog};
use super::{ExtractionMatch, FieldExtractor};

/// Document number extractor. The first pattern with a non-empty match wins.
pub struct DocumentNumberExtractor<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> DocumentNumberExtractor<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }
}

impl FieldExtractor for DocumentNumberExtractor<'_> {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let first = self.extract_all(text).into_iter().next()?;
        trace!("document number from pattern {}", first.rank);
        Some(first.value)
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<Self::Output>> {
        let mut results = Vec::new();

        for pattern in self.catalog.patterns(Field::DocumentNumber) {
            let Some(raw) = pattern.matcher.captures(text).and_then(|c| c.get(1)) else {
                continue;
            };

            let value = raw.as_str().trim();
            if value.is_empty() {
                continue;
            }

            results.push(
                ExtractionMatch::new(value.to_string(), pattern.rank, raw.as_str())
                    .with_position(raw.start(), raw.end()),
            );
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<String> {
        let catalog = PatternCatalog::builtin();
        DocumentNumberExtractor::new(&catalog).extract(text)
    }

    #[test]
    fn test_next_line_layout() {
        assert_eq!(
            extract("Número do Documento\n000123456/1\n"),
            Some("000123456/1".to_string())
        );
    }

    #[test]
    fn test_same_line_labels() {
        assert_eq!(extract("Número do Documento: 2025/0042"), Some("2025/0042".to_string()));
        assert_eq!(extract("Numero do Doc: NF-889"), Some("NF-889".to_string()));
        assert_eq!(extract("Nº do Doc. 4471"), Some("4471".to_string()));
    }

    #[test]
    fn test_invoice_number() {
        assert_eq!(extract("Número da Fatura: 47191977"), Some("47191977".to_string()));
        assert_eq!(extract("Nº Fatura 5512-A"), Some("5512-A".to_string()));
    }

    #[test]
    fn test_priority_order() {
        let text = "Número da Fatura: 111\nNúmero do Documento: 222\n";
        assert_eq!(extract(text), Some("222".to_string()));
    }

    #[test]
    fn test_absent() {
        assert_eq!(extract("Valor do Documento: 100,00"), None);
    }
}
