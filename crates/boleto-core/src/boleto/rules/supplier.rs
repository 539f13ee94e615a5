//! Supplier (beneficiário) extraction.

use tracing::trace;

use super::catalog::{Field, PatternCatalog};
use super::{ExtractionMatch, FieldExtractor};

/// Sentinel used when no pattern yields a usable supplier name.
pub const UNIDENTIFIED_SUPPLIER: &str = "Fornecedor não identificado";

/// Names longer than this are truncated.
const MAX_SUPPLIER_CHARS: usize = 60;

/// Names of this length or shorter are rejected.
const MIN_SUPPLIER_CHARS: usize = 5;

/// Fragments of the boleto footer ("Ficha de Compensação") that some layouts
/// place right below the beneficiário label. Matched case-sensitively: the
/// footer is printed in title case, supplier names in upper case.
const NOISE_FRAGMENTS: [&str; 2] = ["Ficha", "Compensa"];

/// Supplier field extractor.
pub struct SupplierExtractor<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> SupplierExtractor<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Extract the supplier, falling back to [`UNIDENTIFIED_SUPPLIER`].
    pub fn extract_or_default(&self, text: &str) -> String {
        self.extract(text)
            .unwrap_or_else(|| UNIDENTIFIED_SUPPLIER.to_string())
    }
}

impl FieldExtractor for SupplierExtractor<'_> {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for pattern in self.catalog.patterns(Field::Supplier) {
            let Some(raw) = pattern.matcher.captures(text).and_then(|c| c.get(1)) else {
                continue;
            };

            match clean_supplier(raw.as_str()) {
                Some(name) => {
                    trace!("supplier from pattern {} ({:?})", pattern.rank, pattern.layout);
                    return Some(name);
                }
                None => trace!("supplier pattern {} rejected {:?}", pattern.rank, raw.as_str()),
            }
        }

        None
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<Self::Output>> {
        let mut results = Vec::new();

        for pattern in self.catalog.patterns(Field::Supplier) {
            let Some(raw) = pattern.matcher.captures(text).and_then(|c| c.get(1)) else {
                continue;
            };

            if let Some(name) = clean_supplier(raw.as_str()) {
                results.push(
                    ExtractionMatch::new(name, pattern.rank, raw.as_str())
                        .with_position(raw.start(), raw.end()),
                );
            }
        }

        results
    }
}

/// Clean a raw supplier match.
///
/// Only the first line of the match is kept; the label patterns let the
/// capture run on into the next label, so the remaining lines are never part
/// of the name. Whitespace is then collapsed, footer noise rejected, the name
/// truncated to 60 characters and names of 5 characters or fewer rejected.
pub fn clean_supplier(raw: &str) -> Option<String> {
    let first_line = raw.trim_start().lines().next().unwrap_or_default();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if NOISE_FRAGMENTS.iter().any(|noise| collapsed.contains(noise)) {
        return None;
    }

    let truncated: String = collapsed.chars().take(MAX_SUPPLIER_CHARS).collect();
    let name = truncated.trim_end();

    if name.chars().count() <= MIN_SUPPLIER_CHARS {
        return None;
    }

    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_supplier() {
        assert_eq!(
            clean_supplier("  SUMAY   DO BRASIL\tLTDA  "),
            Some("SUMAY DO BRASIL LTDA".to_string())
        );
        assert_eq!(
            clean_supplier("ACME SERVICOS LTDA\nData de Emissão"),
            Some("ACME SERVICOS LTDA".to_string())
        );
        assert_eq!(clean_supplier("ACME"), None);
        assert_eq!(clean_supplier("ABCDE"), None);
        assert_eq!(clean_supplier("ABCDEF"), Some("ABCDEF".to_string()));
        assert_eq!(clean_supplier("Ficha de Compensação"), None);
        assert_eq!(clean_supplier("Compensação bancária"), None);
    }

    #[test]
    fn test_uppercase_names_with_noise_words_kept() {
        assert_eq!(
            clean_supplier("COMPENSADOS PARANA LTDA"),
            Some("COMPENSADOS PARANA LTDA".to_string())
        );

        let catalog = PatternCatalog::builtin();
        let extractor = SupplierExtractor::new(&catalog);
        assert_eq!(
            extractor.extract("Cedente: COMPENSADOS PARANA LTDA\n"),
            Some("COMPENSADOS PARANA LTDA".to_string())
        );
        assert_eq!(
            extractor.extract("Cedente: FICHAS E CARTOES LTDA\n"),
            Some("FICHAS E CARTOES LTDA".to_string())
        );
        assert_eq!(extractor.extract("Cedente: Ficha de Compensação\n"), None);
    }

    #[test]
    fn test_truncates_long_names() {
        let raw = format!("{} LTDA", "A".repeat(70));
        let name = clean_supplier(&raw).unwrap();
        assert_eq!(name.chars().count(), 60);

        // A space landing on the cut is trimmed away.
        let raw = format!("{} LTDA", "B".repeat(59));
        assert_eq!(clean_supplier(&raw).unwrap(), "B".repeat(59));
    }

    #[test]
    fn test_missing_label_gives_sentinel() {
        let catalog = PatternCatalog::builtin();
        let extractor = SupplierExtractor::new(&catalog);
        assert_eq!(extractor.extract("Valor do Documento: 100,00"), None);
        assert_eq!(extractor.extract_or_default("Valor do Documento: 100,00"), UNIDENTIFIED_SUPPLIER);
    }

    #[test]
    fn test_safra_supplier() {
        let catalog = PatternCatalog::builtin();
        let text = "Beneficiário CNPJ / CPF Ag./Cód.Beneficiário\nSUMAY DO BRASIL LTDA 12.345.678/0001-90 0001/123456-7\n";
        assert_eq!(
            SupplierExtractor::new(&catalog).extract(text),
            Some("SUMAY DO BRASIL LTDA".to_string())
        );
    }

    #[test]
    fn test_braspress_supplier() {
        let catalog = PatternCatalog::builtin();
        let text = "Beneficiário Final\nBRASPRESS TRANSPORTES URGENTES LTDA 48.740.351/0001-65\n";
        assert_eq!(
            SupplierExtractor::new(&catalog).extract(text),
            Some("BRASPRESS TRANSPORTES URGENTES LTDA".to_string())
        );
    }

    #[test]
    fn test_noise_skipped_for_next_pattern() {
        let catalog = PatternCatalog::builtin();
        let text = "Beneficiário\nFicha de Compensação\nCedente: REAL SUPPLIER LTDA\n";

        let extractor = SupplierExtractor::new(&catalog);
        assert_eq!(extractor.extract(text), Some("REAL SUPPLIER LTDA".to_string()));
    }

    #[test]
    fn test_cedente_label() {
        let catalog = PatternCatalog::builtin();
        let text = "Cedente: ACME SERVICOS DE TECNOLOGIA LTDA\nData de Emissão: 05/09/2025\n";
        assert_eq!(
            SupplierExtractor::new(&catalog).extract(text),
            Some("ACME SERVICOS DE TECNOLOGIA LTDA".to_string())
        );
    }
}
