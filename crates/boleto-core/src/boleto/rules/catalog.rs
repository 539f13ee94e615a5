//! Pattern catalog: priority-ordered matching rules per boleto field.

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

use super::patterns::{BUILTIN_CATALOG, BUILTIN_PATTERNS};

/// Target field of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    IssueDate,
    DueDate,
    Supplier,
    DocumentNumber,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Amount,
        Field::IssueDate,
        Field::DueDate,
        Field::Supplier,
        Field::DocumentNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Amount => "amount",
            Field::IssueDate => "issue_date",
            Field::DueDate => "due_date",
            Field::Supplier => "supplier",
            Field::DocumentNumber => "document_number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the capture groups of a match combine into a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupInterpretation {
    /// Group 1 holds the whole value.
    #[default]
    Single,
    /// Groups 1-3 hold numeric day, month and year.
    DayMonthYear,
    /// Groups 1-3 hold day, Portuguese month name and year.
    DayMonthNameYear,
}

impl GroupInterpretation {
    /// Number of capture groups the interpretation reads.
    pub fn required_groups(&self) -> usize {
        match self {
            GroupInterpretation::Single => 1,
            GroupInterpretation::DayMonthYear | GroupInterpretation::DayMonthNameYear => 3,
        }
    }
}

/// Document template a pattern was written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Generic,
    /// Braspress freight invoices.
    Braspress,
    /// Banco Safra boletos.
    Safra,
}

/// Serializable description of a pattern, as stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub field: Field,
    pub pattern: String,
    #[serde(default)]
    pub interpretation: GroupInterpretation,
    #[serde(default)]
    pub layout: Layout,
}

/// One compiled rule of the catalog.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub field: Field,
    /// Position in the field's list, 0 is tried first.
    pub rank: usize,
    pub matcher: Regex,
    pub interpretation: GroupInterpretation,
    pub layout: Layout,
}

impl FieldPattern {
    /// Compile a pattern. Every catalog pattern is case-insensitive and multi-line.
    pub fn compile(spec: &PatternSpec, rank: usize) -> Result<Self, ExtractionError> {
        let matcher = RegexBuilder::new(&spec.pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map_err(|e| ExtractionError::InvalidPattern {
                field: spec.field.to_string(),
                reason: e.to_string(),
            })?;

        let groups = matcher.captures_len() - 1;
        let required = spec.interpretation.required_groups();
        if groups < required {
            return Err(ExtractionError::InvalidPattern {
                field: spec.field.to_string(),
                reason: format!(
                    "{:?} needs {} capture groups, pattern has {}",
                    spec.interpretation, required, groups
                ),
            });
        }

        Ok(Self {
            field: spec.field,
            rank,
            matcher,
            interpretation: spec.interpretation,
            layout: spec.layout,
        })
    }
}

/// Ordered rule sets for every field.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    amount: Vec<FieldPattern>,
    issue_date: Vec<FieldPattern>,
    due_date: Vec<FieldPattern>,
    supplier: Vec<FieldPattern>,
    document_number: Vec<FieldPattern>,
}

impl PatternCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog covering the generic, Braspress and Safra layouts.
    pub fn builtin() -> Arc<PatternCatalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    /// Specs of the built-in catalog, in priority order per field.
    pub fn builtin_specs() -> Vec<PatternSpec> {
        BUILTIN_PATTERNS
            .iter()
            .map(|(field, layout, interpretation, pattern)| PatternSpec {
                field: *field,
                pattern: (*pattern).to_string(),
                interpretation: *interpretation,
                layout: *layout,
            })
            .collect()
    }

    /// Compile a catalog from specs. Order within a field is preserved.
    pub fn from_specs(specs: &[PatternSpec]) -> Result<Self, ExtractionError> {
        let mut catalog = Self::new();
        for spec in specs {
            catalog.push(spec)?;
        }
        Ok(catalog)
    }

    /// Copy of this catalog with extra patterns appended after the existing ones.
    pub fn with_additional(&self, specs: &[PatternSpec]) -> Result<Self, ExtractionError> {
        let mut catalog = self.clone();
        for spec in specs {
            catalog.push(spec)?;
        }
        Ok(catalog)
    }

    /// Append a pattern at the lowest priority of its field.
    pub fn push(&mut self, spec: &PatternSpec) -> Result<(), ExtractionError> {
        let list = self.list_mut(spec.field);
        let pattern = FieldPattern::compile(spec, list.len())?;
        list.push(pattern);
        Ok(())
    }

    /// Patterns of a field in priority order.
    pub fn patterns(&self, field: Field) -> &[FieldPattern] {
        match field {
            Field::Amount => &self.amount,
            Field::IssueDate => &self.issue_date,
            Field::DueDate => &self.due_date,
            Field::Supplier => &self.supplier,
            Field::DocumentNumber => &self.document_number,
        }
    }

    /// Total number of patterns.
    pub fn len(&self) -> usize {
        Field::ALL.iter().map(|f| self.patterns(*f).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list_mut(&mut self, field: Field) -> &mut Vec<FieldPattern> {
        match field {
            Field::Amount => &mut self.amount,
            Field::IssueDate => &mut self.issue_date,
            Field::DueDate => &mut self.due_date,
            Field::Supplier => &mut self.supplier,
            Field::DocumentNumber => &mut self.document_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(field: Field, pattern: &str, interpretation: GroupInterpretation) -> PatternSpec {
        PatternSpec {
            field,
            pattern: pattern.to_string(),
            interpretation,
            layout: Layout::Generic,
        }
    }

    #[test]
    fn test_builtin_counts() {
        let catalog = PatternCatalog::builtin();
        assert_eq!(catalog.patterns(Field::Amount).len(), 12);
        assert_eq!(catalog.patterns(Field::IssueDate).len(), 5);
        assert_eq!(catalog.patterns(Field::DueDate).len(), 5);
        assert_eq!(catalog.patterns(Field::Supplier).len(), 7);
        assert_eq!(catalog.patterns(Field::DocumentNumber).len(), 6);
        assert_eq!(catalog.len(), 35);
    }

    #[test]
    fn test_ranks_follow_order() {
        let catalog = PatternCatalog::builtin();
        for field in Field::ALL {
            for (i, pattern) in catalog.patterns(field).iter().enumerate() {
                assert_eq!(pattern.rank, i);
                assert_eq!(pattern.field, field);
            }
        }
    }

    #[test]
    fn test_additional_patterns_go_last() {
        let extra = spec(Field::Amount, r"Total\s+([\d.,]+)", GroupInterpretation::Single);
        let catalog = PatternCatalog::builtin().with_additional(&[extra]).unwrap();

        let amount = catalog.patterns(Field::Amount);
        assert_eq!(amount.len(), 13);
        assert_eq!(amount[12].rank, 12);
        assert!(amount[12].matcher.is_match("TOTAL 10,00"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let bad = spec(Field::Supplier, r"Cedente(", GroupInterpretation::Single);
        let err = PatternCatalog::from_specs(&[bad]).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_group_count_checked() {
        let bad = spec(Field::DueDate, r"Vencimento (\d{2}/\d{2}/\d{4})", GroupInterpretation::DayMonthYear);
        assert!(PatternCatalog::from_specs(&[bad]).is_err());
    }

    #[test]
    fn test_spec_json_defaults() {
        let spec: PatternSpec =
            serde_json::from_str(r#"{"field":"due_date","pattern":"Venc\\.\\s*(\\S+)"}"#).unwrap();
        assert_eq!(spec.interpretation, GroupInterpretation::Single);
        assert_eq!(spec.layout, Layout::Generic);
    }
}
