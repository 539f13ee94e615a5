//! Amount extraction for boletos.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::trace;

use super::catalog::{Field, PatternCatalog};
use super::{ExtractionMatch, FieldExtractor};

/// How a single amount is chosen from the pooled candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountPolicy {
    /// The value that occurs most often across all patterns wins.
    #[default]
    MostFrequent,
    /// The first valid value of the highest-priority matching pattern wins.
    FirstValid,
}

/// Inclusive range of plausible boleto amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for AmountRange {
    fn default() -> Self {
        Self {
            min: Decimal::TEN,
            max: Decimal::from(1_000_000),
        }
    }
}

impl AmountRange {
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Amount field extractor.
pub struct AmountExtractor<'a> {
    catalog: &'a PatternCatalog,
    policy: AmountPolicy,
    range: AmountRange,
}

impl<'a> AmountExtractor<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self {
            catalog,
            policy: AmountPolicy::default(),
            range: AmountRange::default(),
        }
    }

    pub fn with_policy(mut self, policy: AmountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_range(mut self, range: AmountRange) -> Self {
        self.range = range;
        self
    }
}

impl FieldExtractor for AmountExtractor<'_> {
    type Output = Decimal;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let candidates = self.extract_all(text);

        match self.policy {
            AmountPolicy::FirstValid => candidates.first().map(|c| c.value),
            AmountPolicy::MostFrequent => select_most_frequent(candidates.iter().map(|c| c.value)),
        }
    }

    fn extract_all(&self, text: &str) -> Vec<ExtractionMatch<Self::Output>> {
        let mut results = Vec::new();

        for pattern in self.catalog.patterns(Field::Amount) {
            for caps in pattern.matcher.captures_iter(text) {
                let Some(raw) = caps.get(1) else {
                    continue;
                };

                let Some(amount) = parse_brl_amount(raw.as_str()) else {
                    trace!("amount pattern {} matched unparseable {:?}", pattern.rank, raw.as_str());
                    continue;
                };

                if !self.range.contains(amount) {
                    trace!("amount pattern {} matched out-of-range {}", pattern.rank, amount);
                    continue;
                }

                results.push(
                    ExtractionMatch::new(amount, pattern.rank, raw.as_str())
                        .with_position(raw.start(), raw.end()),
                );
            }
        }

        results
    }
}

/// Pick the value with the highest occurrence count. Ties go to the value seen first.
pub fn select_most_frequent<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut counts: Vec<(Decimal, usize)> = Vec::new();

    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(Decimal, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }

    best.map(|(value, _)| value)
}

/// Parse a Brazilian-formatted amount (e.g., "1.234,56").
///
/// Dots are thousands separators and the comma is the decimal separator.
/// The result carries at least two decimal places.
pub fn parse_brl_amount(s: &str) -> Option<Decimal> {
    let normalized = s.trim().replace('.', "").replace(',', ".");
    if normalized.is_empty() {
        return None;
    }

    let mut amount = Decimal::from_str(&normalized).ok()?;
    if amount.scale() < 2 {
        amount.rescale(2);
    }
    Some(amount)
}

/// Format amount in Brazilian style (R$ 1.234,56).
pub fn format_brl_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    let chars: Vec<char> = digits.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("R$ {}{},{}", sign, formatted, decimal_part)
}
