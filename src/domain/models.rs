use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::errors::{EvaluationError, EvaluationResult};

/// An inclusive index range `[lower, upper]` with `1 <= lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    lower: i64,
    upper: i64,
}

impl IndexRange {
    /// Builds a range from already-parsed limits.
    ///
    /// Bounds are checked before order, so `(0, -5)` reports a bounds error
    /// rather than an order error.
    pub fn new(lower: i64, upper: i64) -> EvaluationResult<Self> {
        if lower < 1 || upper < 1 {
            return Err(EvaluationError::RangeBounds { lower, upper });
        }
        if lower > upper {
            return Err(EvaluationError::RangeOrder { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Parses raw limit text, surrounding whitespace allowed.
    ///
    /// ```
    /// use seqcalc::domain::{EvaluationError, IndexRange};
    ///
    /// let range = IndexRange::parse(" 2", "4 ").unwrap();
    /// assert_eq!(range.len(), 3);
    ///
    /// assert!(matches!(IndexRange::parse("1.5", "4"), Err(EvaluationError::RangeFormat { .. })));
    /// ```
    pub fn parse(lower_raw: &str, upper_raw: &str) -> EvaluationResult<Self> {
        let (lower, upper) = match (lower_raw.trim().parse::<i64>(), upper_raw.trim().parse::<i64>()) {
            (Ok(lower), Ok(upper)) => (lower, upper),
            _ => {
                return Err(EvaluationError::RangeFormat {
                    lower: lower_raw.to_string(),
                    upper: upper_raw.to_string(),
                });
            }
        };
        Self::new(lower, upper)
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    /// Number of indices in the range.
    pub fn len(&self) -> u64 {
        (self.upper - self.lower) as u64 + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Indices in ascending order.
    pub fn indices(&self) -> RangeInclusive<i64> {
        self.lower..=self.upper
    }
}

/// One evaluated entry of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub index: i64,
    pub value: f64,
    /// The formula as typed, with the index written in place of `k`.
    pub substituted: String,
}

/// All terms of a fully evaluated sequence plus their sum and product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResult {
    pub terms: Vec<Term>,
    pub sum: f64,
    pub product: f64,
}

impl SequenceResult {
    /// Folds the term values left to right, in index order.
    pub fn from_terms(terms: Vec<Term>) -> Self {
        let sum = terms.iter().fold(0.0, |acc, term| acc + term.value);
        let product = terms.iter().fold(1.0, |acc, term| acc * term.value);
        Self { terms, sum, product }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.terms.iter().map(|term| term.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(index: i64, value: f64) -> Term {
        Term {
            index,
            value,
            substituted: String::new(),
        }
    }

    #[test]
    fn test_range_validation_order() {
        assert!(matches!(
            IndexRange::parse("abc", "0"),
            Err(EvaluationError::RangeFormat { .. })
        ));
        assert_eq!(
            IndexRange::parse("0", "-5"),
            Err(EvaluationError::RangeBounds { lower: 0, upper: -5 })
        );
        assert_eq!(
            IndexRange::parse("7", "3"),
            Err(EvaluationError::RangeOrder { lower: 7, upper: 3 })
        );
    }

    #[test]
    fn test_range_format_keeps_raw_text() {
        let err = IndexRange::parse(" 1 ", "ten").unwrap_err();
        assert_eq!(
            err,
            EvaluationError::RangeFormat {
                lower: " 1 ".to_string(),
                upper: "ten".to_string(),
            }
        );
    }

    #[test]
    fn test_range_accepts_signs_and_whitespace() {
        let range = IndexRange::parse("+2", " 5").unwrap();
        assert_eq!(range.lower(), 2);
        assert_eq!(range.upper(), 5);
        assert_eq!(range.indices().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn test_single_index_range() {
        let range = IndexRange::new(1, 1).unwrap();
        assert_eq!(range.len(), 1);
        assert!(!range.is_empty());
    }

    #[test]
    fn test_folds() {
        let result = SequenceResult::from_terms(vec![term(2, 4.0), term(3, 9.0), term(4, 16.0)]);
        assert_eq!(result.sum, 29.0);
        assert_eq!(result.product, 576.0);
        assert_eq!(result.values().collect::<Vec<_>>(), vec![4.0, 9.0, 16.0]);
    }

    #[test]
    fn test_product_overflow_is_not_an_error() {
        let result = SequenceResult::from_terms(vec![term(1, 1e200), term(2, 1e200)]);
        assert!(result.product.is_infinite());
    }
}
