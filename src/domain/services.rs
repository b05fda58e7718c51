//! Sequence evaluation services.
//!
//! This module drives a parsed formula across an index range: it validates
//! the raw limits, parses the formula once, evaluates one term per index in
//! ascending order and folds the values into a sum and a product.

use log::{debug, trace, warn};

use super::errors::{EvaluationError, EvaluationResult};
use super::models::{IndexRange, SequenceResult, Term};
use super::parser::{self, ParsedExpression};

/// Evaluates single terms of one formula.
///
/// Holds the parsed expression for the numeric path and the formula exactly
/// as the user typed it for the displayed substitution.
pub struct TermEvaluator<'a> {
    expression: &'a ParsedExpression,
    formula: &'a str,
}

impl<'a> TermEvaluator<'a> {
    pub fn new(expression: &'a ParsedExpression, formula: &'a str) -> Self {
        Self { expression, formula }
    }

    /// Evaluates the term at index `k`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Eval`] naming `k` when the substituted
    /// expression has no finite real value.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqcalc::domain::{ParsedExpression, TermEvaluator};
    ///
    /// let expr = ParsedExpression::parse("k**2").unwrap();
    /// let evaluator = TermEvaluator::new(&expr, "k^2");
    ///
    /// let term = evaluator.evaluate(3).unwrap();
    /// assert_eq!(term.value, 9.0);
    /// assert_eq!(term.substituted, "3^2");
    /// ```
    pub fn evaluate(&self, k: i64) -> EvaluationResult<Term> {
        let substituted = parser::substitute_display(self.formula, k);
        let value = self
            .expression
            .evaluate_at(k)
            .map_err(|cause| EvaluationError::Eval {
                index: k,
                formula: self.formula.to_string(),
                cause,
            })?;

        trace!("a_{k} = {substituted} = {value}");
        Ok(Term {
            index: k,
            value,
            substituted,
        })
    }
}

/// Evaluates whole sequences.
///
/// Stateless: every call validates, parses and evaluates from scratch, so
/// one evaluator can serve any number of requests, from any thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceEvaluator;

impl SequenceEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `formula` for every `k` from `lower_raw` to `upper_raw`.
    ///
    /// Checks run in a fixed order and the first failure wins: limit
    /// format, limit bounds, limit order, empty formula, syntax, then the
    /// terms themselves in ascending index order. A failing term aborts the
    /// whole sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqcalc::domain::{EvaluationError, SequenceEvaluator};
    ///
    /// let evaluator = SequenceEvaluator::new();
    ///
    /// let result = evaluator.evaluate_sequence("k^2", "2", "4").unwrap();
    /// assert_eq!(result.sum, 29.0);
    /// assert_eq!(result.product, 576.0);
    ///
    /// let err = evaluator.evaluate_sequence("1/(k-3)", "1", "5").unwrap_err();
    /// assert!(matches!(err, EvaluationError::Eval { index: 3, .. }));
    /// ```
    pub fn evaluate_sequence(
        &self,
        formula: &str,
        lower_raw: &str,
        upper_raw: &str,
    ) -> EvaluationResult<SequenceResult> {
        let (expression, range) = self.prepare(formula, lower_raw, upper_raw)?;
        let result = self.evaluate_range(&expression, formula, range)?;
        debug!("sum = {}, product = {}", result.sum, result.product);
        Ok(result)
    }

    /// Runs every check that comes before the terms themselves: the limits,
    /// the empty formula and the syntax.
    ///
    /// Callers that add their own limits on the range apply them between
    /// this and [`SequenceEvaluator::evaluate_range`].
    pub fn prepare(
        &self,
        formula: &str,
        lower_raw: &str,
        upper_raw: &str,
    ) -> EvaluationResult<(ParsedExpression, IndexRange)> {
        let range = IndexRange::parse(lower_raw, upper_raw)?;

        if formula.trim().is_empty() {
            return Err(EvaluationError::EmptyFormula);
        }

        let normalized = parser::normalize_caret(formula);
        let expression = ParsedExpression::parse(&normalized).map_err(|detail| {
            debug!("rejected formula '{formula}': {detail}");
            EvaluationError::Syntax {
                formula: formula.to_string(),
                detail,
            }
        })?;
        debug!(
            "parsed '{formula}' for k in {}..={} ({} terms)",
            range.lower(),
            range.upper(),
            range.len()
        );
        Ok((expression, range))
    }

    /// Evaluates an already-parsed formula over a validated range.
    pub fn evaluate_range(
        &self,
        expression: &ParsedExpression,
        formula: &str,
        range: IndexRange,
    ) -> EvaluationResult<SequenceResult> {
        let evaluator = TermEvaluator::new(expression, formula);
        let mut terms = Vec::with_capacity(usize::try_from(range.len()).unwrap_or(0).min(1 << 16));

        for k in range.indices() {
            match evaluator.evaluate(k) {
                Ok(term) => terms.push(term),
                Err(err) => {
                    warn!("{err}");
                    return Err(err);
                }
            }
        }

        Ok(SequenceResult::from_terms(terms))
    }
}

/// Shorthand for [`SequenceEvaluator::evaluate_sequence`].
pub fn evaluate_sequence(formula: &str, lower_raw: &str, upper_raw: &str) -> EvaluationResult<SequenceResult> {
    SequenceEvaluator::new().evaluate_sequence(formula, lower_raw, upper_raw)
}
