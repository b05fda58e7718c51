//! Request/response boundary of the sequence calculator.
//!
//! Front ends hand a [`SequenceRequest`] of three raw strings to a
//! [`Calculator`] and get back a [`SequenceResponse`] that is either a full
//! result or a single error message, never something in between.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{IndexRange, SequenceEvaluator, SequenceResult};

/// Largest number of terms a calculator accepts unless configured otherwise.
pub const DEFAULT_MAX_TERMS: u64 = 100_000;

/// The three raw inputs of a calculation, as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceRequest {
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub lower_limit: String,
    #[serde(default)]
    pub upper_limit: String,
}

impl SequenceRequest {
    pub fn new(formula: impl Into<String>, lower_limit: impl Into<String>, upper_limit: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            lower_limit: lower_limit.into(),
            upper_limit: upper_limit.into(),
        }
    }
}

/// One term as exposed to front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub k: i64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// Outcome of a calculation.
///
/// On failure `result` is `"Error"`, `error` holds the message and the
/// numeric fields are empty.
///
/// A successful `sum` or `product` may be infinite when every term is
/// finite but the fold overflows. JSON has no infinity, so such a value is
/// written as `null`; `error` being `null` is what marks the response as a
/// success, and `result` still carries `inf` in its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResponse {
    pub result: String,
    pub error: Option<String>,
    pub terms: Vec<TermEntry>,
    pub sum: Option<f64>,
    pub product: Option<f64>,
}

impl SequenceResponse {
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            result: "Error".to_string(),
            error: Some(format!("Error: {message}")),
            terms: Vec::new(),
            sum: None,
            product: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The text a front end shows: the rendered block or the error.
    pub fn display_text(&self) -> &str {
        self.error.as_deref().unwrap_or(&self.result)
    }
}

/// Limits imposed by the caller rather than by the evaluation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("the range k = {lower}..{upper} has {requested} terms, more than the limit of {limit}")]
    TooManyTerms {
        lower: i64,
        upper: i64,
        requested: u64,
        limit: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatorConfig {
    /// Include the substituted form of each term in the output.
    pub show_substitution: bool,
    /// Reject ranges with more terms than this; `None` disables the cap.
    pub max_terms: Option<u64>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            show_substitution: true,
            max_terms: Some(DEFAULT_MAX_TERMS),
        }
    }
}

/// Turns requests into responses.
///
/// # Examples
///
/// ```
/// use seqcalc::application::{Calculator, SequenceRequest};
///
/// let calculator = Calculator::default();
/// let response = calculator.calculate(&SequenceRequest::new("2*k+1", "1", "1"));
///
/// assert_eq!(response.sum, Some(3.0));
/// assert!(response.result.contains("a_1 = 2*1+1 = 3.0000"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    config: CalculatorConfig,
    evaluator: SequenceEvaluator,
}

impl Calculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            config,
            evaluator: SequenceEvaluator::new(),
        }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn calculate(&self, request: &SequenceRequest) -> SequenceResponse {
        debug!(
            "received formula {:?}, lower limit {:?}, upper limit {:?}",
            request.formula, request.lower_limit, request.upper_limit
        );

        let (expression, range) = match self
            .evaluator
            .prepare(&request.formula, &request.lower_limit, &request.upper_limit)
        {
            Ok(prepared) => prepared,
            Err(err) => return SequenceResponse::failure(err),
        };

        if let Err(err) = self.check_policy(range) {
            return SequenceResponse::failure(err);
        }

        match self.evaluator.evaluate_range(&expression, &request.formula, range) {
            Ok(result) => self.success(request, &result),
            Err(err) => SequenceResponse::failure(err),
        }
    }

    /// Applies the term cap to a range whose formula already parsed.
    ///
    /// Runs after the engine's own checks, so a bad limit, an empty formula
    /// or a syntax error is reported as such whatever the range length.
    fn check_policy(&self, range: IndexRange) -> Result<(), PolicyError> {
        match self.config.max_terms {
            Some(limit) if range.len() > limit => Err(PolicyError::TooManyTerms {
                lower: range.lower(),
                upper: range.upper(),
                requested: range.len(),
                limit,
            }),
            _ => Ok(()),
        }
    }

    fn success(&self, request: &SequenceRequest, result: &SequenceResult) -> SequenceResponse {
        let show = self.config.show_substitution;
        let terms = result
            .terms
            .iter()
            .map(|term| TermEntry {
                k: term.index,
                value: term.value,
                expression: show.then(|| term.substituted.clone()),
            })
            .collect();

        SequenceResponse {
            result: render_result(request, result, show),
            error: None,
            terms,
            sum: Some(result.sum),
            product: Some(result.product),
        }
    }
}

/// Renders the human-readable result block.
///
/// One line per term with four decimals, then the sum with four decimals
/// and the product in scientific notation.
pub fn render_result(request: &SequenceRequest, result: &SequenceResult, show_substitution: bool) -> String {
    let mut lines = Vec::with_capacity(result.terms.len() + 4);
    lines.push(format!(
        "Sequence for a_k = {}, k from {} to {}:",
        request.formula, request.lower_limit, request.upper_limit
    ));

    for term in &result.terms {
        if show_substitution {
            lines.push(format!("• a_{} = {} = {:.4}", term.index, term.substituted, term.value));
        } else {
            lines.push(format!("• a_{} = {:.4}", term.index, term.value));
        }
    }

    lines.push(String::new());
    lines.push(format!("Sum = {:.4}", result.sum));
    lines.push(format!("Product = {}", format_scientific(result.product)));
    lines.join("\n")
}

/// Formats a number as `d.dddde±XX`.
///
/// ```
/// use seqcalc::application::format_scientific;
///
/// assert_eq!(format_scientific(576.0), "5.7600e+02");
/// assert_eq!(format_scientific(1.0 / 6.0), "1.6667e-01");
/// ```
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{value:.4e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(formula: &str, lower: &str, upper: &str) -> SequenceRequest {
        SequenceRequest::new(formula, lower, upper)
    }

    #[test]
    fn test_rendered_block() {
        let response = Calculator::default().calculate(&request("k^2", "2", "4"));

        assert_eq!(
            response.result,
            "Sequence for a_k = k^2, k from 2 to 4:\n\
             • a_2 = 2^2 = 4.0000\n\
             • a_3 = 3^2 = 9.0000\n\
             • a_4 = 4^2 = 16.0000\n\
             \n\
             Sum = 29.0000\n\
             Product = 5.7600e+02"
        );
        assert_eq!(response.error, None);
        assert_eq!(response.sum, Some(29.0));
        assert_eq!(response.product, Some(576.0));
    }

    #[test]
    fn test_rendered_block_without_substitution() {
        let calculator = Calculator::new(CalculatorConfig {
            show_substitution: false,
            ..CalculatorConfig::default()
        });
        let response = calculator.calculate(&request("1/k", "1", "2"));

        assert!(response.result.contains("• a_1 = 1.0000\n• a_2 = 0.5000"));
        assert!(response.terms.iter().all(|t| t.expression.is_none()));
    }

    #[test]
    fn test_error_response_shape() {
        let response = Calculator::default().calculate(&request("1/(k-3)", "1", "5"));

        assert!(response.is_error());
        assert_eq!(response.result, "Error");
        assert!(response.terms.is_empty());
        assert_eq!(response.sum, None);
        assert_eq!(response.product, None);
        let message = response.error.as_deref().unwrap();
        assert!(message.starts_with("Error: "));
        assert!(message.contains("k=3"));
        assert_eq!(response.display_text(), message);
    }

    #[test]
    fn test_json_field_names() {
        let response = Calculator::default().calculate(&request("k", "1", "2"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["result"].as_str().map(|s| s.starts_with("Sequence for")), Some(true));
        assert!(json["error"].is_null());
        assert_eq!(json["terms"][1]["k"], 2);
        assert_eq!(json["terms"][1]["value"], 2.0);
        assert_eq!(json["terms"][1]["expression"], "2");
        assert_eq!(json["sum"], 3.0);
        assert_eq!(json["product"], 2.0);

        let failed = Calculator::default().calculate(&request("", "1", "2"));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["result"], "Error");
        assert_eq!(json["error"], "Error: the formula cannot be empty");
        assert_eq!(json["terms"], serde_json::json!([]));
        assert!(json["sum"].is_null());
        assert!(json["product"].is_null());
    }

    #[test]
    fn test_request_fields_default_to_empty() {
        let request: SequenceRequest = serde_json::from_str(r#"{"formula": "k"}"#).unwrap();
        assert_eq!(request, SequenceRequest::new("k", "", ""));

        let response = Calculator::default().calculate(&request);
        assert!(response.error.unwrap().contains("must be valid integers"));
    }

    #[test]
    fn test_term_cap_is_caller_policy() {
        let calculator = Calculator::new(CalculatorConfig {
            max_terms: Some(10),
            ..CalculatorConfig::default()
        });

        let response = calculator.calculate(&request("k", "1", "11"));
        assert!(response.error.unwrap().contains("11 terms, more than the limit of 10"));

        let response = calculator.calculate(&request("k", "1", "10"));
        assert_eq!(response.terms.len(), 10);

        // Invalid limits are still classified by the engine.
        let response = calculator.calculate(&request("k", "5", "1"));
        assert!(response.error.unwrap().contains("lower limit (5)"));

        // So are formula errors over a range longer than the cap.
        let response = calculator.calculate(&request("", "1", "11"));
        assert_eq!(response.error.as_deref(), Some("Error: the formula cannot be empty"));

        let uncapped = Calculator::new(CalculatorConfig {
            max_terms: None,
            ..CalculatorConfig::default()
        });
        assert_eq!(uncapped.calculate(&request("k", "1", "11")).terms.len(), 11);
    }

    #[test]
    fn test_formula_errors_win_over_default_cap() {
        let calculator = Calculator::default();

        let response = calculator.calculate(&request("", "1", "200000"));
        assert_eq!(response.error.as_deref(), Some("Error: the formula cannot be empty"));

        let response = calculator.calculate(&request("(((", "1", "200000"));
        assert!(response.error.unwrap().contains("syntax error"));

        let response = calculator.calculate(&request("k", "1", "200000"));
        assert!(response.error.unwrap().contains("more than the limit of 100000"));
    }

    #[test]
    fn test_overflowing_product_is_still_a_success() {
        let response = Calculator::default().calculate(&request("1e200", "1", "2"));

        assert!(!response.is_error());
        assert_eq!(response.product, Some(f64::INFINITY));
        assert!(response.result.ends_with("Product = inf"));

        // JSON has no infinity; `error` is what tells this apart from a failure.
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["product"].is_null());
        assert!(json["error"].is_null());
        assert_eq!(json["terms"][1]["value"], 1e200);
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_scientific(576.0), "5.7600e+02");
        assert_eq!(format_scientific(3.0), "3.0000e+00");
        assert_eq!(format_scientific(0.0), "0.0000e+00");
        assert_eq!(format_scientific(-0.000123456), "-1.2346e-04");
        assert_eq!(format_scientific(1e120), "1.0000e+120");
        assert_eq!(format_scientific(f64::INFINITY), "inf");
        assert_eq!(format_scientific(f64::NAN), "nan");
    }
}
