use thiserror::Error;

/// Why a single term could not be reduced to a real number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{function}({argument}) is undefined")]
    Domain { function: &'static str, argument: f64 },

    #[error("{operation} has no real value")]
    Complex { operation: String },

    #[error("result is too large to represent")]
    Overflow,

    #[error("result is undefined")]
    Undefined,
}

/// A malformed formula, with the character offset the parser stopped at.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Every way a sequence request can fail.
///
/// Variants are listed in the order the aggregator checks for them; the
/// first failing check determines which one a caller sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("the limits ({lower}, {upper}) must be valid integers")]
    RangeFormat { lower: String, upper: String },

    #[error(
        "the limits must be positive integers (m and n must be greater than or equal to 1), got ({lower}, {upper})"
    )]
    RangeBounds { lower: i64, upper: i64 },

    #[error("the lower limit ({lower}) must be less than or equal to the upper limit ({upper})")]
    RangeOrder { lower: i64, upper: i64 },

    #[error("the formula cannot be empty")]
    EmptyFormula,

    #[error(
        "the formula '{formula}' has a syntax error ({detail}). Make sure to use valid operators and that the expression is correct (for example, '1/k', 'k^2', '2*k + 1')"
    )]
    Syntax { formula: String, detail: ParseError },

    #[error("could not evaluate the term k={index} of '{formula}': {cause}")]
    Eval {
        index: i64,
        formula: String,
        cause: NumericError,
    },
}

impl EvaluationError {
    /// Name of the error class, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::RangeFormat { .. } => "RangeFormatError",
            EvaluationError::RangeBounds { .. } => "RangeBoundsError",
            EvaluationError::RangeOrder { .. } => "RangeOrderError",
            EvaluationError::EmptyFormula => "EmptyFormulaError",
            EvaluationError::Syntax { .. } => "SyntaxError",
            EvaluationError::Eval { .. } => "EvalError",
        }
    }
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;
pub type NumericResult<T> = Result<T, NumericError>;
