//! Elementary functions and constants usable inside a formula.
//!
//! Names are case-sensitive. Each function checks its own real domain and
//! reports a [`NumericError`] instead of producing NaN or infinity, so that
//! a term that has no real value is rejected rather than silently folded
//! into the sum and product.

use super::errors::{NumericError, NumericResult};

/// Named constants recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "E" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
            Arity::AtLeast(n) => count >= n,
        }
    }

    pub fn describe(self) -> String {
        match self {
            Arity::Exactly(1) => "exactly 1 argument".to_string(),
            Arity::Exactly(n) => format!("exactly {n} arguments"),
            Arity::Between(lo, hi) => format!("{lo} or {hi} arguments"),
            Arity::AtLeast(n) => format!("at least {n} argument(s)"),
        }
    }
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Log,
    Ln,
    Sqrt,
    Cbrt,
    Abs,
    Floor,
    Ceiling,
    Sign,
    Factorial,
    Binomial,
    Min,
    Max,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "cot" => Function::Cot,
            "sec" => Function::Sec,
            "csc" => Function::Csc,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "asinh" => Function::Asinh,
            "acosh" => Function::Acosh,
            "atanh" => Function::Atanh,
            "exp" => Function::Exp,
            "log" => Function::Log,
            "ln" => Function::Ln,
            "sqrt" => Function::Sqrt,
            "cbrt" => Function::Cbrt,
            "abs" | "Abs" => Function::Abs,
            "floor" => Function::Floor,
            "ceiling" => Function::Ceiling,
            "sign" => Function::Sign,
            "factorial" => Function::Factorial,
            "binomial" => Function::Binomial,
            "Min" => Function::Min,
            "Max" => Function::Max,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Cot => "cot",
            Function::Sec => "sec",
            Function::Csc => "csc",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Asinh => "asinh",
            Function::Acosh => "acosh",
            Function::Atanh => "atanh",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Cbrt => "cbrt",
            Function::Abs => "abs",
            Function::Floor => "floor",
            Function::Ceiling => "ceiling",
            Function::Sign => "sign",
            Function::Factorial => "factorial",
            Function::Binomial => "binomial",
            Function::Min => "Min",
            Function::Max => "Max",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Function::Log => Arity::Between(1, 2),
            Function::Binomial => Arity::Exactly(2),
            Function::Min | Function::Max => Arity::AtLeast(1),
            _ => Arity::Exactly(1),
        }
    }

    /// Applies the function to already-reduced arguments.
    ///
    /// The argument count has been checked by the parser.
    pub fn apply(self, args: &[f64]) -> NumericResult<f64> {
        let x = args.first().copied().unwrap_or(f64::NAN);
        let name = self.name();

        let value = match self {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => divide(x.sin(), x.cos())?,
            Function::Cot => divide(x.cos(), x.sin())?,
            Function::Sec => divide(1.0, x.cos())?,
            Function::Csc => divide(1.0, x.sin())?,
            Function::Asin | Function::Acos => {
                if !(-1.0..=1.0).contains(&x) {
                    return Err(complex(name, x));
                }
                if self == Function::Asin { x.asin() } else { x.acos() }
            }
            Function::Atan => x.atan(),
            Function::Sinh => x.sinh(),
            Function::Cosh => x.cosh(),
            Function::Tanh => x.tanh(),
            Function::Asinh => x.asinh(),
            Function::Acosh => {
                if x < 1.0 {
                    return Err(complex(name, x));
                }
                x.acosh()
            }
            Function::Atanh => {
                if x.abs() == 1.0 {
                    return Err(NumericError::Domain { function: name, argument: x });
                }
                if x.abs() > 1.0 {
                    return Err(complex(name, x));
                }
                x.atanh()
            }
            Function::Exp => x.exp(),
            Function::Ln => natural_log(name, x)?,
            Function::Log => match args.get(1) {
                None => natural_log(name, x)?,
                Some(&base) => {
                    let numerator = natural_log(name, x)?;
                    let denominator = natural_log(name, base)?;
                    divide(numerator, denominator)?
                }
            },
            Function::Sqrt => {
                if x < 0.0 {
                    return Err(complex(name, x));
                }
                x.sqrt()
            }
            Function::Cbrt => x.cbrt(),
            Function::Abs => x.abs(),
            Function::Floor => x.floor(),
            Function::Ceiling => x.ceil(),
            Function::Sign => {
                if x == 0.0 { 0.0 } else { x.signum() }
            }
            Function::Factorial => factorial(x)?,
            Function::Binomial => binomial(x, args.get(1).copied().unwrap_or(f64::NAN))?,
            Function::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };

        check_finite(value)
    }
}

/// Rejects infinities and NaN produced by an otherwise valid operation.
pub fn check_finite(value: f64) -> NumericResult<f64> {
    if value.is_nan() {
        Err(NumericError::Undefined)
    } else if value.is_infinite() {
        Err(NumericError::Overflow)
    } else {
        Ok(value)
    }
}

pub fn divide(numerator: f64, denominator: f64) -> NumericResult<f64> {
    if denominator == 0.0 {
        return Err(NumericError::DivisionByZero);
    }
    check_finite(numerator / denominator)
}

/// Floored modulo: the result takes the sign of the divisor.
pub fn modulo(dividend: f64, divisor: f64) -> NumericResult<f64> {
    if divisor == 0.0 {
        return Err(NumericError::DivisionByZero);
    }
    let mut remainder = dividend % divisor;
    if remainder != 0.0 && (remainder < 0.0) != (divisor < 0.0) {
        remainder += divisor;
    }
    check_finite(remainder)
}

/// Real power. Integral exponents go through `powi` so that small integer
/// powers are exact; larger ones keep the sign a negative base gets from
/// an odd exponent.
pub fn power(base: f64, exponent: f64) -> NumericResult<f64> {
    if base == 0.0 && exponent < 0.0 {
        return Err(NumericError::DivisionByZero);
    }
    let value = if exponent.fract() == 0.0 {
        if exponent.abs() <= i32::MAX as f64 {
            base.powi(exponent as i32)
        } else {
            let magnitude = base.abs().powf(exponent);
            if base < 0.0 && exponent % 2.0 != 0.0 { -magnitude } else { magnitude }
        }
    } else if base < 0.0 {
        return Err(NumericError::Complex {
            operation: format!("({base})**({exponent})"),
        });
    } else {
        base.powf(exponent)
    };
    check_finite(value)
}

pub fn factorial(x: f64) -> NumericResult<f64> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(NumericError::Domain { function: "factorial", argument: x });
    }
    let mut acc = 1.0_f64;
    let mut i = 2.0;
    while i <= x {
        acc *= i;
        if acc.is_infinite() {
            return Err(NumericError::Overflow);
        }
        i += 1.0;
    }
    Ok(acc)
}

fn binomial(n: f64, r: f64) -> NumericResult<f64> {
    if n.fract() != 0.0 || r.fract() != 0.0 {
        return Err(NumericError::Domain { function: "binomial", argument: if n.fract() != 0.0 { n } else { r } });
    }
    if r < 0.0 {
        return Ok(0.0);
    }
    // C(n, r) = (-1)^r C(r - n - 1, r) for negative n.
    let (n, sign) = if n < 0.0 {
        (r - n - 1.0, if r % 2.0 == 0.0 { 1.0 } else { -1.0 })
    } else {
        (n, 1.0)
    };
    if r > n {
        return Ok(0.0);
    }
    let r = r.min(n - r);
    // With r <= n / 2, C(n, r) >= 2^r.
    if r > f64::MAX_EXP as f64 {
        return Err(NumericError::Overflow);
    }
    let mut acc = 1.0_f64;
    let mut i = 0.0;
    while i < r {
        acc = acc * (n - i) / (i + 1.0);
        if acc.is_infinite() {
            return Err(NumericError::Overflow);
        }
        i += 1.0;
    }
    Ok(sign * acc.round())
}

fn natural_log(name: &'static str, x: f64) -> NumericResult<f64> {
    if x == 0.0 {
        Err(NumericError::Domain { function: name, argument: x })
    } else if x < 0.0 {
        Err(complex(name, x))
    } else {
        Ok(x.ln())
    }
}

fn complex(name: &str, x: f64) -> NumericError {
    NumericError::Complex {
        operation: format!("{name}({x})"),
    }
}
