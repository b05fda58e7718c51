//! Expression parser for sequence formulas.
//!
//! This module implements a recursive descent parser for formulas over the
//! single free variable `k`. The parser builds an AST once; the AST is then
//! substituted and reduced for every index of a sequence without being
//! re-parsed.
//!
//! # Grammar
//!
//! ```bnf
//! Expression ::= Additive
//! Additive   ::= Term ( ( "+" | "-" ) Term )*
//! Term       ::= Unary ( ( "*" | "/" | "%" ) Unary )*
//! Unary      ::= ( "+" | "-" ) Unary | Power
//! Power      ::= Postfix ( ( "**" | "^" ) Unary )?
//! Postfix    ::= Primary "!"*
//! Primary    ::= Number | "k" | Constant | Call | "(" Expression ")"
//! Call       ::= Identifier "(" Expression ( "," Expression )* ")"
//! Number     ::= [0-9]* ( "." [0-9]* )? ( [eE] [+-]? [0-9]+ )?
//! ```
//!
//! Precedence follows the usual mathematical conventions:
//! - Power binds tighter than unary minus, so `-k**2` is `-(k**2)`
//! - Power is right-associative and its exponent may carry a sign (`2**-k`)
//! - Factorial notation (`k!`) binds tighter than everything but primaries
//! - Identifiers other than `k`, `pi`, `E` and the built-in function names
//!   are rejected at parse time

use super::errors::{NumericError, NumericResult, ParseError};
use super::functions::{self, Constant, Function};

/// Name of the only variable a formula may mention.
pub const FREE_VARIABLE: &str = "k";

/// Represents a token in the formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),

    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Power,
    PowerAlt, // ^ alternative to **
    Bang,

    LeftParen,
    RightParen,
    Comma,

    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(value) => write!(f, "number {value}"),
            Token::Identifier(name) => write!(f, "'{name}'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Multiply => write!(f, "'*'"),
            Token::Divide => write!(f, "'/'"),
            Token::Modulo => write!(f, "'%'"),
            Token::Power => write!(f, "'**'"),
            Token::PowerAlt => write!(f, "'^'"),
            Token::Bang => write!(f, "'!'"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Eof => write!(f, "end of formula"),
        }
    }
}

/// A token together with the character range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// Abstract syntax tree of a formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// The free variable `k`.
    Variable,
    Constant(Constant),

    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },

    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },

    Factorial(Box<Expr>),

    FunctionCall {
        function: Function,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl Expr {
    /// Returns a copy of the tree with every occurrence of `k` replaced by
    /// the literal `value`.
    pub fn substitute(&self, value: f64) -> Expr {
        match self {
            Expr::Variable => Expr::Number(value),
            Expr::Number(_) | Expr::Constant(_) => self.clone(),
            Expr::Binary { left, operator, right } => Expr::Binary {
                left: Box::new(left.substitute(value)),
                operator: *operator,
                right: Box::new(right.substitute(value)),
            },
            Expr::Unary { operator, operand } => Expr::Unary {
                operator: *operator,
                operand: Box::new(operand.substitute(value)),
            },
            Expr::Factorial(operand) => Expr::Factorial(Box::new(operand.substitute(value))),
            Expr::FunctionCall { function, args } => Expr::FunctionCall {
                function: *function,
                args: args.iter().map(|arg| arg.substitute(value)).collect(),
            },
        }
    }

    /// Reduces a closed tree (one without `k`) to a single real number.
    ///
    /// Every intermediate value must be finite and real; the first
    /// operation that is not fails the whole reduction.
    pub fn reduce(&self) -> NumericResult<f64> {
        match self {
            Expr::Number(value) => functions::check_finite(*value),
            Expr::Constant(constant) => Ok(constant.value()),
            Expr::Variable => Err(NumericError::Undefined),

            Expr::Binary { left, operator, right } => {
                let left_val = left.reduce()?;
                let right_val = right.reduce()?;

                match operator {
                    BinaryOp::Add => functions::check_finite(left_val + right_val),
                    BinaryOp::Subtract => functions::check_finite(left_val - right_val),
                    BinaryOp::Multiply => functions::check_finite(left_val * right_val),
                    BinaryOp::Divide => functions::divide(left_val, right_val),
                    BinaryOp::Modulo => functions::modulo(left_val, right_val),
                    BinaryOp::Power => functions::power(left_val, right_val),
                }
            }

            Expr::Unary { operator, operand } => {
                let operand_val = operand.reduce()?;

                match operator {
                    UnaryOp::Plus => Ok(operand_val),
                    UnaryOp::Minus => Ok(-operand_val),
                }
            }

            Expr::Factorial(operand) => functions::factorial(operand.reduce()?),

            Expr::FunctionCall { function, args } => {
                let arg_values = args.iter().map(Expr::reduce).collect::<NumericResult<Vec<_>>>()?;
                function.apply(&arg_values)
            }
        }
    }

    /// Whether `k` occurs anywhere in the tree.
    pub fn mentions_variable(&self) -> bool {
        match self {
            Expr::Variable => true,
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Binary { left, right, .. } => left.mentions_variable() || right.mentions_variable(),
            Expr::Unary { operand, .. } | Expr::Factorial(operand) => operand.mentions_variable(),
            Expr::FunctionCall { args, .. } => args.iter().any(Expr::mentions_variable),
        }
    }
}

/// A parsed formula, ready to be evaluated at any index.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    root: Expr,
}

impl ParsedExpression {
    /// Parses formula text in which `^` has already been normalized to `**`.
    ///
    /// # Examples
    ///
    /// ```
    /// use seqcalc::domain::ParsedExpression;
    ///
    /// let expr = ParsedExpression::parse("1/k").unwrap();
    /// assert_eq!(expr.evaluate_at(4).unwrap(), 0.25);
    ///
    /// assert!(ParsedExpression::parse("(k + 1").is_err());
    /// assert!(ParsedExpression::parse("x + 1").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut parser = Parser::new(text)?;
        let root = parser.parse()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Substitutes `k = index` and reduces the result.
    pub fn evaluate_at(&self, index: i64) -> NumericResult<f64> {
        self.root.substitute(index as f64).reduce()
    }
}

/// Replaces `^` with `**`.
pub fn normalize_caret(formula: &str) -> String {
    formula.replace('^', "**")
}

/// Writes `index` in place of every `k` token of `formula`.
///
/// Only whole `k` tokens are replaced; longer identifiers that contain the
/// letter are left alone, and everything between tokens is kept exactly as
/// typed.
///
/// ```
/// use seqcalc::domain::substitute_display;
///
/// assert_eq!(substitute_display("k^2 + 1/k", 3), "3^2 + 1/3");
/// ```
pub fn substitute_display(formula: &str, index: i64) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let replacement = index.to_string();
    let mut lexer = Lexer::new(formula);
    let mut output = String::with_capacity(formula.len());
    let mut copied = 0;

    loop {
        match lexer.next_token() {
            Ok(Spanned { token: Token::Identifier(name), start, end }) if name == FREE_VARIABLE => {
                output.extend(&chars[copied..start]);
                output.push_str(&replacement);
                copied = end;
            }
            Ok(Spanned { token: Token::Eof, .. }) | Err(_) => break,
            Ok(_) => {}
        }
    }

    output.extend(&chars[copied..]);
    output
}

/// Lexical analyzer for tokenizing formulas.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Reads an integer, decimal or exponent-notation literal.
    fn read_number(&mut self) -> Result<f64, ParseError> {
        let start = self.position;
        let mut number_str = String::new();

        while let Some(ch) = self.current_char.filter(char::is_ascii_digit) {
            number_str.push(ch);
            self.advance();
        }

        if self.current_char == Some('.') {
            number_str.push('.');
            self.advance();

            while let Some(ch) = self.current_char.filter(char::is_ascii_digit) {
                number_str.push(ch);
                self.advance();
            }
        }

        if number_str == "." {
            return Err(ParseError::new("a lone '.' is not a number", start));
        }

        // Only consume an exponent marker that is actually followed by digits.
        if matches!(self.current_char, Some('e' | 'E')) {
            let digits_at = match self.peek(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek(digits_at).is_some_and(|ch| ch.is_ascii_digit()) {
                for _ in 0..digits_at {
                    number_str.push(self.current_char.unwrap_or('e'));
                    self.advance();
                }
                while let Some(ch) = self.current_char.filter(char::is_ascii_digit) {
                    number_str.push(ch);
                    self.advance();
                }
            }
        }

        let value = number_str
            .parse::<f64>()
            .map_err(|_| ParseError::new(format!("invalid number '{number_str}'"), start))?;
        if !value.is_finite() {
            return Err(ParseError::new(format!("number '{number_str}' is out of range"), start));
        }
        Ok(value)
    }

    fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        identifier
    }

    /// Gets the next token from the input.
    pub fn next_token(&mut self) -> Result<Spanned, ParseError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char {
            None => Token::Eof,

            Some(ch) => match ch {
                '0'..='9' | '.' => Token::Number(self.read_number()?),

                'A'..='Z' | 'a'..='z' | '_' => Token::Identifier(self.read_identifier()),

                '+' => {
                    self.advance();
                    Token::Plus
                }

                '-' => {
                    self.advance();
                    Token::Minus
                }

                '*' => {
                    self.advance();
                    if self.current_char == Some('*') {
                        self.advance();
                        Token::Power
                    } else {
                        Token::Multiply
                    }
                }

                '/' => {
                    self.advance();
                    Token::Divide
                }

                '%' => {
                    self.advance();
                    Token::Modulo
                }

                '^' => {
                    self.advance();
                    Token::PowerAlt
                }

                '!' => {
                    self.advance();
                    Token::Bang
                }

                '(' => {
                    self.advance();
                    Token::LeftParen
                }

                ')' => {
                    self.advance();
                    Token::RightParen
                }

                ',' => {
                    self.advance();
                    Token::Comma
                }

                _ => return Err(ParseError::new(format!("unexpected character '{ch}'"), start)),
            },
        };

        Ok(Spanned {
            token,
            start,
            end: self.position,
        })
    }
}

/// Recursive descent parser for formulas.
pub struct Parser {
    lexer: Lexer,
    current: Spanned,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;

        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current.start)
    }

    fn unexpected(&self) -> ParseError {
        match self.current.token {
            Token::Eof => self.error_here("unexpected end of formula"),
            Token::RightParen => self.error_here("unbalanced parenthesis ')'"),
            ref token => self.error_here(format!("unexpected {token}")),
        }
    }

    /// Parses the whole input as one expression.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.current.token == Token::Eof {
            return Err(self.error_here("empty formula"));
        }

        let expr = self.parse_additive()?;

        if self.current.token != Token::Eof {
            return Err(self.unexpected());
        }

        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;

        while matches!(self.current.token, Token::Plus | Token::Minus) {
            let op = match self.current.token {
                Token::Plus => BinaryOp::Add,
                _ => BinaryOp::Subtract,
            };
            self.advance()?;
            let right = self.parse_term()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator: op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while matches!(self.current.token, Token::Multiply | Token::Divide | Token::Modulo) {
            let op = match self.current.token {
                Token::Multiply => BinaryOp::Multiply,
                Token::Divide => BinaryOp::Divide,
                _ => BinaryOp::Modulo,
            };
            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator: op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let operator = match self.current.token {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_power(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    /// Parses power expressions (right-associative).
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_postfix()?;

        if matches!(self.current.token, Token::Power | Token::PowerAlt) {
            self.advance()?;
            let right = self.parse_unary()?;
            Ok(Expr::Binary {
                left: Box::new(left),
                operator: BinaryOp::Power,
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        while self.current.token == Token::Bang {
            self.advance()?;
            expr = Expr::Factorial(Box::new(expr));
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.current.token {
            Token::Number(value) => {
                let value = *value;
                self.advance()?;
                Ok(Expr::Number(value))
            }

            Token::Identifier(name) => {
                let name = name.clone();
                let start = self.current.start;
                self.advance()?;

                if self.current.token == Token::LeftParen {
                    return self.parse_call(&name, start);
                }

                if name == FREE_VARIABLE {
                    Ok(Expr::Variable)
                } else if let Some(constant) = Constant::from_name(&name) {
                    Ok(Expr::Constant(constant))
                } else if Function::from_name(&name).is_some() {
                    Err(ParseError::new(format!("function '{name}' needs arguments in parentheses"), start))
                } else {
                    Err(ParseError::new(
                        format!("unknown identifier '{name}' (the only variable is '{FREE_VARIABLE}')"),
                        start,
                    ))
                }
            }

            Token::LeftParen => {
                self.advance()?;
                if self.current.token == Token::RightParen {
                    return Err(self.error_here("empty parentheses"));
                }
                let expr = self.parse_additive()?;
                if self.current.token != Token::RightParen {
                    return Err(self.error_here(format!(
                        "unbalanced parenthesis: expected ')', found {}",
                        self.current.token
                    )));
                }
                self.advance()?;
                Ok(expr)
            }

            _ => Err(self.unexpected()),
        }
    }

    /// Parses `name(arg, ...)` with the current token on the `(`.
    fn parse_call(&mut self, name: &str, start: usize) -> Result<Expr, ParseError> {
        let function = Function::from_name(name)
            .ok_or_else(|| ParseError::new(format!("unknown function '{name}'"), start))?;
        self.advance()?;

        let mut args = Vec::new();
        if self.current.token != Token::RightParen {
            args.push(self.parse_additive()?);
            while self.current.token == Token::Comma {
                self.advance()?;
                args.push(self.parse_additive()?);
            }
        }

        if self.current.token != Token::RightParen {
            return Err(self.error_here(format!(
                "unbalanced parenthesis in call to '{name}': expected ')', found {}",
                self.current.token
            )));
        }
        self.advance()?;

        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(ParseError::new(
                format!("'{name}' takes {}, got {}", arity.describe(), args.len()),
                start,
            ));
        }

        Ok(Expr::FunctionCall { function, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Expr {
        ParsedExpression::parse(text).unwrap().root().clone()
    }

    fn tokens(text: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(text);
        let mut out = Vec::new();
        loop {
            let spanned = lexer.next_token().unwrap();
            if spanned.token == Token::Eof {
                return out;
            }
            out.push(spanned.token);
        }
    }

    #[test]
    fn test_lexer_numbers() {
        assert_eq!(
            tokens("42 3.14 .5 2. 1e3 2.5E-2"),
            vec![
                Token::Number(42.0),
                Token::Number(3.14),
                Token::Number(0.5),
                Token::Number(2.0),
                Token::Number(1000.0),
                Token::Number(0.025),
            ]
        );
    }

    #[test]
    fn test_lexer_exponent_marker_needs_digits() {
        assert_eq!(
            tokens("2E"),
            vec![Token::Number(2.0), Token::Identifier("E".to_string())]
        );
    }

    #[test]
    fn test_lexer_operators() {
        assert_eq!(
            tokens("+ - * / % ** ^ ! ( ) ,"),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Multiply,
                Token::Divide,
                Token::Modulo,
                Token::Power,
                Token::PowerAlt,
                Token::Bang,
                Token::LeftParen,
                Token::RightParen,
                Token::Comma,
            ]
        );
    }

    #[test]
    fn test_lexer_spans() {
        let mut lexer = Lexer::new("  sqrt(k)");
        let first = lexer.next_token().unwrap();
        assert_eq!((first.start, first.end), (2, 6));
        lexer.next_token().unwrap();
        let k = lexer.next_token().unwrap();
        assert_eq!(k.token, Token::Identifier("k".to_string()));
        assert_eq!((k.start, k.end), (7, 8));
    }

    #[test]
    fn test_lexer_rejects_unknown_characters() {
        assert!(Lexer::new("$").next_token().is_err());
        let err = ParsedExpression::parse("k # 2").unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_parser_operator_precedence() {
        // 1 + 2 * k is 1 + (2 * k)
        match parse("1 + 2 * k") {
            Expr::Binary { left, operator: BinaryOp::Add, right } => {
                assert_eq!(*left, Expr::Number(1.0));
                assert_eq!(
                    *right,
                    Expr::Binary {
                        left: Box::new(Expr::Number(2.0)),
                        operator: BinaryOp::Multiply,
                        right: Box::new(Expr::Variable),
                    }
                );
            }
            other => panic!("Expected addition at top level, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_power_right_associative() {
        match parse("2 ** 3 ** 2") {
            Expr::Binary { left, operator: BinaryOp::Power, right } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(*right, Expr::Binary { operator: BinaryOp::Power, .. }));
            }
            other => panic!("Expected power at top level, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_minus_binds_looser_than_power() {
        let expr = ParsedExpression::parse("-k**2").unwrap();
        assert_eq!(expr.evaluate_at(3).unwrap(), -9.0);

        let expr = ParsedExpression::parse("2**-k").unwrap();
        assert_eq!(expr.evaluate_at(2).unwrap(), 0.25);
    }

    #[test]
    fn test_parser_factorial_notation() {
        assert_eq!(parse("k!"), Expr::Factorial(Box::new(Expr::Variable)));
        let expr = ParsedExpression::parse("1/k!").unwrap();
        assert_eq!(expr.evaluate_at(3).unwrap(), 1.0 / 6.0);
    }

    #[test]
    fn test_parser_functions_and_constants() {
        assert_eq!(
            parse("log(k, 2)"),
            Expr::FunctionCall {
                function: Function::Log,
                args: vec![Expr::Variable, Expr::Number(2.0)],
            }
        );
        assert_eq!(parse("pi"), Expr::Constant(Constant::Pi));
        assert!(!parse("sin(pi)").mentions_variable());
        assert!(parse("sin(pi*k)").mentions_variable());
    }

    #[test]
    fn test_parser_error_handling() {
        for text in ["", "   ", "(k + 1", "k + 1)", "k +", "()", "2k", "k ** ", "* k", "sin()", "log(1, 2, 3)"] {
            assert!(ParsedExpression::parse(text).is_err(), "expected '{text}' to be rejected");
        }
    }

    #[test]
    fn test_parser_rejects_unknown_identifiers() {
        let err = ParsedExpression::parse("x + 1").unwrap_err();
        assert!(err.message.contains("unknown identifier 'x'"));

        let err = ParsedExpression::parse("foo(k)").unwrap_err();
        assert!(err.message.contains("unknown function 'foo'"));

        let err = ParsedExpression::parse("sqrt + 1").unwrap_err();
        assert!(err.message.contains("needs arguments"));

        // The variable name is case-sensitive.
        assert!(ParsedExpression::parse("K").is_err());
    }

    #[test]
    fn test_parser_accepts_undefined_forms() {
        assert!(ParsedExpression::parse("1/k").is_ok());
        assert!(ParsedExpression::parse("1/(k-3)").is_ok());
        assert!(ParsedExpression::parse("log(k-1)").is_ok());
    }

    #[test]
    fn test_substitute_replaces_only_the_variable() {
        let expr = ParsedExpression::parse("k + sin(k)").unwrap();
        let substituted = expr.root().substitute(2.0);
        assert!(!substituted.mentions_variable());
        assert_eq!(substituted.reduce().unwrap(), 2.0 + 2.0_f64.sin());
        // The original tree is untouched.
        assert!(expr.root().mentions_variable());
    }

    #[test]
    fn test_reduce_rejects_free_variable() {
        assert_eq!(Expr::Variable.reduce(), Err(NumericError::Undefined));
    }

    #[test]
    fn test_reduce_classifies_failures() {
        let expr = ParsedExpression::parse("1/(k-3)").unwrap();
        assert_eq!(expr.evaluate_at(3), Err(NumericError::DivisionByZero));

        let expr = ParsedExpression::parse("(k-3)/(k-3)").unwrap();
        assert_eq!(expr.evaluate_at(3), Err(NumericError::DivisionByZero));

        let expr = ParsedExpression::parse("(-k)**0.5").unwrap();
        assert!(matches!(expr.evaluate_at(2), Err(NumericError::Complex { .. })));

        let expr = ParsedExpression::parse("10**(k*100)").unwrap();
        assert_eq!(expr.evaluate_at(4), Err(NumericError::Overflow));
    }

    #[test]
    fn test_normalize_caret() {
        assert_eq!(normalize_caret("k^2 + 2^k"), "k**2 + 2**k");
    }

    #[test]
    fn test_substitute_display() {
        assert_eq!(substitute_display("1/k", 2), "1/2");
        assert_eq!(substitute_display("k^2", 4), "4^2");
        assert_eq!(substitute_display("sqrt(k) + k!", 10), "sqrt(10) + 10!");
        assert_eq!(substitute_display("  2*k + 1 ", 1), "  2*1 + 1 ");
        assert_eq!(substitute_display("kk + k", 5), "kk + 5");
    }
}
