//! Domain layer: formula parsing and sequence evaluation.

pub mod errors;
pub mod functions;
pub mod models;
pub mod parser;
pub mod services;

pub use errors::*;
pub use functions::{Arity, Constant, Function};
pub use models::*;
pub use parser::{normalize_caret, substitute_display, Expr, ParsedExpression, FREE_VARIABLE};
pub use services::*;
