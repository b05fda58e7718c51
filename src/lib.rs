//! seqcalc - Sequence Calculator Library
//!
//! Evaluates a formula `a_k` over an integer range `[m, n]`, producing the
//! terms of the sequence, their sum and their product, with a terminal
//! front end built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
