//! Application layer managing state and business workflows.
//!
//! This module sits between the domain layer and the front ends: it turns
//! raw requests into responses and holds the interactive calculator state.

pub mod calculator;
pub mod state;

pub use calculator::*;
pub use state::*;
