//! Infrastructure layer: files on disk.
//!
//! Request and response JSON files and CSV export of computed terms.

pub mod persistence;

pub use persistence::*;
