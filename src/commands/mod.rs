//! Operations invoked by the user-facing layer.
//!
//! Each command logs what it does and reports failures as display strings.

pub mod analysis;
pub mod backend;
pub mod evaluation;
pub mod results;
