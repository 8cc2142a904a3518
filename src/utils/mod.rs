//! Validation helpers, exact decimal parsing and the in-memory bill repository

pub mod decimal;
pub mod memory_storage;
pub mod validation;

pub use memory_storage::*;
pub use validation::*;
