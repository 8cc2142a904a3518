//! Billing module containing bill records, numbering and the bill register

pub mod bill;
pub mod number;
pub mod register;

pub use bill::*;
pub use number::*;
pub use register::*;
