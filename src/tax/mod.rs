//! Tax module containing GST rates, jurisdiction resolution and bill-level calculation

pub mod breakdown;
pub mod calculator;
pub mod gst;
pub mod jurisdiction;
pub mod rounding;

pub use breakdown::*;
pub use calculator::*;
pub use gst::*;
pub use jurisdiction::*;
pub use rounding::*;
