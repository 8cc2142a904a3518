//! # Billing Core
//!
//! The calculation core of a small-business billing application: GST
//! computation and financial-year scoped bill numbering.
//!
//! ## Features
//!
//! - **GST calculation**: CGST/SGST for intrastate and IGST for interstate supplies,
//!   forward from tax-exclusive prices or reverse from GST-inclusive prices
//! - **Rate resolution**: per-item rates, configured per-state rates with a default,
//!   or an amount-weighted bill rate
//! - **Bill numbering**: `GST/2025-26/0001` style numbers per bill type and financial year
//! - **Bill register**: validation, numbering and storage of issued bills
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use billing_core::{
//!     CalculationOptions, BillingMode, LineItem, PriceConvention, TaxCalculator,
//!     TaxJurisdictionPair,
//! };
//! use bigdecimal::BigDecimal;
//!
//! let items = vec![LineItem::new("Widget", 1, BigDecimal::from(236), BigDecimal::from(18))];
//! let pair = TaxJurisdictionPair::new("Karnataka", "Kerala");
//! let options = CalculationOptions::new(BillingMode::Gst, PriceConvention::Inclusive);
//!
//! let breakdown = TaxCalculator::default().calculate(&items, &pair, options).unwrap();
//! assert_eq!(breakdown.subtotal, BigDecimal::from(200));
//! assert_eq!(breakdown.igst, BigDecimal::from(36));
//! ```

pub mod billing;
pub mod config;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use billing::*;
pub use config::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
