//! Unit tables and conversion
//!
//! # Modules
//!
//! - [`types`]: Category ids, unit definitions and categories
//! - [`registry`]: The unit registry built at startup, with the built-in tables
//! - [`converter`]: Conversion formula, rounding and input/output formatting
//! - [`error`]: Errors for unknown categories or units

pub mod converter;
pub mod error;
pub mod registry;
pub mod types;

pub use converter::{convert_rates, format_value, parse_input, round_to_precision};
pub use error::ConversionError;
pub use registry::UnitRegistry;
pub use types::{CategoryId, UnitCategory, UnitDefinition};
