//! Error handling foundation for the console.
//!
//! Each crate defines its own domain error enums next to the code that
//! raises them. This module only provides the `Result` alias used where a
//! `rootcause::Report` carries those errors up through the store and the
//! server functions.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
