//! Domain validation errors.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Symbols are written `BASE/QUOTE`.
    #[error("malformed symbol '{symbol}', expected BASE/QUOTE")]
    MalformedSymbol { symbol: String },

    /// No product specification is known for the pair.
    #[error("unknown product '{pair}'")]
    UnknownProduct { pair: String },

    /// Order sizes must be positive.
    #[error("size must be positive, got {size}")]
    NonPositiveSize { size: rust_decimal::Decimal },
}
