pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

pub use error::CreditSimError;
pub use types::*;

/// Standard result type for all credit-sim operations
pub type CreditSimResult<T> = Result<T, CreditSimError>;
