//! # OWM Core
//!
//! Core errors, constants, and traits shared by the owm crates.
//!
//! - **Errors**: one error enum for configuration, API, and network failures
//! - **Constants**: API endpoints, query parameter names, cache defaults
//! - **Traits**: the response cache contract and the clock it reads time from
//! - **Redaction**: masking the API key in cache keys before they are logged
//!
//! ## Example
//!
//! ```rust
//! use owm_core::{OwmError, Result};
//!
//! fn check(max_size: usize) -> Result<()> {
//!     if max_size == 0 {
//!         return Err(OwmError::ConfigError("max_size must be positive".into()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(0).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod redact;
pub mod traits;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{OwmError, Result};
pub use redact::redact_key;
pub use traits::*;
