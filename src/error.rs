//! Error types for the cachetrace library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when an engine cannot be constructed from the
//!   requested parameters (currently only a zero capacity).
//! - [`InvariantError`]: Returned by the `check_invariants` methods when an
//!   engine's internal structure is inconsistent.
//!
//! Script parsing has its own error, [`ParseError`](crate::sim::ParseError),
//! since it carries a line number.
//!
//! ## Example Usage
//!
//! ```
//! use cachetrace::error::ConfigError;
//! use cachetrace::policy::lru::LruEngine;
//!
//! let engine: Result<LruEngine<u32, &str>, ConfigError> = LruEngine::new(2);
//! assert!(engine.is_ok());
//!
//! let bad = LruEngine::<u32, &str>::new(0);
//! assert_eq!(bad.unwrap_err(), ConfigError::InvalidCapacity { capacity: 0 });
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when engine construction parameters are invalid.
///
/// Fatal to engine creation: there is no partially built engine to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested capacity cannot hold a single entry.
    InvalidCapacity { capacity: usize },
}

impl ConfigError {
    /// Validates a capacity, returning it unchanged when usable.
    #[inline]
    pub(crate) fn check_capacity(capacity: usize) -> Result<usize, Self> {
        if capacity == 0 {
            Err(ConfigError::InvalidCapacity { capacity })
        } else {
            Ok(capacity)
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCapacity { capacity } => {
                write!(f, "invalid capacity {capacity}: capacity must be > 0")
            },
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an engine's internal invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

/// Returns `Err(InvariantError)` with a formatted message when `cond` is false.
macro_rules! ensure_invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::InvariantError::new(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_invariant;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
