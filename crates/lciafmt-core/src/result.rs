//! Result type alias for LCIA formatting operations

use crate::error::LciaError;

/// Standard Result type for LCIA formatting operations
pub type Result<T> = std::result::Result<T, LciaError>;
