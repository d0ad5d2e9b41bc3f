//! # Error Types

/// Errors from nmtkit operations.
#[derive(Debug, thiserror::Error)]
pub enum NmtError {
    /// A configuration value or call precondition was rejected.
    ///
    /// Examples: an invalid vocabulary size, a zero beam width,
    /// or parallel corpora with mismatched line counts.
    #[error("configuration error: {0}")]
    Config(String),

    /// An algorithmic impossibility; this signals a logic bug, not bad input.
    ///
    /// Examples: an inference graph without a unique BOS root,
    /// a cycle on the one-best path, or a k-best request larger than its input.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Parse error (integers, ID streams, etc.)
    #[error("parse error: {0}")]
    Parse(String),

    /// Vocabulary (de)serialization error.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Error from an external component, such as a scoring oracle.
    #[error("{0}")]
    External(String),
}

impl NmtError {
    /// Build a [`NmtError::Config`] error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`NmtError::InvariantViolation`] error.
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Is this an invariant violation (a logic bug) rather than an input error?
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

/// Result type for nmtkit operations.
pub type NmtResult<T> = core::result::Result<T, NmtError>;
