use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Failures raised by the clustering engine.
///
/// Callers embedding the library can match on the variant; the command-line
/// tools collapse all of them into a single message.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Bad `k`, mismatched shapes, malformed input rows.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Input whose structure makes a step undefined, e.g. an isolated point
    /// with zero degree.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Non-finite values produced during an iterative update.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl ClusterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateInput(msg.into())
    }
}
