// error.rs - engine-wide error type

use std::fmt;

/// Failure modes the engine can surface to a caller.
///
/// `Timeout` is deliberately absent: a timed-out subprocess call is not an
/// error from the engine's point of view, it is a discarded candidate.
#[derive(Debug, Clone)]
pub enum EngineError {
    /// The formatter or diff tool could not be launched at all.
    Launch(String),
    /// A subprocess produced output the adapter could not make sense of.
    InvalidOutput(String),
    /// A formatter exited non-zero without a recognizable "unknown option" message.
    FormatterCrash(String),
    /// Round 0 produced no valid candidate for any input file.
    NoValidCandidates(String),
    /// The cache backend failed on a write; the candidate still proceeds.
    CacheWrite(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Launch(msg) => write!(f, "launch failure: {}", msg),
            EngineError::InvalidOutput(msg) => write!(f, "invalid formatter output: {}", msg),
            EngineError::FormatterCrash(msg) => write!(f, "formatter crash: {}", msg),
            EngineError::NoValidCandidates(msg) => write!(f, "no valid candidates: {}", msg),
            EngineError::CacheWrite(msg) => write!(f, "cache write failed: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// Only these two kinds should reach the CLI's `exit(1)`; the rest are
    /// recorded and the search continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Launch(_) | EngineError::NoValidCandidates(_))
    }
}

impl From<EngineError> for String {
    fn from(e: EngineError) -> Self {
        e.to_string()
    }
}
