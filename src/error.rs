use std::error::Error;
use std::fmt;

use simple_error::SimpleError;

/// Errors that abort a run.
///
/// A mismatch between simulated and reference counts is not an error; it is
/// reported as `false` by the comparator.
#[derive(Debug, PartialEq)]
pub enum RunError {
    /// Rejected settings, detected before any work is done.
    Config(SimpleError),
    /// A construction or algorithm bug: missing or invalid neuron parameters,
    /// malformed synapses, duplicate edges, length mismatches.
    Structural(SimpleError),
}

impl RunError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        RunError::Config(SimpleError::new(msg.into()))
    }

    pub fn structural<S: Into<String>>(msg: S) -> Self {
        RunError::Structural(SimpleError::new(msg.into()))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, RunError::Config(_))
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, RunError::Structural(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunError::Config(e) | RunError::Structural(e) => e.as_str(),
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunError::Config(e) => write!(f, "invalid configuration: {}", e),
            RunError::Structural(e) => write!(f, "structural error: {}", e),
        }
    }
}

impl Error for RunError {}
