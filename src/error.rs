// Failure taxonomy for both verifiers.
//
// There is only one kind of failure — "verification failed" — but the exit
// status distinguishes what went wrong, and downstream scripts key off those
// statuses, so every variant carries the status it must exit with. A single
// inconsistency invalidates the whole proof; nothing here is recoverable.

use thiserror::Error;

/// Terminal verification failure.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A file could not be opened, or input ended prematurely.
    #[error("{message}")]
    Io { message: String, status: i32 },

    /// An input file did not scan (configuration, rule or presentation).
    #[error("{message}")]
    Format { message: String, status: i32 },

    /// A structural invariant of the input data does not hold
    /// (Euler sum, ring adjacency, contract sparsity, triad, radius).
    #[error("{message}")]
    Structural { message: String, status: i32 },

    /// The independent cross-checks of the subconfiguration matcher disagree.
    #[error("{message}")]
    Matcher { message: String, status: i32 },

    /// A mathematical claim of the proof failed to verify.
    #[error("{message}")]
    Claim { message: String, status: i32 },

    /// A hard-coded capacity was exceeded.
    #[error("{message}")]
    Resource { message: String, status: i32 },
}

impl VerifyError {
    pub fn io(message: impl Into<String>, status: i32) -> Self {
        VerifyError::Io { message: message.into(), status }
    }

    pub fn format(message: impl Into<String>, status: i32) -> Self {
        VerifyError::Format { message: message.into(), status }
    }

    pub fn structural(message: impl Into<String>, status: i32) -> Self {
        VerifyError::Structural { message: message.into(), status }
    }

    pub fn matcher(message: impl Into<String>, status: i32) -> Self {
        VerifyError::Matcher { message: message.into(), status }
    }

    pub fn claim(message: impl Into<String>, status: i32) -> Self {
        VerifyError::Claim { message: message.into(), status }
    }

    pub fn resource(message: impl Into<String>, status: i32) -> Self {
        VerifyError::Resource { message: message.into(), status }
    }

    /// Exit status the process must terminate with.
    pub fn status(&self) -> i32 {
        match self {
            VerifyError::Io { status, .. }
            | VerifyError::Format { status, .. }
            | VerifyError::Structural { status, .. }
            | VerifyError::Matcher { status, .. }
            | VerifyError::Claim { status, .. }
            | VerifyError::Resource { status, .. } => *status,
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;

/// Failure of a presentation line: the exit status is the line number itself.
pub fn line_error(message: impl std::fmt::Display, lineno: i32) -> VerifyError {
    VerifyError::Claim {
        message: format!("{message} on line {lineno}"),
        status: lineno,
    }
}
