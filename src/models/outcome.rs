use std::fmt;

/// Result of a mutating logic operation that did not hit a store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The key being created or renamed to already exists.
    Duplicate,
    /// The key being operated on does not resolve.
    NotFound,
    /// Input or state check failed; nothing was written.
    Invalid(String),
    /// The caller may not perform this operation; nothing was written.
    Denied(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Outcome::Invalid(reason.into())
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Outcome::Denied(reason.into())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Duplicate => write!(f, "duplicate"),
            Outcome::NotFound => write!(f, "not found"),
            Outcome::Invalid(reason) => write!(f, "invalid: {reason}"),
            Outcome::Denied(reason) => write!(f, "denied: {reason}"),
        }
    }
}
