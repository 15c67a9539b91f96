//! Error types for the map engine and its collaborators.

use thiserror::Error;

/// Errors raised while framing a viewport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    /// `fit_bounds` was called without any points to frame.
    #[error("Precondition violated: cannot fit a viewport to an empty set of bounds")]
    EmptyBounds,
}

/// Per-address failures reported by a geolocation provider.
///
/// A failure only affects the address it belongs to; the rest of the batch
/// continues and nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The provider did not answer within the configured timeout.
    #[error("Lookup timed out")]
    Timeout,

    /// The request could not be sent or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with something that is not a location record.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The provider answered but could not locate the address.
    #[error("Could not locate address: {message}")]
    Rejected {
        /// The provider's own explanation, or `Unknown error`.
        message: String,
    },
}

impl LookupError {
    /// Create a Rejected error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Errors raised while reading a list of addresses typed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter at least one IP address")]
    NoAddresses,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            LookupError::rejected("private range").to_string(),
            "Could not locate address: private range"
        );
        assert_eq!(LookupError::Timeout.to_string(), "Lookup timed out");
        assert!(FitError::EmptyBounds.to_string().contains("empty set of bounds"));
        assert_eq!(
            InputError::NoAddresses.to_string(),
            "Please enter at least one IP address"
        );
    }
}
