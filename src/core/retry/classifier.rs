//! Error classification
//!
//! Maps a raised error (type name + message) onto an [`ErrorCategory`]. Type names are
//! matched first against a fixed table; if that fails the message is searched for known
//! phrases. Anything else is `Unknown`.

use super::types::{ErrorCategory, RetryContext};

/// Error type names, normalized to lowercase without `_`/`-`/spaces
const TYPE_TABLE: &[(&str, ErrorCategory)] = &[
    ("timeout", ErrorCategory::Timeout),
    ("timeouterror", ErrorCategory::Timeout),
    ("timedout", ErrorCategory::Timeout),
    ("elapsed", ErrorCategory::Timeout),
    ("deadlineexceeded", ErrorCategory::Timeout),
    ("connectionerror", ErrorCategory::NetworkError),
    ("connectionrefused", ErrorCategory::NetworkError),
    ("connectionrefusederror", ErrorCategory::NetworkError),
    ("connectionreset", ErrorCategory::NetworkError),
    ("connectionreseterror", ErrorCategory::NetworkError),
    ("connectionaborted", ErrorCategory::NetworkError),
    ("connectionabortederror", ErrorCategory::NetworkError),
    ("notconnected", ErrorCategory::NetworkError),
    ("brokenpipe", ErrorCategory::NetworkError),
    ("hostunreachable", ErrorCategory::NetworkError),
    ("networkunreachable", ErrorCategory::NetworkError),
    ("valueerror", ErrorCategory::InvalidRequest),
    ("invalidinput", ErrorCategory::InvalidRequest),
    ("invaliddata", ErrorCategory::InvalidRequest),
    ("runtimeerror", ErrorCategory::InternalError),
    ("internalerror", ErrorCategory::InternalError),
];

/// Message phrases, checked in order against the lowercased message
const MESSAGE_TABLE: &[(&str, ErrorCategory)] = &[
    ("rate limit", ErrorCategory::RateLimit),
    ("too many requests", ErrorCategory::RateLimit),
    ("resource exhausted", ErrorCategory::ResourceExhausted),
    ("out of memory", ErrorCategory::ResourceExhausted),
    ("connection refused", ErrorCategory::NetworkError),
    ("invalid", ErrorCategory::InvalidRequest),
];

/// Stateless error classifier
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error by type name, then by message
    pub fn classify(error_type: &str, message: &str) -> ErrorCategory {
        Self::classify_type(error_type)
            .or_else(|| Self::classify_message(message))
            .unwrap_or(ErrorCategory::Unknown)
    }

    /// Classify the error carried by a retry context
    pub fn classify_context(context: &RetryContext) -> ErrorCategory {
        Self::classify(&context.error_type, &context.error_message)
    }

    /// Classify an IO error by kind and message
    pub fn classify_io(error: &std::io::Error) -> ErrorCategory {
        Self::classify(&format!("{:?}", error.kind()), &error.to_string())
    }

    fn classify_type(error_type: &str) -> Option<ErrorCategory> {
        let normalized: String = error_type
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        TYPE_TABLE
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, category)| *category)
    }

    fn classify_message(message: &str) -> Option<ErrorCategory> {
        let message = message.to_lowercase();

        MESSAGE_TABLE
            .iter()
            .find(|(phrase, _)| message.contains(phrase))
            .map(|(_, category)| *category)
    }
}
