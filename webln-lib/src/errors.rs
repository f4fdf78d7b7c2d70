//! Error types for wallet controller operations.
//!
//! Every failure the controller can observe is classified into an
//! [`ErrorKind`]. The five wallet-facing kinds are what page code reacts to;
//! the remaining kinds cover the ambient plumbing (configuration, storage,
//! serialization, rendering).

use crate::provider::RejectionCategory;
use thiserror::Error;

/// Error codes for JS and FFI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(i32)]
pub enum ErrorKind {
    /// Provider discovery failed; terminal for the session.
    ProviderUnavailable = 1000,
    /// The provider does not implement the requested capability.
    UnsupportedOperation = 2000,
    /// A human declined the wallet's approval prompt.
    UserRejected = 3000,
    /// Request rejected locally before reaching the provider.
    InvalidInput = 4000,
    /// Any other provider-reported rejection.
    ProviderFailure = 5000,
    /// Invalid controller configuration.
    Configuration = 6000,
    /// Preference storage failed.
    Storage = 7000,
    /// Payload (de)serialization failed.
    Serialization = 8000,
    /// Payment request could not be rendered as a symbol.
    Render = 9000,
}

impl ErrorKind {
    /// Stable name used in status messages and JS bindings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "ProviderUnavailable",
            Self::UnsupportedOperation => "UnsupportedOperation",
            Self::UserRejected => "UserRejected",
            Self::InvalidInput => "InvalidInput",
            Self::ProviderFailure => "ProviderFailure",
            Self::Configuration => "Configuration",
            Self::Storage => "Storage",
            Self::Serialization => "Serialization",
            Self::Render => "Render",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for controller operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeblnError {
    /// No compatible wallet was discovered for this session.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider lacks the capability.
    #[error("operation not supported by provider: {0}")]
    UnsupportedOperation(String),

    /// The user declined the wallet prompt.
    #[error("{0}")]
    UserRejected(String),

    /// Malformed request caught before it reached the provider.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Provider rejection, message preserved verbatim.
    #[error("{0}")]
    ProviderFailure(String),

    /// Configuration value out of range.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Preference store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// QR rendering failure.
    #[error("render error: {0}")]
    Render(String),
}

impl WeblnError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::UserRejected(_) => ErrorKind::UserRejected,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::ProviderFailure(_) => ErrorKind::ProviderFailure,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Render(_) => ErrorKind::Render,
        }
    }

    /// Get the error message as an owned String (useful for JS bindings).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Terminal errors stay visible until the page is reloaded.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }

    /// Create an invalid input error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Map a provider rejection onto the controller taxonomy.
    pub fn from_rejection(category: RejectionCategory, message: impl Into<String>) -> Self {
        let message = message.into();
        match category {
            RejectionCategory::UserRejected => Self::UserRejected(message),
            RejectionCategory::Unsupported => Self::UnsupportedOperation(message),
            RejectionCategory::Other => Self::ProviderFailure(message),
        }
    }
}

impl From<serde_json::Error> for WeblnError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<qrcode::types::QrError> for WeblnError {
    fn from(err: qrcode::types::QrError) -> Self {
        Self::Render(err.to_string())
    }
}
