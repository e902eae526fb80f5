//! Error types for the TaxSync client.

use thiserror::Error;

/// A shared error type for the entire TaxSync client.
///
/// Transport, protocol and application failures all travel through this one
/// type so callers never have to branch on the failure class to decide what to
/// do next. Nothing in the client retries automatically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaxError {
    /// The network layer could not complete the exchange
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("Server returned HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// The server reported `success = false` or rejected the request's content
    #[error("{operation} was rejected: {reason}")]
    Application { operation: String, reason: String },

    /// Locally detected input problem; never reaches the network layer
    #[error("{0}")]
    Validation(String),

    /// Response body could not be decoded into the expected shape
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TaxError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Protocol error
    pub fn protocol(status: u16, body: impl Into<String>) -> Self {
        Self::Protocol {
            status,
            body: body.into(),
        }
    }

    /// Creates an Application error
    pub fn application(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Application {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a JSON decoding error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }

    /// Check if this error was raised before any request was issued
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Hint for the user-facing surface: trying the same action again might succeed.
    ///
    /// The client itself never acts on this.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Protocol { .. })
    }

    /// Prefixes the message with the action that failed, keeping the variant.
    ///
    /// Used by the action layer to produce "Failed to add job: ..." messages.
    pub fn context(self, action: &str) -> Self {
        match self {
            Self::Transport(message) => Self::Transport(format!("{}: {}", action, message)),
            Self::Validation(message) => Self::Validation(format!("{}: {}", action, message)),
            Self::Config(message) => Self::Config(format!("{}: {}", action, message)),
            Self::Application { operation, reason } => Self::Application {
                operation: format!("{} ({})", action, operation),
                reason,
            },
            Self::Protocol { status, body } => Self::Protocol {
                status,
                body: format!("{}: {}", action, body),
            },
            Self::Serialization { format, message } => Self::Serialization {
                format,
                message: format!("{}: {}", action, message),
            },
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TaxError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for TaxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TaxError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TaxError>`.
pub type Result<T> = std::result::Result<T, TaxError>;
