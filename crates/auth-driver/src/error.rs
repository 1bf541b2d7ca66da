//! Authorization error types.

use thiserror::Error;

/// Failure reported by a session while talking to the authorization engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine answered the request with an error object.
    #[error("Engine rejected request ({code}): {message}")]
    Rejected { code: i32, message: String },

    /// The request or its response never made it across the transport.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The session lost its connection mid-call.
    #[error("Session disconnected")]
    Disconnected,

    /// The engine answered with something the session could not decode.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type for session calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Authorization driver error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// A request/response exchange with the session failed
    #[error("Authorization engine unavailable: {0}")]
    EngineUnavailable(#[from] EngineError),

    /// The engine reported a state the driver has no step for
    #[error("Unrecognized authorization state: {0}")]
    UnrecognizedState(String),

    /// The requested stopping depth does not exist
    #[error("Invalid authorization target: {0}")]
    InvalidTarget(String),

    /// A headless resolver was asked for material it does not hold
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    /// Credential resolution failed (closed input, failing producer, ...)
    #[error("Credential resolver error: {0}")]
    Resolver(String),

    /// Invalid transition of the authorized-flag state machine
    #[error("Invalid authorization state transition: {0}")]
    InvalidStateTransition(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker running the driver died before reporting back
    #[error("Authorization worker failed: {0}")]
    Worker(String),
}

impl AuthError {
    /// Returns true if the failure came from the connection rather than the
    /// engine's answer, so running the driver again may succeed.
    ///
    /// The driver itself never retries; this is for callers that wrap it.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthError::EngineUnavailable(EngineError::Transport(_))
                | AuthError::EngineUnavailable(EngineError::Disconnected)
        )
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
