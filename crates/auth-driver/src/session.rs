//! Session collaborator contract.

use crate::config::TdlibParameters;
use crate::error::EngineResult;
use crate::AuthorizationState;

/// What a sign-in submits.
#[derive(Clone, PartialEq, Eq)]
pub enum SignIn {
    /// Verification code for a registered account.
    Code(String),
    /// Two-factor password.
    Password(String),
}

impl std::fmt::Debug for SignIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignIn::Code(_) => f.write_str("SignIn::Code(..)"),
            SignIn::Password(_) => f.write_str("SignIn::Password(..)"),
        }
    }
}

/// Requests the driver sends through the owning session.
///
/// Every call blocks until the engine answers. Transport concerns
/// (reconnection, timeouts, retries) belong to the implementation.
pub trait AuthSession {
    /// Whether the session is still connected to the engine.
    fn is_connected(&self) -> bool;

    fn get_authorization_state(&self) -> EngineResult<AuthorizationState>;

    fn set_tdlib_parameters(&self, parameters: &TdlibParameters) -> EngineResult<()>;

    /// Open an existing encrypted database.
    fn check_database_key(&self, key: &str) -> EngineResult<()>;

    /// Set the key for a new database.
    fn set_database_key(&self, key: &str) -> EngineResult<()>;

    fn check_bot_token(&self, token: &str) -> EngineResult<()>;

    /// Ask the engine to send a verification code to `phone_number`.
    fn send_code_request(&self, phone_number: &str) -> EngineResult<()>;

    fn sign_in(&self, credential: SignIn) -> EngineResult<()>;

    /// Register a new account with the verification code.
    fn sign_up(&self, code: &str, first_name: &str, last_name: &str) -> EngineResult<()>;

    /// Ask the engine to close the session and release its database.
    fn close(&self) -> EngineResult<()>;
}
