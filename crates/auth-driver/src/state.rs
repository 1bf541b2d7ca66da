//! Authorization states reported by the engine and their ordering.
//!
//! Every state the driver knows how to answer maps to an [`AuthorizationStep`].
//! Steps are totally ordered by depth and that ordering is only used to
//! compare progress against the caller's [`AuthorizationStats`] target.
//!
//! ```text
//! TdlibParameters(0) → EncryptionKey(1) → PhoneNumber(2) → Code(3) → Password(4) → Ready(5)
//! ```

use crate::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization state as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationState {
    /// The engine needs its startup parameters.
    WaitTdlibParameters,
    /// The engine needs the local database key.
    WaitEncryptionKey { is_encrypted: bool },
    /// The engine needs a phone number or a bot token.
    WaitPhoneNumber,
    /// The engine sent a verification code and waits for it.
    WaitCode {
        is_registered: bool,
        terms_of_service: Option<String>,
    },
    /// The account has two-factor authentication enabled.
    WaitPassword { password_hint: Option<String> },
    /// Authorization is complete.
    Ready,
    /// Any state the driver has no step for, carrying the engine's name for it.
    Other(String),
}

impl AuthorizationState {
    /// Step this state belongs to, or `None` for unrecognized states.
    pub fn step(&self) -> Option<AuthorizationStep> {
        match self {
            AuthorizationState::WaitTdlibParameters => Some(AuthorizationStep::TdlibParameters),
            AuthorizationState::WaitEncryptionKey { .. } => Some(AuthorizationStep::EncryptionKey),
            AuthorizationState::WaitPhoneNumber => Some(AuthorizationStep::PhoneNumber),
            AuthorizationState::WaitCode { .. } => Some(AuthorizationStep::Code),
            AuthorizationState::WaitPassword { .. } => Some(AuthorizationStep::Password),
            AuthorizationState::Ready => Some(AuthorizationStep::Ready),
            AuthorizationState::Other(_) => None,
        }
    }

    /// Short name used in logs and transition events.
    pub fn name(&self) -> &str {
        match self {
            AuthorizationState::WaitTdlibParameters => "wait_tdlib_parameters",
            AuthorizationState::WaitEncryptionKey { .. } => "wait_encryption_key",
            AuthorizationState::WaitPhoneNumber => "wait_phone_number",
            AuthorizationState::WaitCode { .. } => "wait_code",
            AuthorizationState::WaitPassword { .. } => "wait_password",
            AuthorizationState::Ready => "ready",
            AuthorizationState::Other(name) => name,
        }
    }
}

/// Depth-ranked authorization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStep {
    TdlibParameters = 0,
    EncryptionKey = 1,
    PhoneNumber = 2,
    Code = 3,
    Password = 4,
    Ready = 5,
}

impl AuthorizationStep {
    /// All steps in depth order.
    pub const ALL: [AuthorizationStep; 6] = [
        AuthorizationStep::TdlibParameters,
        AuthorizationStep::EncryptionKey,
        AuthorizationStep::PhoneNumber,
        AuthorizationStep::Code,
        AuthorizationStep::Password,
        AuthorizationStep::Ready,
    ];

    /// Integer depth (0..=5).
    pub fn depth(self) -> u8 {
        self as u8
    }

    /// Step at the given depth, if any.
    pub fn from_depth(depth: u8) -> Option<Self> {
        Self::ALL.get(depth as usize).copied()
    }

    /// Snake-case step name.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationStep::TdlibParameters => "tdlib_parameters",
            AuthorizationStep::EncryptionKey => "encryption_key",
            AuthorizationStep::PhoneNumber => "phone_number",
            AuthorizationStep::Code => "code",
            AuthorizationStep::Password => "password",
            AuthorizationStep::Ready => "ready",
        }
    }
}

impl fmt::Display for AuthorizationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stopping criterion for a driver run: stop once the engine's state has
/// advanced at least this far.
///
/// Defaults to [`AuthorizationStep::Ready`], i.e. run until authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStats(AuthorizationStep);

impl AuthorizationStats {
    pub fn new(step: AuthorizationStep) -> Self {
        Self(step)
    }

    /// Target step.
    pub fn step(self) -> AuthorizationStep {
        self.0
    }

    /// Target depth.
    pub fn depth(self) -> u8 {
        self.0.depth()
    }

    /// Returns true once `step` has reached or passed the target.
    pub fn is_reached_by(self, step: AuthorizationStep) -> bool {
        step >= self.0
    }
}

impl Default for AuthorizationStats {
    fn default() -> Self {
        Self(AuthorizationStep::Ready)
    }
}

impl From<AuthorizationStep> for AuthorizationStats {
    fn from(step: AuthorizationStep) -> Self {
        Self(step)
    }
}

impl TryFrom<u8> for AuthorizationStats {
    type Error = AuthError;

    fn try_from(depth: u8) -> AuthResult<Self> {
        AuthorizationStep::from_depth(depth)
            .map(Self)
            .ok_or_else(|| AuthError::InvalidTarget(format!("depth {} is beyond ready (5)", depth)))
    }
}

impl FromStr for AuthorizationStats {
    type Err = AuthError;

    /// Accepts a depth (`"0"`..`"5"`) or a step name (`"phone_number"`).
    fn from_str(s: &str) -> AuthResult<Self> {
        let s = s.trim();
        if let Ok(depth) = s.parse::<u8>() {
            return Self::try_from(depth);
        }

        let normalized = s.to_ascii_lowercase().replace('-', "_");
        AuthorizationStep::ALL
            .iter()
            .find(|step| step.as_str() == normalized)
            .map(|step| Self(*step))
            .ok_or_else(|| AuthError::InvalidTarget(format!("unknown step name '{}'", s)))
    }
}
