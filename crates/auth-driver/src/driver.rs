//! The authorization loop.
//!
//! Each iteration asks the engine for its current authorization state,
//! answers it with exactly one step handler, and then decides whether to go
//! round again:
//!
//! ```text
//! is_connected? ──no──► Disconnected
//!      │ yes
//!      ▼
//! get_authorization_state ──► step ──► handler ──► Ready? ──yes──► Authorized
//!                              │                     │ no
//!                    unknown ──┴──► error            ▼
//!                                         step ≥ target? ──yes──► TargetReached
//!                                                    │ no
//!                                                    └──► loop
//! ```

use crate::auth_fsm::{machine_for_flag, observe_step, AuthorizationMachine, AuthorizationMachineState};
use crate::credentials::{CodeSource, CredentialStore, LoginKey, NamePart};
use crate::resolver::CredentialResolver;
use crate::session::{AuthSession, SignIn};
use crate::{AuthError, AuthResult, AuthorizationState, AuthorizationStats, AuthorizationStep, SessionConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The engine reported `Ready` and the flag is set.
    Authorized,
    /// The engine reached the requested step before `Ready`.
    TargetReached(AuthorizationStep),
    /// The session stopped reporting itself connected.
    Disconnected,
}

/// Payload for authorization step notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Step that was just handled.
    pub step: AuthorizationStep,
    /// Engine state name.
    pub state: String,
    /// Authorized flag after handling the step.
    pub authorized: bool,
}

/// Callback type for step notifications.
pub type TransitionCallback = Box<dyn Fn(&TransitionEvent) + Send + Sync>;

/// Negotiates one session's authorization with the engine.
pub struct AuthorizationDriver<S, C, R> {
    session: S,
    config: SessionConfig,
    credentials: C,
    resolver: R,
    /// Guards the authorized flag.
    fsm: AuthorizationMachine,
    /// Optional callback for step notifications.
    transition_callback: Option<TransitionCallback>,
}

impl<S, C, R> AuthorizationDriver<S, C, R>
where
    S: AuthSession,
    C: CredentialStore,
    R: CredentialResolver,
{
    /// Create a driver for a session.
    ///
    /// The authorized flag starts from whatever the credential store holds.
    pub fn new(session: S, config: SessionConfig, credentials: C, resolver: R) -> Self {
        let fsm = machine_for_flag(credentials.is_authorized());
        Self {
            session,
            config,
            credentials,
            resolver,
            fsm,
            transition_callback: None,
        }
    }

    /// Set a callback to be notified after every handled step.
    pub fn set_transition_callback(&mut self, callback: TransitionCallback) {
        self.transition_callback = Some(callback);
    }

    pub fn is_authorized(&self) -> bool {
        *self.fsm.state() == AuthorizationMachineState::Authorized
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn into_parts(self) -> (S, C, R) {
        (self.session, self.credentials, self.resolver)
    }

    /// Drive the engine until it is `Ready`, reaches `target`, or the session
    /// disconnects.
    ///
    /// Blocks on every engine call and on every prompt the resolver issues, so
    /// run it where blocking is acceptable (see [`crate::run_on_worker`]).
    /// Any session failure aborts the run without retrying the step.
    pub fn run(&mut self, target: AuthorizationStats) -> AuthResult<RunOutcome> {
        info!(target = %target.step(), "Starting authorization");

        while self.session.is_connected() {
            let state = self.session.get_authorization_state()?;

            let Some(step) = state.step() else {
                warn!(state = state.name(), "Engine reported an unrecognized authorization state");
                return Err(AuthError::UnrecognizedState(state.name().to_string()));
            };

            info!(step = %step, depth = step.depth(), "Authorization state received");

            let newly_authorized = match observe_step(&mut self.fsm, step) {
                Ok(flipped) => flipped,
                Err(e) => {
                    warn!(step = %step, "Engine left Ready after authorization");
                    return Err(e);
                }
            };

            self.handle(&state, newly_authorized)?;
            self.notify(&state, step);

            if step == AuthorizationStep::Ready {
                return Ok(RunOutcome::Authorized);
            }

            if target.is_reached_by(step) {
                info!(step = %step, target = %target.step(), "Authorization target reached");
                return Ok(RunOutcome::TargetReached(step));
            }
        }

        info!("Session disconnected, stopping authorization");
        Ok(RunOutcome::Disconnected)
    }

    fn handle(&mut self, state: &AuthorizationState, newly_authorized: bool) -> AuthResult<()> {
        match state {
            AuthorizationState::WaitTdlibParameters => self.submit_parameters(),
            AuthorizationState::WaitEncryptionKey { is_encrypted } => {
                self.submit_encryption_key(*is_encrypted)
            }
            AuthorizationState::WaitPhoneNumber => self.submit_login_key(),
            AuthorizationState::WaitCode {
                is_registered,
                terms_of_service,
            } => self.submit_code(*is_registered, terms_of_service.as_deref()),
            AuthorizationState::WaitPassword { password_hint } => {
                self.submit_password(password_hint.as_deref())
            }
            AuthorizationState::Ready => {
                self.complete(newly_authorized);
                Ok(())
            }
            AuthorizationState::Other(name) => Err(AuthError::UnrecognizedState(name.clone())),
        }
    }

    fn submit_parameters(&mut self) -> AuthResult<()> {
        let parameters = self.config.tdlib_parameters();
        debug!(
            database_directory = %parameters.database_directory,
            files_directory = %parameters.files_directory,
            use_test_dc = parameters.use_test_dc,
            "Submitting engine parameters"
        );
        self.session.set_tdlib_parameters(&parameters)?;
        Ok(())
    }

    fn submit_encryption_key(&mut self, is_encrypted: bool) -> AuthResult<()> {
        let key = self.credentials.encryption_key();
        if is_encrypted {
            debug!("Checking database encryption key");
            self.session.check_database_key(&key)?;
        } else {
            debug!("Setting database encryption key");
            self.session.set_database_key(&key)?;
        }
        Ok(())
    }

    fn submit_login_key(&mut self) -> AuthResult<()> {
        let login_key = match self.credentials.login_key() {
            Some(key) => key,
            None => self.resolver.resolve_login_key()?,
        };

        debug!(kind = login_key.kind(), "Submitting login key");
        match &login_key {
            LoginKey::BotToken(token) => self.session.check_bot_token(token)?,
            LoginKey::PhoneNumber(phone_number) => self.session.send_code_request(phone_number)?,
        }
        Ok(())
    }

    fn submit_code(&mut self, is_registered: bool, terms_of_service: Option<&str>) -> AuthResult<()> {
        if let Some(text) = terms_of_service.filter(|t| !t.is_empty()) {
            self.resolver.show_terms_of_service(text)?;
        }

        let code = self.resolve_code()?;

        if is_registered {
            debug!("Signing in with verification code");
            self.session.sign_in(SignIn::Code(code))?;
        } else {
            let first_name = self.resolve_name(NamePart::First)?;
            let last_name = self.resolve_name(NamePart::Last)?;
            debug!("Signing up with verification code");
            self.session.sign_up(&code, &first_name, &last_name)?;
        }
        Ok(())
    }

    fn submit_password(&mut self, password_hint: Option<&str>) -> AuthResult<()> {
        let password = self.resolver.resolve_password(password_hint)?;
        debug!("Signing in with two-factor password");
        self.session.sign_in(SignIn::Password(password))?;
        Ok(())
    }

    fn complete(&mut self, newly_authorized: bool) {
        if newly_authorized {
            self.credentials.mark_authorized();
            info!("Authorization complete");
        } else {
            debug!("Engine reported Ready for an already authorized session");
        }
    }

    /// Code from the session's code source, or from the resolver when the
    /// source says to prompt (or holds an empty fixed code).
    fn resolve_code(&mut self) -> AuthResult<String> {
        let code = match self.credentials.code_source() {
            CodeSource::Callback(produce) => Some(produce()?),
            CodeSource::Fixed(code) if !code.is_empty() => Some(code.clone()),
            CodeSource::Fixed(_) | CodeSource::Prompt => None,
        };

        match code {
            Some(code) => Ok(code),
            None => self.resolver.resolve_code(),
        }
    }

    /// Name from the store, resolving and persisting it when unset.
    fn resolve_name(&mut self, part: NamePart) -> AuthResult<String> {
        if let Some(name) = self.credentials.name(part) {
            return Ok(name);
        }

        let name = self.resolver.resolve_name(part)?;
        self.credentials.set_name(part, name.clone());
        Ok(name)
    }

    fn notify(&self, state: &AuthorizationState, step: AuthorizationStep) {
        if let Some(callback) = self.transition_callback.as_ref() {
            callback(&TransitionEvent {
                step,
                state: state.name().to_string(),
                authorized: self.is_authorized(),
            });
        }
    }
}
