//! Scripted engine session shared by the integration tests.

#![allow(dead_code)]

use auth_driver::{
    AuthSession, AuthorizationState, EngineError, EngineResult, SignIn, TdlibParameters,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A request the driver sent to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetTdlibParameters(TdlibParameters),
    CheckDatabaseKey(String),
    SetDatabaseKey(String),
    CheckBotToken(String),
    SendCodeRequest(String),
    SignInCode(String),
    SignInPassword(String),
    SignUp {
        code: String,
        first_name: String,
        last_name: String,
    },
    Close,
}

/// Session that replays a fixed sequence of authorization states and
/// records every submit call.
pub struct ScriptedSession {
    states: Mutex<VecDeque<AuthorizationState>>,
    calls: Mutex<Vec<Call>>,
    state_queries: AtomicUsize,
    disconnect_after: Option<usize>,
    stay_connected: bool,
    submit_failure: Mutex<Option<EngineError>>,
}

impl ScriptedSession {
    pub fn new(states: Vec<AuthorizationState>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            calls: Mutex::new(Vec::new()),
            state_queries: AtomicUsize::new(0),
            disconnect_after: None,
            stay_connected: false,
            submit_failure: Mutex::new(None),
        }
    }

    /// Report disconnected once `queries` state queries have been answered.
    pub fn disconnect_after(mut self, queries: usize) -> Self {
        self.disconnect_after = Some(queries);
        self
    }

    /// Keep reporting connected after the script runs out, so the next state
    /// query fails instead.
    pub fn stay_connected(mut self) -> Self {
        self.stay_connected = true;
        self
    }

    /// Fail the next submit call with `error`.
    pub fn fail_next_submit(self, error: EngineError) -> Self {
        *self.submit_failure.lock().unwrap() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn state_queries(&self) -> usize {
        self.state_queries.load(Ordering::SeqCst)
    }

    pub fn remaining_states(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    fn record(&self, call: Call) -> EngineResult<()> {
        if let Some(error) = self.submit_failure.lock().unwrap().take() {
            return Err(error);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl AuthSession for ScriptedSession {
    fn is_connected(&self) -> bool {
        match self.disconnect_after {
            Some(limit) if self.state_queries() >= limit => false,
            _ => self.stay_connected || !self.states.lock().unwrap().is_empty(),
        }
    }

    fn get_authorization_state(&self) -> EngineResult<AuthorizationState> {
        self.state_queries.fetch_add(1, Ordering::SeqCst);
        self.states
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(EngineError::Disconnected)
    }

    fn set_tdlib_parameters(&self, parameters: &TdlibParameters) -> EngineResult<()> {
        self.record(Call::SetTdlibParameters(parameters.clone()))
    }

    fn check_database_key(&self, key: &str) -> EngineResult<()> {
        self.record(Call::CheckDatabaseKey(key.to_string()))
    }

    fn set_database_key(&self, key: &str) -> EngineResult<()> {
        self.record(Call::SetDatabaseKey(key.to_string()))
    }

    fn check_bot_token(&self, token: &str) -> EngineResult<()> {
        self.record(Call::CheckBotToken(token.to_string()))
    }

    fn send_code_request(&self, phone_number: &str) -> EngineResult<()> {
        self.record(Call::SendCodeRequest(phone_number.to_string()))
    }

    fn sign_in(&self, credential: SignIn) -> EngineResult<()> {
        match credential {
            SignIn::Code(code) => self.record(Call::SignInCode(code)),
            SignIn::Password(password) => self.record(Call::SignInPassword(password)),
        }
    }

    fn sign_up(&self, code: &str, first_name: &str, last_name: &str) -> EngineResult<()> {
        self.record(Call::SignUp {
            code: code.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }

    fn close(&self) -> EngineResult<()> {
        self.record(Call::Close)
    }
}

pub fn config() -> auth_driver::SessionConfig {
    let mut config = auth_driver::SessionConfig::new(94575, "a3406de8d171bb422bb6ddf3bbd800e2");
    config.work_dir = std::path::PathBuf::from("/srv/tdauth");
    config
}

pub fn wait_code(is_registered: bool, terms_of_service: Option<&str>) -> AuthorizationState {
    AuthorizationState::WaitCode {
        is_registered,
        terms_of_service: terms_of_service.map(str::to_string),
    }
}

pub fn wait_password(hint: Option<&str>) -> AuthorizationState {
    AuthorizationState::WaitPassword {
        password_hint: hint.map(str::to_string),
    }
}
