//! [`AuthSession`] over a JSON object client.

use crate::codec::{decode_authorization_state, decode_ok, type_of, Request};
use auth_driver::{AuthSession, AuthorizationState, EngineResult, SignIn, TdlibParameters};
use serde_json::Value;
use tracing::{debug, trace};

/// A connection that exchanges JSON objects with the engine.
///
/// `execute` sends one request and blocks until the matching response
/// arrives. Implementations own request correlation and reconnection.
pub trait TdJsonClient {
    fn is_connected(&self) -> bool;

    fn execute(&self, request: Value) -> EngineResult<Value>;
}

/// Authorization session speaking the engine's JSON protocol.
pub struct TdJsonSession<C> {
    client: C,
}

impl<C: TdJsonClient> TdJsonSession<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn call(&self, request: &Request<'_>) -> EngineResult<Value> {
        let value = request.to_value()?;
        let request_type = type_of(&value)?.to_string();
        trace!(request = %request_type, "Sending engine request");

        let response = self.client.execute(value)?;
        trace!(
            request = %request_type,
            response = type_of(&response).unwrap_or("<untyped>"),
            "Engine responded"
        );
        Ok(response)
    }

    fn call_ok(&self, request: &Request<'_>) -> EngineResult<()> {
        decode_ok(self.call(request)?)
    }
}

impl<C: TdJsonClient> AuthSession for TdJsonSession<C> {
    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    fn get_authorization_state(&self) -> EngineResult<AuthorizationState> {
        let state = decode_authorization_state(self.call(&Request::GetAuthorizationState)?)?;
        debug!(state = state.name(), "Decoded authorization state");
        Ok(state)
    }

    fn set_tdlib_parameters(&self, parameters: &TdlibParameters) -> EngineResult<()> {
        self.call_ok(&Request::set_tdlib_parameters(parameters)?)
    }

    fn check_database_key(&self, key: &str) -> EngineResult<()> {
        self.call_ok(&Request::check_database_key(key))
    }

    fn set_database_key(&self, key: &str) -> EngineResult<()> {
        self.call_ok(&Request::set_database_key(key))
    }

    fn check_bot_token(&self, token: &str) -> EngineResult<()> {
        self.call_ok(&Request::CheckAuthenticationBotToken { token })
    }

    fn send_code_request(&self, phone_number: &str) -> EngineResult<()> {
        self.call_ok(&Request::SetAuthenticationPhoneNumber { phone_number })
    }

    fn sign_in(&self, credential: SignIn) -> EngineResult<()> {
        match &credential {
            SignIn::Code(code) => self.call_ok(&Request::CheckAuthenticationCode {
                code: code.as_str(),
                first_name: None,
                last_name: None,
            }),
            SignIn::Password(password) => self.call_ok(&Request::CheckAuthenticationPassword {
                password: password.as_str(),
            }),
        }
    }

    fn sign_up(&self, code: &str, first_name: &str, last_name: &str) -> EngineResult<()> {
        self.call_ok(&Request::CheckAuthenticationCode {
            code,
            first_name: Some(first_name),
            last_name: Some(last_name),
        })
    }

    fn close(&self) -> EngineResult<()> {
        debug!("Closing engine session");
        self.call_ok(&Request::Close)
    }
}
