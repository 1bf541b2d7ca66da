//! JSON object encoding for authorization requests and responses.
//!
//! Every object carries its type in an `@type` field:
//!
//! ```text
//! → {"@type":"setAuthenticationPhoneNumber","phone_number":"+15550001111"}
//! ← {"@type":"ok"}
//! ← {"@type":"error","code":400,"message":"PHONE_NUMBER_INVALID"}
//! ```

use auth_driver::{AuthorizationState, EngineError, EngineResult, TdlibParameters};
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix shared by every authorization state type.
const AUTHORIZATION_STATE_PREFIX: &str = "authorizationState";

/// Requests the session can send.
#[derive(Debug, Serialize)]
#[serde(tag = "@type", rename_all = "camelCase")]
pub enum Request<'a> {
    GetAuthorizationState,
    SetTdlibParameters {
        parameters: Value,
    },
    CheckDatabaseEncryptionKey {
        encryption_key: String,
    },
    SetDatabaseEncryptionKey {
        new_encryption_key: String,
    },
    CheckAuthenticationBotToken {
        token: &'a str,
    },
    SetAuthenticationPhoneNumber {
        phone_number: &'a str,
    },
    /// Sign-in with a code, or sign-up when names are included.
    CheckAuthenticationCode {
        code: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        first_name: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_name: Option<&'a str>,
    },
    CheckAuthenticationPassword {
        password: &'a str,
    },
    Close,
}

impl<'a> Request<'a> {
    /// `setTdlibParameters` with the nested `tdlibParameters` object.
    pub fn set_tdlib_parameters(parameters: &TdlibParameters) -> EngineResult<Self> {
        let mut object = serde_json::to_value(parameters)
            .map_err(|e| EngineError::Protocol(format!("Cannot encode parameters: {}", e)))?;
        object["@type"] = Value::from("tdlibParameters");
        Ok(Request::SetTdlibParameters { parameters: object })
    }

    pub fn check_database_key(key: &str) -> Self {
        Request::CheckDatabaseEncryptionKey {
            encryption_key: encode_bytes(key),
        }
    }

    pub fn set_database_key(key: &str) -> Self {
        Request::SetDatabaseEncryptionKey {
            new_encryption_key: encode_bytes(key),
        }
    }

    /// Serialize to a JSON object.
    pub fn to_value(&self) -> EngineResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| EngineError::Protocol(format!("Cannot encode request: {}", e)))
    }
}

/// Byte fields travel base64-encoded.
fn encode_bytes(value: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

/// `@type` of a response object.
pub fn type_of(response: &Value) -> EngineResult<&str> {
    response
        .get("@type")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::Protocol("Response has no @type".to_string()))
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

fn fields<T: DeserializeOwned>(response: Value, type_name: &str) -> EngineResult<T> {
    serde_json::from_value(response)
        .map_err(|e| EngineError::Protocol(format!("Malformed {}: {}", type_name, e)))
}

fn rejected(response: Value) -> EngineError {
    match fields::<ErrorObject>(response, "error") {
        Ok(error) => EngineError::Rejected {
            code: error.code,
            message: error.message,
        },
        Err(e) => e,
    }
}

/// Expect an `ok` acknowledgement.
pub fn decode_ok(response: Value) -> EngineResult<()> {
    let type_name = type_of(&response)?.to_string();
    match type_name.as_str() {
        "ok" => Ok(()),
        "error" => Err(rejected(response)),
        other => Err(EngineError::Protocol(format!("Expected ok, got {}", other))),
    }
}

#[derive(Debug, Deserialize)]
struct EncryptionKeyFields {
    #[serde(default)]
    is_encrypted: bool,
}

#[derive(Debug, Deserialize)]
struct FormattedText {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TermsOfService {
    text: FormattedText,
}

#[derive(Debug, Deserialize)]
struct CodeFields {
    // Engines that register accounts in a separate state omit the flag
    #[serde(default = "default_registered")]
    is_registered: bool,
    #[serde(default)]
    terms_of_service: Option<TermsOfService>,
}

fn default_registered() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct PasswordFields {
    #[serde(default)]
    password_hint: String,
}

/// Decode an authorization state object.
///
/// Unknown `authorizationState*` types decode to
/// [`AuthorizationState::Other`]; anything else is a protocol error.
pub fn decode_authorization_state(response: Value) -> EngineResult<AuthorizationState> {
    let type_name = type_of(&response)?.to_string();

    let state = match type_name.as_str() {
        "authorizationStateWaitTdlibParameters" => AuthorizationState::WaitTdlibParameters,
        "authorizationStateWaitEncryptionKey" => {
            let f: EncryptionKeyFields = fields(response, &type_name)?;
            AuthorizationState::WaitEncryptionKey {
                is_encrypted: f.is_encrypted,
            }
        }
        "authorizationStateWaitPhoneNumber" => AuthorizationState::WaitPhoneNumber,
        "authorizationStateWaitCode" => {
            let f: CodeFields = fields(response, &type_name)?;
            AuthorizationState::WaitCode {
                is_registered: f.is_registered,
                terms_of_service: f
                    .terms_of_service
                    .map(|tos| tos.text.text)
                    .filter(|text| !text.is_empty()),
            }
        }
        "authorizationStateWaitPassword" => {
            let f: PasswordFields = fields(response, &type_name)?;
            AuthorizationState::WaitPassword {
                password_hint: Some(f.password_hint).filter(|hint| !hint.is_empty()),
            }
        }
        "authorizationStateReady" => AuthorizationState::Ready,
        "error" => return Err(rejected(response)),
        other if other.starts_with(AUTHORIZATION_STATE_PREFIX) => {
            AuthorizationState::Other(other.to_string())
        }
        other => {
            return Err(EngineError::Protocol(format!(
                "Expected an authorization state, got {}",
                other
            )))
        }
    };

    Ok(state)
}
