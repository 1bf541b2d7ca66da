//! Session-scoped credential material the driver reads and fills in.

use crate::AuthResult;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// `<bot id>:<secret>` as issued for bot accounts.
const BOT_TOKEN_PATTERN: &str = r"\d+:\S+";

fn bot_token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(BOT_TOKEN_PATTERN).expect("bot token pattern is valid"))
}

/// What the engine should log in with: a user's phone number or a bot token.
#[derive(Clone, PartialEq, Eq)]
pub enum LoginKey {
    PhoneNumber(String),
    BotToken(String),
}

impl LoginKey {
    /// Classify a raw login key.
    ///
    /// Anything containing `digits:non-space` is a bot token, everything else
    /// a phone number. Depends on nothing but the string itself.
    pub fn classify(raw: &str) -> Self {
        let value = raw.trim().to_string();
        if bot_token_regex().is_match(&value) {
            LoginKey::BotToken(value)
        } else {
            LoginKey::PhoneNumber(value)
        }
    }

    /// `"bot"` or `"phone"`, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            LoginKey::PhoneNumber(_) => "phone",
            LoginKey::BotToken(_) => "bot",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LoginKey::PhoneNumber(value) | LoginKey::BotToken(value) => value,
        }
    }
}

// Keeps tokens out of logs and panic messages.
impl fmt::Debug for LoginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoginKey::{}(..)", self.kind())
    }
}

/// Producer invoked for a verification code.
pub type CodeCallback = Box<dyn FnMut() -> AuthResult<String> + Send>;

/// Where the verification code comes from.
#[derive(Default)]
pub enum CodeSource {
    /// A code known up front. An empty value falls back to prompting.
    Fixed(String),
    /// A producer called each time a code is needed.
    Callback(CodeCallback),
    /// Ask the credential resolver.
    #[default]
    Prompt,
}

impl CodeSource {
    pub fn callback<F>(f: F) -> Self
    where
        F: FnMut() -> AuthResult<String> + Send + 'static,
    {
        CodeSource::Callback(Box::new(f))
    }
}

impl fmt::Debug for CodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeSource::Fixed(_) => f.write_str("CodeSource::Fixed(..)"),
            CodeSource::Callback(_) => f.write_str("CodeSource::Callback"),
            CodeSource::Prompt => f.write_str("CodeSource::Prompt"),
        }
    }
}

/// Which half of the account name is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePart {
    First,
    Last,
}

/// Credential fields owned by the session and mutated by the driver.
pub trait CredentialStore: Send {
    /// Phone number or bot token preset for this session.
    fn login_key(&self) -> Option<LoginKey>;

    /// Local database encryption key.
    fn encryption_key(&self) -> String;

    fn name(&self, part: NamePart) -> Option<String>;

    /// Persist a resolved name for reuse on later sign-ups.
    fn set_name(&mut self, part: NamePart, value: String);

    fn code_source(&mut self) -> &mut CodeSource;

    fn is_authorized(&self) -> bool;

    /// Record that the engine reported `Ready`.
    fn mark_authorized(&mut self);
}

/// In-memory credential record for one session.
#[derive(Default)]
pub struct SessionCredentials {
    login_key: Option<LoginKey>,
    encryption_key: String,
    first_name: Option<String>,
    last_name: Option<String>,
    code_source: CodeSource,
    authorized: bool,
}

impl SessionCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a phone number. Replaces any preset bot token.
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.login_key = Some(LoginKey::PhoneNumber(phone_number.into()));
        self
    }

    /// Preset a bot token. Replaces any preset phone number.
    pub fn with_bot_token(mut self, bot_token: impl Into<String>) -> Self {
        self.login_key = Some(LoginKey::BotToken(bot_token.into()));
        self
    }

    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = key.into();
        self
    }

    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_code_source(mut self, source: CodeSource) -> Self {
        self.code_source = source;
        self
    }

    pub fn phone_number(&self) -> Option<&str> {
        match &self.login_key {
            Some(LoginKey::PhoneNumber(phone)) => Some(phone),
            _ => None,
        }
    }

    pub fn bot_token(&self) -> Option<&str> {
        match &self.login_key {
            Some(LoginKey::BotToken(token)) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("login_key", &self.login_key)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("code_source", &self.code_source)
            .field("authorized", &self.authorized)
            .finish_non_exhaustive()
    }
}

impl CredentialStore for SessionCredentials {
    fn login_key(&self) -> Option<LoginKey> {
        self.login_key.clone()
    }

    fn encryption_key(&self) -> String {
        self.encryption_key.clone()
    }

    fn name(&self, part: NamePart) -> Option<String> {
        match part {
            NamePart::First => self.first_name.clone(),
            NamePart::Last => self.last_name.clone(),
        }
    }

    fn set_name(&mut self, part: NamePart, value: String) {
        match part {
            NamePart::First => self.first_name = Some(value),
            NamePart::Last => self.last_name = Some(value),
        }
    }

    fn code_source(&mut self) -> &mut CodeSource {
        &mut self.code_source
    }

    fn is_authorized(&self) -> bool {
        self.authorized
    }

    fn mark_authorized(&mut self) {
        self.authorized = true;
    }
}
