//! Credential resolvers: where the driver gets material the session does not
//! already hold.
//!
//! - [`TerminalResolver`] prompts a person on a terminal (or any reader/writer
//!   pair) and reads the password without echo.
//! - [`StaticResolver`] hands out preset values for headless runs and fails
//!   instead of blocking when something is missing.

use crate::credentials::{LoginKey, NamePart};
use crate::{AuthError, AuthResult};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use tracing::info;

const LOGIN_KEY_PROMPT: &str = "Enter phone number or bot token: ";
const CODE_PROMPT: &str = "Enter verification code: ";
const FIRST_NAME_PROMPT: &str = "First name: ";
const LAST_NAME_PROMPT: &str = "Last name: ";

/// Supplies credential material on demand.
pub trait CredentialResolver {
    /// Phone number or bot token, confirmed by whoever supplies it.
    fn resolve_login_key(&mut self) -> AuthResult<LoginKey>;

    /// Verification code sent by the engine.
    fn resolve_code(&mut self) -> AuthResult<String>;

    /// Name for a new account.
    fn resolve_name(&mut self, part: NamePart) -> AuthResult<String>;

    /// Two-factor password.
    fn resolve_password(&mut self, hint: Option<&str>) -> AuthResult<String>;

    /// Present the engine's terms of service before a code is requested.
    fn show_terms_of_service(&mut self, text: &str) -> AuthResult<()>;
}

/// Reads a secret after showing a prompt, without echoing it.
pub type MaskedReader = Box<dyn FnMut(&str) -> io::Result<String> + Send>;

/// Two-factor prompt, with the hint when the engine provided one.
pub fn password_prompt(hint: Option<&str>) -> String {
    let mut text = String::from("Two-factor authentication is enabled.\n");
    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
        text.push_str(&format!("Password hint: {}\n", hint));
    }
    text.push_str("Enter password: ");
    text
}

/// Prompt-based resolver.
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
    masked: MaskedReader,
}

impl TerminalResolver<BufReader<Stdin>, Stdout> {
    /// Resolver bound to the process's stdin/stdout, reading passwords from
    /// the controlling terminal.
    pub fn stdio() -> Self {
        Self::new(
            BufReader::new(io::stdin()),
            io::stdout(),
            Box::new(|prompt: &str| rpassword::prompt_password(prompt)),
        )
    }
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub fn new(input: R, output: W, masked: MaskedReader) -> Self {
        Self {
            input,
            output,
            masked,
        }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn prompt(&mut self, text: &str) -> AuthResult<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AuthError::Resolver(format!(
                "input closed while waiting for '{}'",
                text.trim()
            )));
        }
        Ok(line.trim().to_string())
    }

    fn prompt_non_empty(&mut self, text: &str) -> AuthResult<String> {
        loop {
            let value = self.prompt(text)?;
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
}

impl<R: BufRead, W: Write> CredentialResolver for TerminalResolver<R, W> {
    fn resolve_login_key(&mut self) -> AuthResult<LoginKey> {
        let mut login_key = self.prompt_non_empty(LOGIN_KEY_PROMPT)?;

        loop {
            let answer = self.prompt(&format!("Is \"{}\" correct? (y/n): ", login_key))?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" | "1" => break,
                "n" | "no" | "2" => login_key = self.prompt_non_empty(LOGIN_KEY_PROMPT)?,
                _ => {}
            }
        }

        Ok(LoginKey::classify(&login_key))
    }

    fn resolve_code(&mut self) -> AuthResult<String> {
        self.prompt_non_empty(CODE_PROMPT)
    }

    fn resolve_name(&mut self, part: NamePart) -> AuthResult<String> {
        match part {
            NamePart::First => self.prompt_non_empty(FIRST_NAME_PROMPT),
            // Accounts may have no last name
            NamePart::Last => self.prompt(LAST_NAME_PROMPT),
        }
    }

    fn resolve_password(&mut self, hint: Option<&str>) -> AuthResult<String> {
        let prompt = password_prompt(hint);
        (self.masked)(&prompt).map_err(AuthError::from)
    }

    fn show_terms_of_service(&mut self, text: &str) -> AuthResult<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }
}

/// Headless resolver with preset values.
#[derive(Default)]
pub struct StaticResolver {
    login_key: Option<LoginKey>,
    code: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    password: Option<String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_key(mut self, raw: &str) -> Self {
        self.login_key = Some(LoginKey::classify(raw));
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

fn preset(value: &Option<String>, what: &str) -> AuthResult<String> {
    value
        .clone()
        .ok_or_else(|| AuthError::CredentialUnavailable(what.to_string()))
}

impl CredentialResolver for StaticResolver {
    fn resolve_login_key(&mut self) -> AuthResult<LoginKey> {
        self.login_key
            .clone()
            .ok_or_else(|| AuthError::CredentialUnavailable("phone number or bot token".to_string()))
    }

    fn resolve_code(&mut self) -> AuthResult<String> {
        preset(&self.code, "verification code")
    }

    fn resolve_name(&mut self, part: NamePart) -> AuthResult<String> {
        match part {
            NamePart::First => preset(&self.first_name, "first name"),
            NamePart::Last => preset(&self.last_name, "last name"),
        }
    }

    fn resolve_password(&mut self, _hint: Option<&str>) -> AuthResult<String> {
        preset(&self.password, "two-factor password")
    }

    fn show_terms_of_service(&mut self, text: &str) -> AuthResult<()> {
        info!(length = text.len(), "Terms of service received");
        Ok(())
    }
}
