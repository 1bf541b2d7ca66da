//! Authorization driver for a stateful authorization engine.
//!
//! This crate provides:
//! - The authorization loop that answers each engine state with one step
//! - Depth ordering of states and the caller's stopping criterion
//! - An explicit FSM guarding the authorized flag
//! - Credential storage and pluggable credential resolvers (terminal, headless)
//! - Session configuration loading and engine parameter derivation
//! - A helper for running the blocking loop on a tokio worker

mod auth_fsm;
mod config;
mod credentials;
mod driver;
mod error;
mod resolver;
mod session;
mod state;
mod worker;

pub use auth_fsm::authorization_machine;
pub use auth_fsm::{AuthorizationMachine, AuthorizationMachineInput, AuthorizationMachineState};
pub use config::{SessionConfig, TdlibParameters, DEFAULT_DEVICE_MODEL, DEFAULT_LANG_CODE};
pub use credentials::{
    CodeCallback, CodeSource, CredentialStore, LoginKey, NamePart, SessionCredentials,
};
pub use driver::{AuthorizationDriver, RunOutcome, TransitionCallback, TransitionEvent};
pub use error::{AuthError, AuthResult, EngineError, EngineResult};
pub use resolver::{
    password_prompt, CredentialResolver, MaskedReader, StaticResolver, TerminalResolver,
};
pub use session::{AuthSession, SignIn};
pub use state::{AuthorizationState, AuthorizationStats, AuthorizationStep};
pub use worker::run_on_worker;
