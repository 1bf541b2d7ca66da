//! Authorized-flag state machine using rust-fsm.
//!
//! The driver's "authorized" flag may only ever move from false to true, and
//! only when the engine reports `Ready`. Encoding it as an explicit machine
//! makes any other movement an impossible transition instead of a silent
//! overwrite.
//!
//! ## State Diagram
//!
//! ```text
//!            StepObserved
//!            ┌──────────┐
//!            ▼          │
//! ┌─────────────────────┴┐  ReadyObserved  ┌──────────────────┐
//! │     Unauthorized     │ ───────────────► │    Authorized    │ ◄─┐
//! └──────────────────────┘                  └────────┬─────────┘   │
//!                                                    │ ReadyObserved
//!                                                    └─────────────┘
//! ```

use crate::{AuthError, AuthResult, AuthorizationStep};
use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub authorization_machine(Unauthorized)

    Unauthorized => {
        // Any pre-Ready step keeps the flag down
        StepObserved => Unauthorized,
        ReadyObserved => Authorized
    },
    Authorized => {
        // Engine repeating Ready on a re-entered run
        ReadyObserved => Authorized
    }
}

pub use authorization_machine::Input as AuthorizationMachineInput;
pub use authorization_machine::State as AuthorizationMachineState;
pub use authorization_machine::StateMachine as AuthorizationMachine;

impl AuthorizationMachineInput {
    /// Machine input produced by observing a step.
    pub fn for_step(step: AuthorizationStep) -> Self {
        match step {
            AuthorizationStep::Ready => AuthorizationMachineInput::ReadyObserved,
            _ => AuthorizationMachineInput::StepObserved,
        }
    }
}

/// Build a machine seeded from a persisted flag.
pub fn machine_for_flag(authorized: bool) -> AuthorizationMachine {
    if authorized {
        AuthorizationMachine::from_state(AuthorizationMachineState::Authorized)
    } else {
        AuthorizationMachine::new()
    }
}

/// Feed a step into the machine.
///
/// Returns true when this step flipped the flag from false to true.
pub fn observe_step(machine: &mut AuthorizationMachine, step: AuthorizationStep) -> AuthResult<bool> {
    let was_authorized = *machine.state() == AuthorizationMachineState::Authorized;
    let input = AuthorizationMachineInput::for_step(step);

    machine.consume(&input).map_err(|_| {
        AuthError::InvalidStateTransition(format!(
            "Engine reported step {} while in state {:?}",
            step,
            machine.state()
        ))
    })?;

    let is_authorized = *machine.state() == AuthorizationMachineState::Authorized;
    Ok(!was_authorized && is_authorized)
}
