//! Running the driver off the async runtime.
//!
//! Prompts and engine calls block, so the driver gets a blocking worker
//! thread of its own and never stalls tasks that process engine updates.

use crate::credentials::CredentialStore;
use crate::driver::{AuthorizationDriver, RunOutcome};
use crate::resolver::CredentialResolver;
use crate::session::AuthSession;
use crate::{AuthError, AuthResult, AuthorizationStats};

/// Run `driver` to `target` on a blocking worker.
///
/// The outer result fails only if the worker itself died; the inner result is
/// the run's own outcome. The driver is handed back either way so callers can
/// inspect the flag or run again.
pub async fn run_on_worker<S, C, R>(
    mut driver: AuthorizationDriver<S, C, R>,
    target: AuthorizationStats,
) -> AuthResult<(AuthorizationDriver<S, C, R>, AuthResult<RunOutcome>)>
where
    S: AuthSession + Send + 'static,
    C: CredentialStore + 'static,
    R: CredentialResolver + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let outcome = driver.run(target);
        (driver, outcome)
    })
    .await
    .map_err(|e| AuthError::Worker(format!("Authorization task failed: {}", e)))
}
