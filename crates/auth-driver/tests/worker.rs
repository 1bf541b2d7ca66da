//! Running the driver on a blocking tokio worker.

mod common;

use auth_driver::{
    run_on_worker, AuthError, AuthorizationDriver, AuthorizationState, AuthorizationStats,
    AuthorizationStep, RunOutcome, SessionCredentials, StaticResolver,
};
use common::{config, Call, ScriptedSession};

#[tokio::test]
async fn test_worker_runs_to_ready() {
    let session = ScriptedSession::new(vec![
        AuthorizationState::WaitTdlibParameters,
        AuthorizationState::WaitEncryptionKey { is_encrypted: false },
        AuthorizationState::WaitPhoneNumber,
        AuthorizationState::Ready,
    ]);
    let credentials = SessionCredentials::new().with_bot_token("123456:ABCDEF");
    let driver = AuthorizationDriver::new(session, config(), credentials, StaticResolver::new());

    let (driver, outcome) = run_on_worker(driver, AuthorizationStats::default())
        .await
        .unwrap();

    assert_eq!(outcome.unwrap(), RunOutcome::Authorized);
    assert!(driver.is_authorized());
    assert_eq!(
        driver.session().calls().last(),
        Some(&Call::CheckBotToken("123456:ABCDEF".to_string()))
    );
}

#[tokio::test]
async fn test_worker_returns_driver_after_failed_run() {
    let session = ScriptedSession::new(vec![AuthorizationState::WaitPhoneNumber]);
    let driver = AuthorizationDriver::new(
        session,
        config(),
        SessionCredentials::new(),
        StaticResolver::new(),
    );

    let (driver, outcome) = run_on_worker(driver, AuthorizationStats::default())
        .await
        .unwrap();

    assert!(matches!(outcome, Err(AuthError::CredentialUnavailable(_))));
    assert!(!driver.is_authorized());
}

#[tokio::test]
async fn test_worker_resumes_from_early_stop() {
    let session = ScriptedSession::new(vec![
        AuthorizationState::WaitTdlibParameters,
        AuthorizationState::WaitEncryptionKey { is_encrypted: true },
        AuthorizationState::Ready,
    ]);
    let driver = AuthorizationDriver::new(
        session,
        config(),
        SessionCredentials::new().with_encryption_key("k"),
        StaticResolver::new(),
    );

    let target = AuthorizationStats::new(AuthorizationStep::TdlibParameters);
    let (driver, outcome) = run_on_worker(driver, target).await.unwrap();
    assert_eq!(
        outcome.unwrap(),
        RunOutcome::TargetReached(AuthorizationStep::TdlibParameters)
    );

    let (driver, outcome) = run_on_worker(driver, AuthorizationStats::default())
        .await
        .unwrap();
    assert_eq!(outcome.unwrap(), RunOutcome::Authorized);
    assert_eq!(driver.session().calls().len(), 2);
}
