mod common;

use std::{panic::AssertUnwindSafe, time::Duration};

use common::{human, not_human, short_timeout, FlowSetup, WALLET};
use futures::FutureExt;
use pretty_assertions::assert_eq;
use verification_client::{
    activity::Severity,
    api::{mock::MockBehavior, VerifyError},
    flow::{FlowConfig, FlowError},
    notice::Notice,
    state::{FlowState, Target, VerificationOutcome},
    wallet::{mock::MockWalletProvider, WalletError},
};

#[tokio::test]
async fn test_connect_without_provider_raises_install_notice() {
    let setup = FlowSetup::new(None, human("u1"));

    let result = setup.flow.connect_wallet().await;

    assert!(matches!(result, Err(FlowError::WalletUnavailable)));
    assert_eq!(setup.notifier.notices(), vec![Notice::InstallWallet]);
    assert!(Notice::InstallWallet.is_blocking());

    let state = setup.flow.state();
    assert!(state.session.is_none());
    assert_eq!(state.connected, FlowState::default().connected);
}

#[tokio::test]
async fn test_connect_sets_session_and_display_address() {
    let setup = FlowSetup::connected(human("u1"));

    let session = setup.flow.connect_wallet().await.unwrap();

    assert_eq!(session.raw_address(), WALLET);
    assert_eq!(session.display_address(), "0xde...eef");

    let state = setup.flow.state();
    assert_eq!(state.session, Some(session));
    let last = state.log.last().unwrap();
    assert_eq!(last.severity, Severity::Success);
    assert_eq!(last.message, format!("Wallet connected: {WALLET}"));
}

#[tokio::test]
async fn test_rejected_connection_leaves_session_untouched() {
    let setup = FlowSetup::new(
        Some(MockWalletProvider::failing(WalletError::Rejected(
            "User rejected the request".to_string(),
        ))),
        human("u1"),
    );

    let result = setup.flow.connect_wallet().await;

    assert!(matches!(
        result,
        Err(FlowError::Wallet(WalletError::Rejected(_)))
    ));
    assert!(setup.flow.state().session.is_none());
    assert_eq!(setup.wallet_calls(), 1);
    assert!(matches!(
        setup.notifier.notices().as_slice(),
        [Notice::WalletConnectionFailed { .. }]
    ));
    assert_eq!(
        setup.flow.state().log.last().unwrap().severity,
        Severity::Error
    );
}

#[tokio::test]
async fn test_connect_with_no_accounts_fails() {
    let setup = FlowSetup::new(Some(MockWalletProvider::with_accounts(&[])), human("u1"));

    let result = setup.flow.connect_wallet().await;

    assert!(matches!(result, Err(FlowError::Wallet(WalletError::NoAccounts))));
    assert!(setup.flow.state().session.is_none());
}

#[tokio::test]
async fn test_connect_takes_first_account() {
    let other = "0x1111111111111111111111111111111111111111";
    let setup = FlowSetup::new(
        Some(MockWalletProvider::with_accounts(&[WALLET, other])),
        human("u1"),
    );

    let session = setup.flow.connect_wallet().await.unwrap();
    assert_eq!(session.raw_address(), WALLET);
}

#[tokio::test]
async fn test_reconnect_keeps_existing_session() {
    let setup = FlowSetup::connected(human("u1"));

    let first = setup.flow.connect_wallet().await.unwrap();
    let second = setup.flow.connect_wallet().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(setup.flow.state().session, Some(first));
}

#[tokio::test]
async fn test_verify_without_wallet_sends_nothing() {
    let setup = FlowSetup::connected(human("u1"));

    let result = setup.flow.verify_connected().await;

    assert!(matches!(result, Err(FlowError::WalletNotConnected)));
    assert_eq!(setup.api.calls(), 0);
    assert_eq!(setup.notifier.count(&Notice::ConnectWalletFirst), 1);

    let state = setup.flow.state();
    assert!(!state.connected.loading);
    assert_eq!(state.connected.outcome, VerificationOutcome::NotChecked);
    assert_eq!(state.log.last().unwrap().message, "Wallet not connected");
}

#[tokio::test]
async fn test_verify_human_wallet() {
    let setup = FlowSetup::connected(human("u1"));
    setup.flow.connect_wallet().await.unwrap();
    assert!(!setup.flow.state().is_loading());

    let outcome = setup.flow.verify_connected().await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.user_id(), Some("u1"));
    assert_eq!(setup.api.calls(), 1);

    let state = setup.flow.state();
    assert!(!state.connected.loading);
    assert_eq!(state.connected.outcome, outcome);
    assert_eq!(state.connected.address.as_deref(), Some(WALLET));
    assert_eq!(
        setup.notifier.count(&Notice::VerifiedHuman {
            target: Target::Connected
        }),
        1
    );
    assert_eq!(
        state.log.last().unwrap().message,
        "Wallet verified as human!"
    );
}

#[tokio::test]
async fn test_verify_not_human_wallet() {
    let setup = FlowSetup::connected(not_human());
    setup.flow.connect_wallet().await.unwrap();

    let outcome = setup.flow.verify_connected().await.unwrap();

    assert!(matches!(outcome, VerificationOutcome::NotHuman { .. }));
    assert!(!outcome.is_success());
    assert_eq!(outcome.user_id(), None);
    assert_eq!(
        setup.notifier.count(&Notice::NotHuman {
            target: Target::Connected
        }),
        1
    );

    let last = setup.flow.state().log.last().unwrap().clone();
    assert_eq!(last.severity, Severity::Warning);
}

#[tokio::test]
async fn test_error_status_marks_check_failed() {
    let setup = FlowSetup::connected(MockBehavior::Status(
        reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    ));
    setup.flow.connect_wallet().await.unwrap();

    let result = setup.flow.verify_connected().await;

    assert!(matches!(
        result,
        Err(FlowError::Verify(VerifyError::Status { .. }))
    ));

    let state = setup.flow.state();
    assert!(!state.connected.loading);
    assert!(matches!(
        state.connected.outcome,
        VerificationOutcome::Failed { .. }
    ));
    assert_eq!(setup.notifier.count(&Notice::VerificationFailed), 1);
    let last = state.log.last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.message.starts_with("API Error: "));
}

#[tokio::test]
async fn test_hanging_request_times_out_and_clears_loading() {
    let setup = FlowSetup::with_config(
        Some(MockWalletProvider::with_accounts(&[WALLET])),
        MockBehavior::Hang,
        short_timeout(),
    );
    setup.flow.connect_wallet().await.unwrap();

    let result = setup.flow.verify_connected().await;

    assert!(matches!(
        result,
        Err(FlowError::Verify(VerifyError::Timeout(_)))
    ));
    let state = setup.flow.state();
    assert!(!state.connected.loading);
    assert!(matches!(
        state.connected.outcome,
        VerificationOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn test_panicking_request_clears_loading() {
    let setup = FlowSetup::connected(MockBehavior::Panic);
    setup.flow.connect_wallet().await.unwrap();

    let result = AssertUnwindSafe(setup.flow.verify_connected())
        .catch_unwind()
        .await;

    assert!(result.is_err());
    let state = setup.flow.state();
    assert!(!state.connected.loading);
    assert!(matches!(
        state.connected.outcome,
        VerificationOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn test_concurrent_verifications_issue_one_request() {
    let setup = FlowSetup::connected(MockBehavior::Delayed(
        Duration::from_millis(200),
        common_types::VerificationResult::new(Some(WALLET.to_string()), true, None),
    ));
    setup.flow.connect_wallet().await.unwrap();

    let (first, second) = tokio::join!(
        setup.flow.verify_connected(),
        setup.flow.verify_connected()
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(FlowError::VerificationInFlight)));
    assert_eq!(setup.api.calls(), 1);
    assert_eq!(
        setup.notifier.count(&Notice::VerificationInProgress {
            target: Target::Connected
        }),
        1
    );
    assert!(!setup.flow.state().connected.loading);
}

#[tokio::test]
async fn test_blank_arbitrary_address_sends_nothing() {
    let setup = FlowSetup::new(None, human("u1"));

    let result = setup.flow.verify_address("   ").await;

    assert!(matches!(result, Err(FlowError::EmptyAddress)));
    assert_eq!(setup.api.calls(), 0);
    assert_eq!(setup.notifier.count(&Notice::EnterAddress), 1);
}

#[tokio::test]
async fn test_arbitrary_check_uses_its_own_slot() {
    let setup = FlowSetup::new(None, human("u2"));

    let outcome = setup.flow.verify_address(&format!("  {WALLET}  ")).await.unwrap();

    assert_eq!(outcome.user_id(), Some("u2"));
    let state = setup.flow.state();
    assert_eq!(state.arbitrary.address.as_deref(), Some(WALLET));
    assert_eq!(state.arbitrary.outcome, outcome);
    assert_eq!(state.connected.outcome, VerificationOutcome::NotChecked);
    assert!(state.session.is_none());
    assert_eq!(
        setup.notifier.count(&Notice::VerifiedHuman {
            target: Target::Arbitrary
        }),
        1
    );
}

#[tokio::test]
async fn test_activity_log_is_bounded() {
    let setup = FlowSetup::with_config(
        Some(MockWalletProvider::with_accounts(&[WALLET])),
        human("u1"),
        FlowConfig {
            log_capacity: 3,
            ..FlowConfig::default()
        },
    );

    for _ in 0..4 {
        let _ = setup.flow.verify_connected().await;
    }

    let state = setup.flow.state();
    assert_eq!(state.log.len(), 3);
    assert_eq!(state.log.capacity(), 3);
    assert!(state
        .log
        .entries()
        .all(|entry| entry.message == "Wallet not connected"));
}
