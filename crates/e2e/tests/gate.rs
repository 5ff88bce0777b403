//! Readiness gate behavior against fake probe, browser and sleeper

mod common;

use std::sync::Arc;
use std::time::Duration;

use admin_e2e::error::{BrowserError, E2eError};
use admin_e2e::gate::{GateOutcome, ReadinessGate};
use common::{
    gate_config, healthy_admin_panel, FakeBrowser, FakeProbe, RecordingSleeper, BASE_URL,
};

fn gate(
    max_retries: u32,
    probe: &Arc<FakeProbe>,
    sleeper: &Arc<RecordingSleeper>,
) -> ReadinessGate<Arc<FakeProbe>, Arc<RecordingSleeper>> {
    ReadinessGate::with_sleeper(gate_config(max_retries), probe.clone(), sleeper.clone())
}

#[tokio::test(start_paused = true)]
async fn ready_on_first_attempt_never_sleeps() {
    for max_retries in [1, 2, 10] {
        let probe = Arc::new(FakeProbe::reachable());
        let sleeper = Arc::new(RecordingSleeper::default());
        let browser = healthy_admin_panel();

        let outcome = gate(max_retries, &probe, &sleeper)
            .await_ready(&browser)
            .await
            .unwrap();

        assert_eq!(outcome, GateOutcome::Ready { attempt: 1 });
        assert_eq!(sleeper.count(), 0);
        assert_eq!(probe.calls(), 1);
        assert_eq!(browser.navigations(), vec![BASE_URL.to_string()]);
    }
}

#[tokio::test(start_paused = true)]
async fn refused_three_times_then_ready_on_fourth() {
    let probe = Arc::new(FakeProbe::refused_then_reachable(3));
    let sleeper = Arc::new(RecordingSleeper::default());
    let browser = healthy_admin_panel();

    let outcome = gate(10, &probe, &sleeper)
        .await_ready(&browser)
        .await
        .unwrap();

    assert_eq!(outcome, GateOutcome::Ready { attempt: 4 });
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(5); 3]);
    // No attempts past the successful one
    assert_eq!(probe.calls(), 4);
    assert_eq!(browser.navigations().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn never_reachable_fails_after_budget_without_trailing_sleep() {
    let probe = Arc::new(FakeProbe::refused());
    let sleeper = Arc::new(RecordingSleeper::default());
    let browser = healthy_admin_panel();

    let outcome = gate(5, &probe, &sleeper)
        .await_ready(&browser)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        GateOutcome::Failed {
            reason: "unreachable after 5 retries".to_string(),
            attempts: 5,
        }
    );
    assert_eq!(probe.calls(), 5);
    assert_eq!(sleeper.count(), 4);
    // Liveness never passed, so the browser was never asked to navigate
    assert!(browser.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reachable_but_unrendered_is_retried() {
    let probe = Arc::new(FakeProbe::reachable());
    let sleeper = Arc::new(RecordingSleeper::default());
    let browser = healthy_admin_panel().unrendered_loads(2);

    let outcome = gate(5, &probe, &sleeper)
        .await_ready(&browser)
        .await
        .unwrap();

    assert_eq!(outcome, GateOutcome::Ready { attempt: 3 });
    assert_eq!(sleeper.count(), 2);
    assert_eq!(browser.navigations().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn render_that_never_completes_exhausts_budget() {
    let probe = Arc::new(FakeProbe::reachable());
    let sleeper = Arc::new(RecordingSleeper::default());
    let browser = healthy_admin_panel().unrendered_loads(usize::MAX);

    let outcome = gate(3, &probe, &sleeper)
        .await_ready(&browser)
        .await
        .unwrap();

    assert!(!outcome.is_ready());
    assert_eq!(sleeper.count(), 2);
    assert_eq!(browser.navigations().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn navigation_error_is_recoverable() {
    let probe = Arc::new(FakeProbe::reachable());
    let sleeper = Arc::new(RecordingSleeper::default());
    let browser = healthy_admin_panel().failing_navigation(
        BASE_URL,
        BrowserError::Navigation {
            url: BASE_URL.to_string(),
            reason: "net::ERR_CONNECTION_RESET".to_string(),
        },
    );

    let outcome = gate(2, &probe, &sleeper)
        .await_ready(&browser)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        GateOutcome::Failed {
            reason: "unreachable after 2 retries".to_string(),
            attempts: 2,
        }
    );
    assert_eq!(browser.navigations().len(), 2);
    assert_eq!(sleeper.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn lost_session_is_fatal() {
    let probe = Arc::new(FakeProbe::reachable());
    let sleeper = Arc::new(RecordingSleeper::default());
    let browser = FakeBrowser::new().session_lost();

    let err = gate(5, &probe, &sleeper)
        .await_ready(&browser)
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::Browser(BrowserError::Session(_))));
    assert_eq!(probe.calls(), 1);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn fatal_probe_error_is_not_retried() {
    let probe = Arc::new(FakeProbe::fatal("relative URL without a base"));
    let sleeper = Arc::new(RecordingSleeper::default());
    let browser = healthy_admin_panel();

    let err = gate(5, &probe, &sleeper)
        .await_ready(&browser)
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::Probe(_)));
    assert_eq!(probe.calls(), 1);
    assert_eq!(sleeper.count(), 0);
}
