//! Main runner that sequences the readiness gate and the check suite

use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::browser::Browser;
use crate::error::E2eResult;
use crate::gate::{GateOutcome, ReadinessGate, Sleeper, TokioSleeper};
use crate::probe::LivenessProbe;
use crate::suite::{CheckContext, CheckSuite, SuiteReport};

/// Process exit status when every check passed
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit status when at least one check failed or errored
pub const EXIT_CHECKS_FAILED: i32 = 1;
/// Process exit status when the application never became ready
pub const EXIT_NOT_READY: i32 = 2;
/// Process exit status for harness errors (config, WebDriver, fatal gate error)
pub const EXIT_HARNESS_ERROR: i32 = 3;

/// Result of a full harness run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The gate passed and every registered check ran
    Completed(SuiteReport),
    /// The gate exhausted its budget; no checks ran
    NotReady { reason: String, attempts: u32 },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(report) if report.is_success() => EXIT_SUCCESS,
            RunOutcome::Completed(_) => EXIT_CHECKS_FAILED,
            RunOutcome::NotReady { .. } => EXIT_NOT_READY,
        }
    }
}

/// Readiness gate plus check context, run against one browser session
pub struct TestRunner<P, S = TokioSleeper> {
    gate: ReadinessGate<P, S>,
    ctx: CheckContext,
    run_timeout: Duration,
}

impl<P: LivenessProbe, S: Sleeper> TestRunner<P, S> {
    pub fn new(gate: ReadinessGate<P, S>, ctx: CheckContext, run_timeout: Duration) -> Self {
        Self {
            gate,
            ctx,
            run_timeout,
        }
    }

    /// Wait for readiness, then run the suite against the same session.
    ///
    /// The gate is bounded by its own retry budget. The run limit starts once
    /// the application is ready and bounds the suite only.
    pub async fn run<B: Browser>(&self, browser: &B, suite: &CheckSuite<B>) -> E2eResult<RunOutcome> {
        info!("Waiting for admin panel at {} to be ready...", self.gate.config().base_url());

        match self.gate.await_ready(browser).await? {
            GateOutcome::Ready { attempt } => {
                info!("Admin panel is ready after {} attempt(s)", attempt);
                let deadline = Instant::now() + self.run_timeout;
                let report = suite.run_until(browser, &self.ctx, Some(deadline)).await;
                Ok(RunOutcome::Completed(report))
            }
            GateOutcome::Failed { reason, attempts } => {
                error!("Application not reachable after {} retries", attempts);
                Ok(RunOutcome::NotReady { reason, attempts })
            }
        }
    }

    /// [`TestRunner::run`], closing the session on every exit path.
    ///
    /// A failure to close the session is logged and never replaces the
    /// run's own result.
    pub async fn run_and_close<B: Browser>(
        &self,
        browser: B,
        suite: &CheckSuite<B>,
    ) -> E2eResult<RunOutcome> {
        let result = self.run(&browser, suite).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        result
    }
}
