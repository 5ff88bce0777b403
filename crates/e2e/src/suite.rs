//! Check suite - runs independent check cases against a ready application

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout_at;
use tracing::{debug, error, info, warn};

use crate::browser::Browser;
use crate::config::RouteConfig;
use crate::error::{BrowserError, E2eError, E2eResult};

/// Three-way outcome of a check case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "message", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    /// The check ran but its assertion did not hold
    Fail(String),
    /// The check could not complete
    Error(String),
}

/// Why a check case did not pass
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{0}")]
    Assertion(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

pub type CheckResult = Result<(), CheckError>;

/// Turn a false condition into an assertion failure
pub fn ensure(condition: bool, message: impl Into<String>) -> CheckResult {
    if condition {
        Ok(())
    } else {
        Err(CheckError::Assertion(message.into()))
    }
}

/// Everything a check needs besides the browser
#[derive(Debug, Clone)]
pub struct CheckContext {
    /// Origin of the application, without a trailing slash
    pub base_url: String,
    /// Upper bound for each wait-until-condition inside a check
    pub wait_timeout: Duration,
    pub routes: RouteConfig,
}

impl CheckContext {
    /// Absolute URL for a path on the application
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn home_url(&self) -> String {
        self.url_for("/")
    }
}

/// A named, independent verification.
///
/// Cases must not rely on the state left behind by other cases: any case
/// that cares about the current page navigates there itself.
#[async_trait]
pub trait Check<B: Browser>: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, browser: &B, ctx: &CheckContext) -> CheckResult;
}

/// A registered case
pub type CheckCase<B> = Box<dyn Check<B>>;

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub duration_ms: u64,
}

/// Aggregate result of a suite run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    /// Names of failed cases, in registration order
    pub failed: Vec<String>,
    /// Names of errored cases, in registration order
    pub errored: Vec<String>,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    fn record(&mut self, result: CaseResult) {
        self.total += 1;
        match &result.verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail(_) => self.failed.push(result.name.clone()),
            Verdict::Error(_) => self.errored.push(result.name.clone()),
        }
        self.results.push(result);
    }

    /// True when every case passed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.errored.is_empty()
    }
}

/// Ordered registry of check cases
pub struct CheckSuite<B: Browser> {
    cases: Vec<CheckCase<B>>,
}

impl<B: Browser> Default for CheckSuite<B> {
    fn default() -> Self {
        Self { cases: Vec::new() }
    }
}

impl<B: Browser> CheckSuite<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cases(cases: Vec<CheckCase<B>>) -> Self {
        Self { cases }
    }

    /// Append a case; cases run in registration order
    pub fn register(&mut self, case: impl Check<B> + 'static) -> &mut Self {
        self.cases.push(Box::new(case));
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.name()).collect()
    }

    /// Keep only the named cases, preserving registration order
    pub fn retain_named(&mut self, names: &[String]) -> E2eResult<()> {
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.cases.iter().any(|c| c.name() == n.as_str()))
        {
            return Err(E2eError::UnknownCheck(unknown.clone()));
        }
        self.cases.retain(|c| names.iter().any(|n| n == c.name()));
        Ok(())
    }

    /// Run every case once, in order.
    ///
    /// A failing, erroring or panicking case never stops the cases after it.
    pub async fn run(&self, browser: &B, ctx: &CheckContext) -> SuiteReport {
        self.run_until(browser, ctx, None).await
    }

    /// Run every case, giving up on cases still running at `deadline`.
    ///
    /// A case interrupted by the deadline, and every case after it, is
    /// recorded as an error so the report still accounts for the whole suite.
    pub async fn run_until(
        &self,
        browser: &B,
        ctx: &CheckContext,
        deadline: Option<tokio::time::Instant>,
    ) -> SuiteReport {
        let start = Instant::now();
        let mut report = SuiteReport::default();

        if self.cases.is_empty() {
            warn!("No checks registered");
        }
        info!("Running {} check(s)...", self.cases.len());

        for case in &self.cases {
            let name = case.name();
            let case_start = Instant::now();
            debug!("Running check: {}", name);

            let guarded = AssertUnwindSafe(case.run(browser, ctx)).catch_unwind();
            let outcome = match deadline {
                Some(deadline) if tokio::time::Instant::now() >= deadline => None,
                Some(deadline) => timeout_at(deadline, guarded).await.ok(),
                None => Some(guarded.await),
            };
            let verdict = match outcome {
                Some(Ok(Ok(()))) => Verdict::Pass,
                Some(Ok(Err(CheckError::Assertion(msg)))) => Verdict::Fail(msg),
                Some(Ok(Err(CheckError::Browser(e)))) => {
                    Verdict::Error(format!("{} could not complete: {}", name, e))
                }
                Some(Err(panic)) => Verdict::Error(format!(
                    "{} panicked: {}",
                    name,
                    panic_message(panic.as_ref())
                )),
                None => Verdict::Error(format!("{} stopped: run limit exceeded", name)),
            };
            let duration_ms = case_start.elapsed().as_millis() as u64;

            match &verdict {
                Verdict::Pass => info!("✓ {} ({} ms)", name, duration_ms),
                Verdict::Fail(msg) => error!("✗ {} - {}", name, msg),
                Verdict::Error(msg) => error!("✗ {} - {}", name, msg),
            }

            report.record(CaseResult {
                name: name.to_string(),
                verdict,
                duration_ms,
            });
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Check results: {} passed, {} failed, {} errored ({} ms)",
            report.passed,
            report.failed.len(),
            report.errored.len(),
            report.duration_ms
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
