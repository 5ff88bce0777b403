//! Readiness gate - block until the admin panel is reachable and rendered
//!
//! A server process can accept connections well before its UI has finished
//! initializing, so readiness is established in two separate steps on every
//! attempt:
//!
//! ```text
//!   Probing ──reachable──▶ Rendering ──body present──▶ Ready
//!      │                       │
//!      └──── not yet ──────────┴──▶ sleep(retry_delay) ──▶ next attempt
//!                                   (no sleep after the last attempt)
//!
//!   budget exhausted ──▶ Failed("unreachable after N retries")
//! ```
//!
//! Recoverable conditions only ever cause a retry. Errors that retrying
//! cannot fix (the probe cannot be issued, the WebDriver session is gone)
//! are returned as `Err` straight away.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::browser::{Browser, Condition, Selector};
use crate::error::{E2eError, E2eResult};
use crate::probe::{Liveness, LivenessProbe};
use crate::wait::wait_until;

/// Immutable readiness gate configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
    per_attempt_timeout: Duration,
}

impl GateConfig {
    /// Validate and build a gate configuration.
    ///
    /// `base_url` must be an absolute `http`/`https` URL with a host and
    /// `max_retries` must be at least 1.
    pub fn new(
        base_url: &str,
        max_retries: u32,
        retry_delay: Duration,
        per_attempt_timeout: Duration,
    ) -> E2eResult<Self> {
        if max_retries == 0 {
            return Err(E2eError::InvalidConfig(
                "max_retries must be at least 1".to_string(),
            ));
        }

        let parsed = url::Url::parse(base_url).map_err(|e| {
            E2eError::InvalidConfig(format!("base_url '{}' is not a valid URL: {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(E2eError::InvalidConfig(format!(
                "base_url '{}' must be an http(s) origin",
                base_url
            )));
        }

        Ok(Self {
            base_url: base_url.to_string(),
            max_retries,
            retry_delay,
            per_attempt_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        self.per_attempt_timeout
    }
}

/// Terminal result of the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GateOutcome {
    /// Reachable and rendered on the given (1-based) attempt
    Ready { attempt: u32 },
    /// Retry budget exhausted
    Failed { reason: String, attempts: u32 },
}

impl GateOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateOutcome::Ready { .. })
    }
}

/// Outcome of one readiness attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub reachable: bool,
    pub rendered: bool,
    pub error: Option<String>,
}

/// Where an attempt currently is, for log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Probing,
    Rendering,
    Ready,
    Failed,
}

impl fmt::Display for GatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GatePhase::Probing => "probing",
            GatePhase::Rendering => "rendering",
            GatePhase::Ready => "ready",
            GatePhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Backoff sleep between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Polls the target until it is usable or the retry budget runs out
pub struct ReadinessGate<P, S = TokioSleeper> {
    config: GateConfig,
    probe: P,
    sleeper: S,
}

impl<P: LivenessProbe> ReadinessGate<P, TokioSleeper> {
    pub fn new(config: GateConfig, probe: P) -> Self {
        Self::with_sleeper(config, probe, TokioSleeper)
    }
}

impl<P: LivenessProbe, S: Sleeper> ReadinessGate<P, S> {
    pub fn with_sleeper(config: GateConfig, probe: P, sleeper: S) -> Self {
        Self {
            config,
            probe,
            sleeper,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Block until the application is reachable and rendered.
    ///
    /// Returns `Ok(GateOutcome::Failed)` when the budget is exhausted and
    /// `Err` only for non-recoverable errors.
    pub async fn await_ready<B: Browser>(&self, browser: &B) -> E2eResult<GateOutcome> {
        let max = self.config.max_retries;

        for attempt in 1..=max {
            let result = self.attempt(browser).await?;

            if result.rendered {
                info!("Admin panel is {} (attempt {}/{})", GatePhase::Ready, attempt, max);
                return Ok(GateOutcome::Ready { attempt });
            }

            let phase = if result.reachable {
                GatePhase::Rendering
            } else {
                GatePhase::Probing
            };
            info!(
                "Waiting for admin panel... ({}/{}) still {}: {}",
                attempt,
                max,
                phase,
                result.error.as_deref().unwrap_or("not ready")
            );

            if attempt < max {
                self.sleeper.sleep(self.config.retry_delay).await;
            }
        }

        warn!("Readiness gate {} after {} attempts", GatePhase::Failed, max);
        Ok(GateOutcome::Failed {
            reason: format!("unreachable after {} retries", max),
            attempts: max,
        })
    }

    /// One liveness probe, followed by a render check when the probe succeeds
    async fn attempt<B: Browser>(&self, browser: &B) -> E2eResult<ProbeResult> {
        let url = self.config.base_url.as_str();

        match self.probe.probe(url).await? {
            Liveness::Reachable(status) => {
                debug!("Liveness probe answered HTTP {}", status);
            }
            Liveness::Unreachable(reason) => {
                return Ok(ProbeResult {
                    reachable: false,
                    rendered: false,
                    error: Some(reason),
                });
            }
        }

        let marker = Condition::ElementPresent(Selector::tag("body"));
        let rendered = match browser.navigate(url).await {
            Ok(()) => wait_until(browser, &marker, self.config.per_attempt_timeout).await,
            Err(e) => Err(e),
        };

        match rendered {
            Ok(true) => Ok(ProbeResult {
                reachable: true,
                rendered: true,
                error: None,
            }),
            Ok(false) => Ok(ProbeResult {
                reachable: true,
                rendered: false,
                error: Some(format!(
                    "no {} within {:?}",
                    marker, self.config.per_attempt_timeout
                )),
            }),
            Err(e) if e.is_recoverable() => Ok(ProbeResult {
                reachable: true,
                rendered: false,
                error: Some(e.to_string()),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
