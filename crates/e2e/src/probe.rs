//! Liveness probing - is anything answering HTTP at the target origin?

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Outcome of a single liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    /// The server answered with a status in `[200, 400)`
    Reachable(u16),
    /// Nothing usable answered yet; worth retrying
    Unreachable(String),
}

impl Liveness {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Liveness::Reachable(_))
    }
}

/// Network-level reachability check.
///
/// Conditions that may clear up on their own (refused connections, timeouts,
/// error statuses) come back as [`Liveness::Unreachable`]. `Err` is reserved
/// for failures no amount of retrying will fix.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self, url: &str) -> E2eResult<Liveness>;
}

#[async_trait]
impl<P: LivenessProbe + ?Sized> LivenessProbe for Arc<P> {
    async fn probe(&self, url: &str) -> E2eResult<Liveness> {
        (**self).probe(url).await
    }
}

/// Liveness probe issuing a bounded-timeout `GET`
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> E2eResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn probe(&self, url: &str) -> E2eResult<Liveness> {
        match self.client.get(url).send().await {
            Ok(resp) => Ok(classify_status(resp.status().as_u16())),
            Err(e) if e.is_builder() => Err(E2eError::Probe(e.to_string())),
            Err(e) => {
                // Connection refused is expected while the server is starting
                if !e.is_connect() && !e.is_timeout() {
                    debug!("Liveness probe error: {}", e);
                }
                Ok(Liveness::Unreachable(e.to_string()))
            }
        }
    }
}

/// Map an HTTP status to a liveness verdict
pub fn classify_status(status: u16) -> Liveness {
    if (200..400).contains(&status) {
        Liveness::Reachable(status)
    } else {
        Liveness::Unreachable(format!("HTTP {}", status))
    }
}
