//! Harness configuration
//!
//! Values come from three layers, later layers winning: built-in defaults,
//! an optional TOML file, then command-line flags (which in turn fall back to
//! `ADMIN_E2E_*` environment variables).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{E2eError, E2eResult};
use crate::gate::GateConfig;
use crate::suite::CheckContext;

/// Full harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Origin of the admin panel under test
    pub base_url: String,

    /// Readiness attempts before giving up
    pub max_retries: u32,

    /// Seconds slept between readiness attempts
    pub retry_delay_secs: u64,

    /// Upper bound in seconds for each wait-until-condition
    pub timeout_secs: u64,

    /// Timeout for a single liveness probe
    pub probe_timeout_ms: u64,

    /// Limit in seconds for the check suite, counted once the gate is ready
    pub run_timeout_secs: u64,

    /// WebDriver server to open the session against
    pub webdriver_url: String,

    pub browser: BrowserOptions,

    pub routes: RouteConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5273".to_string(),
            max_retries: 10,
            retry_delay_secs: 5,
            timeout_secs: 10,
            probe_timeout_ms: 1000,
            run_timeout_secs: 120,
            webdriver_url: "http://localhost:9515".to_string(),
            browser: BrowserOptions::default(),
            routes: RouteConfig::default(),
        }
    }
}

/// Browser session options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Extra command-line arguments passed to the browser
    pub extra_args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            extra_args: Vec::new(),
        }
    }
}

/// Routes exercised by the admin panel checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub dashboard: String,
    pub login: String,
    /// Routes whose rendered source must not contain a 404 marker
    pub sweep: Vec<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            dashboard: "/dashboard".to_string(),
            login: "/login".to_string(),
            sweep: vec!["/".to_string(), "/dashboard".to_string(), "/login".to_string()],
        }
    }
}

impl HarnessConfig {
    /// Load a configuration file, filling unspecified keys with defaults
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Validated readiness gate configuration
    pub fn gate_config(&self) -> E2eResult<GateConfig> {
        GateConfig::new(
            &self.base_url,
            self.max_retries,
            self.retry_delay(),
            self.timeout(),
        )
    }

    /// Context shared by every check case
    pub fn check_context(&self) -> E2eResult<CheckContext> {
        for route in std::iter::once(&self.routes.dashboard)
            .chain(std::iter::once(&self.routes.login))
            .chain(self.routes.sweep.iter())
        {
            if !route.starts_with('/') {
                return Err(E2eError::InvalidConfig(format!(
                    "route '{}' must start with '/'",
                    route
                )));
            }
        }

        Ok(CheckContext {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            wait_timeout: self.timeout(),
            routes: self.routes.clone(),
        })
    }
}
