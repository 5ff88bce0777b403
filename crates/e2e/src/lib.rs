//! Admin Panel E2E Verification
//!
//! This crate drives a real browser (through a WebDriver server) against a
//! running admin panel and verifies that it:
//! - is reachable over HTTP and renders a document,
//! - renders the expected structural elements,
//! - serves its primary routes without a 404.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Runner (admin-e2e)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── ReadinessGate::await_ready(browser) -> GateOutcome   │
//! │    │     ├── LivenessProbe (HTTP GET, [200, 400))           │
//! │    │     └── navigate + wait_until(body present)            │
//! │    └── CheckSuite::run(browser, ctx) -> SuiteReport         │
//! │          └── Check cases, each isolated: Pass|Fail|Error    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Browser capability                                         │
//! │    └── WebDriverBrowser (fantoccini)                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod checks;
pub mod config;
pub mod error;
pub mod gate;
pub mod output;
pub mod probe;
pub mod runner;
pub mod suite;
pub mod wait;
pub mod webdriver;

pub use browser::{Browser, Condition, Selector};
pub use checks::{admin_panel_suite, AdminCheck};
pub use config::HarnessConfig;
pub use error::{BrowserError, E2eError, E2eResult};
pub use gate::{GateConfig, GateOutcome, ReadinessGate};
pub use runner::{RunOutcome, TestRunner};
pub use suite::{Check, CheckContext, CheckSuite, SuiteReport, Verdict};
