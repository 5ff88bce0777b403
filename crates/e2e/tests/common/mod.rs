//! In-memory fakes for the browser, probe and sleeper capabilities

#![allow(dead_code)]

use admin_e2e::browser::{Browser, Selector};
use admin_e2e::config::HarnessConfig;
use admin_e2e::error::{BrowserError, E2eError, E2eResult};
use admin_e2e::gate::{GateConfig, Sleeper};
use admin_e2e::probe::{Liveness, LivenessProbe};
use admin_e2e::suite::CheckContext;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub const BASE_URL: &str = "http://localhost:5273";

fn key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub displayed: bool,
}

/// A page served by [`FakeBrowser`]
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    title: String,
    source: String,
    elements: HashMap<String, Vec<FakeElement>>,
    redirect: Option<String>,
}

impl FakePage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            source: format!("<html><head><title>{}</title></head><body></body></html>", title),
            ..Default::default()
        }
        .with(Selector::tag("body"), 1)
    }

    pub fn with(mut self, selector: Selector, count: usize) -> Self {
        self.elements
            .insert(selector.to_string(), vec![FakeElement { displayed: true }; count]);
        self
    }

    pub fn without(mut self, selector: Selector) -> Self {
        self.elements.remove(&selector.to_string());
        self
    }

    pub fn hidden(mut self, selector: Selector) -> Self {
        self.elements
            .insert(selector.to_string(), vec![FakeElement { displayed: false }]);
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn redirect_to(mut self, url: &str) -> Self {
        self.redirect = Some(url.to_string());
        self
    }
}

#[derive(Default)]
struct State {
    pages: HashMap<String, FakePage>,
    current_page: Option<String>,
    current_url: Option<String>,
    rendered: bool,
    unrendered_loads: usize,
    failing: HashMap<String, BrowserError>,
    failing_calls: HashMap<&'static str, BrowserError>,
    session_lost: bool,
    navigations: Vec<String>,
    close_calls: usize,
    close_error: Option<BrowserError>,
}

/// Scriptable browser session
#[derive(Default)]
pub struct FakeBrowser {
    state: Mutex<State>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.state.lock().pages.insert(key(url), page);
        self
    }

    /// The next `n` navigations load a blank, unrendered document
    pub fn unrendered_loads(self, n: usize) -> Self {
        self.state.lock().unrendered_loads = n;
        self
    }

    pub fn failing_navigation(self, url: &str, err: BrowserError) -> Self {
        self.state.lock().failing.insert(key(url), err);
        self
    }

    /// Make one capability call (`title`, `page_source`, ...) always fail
    pub fn failing_call(self, call: &'static str, err: BrowserError) -> Self {
        self.state.lock().failing_calls.insert(call, err);
        self
    }

    pub fn session_lost(self) -> Self {
        self.state.lock().session_lost = true;
        self
    }

    pub fn close_error(self, err: BrowserError) -> Self {
        self.state.lock().close_error = Some(err);
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }

    fn check(&self, call: &'static str) -> Result<(), BrowserError> {
        let state = self.state.lock();
        if state.session_lost {
            return Err(BrowserError::Session("session deleted".to_string()));
        }
        match state.failing_calls.get(call) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn current(&self) -> Option<FakePage> {
        let state = self.state.lock();
        if !state.rendered {
            return None;
        }
        state
            .current_page
            .as_ref()
            .and_then(|k| state.pages.get(k))
            .cloned()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.check("navigate")?;
        let mut state = self.state.lock();
        state.navigations.push(url.to_string());

        if let Some(err) = state.failing.get(&key(url)) {
            return Err(err.clone());
        }

        let redirect = state.pages.get(&key(url)).and_then(|p| p.redirect.clone());
        let landed = redirect.unwrap_or_else(|| url.to_string());

        let rendered = state.unrendered_loads == 0;
        if !rendered {
            state.unrendered_loads -= 1;
        }
        state.rendered = rendered;
        state.current_page = Some(key(&landed));
        state.current_url = Some(landed);
        Ok(())
    }

    async fn find_elements(&self, selector: &Selector) -> Result<Vec<FakeElement>, BrowserError> {
        self.check("find_elements")?;
        Ok(self
            .current()
            .and_then(|p| p.elements.get(&selector.to_string()).cloned())
            .unwrap_or_default())
    }

    async fn is_displayed(&self, element: &FakeElement) -> Result<bool, BrowserError> {
        self.check("is_displayed")?;
        Ok(element.displayed)
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        self.check("current_url")?;
        Ok(self
            .state
            .lock()
            .current_url
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn title(&self) -> Result<String, BrowserError> {
        self.check("title")?;
        Ok(self.current().map(|p| p.title).unwrap_or_default())
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        self.check("page_source")?;
        Ok(self
            .current()
            .map(|p| p.source)
            .unwrap_or_else(|| "<html><head></head><body></body></html>".to_string()))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let mut state = self.state.lock();
        state.close_calls += 1;
        match &state.close_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Home page of a healthy admin panel
pub fn healthy_home() -> FakePage {
    FakePage::new("Admin Panel")
        .with(Selector::tag("h1"), 1)
        .with(Selector::tag("div"), 12)
        .with(Selector::tag("button"), 2)
        .with(Selector::tag("a"), 5)
        .with(Selector::xpath("//link[contains(@rel,'icon')]"), 1)
        .with(Selector::xpath("//meta[@charset='UTF-8']"), 1)
}

/// An admin panel on which every canonical check passes
pub fn healthy_admin_panel() -> FakeBrowser {
    admin_panel_with_home(healthy_home())
}

pub fn admin_panel_with_home(home: FakePage) -> FakeBrowser {
    FakeBrowser::new()
        .page(BASE_URL, home)
        .page(&format!("{}/dashboard", BASE_URL), FakePage::new("Dashboard"))
        .page(
            &format!("{}/login", BASE_URL),
            FakePage::new("Sign in").with(Selector::tag("form"), 1),
        )
}

/// Probe answering from a script, repeating the last answer once exhausted
pub struct FakeProbe {
    script: Mutex<VecDeque<E2eResult<Liveness>>>,
    last: Liveness,
    calls: Mutex<usize>,
}

impl FakeProbe {
    pub fn always(liveness: Liveness) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: liveness,
            calls: Mutex::new(0),
        }
    }

    pub fn reachable() -> Self {
        Self::always(Liveness::Reachable(200))
    }

    pub fn refused() -> Self {
        Self::always(Liveness::Unreachable("connection refused".to_string()))
    }

    /// Refuse `n` times, then answer 200
    pub fn refused_then_reachable(n: usize) -> Self {
        let probe = Self::reachable();
        {
            let mut script = probe.script.lock();
            for _ in 0..n {
                script.push_back(Ok(Liveness::Unreachable("connection refused".to_string())));
            }
        }
        probe
    }

    pub fn fatal(message: &str) -> Self {
        let probe = Self::reachable();
        probe
            .script
            .lock()
            .push_back(Err(E2eError::Probe(message.to_string())));
        probe
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl LivenessProbe for FakeProbe {
    async fn probe(&self, _url: &str) -> E2eResult<Liveness> {
        *self.calls.lock() += 1;
        match self.script.lock().pop_front() {
            Some(answer) => answer,
            None => Ok(self.last.clone()),
        }
    }
}

/// Sleeper that records instead of sleeping
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn count(&self) -> usize {
        self.sleeps.lock().len()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

pub fn gate_config(max_retries: u32) -> GateConfig {
    GateConfig::new(
        BASE_URL,
        max_retries,
        Duration::from_secs(5),
        Duration::from_millis(500),
    )
    .unwrap()
}

pub fn check_context() -> CheckContext {
    HarnessConfig {
        timeout_secs: 2,
        ..Default::default()
    }
    .check_context()
    .unwrap()
}
