//! WebDriver-backed browser session

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::browser::{Browser, Selector};
use crate::config::BrowserOptions;
use crate::error::{BrowserError, E2eResult};

/// Browser session driven through a WebDriver server (chromedriver by default)
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Open a new session against the WebDriver server at `webdriver_url`
    pub async fn connect(webdriver_url: &str, options: &BrowserOptions) -> E2eResult<Self> {
        info!("Opening WebDriver session at {}", webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(options))
            .connect(webdriver_url)
            .await
            .map_err(BrowserError::from)?;

        Ok(Self { client })
    }
}

/// Chrome capabilities for a session
pub fn chrome_capabilities(options: &BrowserOptions) -> Map<String, Value> {
    let mut args = Vec::new();
    if options.headless {
        args.push("--headless=new".to_string());
    }
    args.extend(
        [
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
        ]
        .iter()
        .map(|a| a.to_string()),
    );
    args.push(format!(
        "--window-size={},{}",
        options.window_width, options.window_height
    ));
    args.extend(options.extra_args.iter().cloned());

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

fn locator(selector: &Selector) -> Locator<'_> {
    match selector {
        // A bare tag name is a valid CSS type selector
        Selector::Tag(name) => Locator::Css(name),
        Selector::XPath(expr) => Locator::XPath(expr),
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        debug!("Navigating to {}", url);
        self.client.goto(url).await.map_err(|e| match BrowserError::from(e) {
            BrowserError::Command(reason) => BrowserError::Navigation {
                url: url.to_string(),
                reason,
            },
            other => other,
        })
    }

    async fn find_elements(&self, selector: &Selector) -> Result<Vec<Element>, BrowserError> {
        Ok(self.client.find_all(locator(selector)).await?)
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool, BrowserError> {
        Ok(element.is_displayed().await?)
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self.client.title().await?)
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        Ok(self.client.source().await?)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        info!("Closing WebDriver session");
        Ok(self.client.clone().close().await?)
    }
}
