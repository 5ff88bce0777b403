//! Browser capability consumed by the readiness gate and the check suite
//!
//! The gate and the suite never talk to WebDriver directly; they are generic
//! over [`Browser`] so a single session can be handed from one to the other
//! and so both can be exercised against an in-memory fake.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::BrowserError;

/// How an element is located on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Element tag name, e.g. `body` or `h1`
    Tag(String),
    /// XPath expression, e.g. `//meta[@charset='UTF-8']`
    XPath(String),
}

impl Selector {
    pub fn tag(name: impl Into<String>) -> Self {
        Selector::Tag(name.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Selector::XPath(expr.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(name) => write!(f, "tag:{}", name),
            Selector::XPath(expr) => write!(f, "xpath:{}", expr),
        }
    }
}

/// A condition polled by [`crate::wait::wait_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// At least one element matches the selector
    ElementPresent(Selector),
    /// The current URL contains the given fragment
    UrlContains(String),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::ElementPresent(selector) => write!(f, "presence of {}", selector),
            Condition::UrlContains(fragment) => write!(f, "url containing '{}'", fragment),
        }
    }
}

/// A live browser session
#[async_trait]
pub trait Browser: Send + Sync {
    /// Handle to an element found on the current page
    type Element: Send + Sync;

    /// Load an absolute URL in the session
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// All elements on the current page matching the selector
    async fn find_elements(&self, selector: &Selector) -> Result<Vec<Self::Element>, BrowserError>;

    /// Whether the element is rendered with a non-empty layout box
    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    async fn page_source(&self) -> Result<String, BrowserError>;

    /// End the session. Called exactly once by the owner of the session.
    async fn close(&self) -> Result<(), BrowserError>;
}

#[async_trait]
impl<B: Browser + ?Sized> Browser for Arc<B> {
    type Element = B::Element;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        (**self).navigate(url).await
    }

    async fn find_elements(&self, selector: &Selector) -> Result<Vec<Self::Element>, BrowserError> {
        (**self).find_elements(selector).await
    }

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, BrowserError> {
        (**self).is_displayed(element).await
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        (**self).current_url().await
    }

    async fn title(&self) -> Result<String, BrowserError> {
        (**self).title().await
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        (**self).page_source().await
    }

    async fn close(&self) -> Result<(), BrowserError> {
        (**self).close().await
    }
}
