//! Admin panel checks
//!
//! Each check is a predicate over a single page load. Every check navigates
//! to the page it inspects, so the order in which they run does not matter.

use async_trait::async_trait;

use crate::browser::{Browser, Condition, Selector};
use crate::error::BrowserError;
use crate::suite::{ensure, Check, CheckContext, CheckError, CheckResult, CheckSuite};
use crate::wait::wait_until;

/// The canonical admin panel checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCheck {
    HomePageTitle,
    DashboardRouteLoads,
    LoginPage,
    H1Presence,
    BodyElement,
    No404OnMainRoutes,
    FaviconLoaded,
    MetaCharsetPresent,
    PageContainsDiv,
    ContainsButtonOrLink,
}

impl AdminCheck {
    /// All checks in registration order
    pub const ALL: [AdminCheck; 10] = [
        AdminCheck::HomePageTitle,
        AdminCheck::DashboardRouteLoads,
        AdminCheck::LoginPage,
        AdminCheck::H1Presence,
        AdminCheck::BodyElement,
        AdminCheck::No404OnMainRoutes,
        AdminCheck::FaviconLoaded,
        AdminCheck::MetaCharsetPresent,
        AdminCheck::PageContainsDiv,
        AdminCheck::ContainsButtonOrLink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminCheck::HomePageTitle => "home_page_title",
            AdminCheck::DashboardRouteLoads => "dashboard_route_loads",
            AdminCheck::LoginPage => "login_page",
            AdminCheck::H1Presence => "h1_presence",
            AdminCheck::BodyElement => "body_element",
            AdminCheck::No404OnMainRoutes => "no_404_on_main_routes",
            AdminCheck::FaviconLoaded => "favicon_loaded",
            AdminCheck::MetaCharsetPresent => "meta_charset_present",
            AdminCheck::PageContainsDiv => "page_contains_div",
            AdminCheck::ContainsButtonOrLink => "contains_button_or_link",
        }
    }
}

/// Suite with every admin panel check registered
pub fn admin_panel_suite<B: Browser>() -> CheckSuite<B> {
    let mut suite = CheckSuite::new();
    for check in AdminCheck::ALL {
        suite.register(check);
    }
    suite
}

#[async_trait]
impl<B: Browser> Check<B> for AdminCheck {
    fn name(&self) -> &str {
        self.as_str()
    }

    async fn run(&self, browser: &B, ctx: &CheckContext) -> CheckResult {
        match self {
            AdminCheck::HomePageTitle => {
                browser.navigate(&ctx.home_url()).await?;
                let title = browser.title().await?;
                ensure(!title.is_empty(), "home page title is empty")
            }
            AdminCheck::DashboardRouteLoads => {
                route_reachable(browser, ctx, &ctx.routes.dashboard).await
            }
            AdminCheck::LoginPage => {
                let login = ctx.routes.login.as_str();
                browser.navigate(&ctx.url_for(login)).await?;
                require(browser, Condition::ElementPresent(Selector::tag("form")), ctx).await?;
                let url = browser.current_url().await?;
                ensure(
                    url.contains(login),
                    format!("expected current URL to contain '{}', got '{}'", login, url),
                )
            }
            AdminCheck::H1Presence => {
                let count = count_on_home(browser, ctx, &Selector::tag("h1")).await?;
                ensure(count > 0, "no h1 elements on the home page")
            }
            AdminCheck::BodyElement => {
                browser.navigate(&ctx.home_url()).await?;
                let bodies = browser.find_elements(&Selector::tag("body")).await?;
                let body = bodies
                    .first()
                    .ok_or_else(|| BrowserError::Command("no such element: body".to_string()))?;
                ensure(
                    browser.is_displayed(body).await?,
                    "body element is not displayed",
                )
            }
            AdminCheck::No404OnMainRoutes => {
                for route in &ctx.routes.sweep {
                    browser.navigate(&ctx.url_for(route)).await?;
                    require(browser, Condition::ElementPresent(Selector::tag("body")), ctx)
                        .await?;
                    let source = browser.page_source().await?.to_lowercase();
                    ensure(
                        !source.contains("404"),
                        format!("page source for '{}' contains '404'", route),
                    )?;
                }
                Ok(())
            }
            AdminCheck::FaviconLoaded => {
                let selector = Selector::xpath("//link[contains(@rel,'icon')]");
                let count = count_on_home(browser, ctx, &selector).await?;
                ensure(count > 0, "no favicon link element on the home page")
            }
            AdminCheck::MetaCharsetPresent => {
                let selector = Selector::xpath("//meta[@charset='UTF-8']");
                let count = count_on_home(browser, ctx, &selector).await?;
                ensure(count > 0, "no UTF-8 meta charset on the home page")
            }
            AdminCheck::PageContainsDiv => {
                let count = count_on_home(browser, ctx, &Selector::tag("div")).await?;
                ensure(count > 0, "no div elements on the home page")
            }
            AdminCheck::ContainsButtonOrLink => {
                browser.navigate(&ctx.home_url()).await?;
                let buttons = browser.find_elements(&Selector::tag("button")).await?.len();
                let links = browser.find_elements(&Selector::tag("a")).await?.len();
                ensure(
                    buttons + links > 0,
                    "no button or anchor elements on the home page",
                )
            }
        }
    }
}

async fn route_reachable<B: Browser>(browser: &B, ctx: &CheckContext, path: &str) -> CheckResult {
    browser.navigate(&ctx.url_for(path)).await?;
    require(browser, Condition::UrlContains(path.to_string()), ctx).await?;
    let url = browser.current_url().await?;
    ensure(
        url.contains(path),
        format!("expected current URL to contain '{}', got '{}'", path, url),
    )
}

async fn count_on_home<B: Browser>(
    browser: &B,
    ctx: &CheckContext,
    selector: &Selector,
) -> Result<usize, CheckError> {
    browser.navigate(&ctx.home_url()).await?;
    Ok(browser.find_elements(selector).await?.len())
}

/// Wait for a condition the check cannot proceed without; timing out is an
/// error, not an assertion failure
async fn require<B: Browser>(browser: &B, condition: Condition, ctx: &CheckContext) -> CheckResult {
    if wait_until(browser, &condition, ctx.wait_timeout).await? {
        Ok(())
    } else {
        Err(BrowserError::WaitTimeout {
            condition: condition.to_string(),
            timeout: ctx.wait_timeout,
        }
        .into())
    }
}
