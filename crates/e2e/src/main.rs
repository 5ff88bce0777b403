//! admin-e2e - runs the admin panel checks against a live instance
//!
//! Exit status: 0 all checks passed, 1 a check failed or errored,
//! 2 the admin panel never became ready, 3 harness error.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use admin_e2e::output::{self, OutputFormat};
use admin_e2e::probe::HttpProbe;
use admin_e2e::runner::{RunOutcome, EXIT_HARNESS_ERROR, EXIT_SUCCESS};
use admin_e2e::webdriver::WebDriverBrowser;
use admin_e2e::{admin_panel_suite, E2eResult, HarnessConfig, ReadinessGate, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "admin-e2e")]
#[command(about = "E2E verification runner for the admin panel")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ADMIN_E2E_CONFIG")]
    config: Option<PathBuf>,

    /// Origin of the admin panel under test
    #[arg(long, env = "ADMIN_E2E_BASE_URL")]
    base_url: Option<String>,

    /// Readiness attempts before giving up
    #[arg(long, env = "ADMIN_E2E_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// Seconds between readiness attempts
    #[arg(long, env = "ADMIN_E2E_RETRY_DELAY")]
    retry_delay: Option<u64>,

    /// Upper bound in seconds for each wait
    #[arg(long, env = "ADMIN_E2E_TIMEOUT")]
    timeout: Option<u64>,

    /// Liveness probe timeout in milliseconds
    #[arg(long)]
    probe_timeout_ms: Option<u64>,

    /// Limit in seconds for the check suite, counted from readiness
    #[arg(long)]
    run_timeout: Option<u64>,

    /// WebDriver server address
    #[arg(long, env = "ADMIN_E2E_WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Run only the named check (repeatable)
    #[arg(long = "check", value_name = "NAME")]
    checks: Vec<String>,

    /// List the registered checks and exit
    #[arg(long)]
    list: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> E2eResult<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(retry_delay) = self.retry_delay {
            config.retry_delay_secs = retry_delay;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(probe_timeout_ms) = self.probe_timeout_ms {
            config.probe_timeout_ms = probe_timeout_ms;
        }
        if let Some(run_timeout) = self.run_timeout {
            config.run_timeout_secs = run_timeout;
        }
        if let Some(webdriver_url) = self.webdriver_url {
            config.webdriver_url = webdriver_url;
        }
        if self.headed {
            config.browser.headless = false;
        }

        Ok(config)
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // One thread, one browser session: checks never run concurrently
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(EXIT_HARNESS_ERROR);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_HARNESS_ERROR);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<i32> {
    let format = args.format;
    let output_path = args.output.clone();
    let selected = args.checks.clone();
    let list = args.list;
    let config = args.into_config()?;

    let mut suite = admin_panel_suite::<WebDriverBrowser>();
    if list {
        for name in suite.names() {
            println!("{}", name);
        }
        return Ok(EXIT_SUCCESS);
    }
    if !selected.is_empty() {
        suite.retain_named(&selected)?;
    }

    let gate = ReadinessGate::new(config.gate_config()?, HttpProbe::new(config.probe_timeout())?);
    let runner = TestRunner::new(gate, config.check_context()?, config.run_timeout());

    if let Some(banner) = output::banner(format) {
        println!("{}", banner);
    }
    let browser = WebDriverBrowser::connect(&config.webdriver_url, &config.browser).await?;

    let outcome = runner.run_and_close(browser, &suite).await?;

    match &outcome {
        RunOutcome::Completed(report) => {
            output::print_report(report, format)?;
            if let Some(path) = &output_path {
                output::write_results(report, path)?;
            }
        }
        RunOutcome::NotReady { reason, .. } => {
            eprintln!("❌ Admin Panel not reachable: {}", reason);
        }
    }

    Ok(outcome.exit_code())
}
