use crate::{Error, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::handler::Handler;
use chromiumoxide::page::Page;
use futures::StreamExt;
use quickgrade_core::form::{FEEDBACK_FIELD_PREFIX, GRADE_FIELD_PREFIX, RawField, Scrape};
use quickgrade_core::inject::{FieldReport, InjectionOutcome, InjectionPlan};
use std::time::Duration;
use tokio::task::JoinHandle;

const SCRAPE_SCRIPT: &str = include_str!("js/scrape.js");
const INJECT_SCRIPT: &str = include_str!("js/inject.js");

/// Stand-ins the scripts carry for values filled in from Rust
const PLAN_PLACEHOLDER: &str = "__PLAN__";
const GRADE_PREFIX_PLACEHOLDER: &str = "__GRADE_PREFIX__";
const FEEDBACK_PREFIX_PLACEHOLDER: &str = "__FEEDBACK_PREFIX__";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A launched browser and the page grades are entered on
pub struct GradingSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl GradingSession {
    /// Start processing browser events and attach to the first tab
    pub async fn start(browser: Browser, mut handler: Handler) -> Result<Self> {
        // The handler must be polled for any command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        // Chrome may still be creating its initial tab
        tokio::time::sleep(Duration::from_millis(500)).await;

        let existing = browser.pages().await?.into_iter().next();
        let page = match existing {
            Some(page) => {
                tracing::debug!("Using existing tab");
                page
            }
            None => {
                tracing::debug!("No open tab, creating one");
                browser.new_page("about:blank").await?
            }
        };

        Ok(Self {
            browser,
            handler_task,
            page,
        })
    }

    pub async fn open(&self, url: &str) -> Result<()> {
        tracing::info!("Opening {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    /// Poll until a grade input is present, or fail after `timeout`
    pub async fn wait_for_grade_fields(&self, timeout: Duration) -> Result<()> {
        let selector = format!("input[name^='{}']", GRADE_FIELD_PREFIX);

        let wait = async {
            loop {
                if self.page.find_element(selector.as_str()).await.is_ok() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| Error::Timeout(timeout))?;

        tracing::info!("Quick-grading fields detected");
        Ok(())
    }

    /// Read every grade field with its row context
    pub async fn scrape(&self) -> Result<Scrape> {
        let fields: Vec<RawField> = self.page.evaluate(scrape_script()?).await?.into_value()?;
        tracing::debug!("Page script returned {} grade fields", fields.len());

        Ok(Scrape::from_raw(fields))
    }

    /// Apply a plan to the page and count what happened
    pub async fn inject(&self, plan: &InjectionPlan) -> Result<InjectionOutcome> {
        let script = inject_script(plan)?;
        let reports: Vec<FieldReport> = self.page.evaluate(script).await?.into_value()?;

        let feedback = reports.iter().filter(|r| r.feedback_written).count();
        tracing::debug!("Wrote feedback into {} comment fields", feedback);

        Ok(InjectionOutcome::tally(plan, &reports))
    }

    /// Close the browser, killing it if it does not exit cleanly
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed, killing: {}", e);
            if let Some(Err(e)) = self.browser.kill().await {
                tracing::warn!("Failed to kill browser: {}", e);
            }
        } else if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }

        self.handler_task.abort();
    }
}

/// Substitute the field-name prefixes as JS string literals
fn with_prefixes(script: &str) -> Result<String> {
    Ok(script
        .replace(GRADE_PREFIX_PLACEHOLDER, &serde_json::to_string(GRADE_FIELD_PREFIX)?)
        .replace(FEEDBACK_PREFIX_PLACEHOLDER, &serde_json::to_string(FEEDBACK_FIELD_PREFIX)?))
}

fn scrape_script() -> Result<String> {
    with_prefixes(SCRAPE_SCRIPT)
}

fn inject_script(plan: &InjectionPlan) -> Result<String> {
    Ok(with_prefixes(INJECT_SCRIPT)?.replace(PLAN_PLACEHOLDER, &plan.to_json()?))
}
