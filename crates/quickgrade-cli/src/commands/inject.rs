use crate::prompt::TerminalPrompter;
use crate::report;
use anyhow::{Context, Result, anyhow, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use quickgrade_browser::{
    ChromeFinder, ChromeLauncher, Error as BrowserError, GradingSession, ProfileCatalog,
    ProfileManager, ProfileSelection, ProfileStore, chrome_user_data_dir, normalize_url,
};
use quickgrade_core::inject::InjectionPlan;
use quickgrade_core::matcher::{FallbackTable, Matcher};
use quickgrade_core::policy::{Decision, PolicySelector};
use quickgrade_core::roster::{Roster, RosterLoader};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Pause after the grade fields appear so the rest of the table can render
const SETTLE_DELAY: Duration = Duration::from_secs(2);

pub struct InjectOptions {
    pub input: PathBuf,
    pub url: Option<String>,
    pub chrome_path: Option<PathBuf>,
    pub timeout: Duration,
    pub fallback_table: Option<PathBuf>,
    pub profile: Option<String>,
}

pub fn execute(options: InjectOptions) -> Result<()> {
    report::print_banner("🎯 QUICKGRADE GRADE INJECTOR");

    let url = options.url.as_deref().map(validate_url).transpose()?;

    println!("\n📂 Loading grades from: {}", options.input.display());
    let roster = RosterLoader::from_file(&options.input)
        .with_context(|| format!("Failed to load {}", options.input.display()))?;
    if roster.is_empty() {
        bail!("No gradable rows in {}", options.input.display());
    }
    report::print_roster(&roster);

    let fallback = match &options.fallback_table {
        Some(path) => FallbackTable::from_file(path)
            .with_context(|| format!("Failed to load fallback table {}", path.display()))?,
        None => FallbackTable::default(),
    };

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(&options, url, &roster, &fallback));

    // A prompt still waiting on stdin after Ctrl-C must not hold up exit
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(
    options: &InjectOptions,
    url: Option<String>,
    roster: &Roster,
    fallback: &FallbackTable,
) -> Result<()> {
    let Some(prepared) = until_interrupted(prepare(options, url)).await else {
        return Ok(());
    };
    let (profile, launcher) = prepared?;

    println!("\n🚀 Starting Chrome...");
    let Some(started) = until_interrupted(start_session(&launcher)).await else {
        return Ok(());
    };
    let session = match started {
        Ok(session) => session,
        Err(e @ BrowserError::ProfileLocked(_)) => {
            println!("\n{}", style("💡 SOLUTION: Close ALL Chrome windows and try again!").yellow());
            println!("   Or select a different profile option.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    println!("✓ Chrome started successfully!");

    let driven = drive(
        &session,
        &launcher,
        profile.is_temporary(),
        roster,
        fallback,
        options.timeout,
    );
    let result = match until_interrupted(driven).await {
        Some(Err(e)) => {
            until_interrupted(pause("\nPress Enter to close browser...")).await;
            Err(e)
        }
        Some(Ok(())) | None => Ok(()),
    };

    session.close().await;
    drop(profile);
    println!("\n👍 Browser closed. Done!");

    result
}

/// Choose the profile and find Chrome, then wait for the operator to start
async fn prepare(
    options: &InjectOptions,
    url: Option<String>,
) -> Result<(ProfileManager, ChromeLauncher)> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    let store = ProfileStore::in_home(&home);
    let chrome_dir = chrome_user_data_dir();
    let catalog = ProfileCatalog::discover(&home, chrome_dir.clone(), &store);

    let selection = match options.profile.as_deref() {
        Some(selector) => {
            let selection = catalog.resolve_selector(selector);
            if let ProfileSelection::Custom(path) = &selection
                && !catalog.custom_profiles().contains(path)
            {
                store.remember(path);
            }
            println!("→ Using {}", selection.describe());
            selection
        }
        None => {
            println!("\n{}", style("🔍 CHROME PROFILE SELECTION").bold());
            ask(move |prompter| catalog.select(prompter, &store)).await?
        }
    };

    let chrome = ChromeFinder::new(options.chrome_path.clone()).find()?;
    println!("✓ Found Chrome at: {}", chrome.display());

    let profile = ProfileManager::for_selection(&selection, chrome_dir.as_deref())?;
    tracing::debug!("Profile directory: {}", profile.path().display());

    let launcher = ChromeLauncher::new(chrome, &profile, url);
    match launcher.initial_url() {
        Some(url) => println!("\n🌐 Target URL: {}", url),
        None => println!("\n🌐 No target URL given; open the grading page in the browser"),
    }

    if profile.is_temporary() {
        println!("\n{}", style("⚠️  You'll need to log in manually").yellow());
        pause("\nPress Enter to start...").await?;
    } else {
        pause("\nPress Enter to start (close Chrome if it's open)...").await?;
    }

    Ok((profile, launcher))
}

/// Everything that happens with the browser open
async fn drive(
    session: &GradingSession,
    launcher: &ChromeLauncher,
    temporary_profile: bool,
    roster: &Roster,
    fallback: &FallbackTable,
    timeout: Duration,
) -> Result<()> {
    if let Some(url) = launcher.initial_url() {
        println!("\n📍 Navigating to the grading page...");
        session.open(&url).await?;
    }

    println!("\n⏳ Waiting for page to load...");
    if temporary_profile {
        println!("   (Please log in if prompted)");
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(format!(
        "Looking for quick-grading fields (up to {}s)",
        timeout.as_secs()
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let waited = session.wait_for_grade_fields(timeout).await;
    spinner.finish_and_clear();

    if let Err(e) = waited {
        if matches!(e, BrowserError::Timeout(_)) {
            report::print_timeout_tips();
        }
        return Err(e.into());
    }
    println!("✓ Grading page loaded!");
    tokio::time::sleep(SETTLE_DELAY).await;

    println!("\n🔍 Extracting student data from the page...");
    let scrape = session.scrape().await?;
    report::print_scrape(&scrape);

    let outcome = Matcher::new(&scrape, fallback).match_all(&roster.rows);
    report::print_analysis(&outcome);

    if outcome.matched.is_empty() {
        bail!("No students could be matched! Check your input file.");
    }

    let existing = outcome.matched.iter().filter(|m| m.entry.has_grade()).count();
    let selector = PolicySelector::new(existing);
    println!();
    let policy = match ask(move |prompter| selector.select(prompter)).await? {
        Decision::Proceed(policy) => policy,
        Decision::Cancel => {
            println!("\n{}", style("❌ Operation cancelled by user").red());
            return Ok(());
        }
    };

    println!("\n💉 Injecting grades (mode: {})...", policy.as_str());
    let plan = InjectionPlan::build(&outcome.matched, policy);
    let injected = session.inject(&plan).await?;
    report::print_injection(&injected);

    pause("\nPress Enter after you've saved the grades...").await
}

fn validate_url(raw: &str) -> Result<String> {
    let normalized = normalize_url(raw);
    url::Url::parse(&normalized).with_context(|| format!("Invalid target URL: {}", raw))?;
    Ok(normalized)
}

/// Launch Chrome and attach to its first tab
async fn start_session(launcher: &ChromeLauncher) -> quickgrade_browser::Result<GradingSession> {
    let (browser, handler) = launcher.launch().await?;
    GradingSession::start(browser, handler).await
}

/// Run `future` unless Ctrl-C comes first; `None` means interrupted
async fn until_interrupted<F: Future>(future: F) -> Option<F::Output> {
    let output = first_or_interrupt(future, tokio::signal::ctrl_c()).await;
    if output.is_none() {
        println!("\n\n{}", style("❌ Interrupted by user").red());
    }
    output
}

/// `None` when `interrupt` completes before `future`
async fn first_or_interrupt<F: Future, I: Future>(future: F, interrupt: I) -> Option<F::Output> {
    tokio::select! {
        output = future => Some(output),
        _ = interrupt => None,
    }
}

/// Run a terminal interaction on the blocking pool
async fn ask<T, F>(interaction: F) -> Result<T>
where
    F: FnOnce(&mut TerminalPrompter) -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let answer =
        tokio::task::spawn_blocking(move || interaction(&mut TerminalPrompter::new())).await??;
    Ok(answer)
}

async fn pause(prompt: &'static str) -> Result<()> {
    ask(move |prompter| prompter.pause(prompt)).await
}
