use anyhow::Result;
use clap::{Parser, Subcommand};
use quickgrade_cli::commands;
use quickgrade_cli::commands::inject::InjectOptions;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "quickgrade")]
#[command(author, version)]
#[command(
    about = "Fill a gradebook's quick-grading form from a grade spreadsheet",
    long_about = "quickgrade reads grades from a CSV or Excel file, opens the grading page in Chrome, \
                  matches each row to a student's quick-grading field and fills it in. \
                  Nothing is saved until you press the page's save button yourself."
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Grade spreadsheet (.csv, .tsv, .xlsx, .xls, .ods)
    #[arg(value_name = "INPUT_FILE")]
    input: Option<PathBuf>,

    /// Grading page to open (https:// is added when missing)
    #[arg(value_name = "TARGET_URL", env = "QUICKGRADE_URL")]
    url: Option<String>,

    /// Path to the Chrome binary
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Seconds to wait for the quick-grading fields
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    timeout: u64,

    /// JSON array of {"name", "id"} pairs used when the page shows no emails
    #[arg(long, value_name = "JSON")]
    fallback_table: Option<PathBuf>,

    /// Profile to use without the menu: "temp", a Chrome profile name, or a custom path
    #[arg(long, value_name = "PROFILE")]
    profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the Chrome profiles offered at startup
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// List Chrome profiles and remembered custom profiles
    List,
    /// Stop offering a remembered custom profile
    Forget {
        /// Custom profile path or name
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Profiles { command }) => match command {
            ProfileCommands::List => commands::profiles::list(),
            ProfileCommands::Forget { path } => commands::profiles::forget(&path),
        },
        None => {
            let Some(input) = cli.input else {
                anyhow::bail!(
                    "Missing input file. Usage: quickgrade <INPUT_FILE> [TARGET_URL]\n\
                     The file needs a grade column plus an email or name column."
                );
            };
            commands::inject::execute(InjectOptions {
                input,
                url: cli.url,
                chrome_path: cli.chrome_path,
                timeout: Duration::from_secs(cli.timeout),
                fallback_table: cli.fallback_table,
                profile: cli.profile,
            })
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("quickgrade=debug,quickgrade_cli=debug,quickgrade_core=debug,quickgrade_browser=debug")
    } else {
        EnvFilter::new("quickgrade=info,quickgrade_cli=info,quickgrade_core=warn,quickgrade_browser=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
