use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use gh_analytics::config::{self, Config};
use gh_analytics::fetch::{self, FetchError, GithubSettings, Source, SourceError};
use gh_analytics::github::DateRange;
use gh_analytics::output::print_json;
use gh_analytics::snapshot::{save_snapshot, Snapshot, SnapshotError};
use gh_analytics::stats::{build_report, ReportOptions};

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_SNAPSHOT: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_FAILURE: i32 = 5;

const QUERY_HELP: &str =
    "GitHub search query. Example: \"repo:microsoft/vscode repo:microsoft/TypeScript\"";

#[derive(Parser, Debug)]
#[command(name = "ga")]
#[command(about = "Velocity metrics from GitHub pull requests and issues", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gh-analytics/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pull request stats
    Pr {
        #[command(subcommand)]
        command: SectionCommand,
    },
    /// Issue/discussion stats
    Issues {
        #[command(subcommand)]
        command: SectionCommand,
    },
    /// Pull request and issue stats together
    Stat(StatArgs),
    /// Save raw pull request and issue data as one snapshot
    Log(LogArgs),
}

#[derive(Subcommand, Debug)]
enum SectionCommand {
    /// Print aggregated stats as JSON
    Stat(StatArgs),
    /// Save raw data to a JSON snapshot
    Log(LogArgs),
}

#[derive(Args, Debug)]
struct StatArgs {
    /// Display values in human friendly format
    #[arg(long)]
    human: bool,

    /// Location of a snapshot with raw data
    #[arg(long, value_name = "FILEPATH")]
    input: Option<PathBuf>,

    /// Filters by date created. Format YYYY-MM-DD
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Filters by date created. Format YYYY-MM-DD
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    end: Option<NaiveDate>,

    #[arg(long, value_name = "SEARCH QUERY", help = QUERY_HELP)]
    query: Option<String>,

    /// Comma separated GitHub usernames of team members
    #[arg(long = "teamMembers", value_name = "TEAM_MEMBERS")]
    team_members: Option<String>,
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Location where to output raw data in JSON
    #[arg(long, value_name = "PATH")]
    output: PathBuf,

    /// Filters by date created. Format YYYY-MM-DD
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    start: NaiveDate,

    /// Filters by date created. Format YYYY-MM-DD
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    end: NaiveDate,

    #[arg(long, value_name = "SEARCH QUERY", help = QUERY_HELP)]
    query: String,
}

#[derive(Debug, Clone, Copy)]
enum Section {
    PullRequests,
    Issues,
    All,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gh_analytics=debug,ga=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_stat(section: Section, args: StatArgs, config: &Config, as_of: DateTime<Utc>) -> Result<()> {
    let range = DateRange::new(args.start, args.end);
    let source = Source::resolve(args.query, args.input, range)?;
    let settings = GithubSettings::resolve(config);
    let options = ReportOptions {
        team_members: config.team_allowlist(args.team_members.as_deref()),
        mode: config.render_mode(args.human),
        as_of,
    };
    tracing::debug!(?source, team_members = options.team_members.len(), "Building report");

    let report = match section {
        Section::PullRequests => {
            let prs = fetch::load_pull_requests(&source, &settings, as_of).await?;
            build_report(Some(prs.as_slice()), None, &options)
        }
        Section::Issues => {
            let issues = fetch::load_issues(&source, &settings).await?;
            build_report(None, Some(issues.as_slice()), &options)
        }
        Section::All => {
            let (prs, issues) = fetch::load_all(&source, &settings, as_of).await?;
            build_report(Some(prs.as_slice()), Some(issues.as_slice()), &options)
        }
    };

    print_json(&report)
}

async fn run_log(section: Section, args: LogArgs, config: &Config, as_of: DateTime<Utc>) -> Result<()> {
    let source = Source::Query {
        query: args.query,
        range: DateRange::new(Some(args.start), Some(args.end)),
    };
    let settings = GithubSettings::resolve(config);

    match section {
        Section::PullRequests => {
            let prs = fetch::load_pull_requests(&source, &settings, as_of).await?;
            save_snapshot(&args.output, &prs)?;
        }
        Section::Issues => {
            let issues = fetch::load_issues(&source, &settings).await?;
            save_snapshot(&args.output, &issues)?;
        }
        Section::All => {
            let (prs, issues) = fetch::load_all(&source, &settings, as_of).await?;
            save_snapshot(&args.output, &Snapshot { prs: &prs, issues: &issues })?;
        }
    }
    Ok(())
}

fn exit_code(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<SourceError>().is_some() {
        EXIT_USAGE
    } else if error.downcast_ref::<SnapshotError>().is_some() {
        EXIT_SNAPSHOT
    } else if error.downcast_ref::<FetchError>().is_some() {
        EXIT_NETWORK
    } else {
        EXIT_FAILURE
    }
}

/// Help and version requests exit cleanly; every other parse error is a
/// usage error.
fn parse_exit_code(error: &clap::Error) -> i32 {
    if error.exit_code() == EXIT_SUCCESS {
        EXIT_SUCCESS
    } else {
        EXIT_USAGE
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };
    init_tracing(cli.verbose);

    let config = match config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // One evaluation instant for every open item in this run.
    let as_of = Utc::now();

    let result = match cli.command {
        Commands::Pr { command } => match command {
            SectionCommand::Stat(args) => run_stat(Section::PullRequests, args, &config, as_of).await,
            SectionCommand::Log(args) => run_log(Section::PullRequests, args, &config, as_of).await,
        },
        Commands::Issues { command } => match command {
            SectionCommand::Stat(args) => run_stat(Section::Issues, args, &config, as_of).await,
            SectionCommand::Log(args) => run_log(Section::Issues, args, &config, as_of).await,
        },
        Commands::Stat(args) => run_stat(Section::All, args, &config, as_of).await,
        Commands::Log(args) => run_log(Section::All, args, &config, as_of).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}
