//! Repo Radar CLI
//!
//! The `radar` command keeps a periodic engineering radar over a roster of
//! tracked repositories.
//!
//! ## Commands
//!
//! - `run`: discover, score and select items, then print the Markdown report
//! - `policy`: show or initialize the policy file
//! - `history`: show recently selected items

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use radar_core::{record_selection, render_report, write_report, Orchestrator, SeenIndex};
use radar_discovery::{ExaSearcher, NoopSearcher, SearxngSearcher, WebSearcher};
use radar_state::{HistoryStore, Policy, PolicyStore, StateDir};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "radar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Engineering radar over tracked repositories", long_about = None)]
struct Cli {
    /// State directory holding policy.json and history.jsonl
    #[arg(long, global = true, env = "RADAR_STATE_DIR", default_value = ".radar")]
    state_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run discovery and selection, then render the report
    Run(RunArgs),

    /// Inspect or initialize the policy
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },

    /// Show recently selected items, oldest first
    History {
        /// Maximum number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Comma-separated repo subset (default: the policy roster)
    #[arg(long, value_delimiter = ',')]
    repos: Vec<String>,

    /// Do not append the selection to history
    #[arg(long)]
    dry_run: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the meta-search backstop
    #[arg(long)]
    no_fallback: bool,

    /// API key for the primary web searcher
    #[arg(long, env = "EXA_API_KEY", hide_env_values = true)]
    exa_api_key: Option<String>,

    /// Meta-search base url (overrides the policy)
    #[arg(long, env = "RADAR_SEARXNG_URL")]
    searxng_url: Option<String>,
}

#[derive(Subcommand)]
enum PolicyAction {
    /// Print the effective policy as JSON, creating defaults if absent
    Show,
    /// Write the default policy
    Init {
        /// Overwrite an existing policy file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    radar_core::init_tracing(cli.json, level);

    let state = StateDir::open(&cli.state_dir)
        .with_context(|| format!("Failed to open state directory {:?}", cli.state_dir))?;

    match cli.command {
        Commands::Run(args) => {
            let report = cmd_run(&state, &args).await?;
            match &args.output {
                Some(path) => {
                    write_report(path, &report)?;
                    info!(event = "report.written", path = %path.display());
                }
                None => print!("{}", report),
            }
            Ok(())
        }
        Commands::Policy { action } => match action {
            PolicyAction::Show => cmd_policy_show(&state),
            PolicyAction::Init { force } => cmd_policy_init(&state, force),
        },
        Commands::History { limit } => cmd_history(&state, limit),
    }
}

/// Requested repos, or the roster when none were given.
fn resolve_repos(policy: &Policy, requested: &[String]) -> Vec<String> {
    let repos: Vec<String> = requested
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    if repos.is_empty() {
        policy.tracked_repo_names()
    } else {
        repos
    }
}

fn primary_searcher(api_key: Option<&str>) -> Result<Arc<dyn WebSearcher>> {
    match api_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Ok(Arc::new(
            ExaSearcher::new(key).context("Failed to build web search client")?,
        )),
        None => {
            warn!(
                event = "discovery.disabled",
                "EXA_API_KEY is not set; web search will return no results"
            );
            Ok(Arc::new(NoopSearcher))
        }
    }
}

/// Run the radar and return the rendered report.
///
/// History is appended before the report is handed back, so a failed append
/// never leaves a report behind.
async fn cmd_run(state: &StateDir, args: &RunArgs) -> Result<String> {
    let policy = state
        .policy_store()
        .load_or_init()
        .context("Failed to load policy")?;
    let repos = resolve_repos(&policy, &args.repos);

    let history = state.history_store();
    let seen = SeenIndex::load(&history, policy.limits.history_window)
        .context("Failed to read history")?;

    let primary = primary_searcher(args.exa_api_key.as_deref())?;
    let mut orchestrator =
        Orchestrator::new(policy, seen, primary).context("Invalid policy")?;
    if !args.no_fallback {
        let fallback = SearxngSearcher::new().context("Failed to build meta-search client")?;
        orchestrator = orchestrator.with_fallback(Arc::new(fallback));
        if let Some(url) = &args.searxng_url {
            orchestrator = orchestrator.with_fallback_base_url(url);
        }
    }

    let outcome = orchestrator.run(&repos).await;
    let now = Utc::now();
    let report = render_report(
        now.date_naive(),
        orchestrator.policy(),
        &repos,
        &outcome.selection,
    );

    if args.dry_run {
        info!(event = "history.skipped", selected = outcome.selection.len());
    } else {
        record_selection(&history, &outcome.selection, now)
            .context("Failed to append history")?;
    }

    info!(
        run_id = %outcome.run_id,
        considered = outcome.considered,
        rejected = outcome.rejected,
        discovery_failures = outcome.discovery_failures,
        selected = outcome.selection.len(),
        "Run complete"
    );
    Ok(report)
}

fn cmd_policy_show(state: &StateDir) -> Result<()> {
    let policy = state
        .policy_store()
        .load_or_init()
        .context("Failed to load policy")?;
    println!("{}", serde_json::to_string_pretty(&policy)?);
    Ok(())
}

fn cmd_policy_init(state: &StateDir, force: bool) -> Result<()> {
    let store = state.policy_store();
    let existing = store.load().context("Failed to read policy")?;
    if existing.is_some() && !force {
        bail!(
            "Policy already exists at {:?}; pass --force to overwrite",
            store.path()
        );
    }
    store
        .save(&Policy::default())
        .context("Failed to write policy")?;
    println!("Wrote default policy to {:?}", store.path());
    Ok(())
}

fn cmd_history(state: &StateDir, limit: usize) -> Result<()> {
    let records = state
        .history_store()
        .read_recent(limit)
        .context("Failed to read history")?;
    if records.is_empty() {
        println!("No history yet. Run 'radar run' first.");
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  {:<14} {:>4}  {}",
            record.ts.format("%Y-%m-%d %H:%M"),
            record.repo,
            record.scores.total,
            record.title
        );
        println!("    {}", record.url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_args() -> RunArgs {
        RunArgs {
            repos: vec!["interdoc".to_string()],
            no_fallback: true,
            ..RunArgs::default()
        }
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "radar",
            "--state-dir",
            "/tmp/radar",
            "run",
            "--repos",
            "Autarch,moltbot",
            "--dry-run",
            "--no-fallback",
        ])
        .unwrap();
        assert_eq!(cli.state_dir, PathBuf::from("/tmp/radar"));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.repos, vec!["Autarch", "moltbot"]);
                assert!(args.dry_run);
                assert!(args.no_fallback);
                assert!(args.output.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn resolve_repos_defaults_to_roster() {
        let policy = Policy::default();
        assert_eq!(resolve_repos(&policy, &[]), policy.tracked_repo_names());
        assert_eq!(
            resolve_repos(&policy, &[" interdoc ".to_string(), String::new()]),
            vec!["interdoc"]
        );
    }

    #[tokio::test]
    async fn run_initializes_policy_and_renders_report() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::open(dir.path()).unwrap();

        let report = cmd_run(&state, &offline_args()).await.unwrap();

        assert!(report.starts_with("# Engineering Radar: "));
        assert!(report.contains("## TL;DR"));
        assert!(dir.path().join("policy.json").exists());
    }

    #[tokio::test]
    async fn dry_run_leaves_history_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::open(dir.path()).unwrap();
        let args = RunArgs {
            dry_run: true,
            ..offline_args()
        };

        cmd_run(&state, &args).await.unwrap();

        assert!(state.history_store().read_recent(10).unwrap().is_empty());
    }

    #[test]
    fn policy_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::open(dir.path()).unwrap();

        cmd_policy_init(&state, false).unwrap();
        assert!(cmd_policy_init(&state, false).is_err());
        cmd_policy_init(&state, true).unwrap();
    }

    #[test]
    fn invalid_policy_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::open(dir.path()).unwrap();
        let mut policy = Policy::default();
        policy.limits.max_items_per_repo = 0;
        state.policy_store().save(&policy).unwrap();

        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt.block_on(cmd_run(&state, &offline_args())).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load policy"));
    }
}
