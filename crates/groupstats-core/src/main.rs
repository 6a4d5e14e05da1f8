//! GroupStats CLI
//!
//! Command-line interface for the GroupStats group usage dashboard.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use groupstats::attribution::AttributionPolicy;
use groupstats::config::LoggingConfig;
use groupstats::export::{spawn_export, ExportOptions};
use groupstats::models::{Dataset, DateWindow};
use groupstats::ranking::{MemberRankingEntry, SortField, SortState};
use groupstats::view::{Summary, ViewPage, ViewState};
use groupstats::{Config, Dashboard, Error};

/// GroupStats - usage attribution and ranking for organization groups
#[derive(Parser)]
#[command(name = "groupstats")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "GROUPSTATS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (for commands that support it)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Dataset JSON file (bundled demo organization when omitted)
    #[arg(short, long, global = true, env = "GROUPSTATS_DATA")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Date window selection; an explicit range wins over `--last`
#[derive(Args, Debug)]
struct WindowArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Trailing window in days ending today (defaults to view.default_window_days)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    last: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the ranked group statistics table
    Groups {
        #[command(flatten)]
        window: WindowArgs,

        /// Attribution policy (full_attribution, even_split)
        #[arg(long)]
        policy: Option<AttributionPolicy>,

        /// Only show this group id
        #[arg(long)]
        group: Option<String>,

        /// Click a sort column; repeat to toggle direction
        /// (total_members, active_members, requests, credits, llm_calls, avg_per_member)
        #[arg(long = "sort")]
        sort: Vec<SortField>,

        /// Page to show
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page (defaults to view.page_size)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Rank members by credit usage
    Members {
        /// Only members of this group id (the catch-all id selects unassigned members)
        #[arg(long)]
        group: Option<String>,

        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Export group statistics as CSV
    Export {
        #[command(flatten)]
        window: WindowArgs,

        /// Attribution policy (full_attribution, even_split)
        #[arg(long)]
        policy: Option<AttributionPolicy>,

        /// Output file (named after the window if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Omit the UTF-8 byte-order mark
        #[arg(long)]
        no_bom: bool,
    },

    /// Validate the dataset's group catalog and member references
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging, cli.verbose);

    // Execute command
    let data = cli.data.as_deref();
    let result = match cli.command {
        Commands::Groups {
            window,
            policy,
            group,
            sort,
            page,
            page_size,
        } => {
            let state = GroupsView {
                group,
                sort,
                page,
                page_size,
            };
            run_groups(&config, data, &window, policy, state, cli.format)
        }
        Commands::Members { group, limit } => {
            run_members(&config, data, group.as_deref(), limit, cli.format)
        }
        Commands::Export {
            window,
            policy,
            output,
            no_bom,
        } => run_export(&config, data, &window, policy, output, no_bom, cli.format).await,
        Commands::Check => run_check(&config, data, cli.format),
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so JSON output on stdout stays machine-readable
fn init_logging(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_dashboard(
    config: &Config,
    data: Option<&Path>,
    policy: Option<AttributionPolicy>,
) -> anyhow::Result<Dashboard> {
    let dataset = match data {
        Some(path) => Dataset::from_path(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?,
        None => {
            info!("No dataset given, using bundled demo organization");
            Dataset::demo()?
        }
    };
    let policy = policy.unwrap_or(config.attribution.policy);
    Ok(Dashboard::from_dataset(dataset, policy)?)
}

/// Validate the requested window against the view settings
fn resolve_window(config: &Config, args: &WindowArgs) -> anyhow::Result<DateWindow> {
    let max_days = config.view.max_window_days;
    let window = match (&args.start, &args.end) {
        (Some(start), Some(end)) => DateWindow::parse(start, end, max_days)?,
        _ => {
            let days = args.last.unwrap_or(config.view.default_window_days);
            if days > max_days {
                bail!(Error::validation(format!(
                    "Maximum query period is {max_days} days."
                )));
            }
            DateWindow::trailing(chrono::Local::now().date_naive(), days)?
        }
    };
    Ok(window)
}

struct GroupsView {
    group: Option<String>,
    sort: Vec<SortField>,
    page: usize,
    page_size: Option<usize>,
}

#[derive(Serialize)]
struct GroupsOutput<'a> {
    window: DateWindow,
    policy: AttributionPolicy,
    sort: SortState,
    selected_group: Option<&'a str>,
    unique_members: usize,
    unique_active_members: usize,
    summary: Summary,
    table: ViewPage,
}

fn run_groups(
    config: &Config,
    data: Option<&Path>,
    window: &WindowArgs,
    policy: Option<AttributionPolicy>,
    view: GroupsView,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let window = resolve_window(config, window)?;
    let dashboard = load_dashboard(config, data, policy)?;
    let report = dashboard.report(window)?;

    let mut state = ViewState::new(view.page_size.unwrap_or(config.view.page_size));
    state.select_group(view.group);
    if let Some(group) = state.selected_group.as_deref() {
        if !dashboard.catalog().contains(group) {
            warn!(group, "Selected group is not in the catalog");
        }
    }
    for field in view.sort {
        state.toggle_sort(field);
    }
    state.go_to(view.page);

    let table = report.page(&state);
    let summary = report.summary(state.selected_group.as_deref());

    if format == OutputFormat::Json {
        let output = GroupsOutput {
            window,
            policy: report.policy,
            sort: state.sort,
            selected_group: state.selected_group.as_deref(),
            unique_members: report.unique_members,
            unique_active_members: report.unique_active_members,
            summary,
            table,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let sorted_by = format!(
        "({}, sorted by {} {})",
        report.policy, state.sort.field, state.sort.direction
    );
    println!(
        "{} {}  {}",
        style("Group statistics").bold(),
        window,
        style(sorted_by).dim()
    );
    println!();

    if table.is_empty() {
        println!("No data for the selected filters.");
        return Ok(());
    }

    println!(
        "{:>4}  {:>4}  {:<24} {:>8} {:>8} {:>10} {:>10} {:>12} {:>8}",
        "#", "Rank", "Group", "Members", "Active", "Queries", "LLM Calls", "Credits", "Avg"
    );
    for row in &table.rows {
        let group = &row.aggregate;
        println!(
            "{:>4}  {:>4}  {:<24} {:>8} {:>8} {:>10} {:>10} {:>12} {:>8}",
            row.position,
            group.rank.to_string(),
            truncate(&group.name, 24),
            group.total_members,
            group.active_members,
            group.requests,
            group.llm_calls,
            group.credits,
            group.avg_per_member,
        );
    }
    println!();
    println!(
        "Page {}/{} ({} groups)",
        table.page, table.total_pages, table.total_rows
    );
    println!(
        "Credits: {}  Queries: {}  LLM calls: {}  Active members: {} ({} unique)",
        style(summary.total_credits).green(),
        summary.total_requests,
        summary.total_llm_calls,
        summary.active_members,
        report.unique_active_members,
    );

    Ok(())
}

fn run_members(
    config: &Config,
    data: Option<&Path>,
    group: Option<&str>,
    limit: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let dashboard = load_dashboard(config, data, None)?;
    let ranking: Vec<MemberRankingEntry> = dashboard
        .member_ranking(group)
        .into_iter()
        .take(limit)
        .collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    if ranking.is_empty() {
        println!("No members found.");
        return Ok(());
    }

    println!(
        "{:>4}  {:<20} {:<28} {:<18} {:>10} {:>12}",
        "Rank", "Member", "Email", "Group", "Queries", "Credits"
    );
    for entry in &ranking {
        println!(
            "{:>4}  {:<20} {:<28} {:<18} {:>10} {:>12}",
            entry.rank,
            truncate(&entry.name, 20),
            truncate(entry.email.as_deref().unwrap_or("-"), 28),
            truncate(&entry.group_label, 18),
            entry.request_count,
            entry.credits,
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct ExportOutput {
    path: PathBuf,
    bytes: usize,
    groups: usize,
}

async fn run_export(
    config: &Config,
    data: Option<&Path>,
    window: &WindowArgs,
    policy: Option<AttributionPolicy>,
    output: Option<PathBuf>,
    no_bom: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let window = resolve_window(config, window)?;
    let dashboard = load_dashboard(config, data, policy)?;
    let report = dashboard.report(window)?;

    let mut options = ExportOptions::from(&config.export);
    if no_bom {
        options.include_bom = false;
    }
    let path = output
        .unwrap_or_else(|| PathBuf::from(report.export_filename(&config.export.filename_prefix)));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Exporting group statistics");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let bytes = spawn_export(report.aggregates.clone(), options)
        .await
        .context("export task failed")??;
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    spinner.finish_and_clear();

    info!(path = %path.display(), bytes = bytes.len(), "Export written");
    if format == OutputFormat::Json {
        let output = ExportOutput {
            path,
            bytes: bytes.len(),
            groups: report.aggregates.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} {}", style("Exported").green().bold(), path.display());
    }

    Ok(())
}

#[derive(Serialize)]
struct CheckOutput {
    groups: usize,
    members: usize,
    catch_all: String,
    unknown_group_refs: Vec<groupstats::attribution::UnknownGroupRef>,
}

fn run_check(config: &Config, data: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let dashboard = load_dashboard(config, data, None)?;
    let output = CheckOutput {
        groups: dashboard.catalog().len(),
        members: dashboard.store().len(),
        catch_all: dashboard.catalog().catch_all().id.clone(),
        unknown_group_refs: dashboard.unknown_group_refs(),
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Groups:    {} (catch-all: {})", output.groups, output.catch_all);
        println!("Members:   {}", output.members);
        for unknown in &output.unknown_group_refs {
            println!(
                "{} member {} references unknown group {}",
                style("warning:").yellow(),
                unknown.member_id,
                unknown.group_id
            );
        }
    }

    if !output.unknown_group_refs.is_empty() {
        bail!(
            "{} member group reference(s) point at undefined groups",
            output.unknown_group_refs.len()
        );
    }
    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "groupstats", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_sort_flags() {
        let cli = Cli::try_parse_from([
            "groupstats", "groups", "--sort", "requests", "--sort", "requests",
        ])
        .unwrap();
        let Commands::Groups { sort, .. } = cli.command else {
            panic!("expected groups command");
        };
        assert_eq!(sort, [SortField::Requests, SortField::Requests]);
    }

    #[test]
    fn test_window_args_resolve() {
        let config = Config::default();
        let args = WindowArgs {
            start: Some("2023-12-01".into()),
            end: Some("2023-12-31".into()),
            last: None,
        };
        let window = resolve_window(&config, &args).unwrap();
        assert_eq!(window.span_days(), 30);

        let reversed = WindowArgs {
            start: Some("2023-12-31".into()),
            end: Some("2023-12-01".into()),
            last: None,
        };
        assert!(resolve_window(&config, &reversed).is_err());

        let too_long = WindowArgs {
            start: None,
            end: None,
            last: Some(400),
        };
        assert!(resolve_window(&config, &too_long).is_err());

        let far_past = WindowArgs {
            start: None,
            end: None,
            last: Some(100_000_000),
        };
        let err = resolve_window(&config, &far_past).unwrap_err();
        assert!(err.to_string().contains("Maximum query period"), "{err}");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Marketing", 24), "Marketing");
        assert_eq!(truncate("Customer Support", 8), "Custome…");
    }
}
