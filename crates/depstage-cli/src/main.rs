#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;
mod source;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use depstage_core::{BuildOptions, GraphError};
use output::{CliError, OutputMode};
use source::InputKind;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::Session;

/// Exit code when the command itself could not run.
const EXIT_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "depstage: dependency-graph analysis for CI workflows and monorepos",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (unless DEPSTAGE_LOG is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    output: Option<OutputMode>,

    /// Config file (default: ./.depstage.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fail when a dependency names a node that does not exist.
    #[arg(long, global = true)]
    strict: bool,

    /// Input kind; inferred from the path when omitted.
    #[arg(long, global = true, value_enum, value_name = "KIND")]
    input_kind: Option<InputKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Validation",
        about = "Report dangling references, self dependencies, and cycles",
        after_help = "EXAMPLES:\n    # Validate a workflow (exit code 1 on cycles)\n    depstage check .github/workflows/ci.yml\n\n    # Treat missing dependencies as errors\n    depstage check --strict graph.yaml"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Scheduling",
        about = "Print a valid execution order",
        after_help = "EXAMPLES:\n    # Dependencies first\n    depstage order graph.json\n\n    # Emit machine-readable output\n    depstage order graph.json --json"
    )]
    Order(cmd::order::OrderArgs),

    #[command(
        next_help_heading = "Scheduling",
        about = "Group nodes into parallel execution levels",
        after_help = "EXAMPLES:\n    # Stages of a CI workflow\n    depstage levels .github/workflows/ci.yml\n\n    # Stages of a pnpm workspace\n    depstage levels ."
    )]
    Levels(cmd::levels::LevelsArgs),

    #[command(
        next_help_heading = "Scheduling",
        about = "Show one representative node per level",
        after_help = "EXAMPLES:\n    depstage critical-path .github/workflows/ci.yml"
    )]
    CriticalPath(cmd::critical_path::CriticalPathArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Show what a node needs and what needs it",
        after_help = "EXAMPLES:\n    # Blast radius of a job\n    depstage impact .github/workflows/ci.yml build\n\n    # Affected packages and pnpm filter commands\n    depstage impact . @app/core"
    )]
    Impact(cmd::impact::ImpactArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Graph statistics and impact ranking",
        after_help = "EXAMPLES:\n    # Ten most impactful packages\n    depstage summary . --top 10"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "List nodes with their direct edges",
        after_help = "EXAMPLES:\n    depstage nodes graph.yaml --json"
    )]
    Nodes(cmd::nodes::NodesArgs),

    #[command(
        next_help_heading = "Reporting",
        about = "Render a Mermaid flowchart",
        after_help = "EXAMPLES:\n    # Fenced block for Markdown\n    depstage mermaid .github/workflows/ci.yml\n\n    # Bare diagram for mermaid-cli\n    depstage mermaid ci.yml --no-fence > ci.mmd"
    )]
    Mermaid(cmd::mermaid::MermaidArgs),

    #[command(
        next_help_heading = "Reporting",
        about = "Write a Markdown analysis report",
        after_help = "EXAMPLES:\n    # Full report with diagram\n    depstage report .github/workflows/ci.yml --with-diagram > ANALYSIS.md"
    )]
    Report(cmd::report::ReportArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DEPSTAGE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "depstage=debug,info"
        } else {
            "depstage=info,warn"
        })
    });

    let format = env::var("DEPSTAGE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Resolve flags and the config file into a [`Session`].
fn session(cli: &Cli) -> anyhow::Result<Session> {
    let working_dir = env::current_dir()?;
    let config = config::load_config(cli.config.as_deref(), &working_dir)?;
    debug!(?config, "configuration loaded");

    Ok(Session {
        output: output::resolve_output_mode(cli.output, cli.json, config.output.format),
        kind: cli.input_kind,
        build: if cli.strict {
            BuildOptions::strict()
        } else {
            config.build
        },
        fan_in_threshold: config.report.fan_in_threshold,
    })
}

/// Run the selected command. `Ok(false)` means the command ran but found a
/// failing condition (cycles for `check`).
fn run(cli: &Cli, session: &Session) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Check(args) => cmd::check::run_check(args, session),
        Commands::Order(args) => cmd::order::run_order(args, session).map(|()| true),
        Commands::Levels(args) => cmd::levels::run_levels(args, session).map(|()| true),
        Commands::CriticalPath(args) => {
            cmd::critical_path::run_critical_path(args, session).map(|()| true)
        }
        Commands::Impact(args) => cmd::impact::run_impact(args, session).map(|()| true),
        Commands::Summary(args) => cmd::summary::run_summary(args, session).map(|()| true),
        Commands::Nodes(args) => cmd::nodes::run_nodes(args, session).map(|()| true),
        Commands::Mermaid(args) => cmd::mermaid::run_mermaid(args, session).map(|()| true),
        Commands::Report(args) => cmd::report::run_report(args, session).map(|()| true),
    }
}

/// Engine errors keep their code and hint; everything else is reported with
/// its context chain.
fn cli_error(err: &anyhow::Error) -> CliError {
    err.downcast_ref::<GraphError>()
        .map_or_else(|| CliError::new(format!("{err:#}")), CliError::from)
}

fn fail(mode: OutputMode, err: &anyhow::Error) -> ExitCode {
    if output::render_error(mode, &cli_error(err)).is_err() {
        eprintln!("error: {err:#}");
    }
    ExitCode::from(EXIT_FAILURE)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = match session(&cli) {
        Ok(session) => session,
        Err(err) => {
            let mode = output::resolve_output_mode(cli.output, cli.json, None);
            return fail(mode, &err);
        }
    };

    match run(&cli, &session) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => fail(session.output, &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depstage_core::DanglingPolicy;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["depstage", "order", "graph.json", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Order(_)));
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::parse_from([
            "depstage",
            "--strict",
            "--input-kind",
            "workflow",
            "--output",
            "text",
            "levels",
            "ci.yml",
        ]);
        assert!(cli.strict);
        assert_eq!(cli.input_kind, Some(InputKind::Workflow));
        assert_eq!(cli.output, Some(OutputMode::Text));
    }

    #[test]
    fn impact_takes_input_and_name() {
        let cli = Cli::parse_from(["depstage", "impact", ".", "@app/core"]);
        let Commands::Impact(args) = cli.command else {
            panic!("expected impact");
        };
        assert_eq!(args.input.input, PathBuf::from("."));
        assert_eq!(args.name, "@app/core");
    }

    #[test]
    fn kebab_case_subcommands() {
        let cli = Cli::parse_from(["depstage", "critical-path", "ci.yml"]);
        assert!(matches!(cli.command, Commands::CriticalPath(_)));
        let cli = Cli::parse_from(["depstage", "report", "ci.yml", "--with-diagram"]);
        assert!(matches!(cli.command, Commands::Report(ref args) if args.with_diagram));
    }

    #[test]
    fn missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["depstage", "check"]).is_err());
    }

    #[test]
    fn strict_flag_selects_fail_policy() {
        let cli = Cli::parse_from(["depstage", "--strict", "check", "x.yaml"]);
        let session = session(&cli).expect("session");
        assert_eq!(session.build.dangling, DanglingPolicy::Fail);
        assert_eq!(session.kind, None);
    }

    #[test]
    fn explicit_config_must_exist() {
        let cli = Cli::parse_from([
            "depstage",
            "--config",
            "/nonexistent/depstage.toml",
            "check",
            "x.yaml",
        ]);
        assert!(session(&cli).is_err());
    }

    #[test]
    fn graph_errors_keep_code_and_hint() {
        let err = anyhow::Error::new(GraphError::UnknownNode {
            name: "ghost".into(),
        });
        let cli_err = cli_error(&err);
        assert_eq!(cli_err.error_code.as_deref(), Some("E3001"));
        assert!(cli_err.message.contains("ghost"));
    }

    #[test]
    fn other_errors_keep_context_chain() {
        let err = anyhow::anyhow!("No jobs found in workflow file").context("Failed to parse ci.yml");
        let cli_err = cli_error(&err);
        assert_eq!(
            cli_err.message,
            "Failed to parse ci.yml: No jobs found in workflow file"
        );
        assert!(cli_err.error_code.is_none());
    }
}
