// occgraph CLI - occupation title reconciliation and knowledge graph export

mod exit_codes;
mod pipeline;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use occgraph_recon::config::{GraphFormat, PartitionMode, PipelineConfig};
use occgraph_recon::summary::{compute_summary, summarize_source, RunMeta, RunSummary};

use exit_codes::{EXIT_RUNTIME, EXIT_SUCCESS, EXIT_UNMATCHED};

#[derive(Parser)]
#[command(name = "occgraph")]
#[command(about = "Match historical occupation titles against a reference table and export a knowledge graph")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: classify sources, write comparison workbooks and graphs
    #[command(after_help = "\
Examples:
  occgraph run occgraph.toml
  occgraph run occgraph.toml --threshold 90
  occgraph run occgraph.toml --json > summary.json
  occgraph run occgraph.toml --summary run.json --fail-on-unmatched
  occgraph run occgraph.toml --partition combined --format n-triples")]
    Run {
        /// Path to the TOML config file
        config: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Classify sources and write comparison workbooks only
    #[command(after_help = "\
Examples:
  occgraph map occgraph.toml
  occgraph map occgraph.toml --threshold 80 --json")]
    Map {
        /// Path to the TOML config file
        config: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Build graphs from previously written comparison workbooks
    #[command(after_help = "\
Examples:
  occgraph graph occgraph.toml
  occgraph graph occgraph.toml --format n-triples")]
    Graph {
        /// Path to the TOML config file
        config: PathBuf,

        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Summarize the reference table: labels, codes, previews
    #[command(after_help = "\
Examples:
  occgraph reference occgraph.toml")]
    Reference {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  occgraph validate occgraph.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Similarity threshold (0-100, inclusive); overrides [matching].threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the JSON run summary to stdout
    #[arg(long)]
    json: bool,

    /// Write the JSON run summary to a file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Exit 62 when any record stays unmatched
    #[arg(long)]
    fail_on_unmatched: bool,
}

#[derive(clap::Args)]
struct GraphArgs {
    /// Graph serialization; overrides [graph].format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Graph partitioning; overrides [graph].partition
    #[arg(long, value_enum)]
    partition: Option<PartitionArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Turtle,
    NTriples,
}

#[derive(Clone, Copy, ValueEnum)]
enum PartitionArg {
    PerFile,
    Combined,
}

impl GraphArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(f) = self.format {
            config.graph.format = match f {
                FormatArg::Turtle => GraphFormat::Turtle,
                FormatArg::NTriples => GraphFormat::NTriples,
            };
        }
        if let Some(p) = self.partition {
            config.graph.partition = match p {
                PartitionArg::PerFile => PartitionMode::PerFile,
                PartitionArg::Combined => PartitionMode::Combined,
            };
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  occgraph-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, run, graph } => cmd_run(&config, &run, Some(&graph)),
        Commands::Map { config, run } => cmd_run(&config, &run, None),
        Commands::Graph { config, graph } => cmd_graph(&config, &graph),
        Commands::Reference { config } => cmd_reference(&config),
        Commands::Validate { config } => cmd_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// run / map
// ============================================================================

/// `graph` is `None` for `map`, which stops after the comparison workbooks.
fn cmd_run(config_path: &Path, args: &RunArgs, graph: Option<&GraphArgs>) -> Result<(), CliError> {
    let mut config = pipeline::load_config(config_path, args.threshold)?;
    if let Some(g) = graph {
        g.apply(&mut config);
    }

    let reference = pipeline::load_reference(&config)?;
    if reference.index.is_empty() {
        eprintln!(
            "warning: reference has no '{}' labels; every record will stay unmatched",
            config.columns.reference_label()
        );
    }

    let (outcomes, skipped) = pipeline::map_sources(&config, &reference)?;

    let meta = RunMeta::new(&config.name, config.matching.threshold, reference.index.len());
    let sources = outcomes.iter().map(summarize_source).collect();
    let mut summary = compute_summary(meta, sources, skipped);

    if graph.is_some() {
        let mapping = pipeline::load_mapping(&config)?;
        summary.graphs = pipeline::write_graphs(
            &config,
            &outcomes,
            mapping.as_ref(),
            reference.catalog.as_ref(),
        )?;
    }

    emit_summary(&summary, args)?;
    print_human_summary(&summary);

    if args.fail_on_unmatched && summary.totals.unmatched > 0 {
        return Err(CliError {
            code: EXIT_UNMATCHED,
            message: format!("{} records left unmatched", summary.totals.unmatched),
            hint: Some(format!(
                "see the *_unmatched sheets in {}",
                config.paths.mapper_output.display()
            )),
        });
    }
    Ok(())
}

fn emit_summary(summary: &RunSummary, args: &RunArgs) -> Result<(), CliError> {
    if !args.json && args.summary.is_none() {
        return Ok(());
    }
    let json_str = serde_json::to_string_pretty(summary)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.summary {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write summary: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if args.json {
        println!("{json_str}");
    }
    Ok(())
}

fn print_human_summary(summary: &RunSummary) {
    for s in &summary.sources {
        eprintln!(
            "{}: {} matched, {} unmatched, {} dropped",
            s.source, s.counts.matched, s.counts.unmatched, s.counts.dropped
        );
        for skipped in &s.skipped_sheets {
            eprintln!("  sheet '{}' skipped: {}", skipped.sheet, skipped.reason);
        }
    }
    for s in &summary.skipped_sources {
        eprintln!("{}: skipped ({})", s.source, s.reason);
    }
    for g in &summary.graphs {
        eprintln!("graph {}: {} triples, {} entities", g.path, g.triples, g.entities);
    }
    let t = &summary.totals;
    eprintln!(
        "threshold {}: {} matched, {} unmatched, {} dropped across {} sources",
        summary.meta.threshold,
        t.matched,
        t.unmatched,
        t.dropped,
        summary.sources.len(),
    );
}

// ============================================================================
// graph
// ============================================================================

fn cmd_graph(config_path: &Path, args: &GraphArgs) -> Result<(), CliError> {
    let mut config = pipeline::load_config(config_path, None)?;
    args.apply(&mut config);

    let outcomes = pipeline::load_comparisons(&config)?;
    if outcomes.is_empty() {
        return Err(CliError::runtime(format!(
            "no comparison workbooks in {}",
            config.paths.mapper_output.display()
        ))
        .with_hint(format!("run `occgraph map {}` first", config_path.display())));
    }

    let mapping = pipeline::load_mapping(&config)?;
    let catalog = if config.columns.reference_code.is_some() {
        pipeline::load_reference(&config)?.catalog
    } else {
        None
    };
    let graphs = pipeline::write_graphs(&config, &outcomes, mapping.as_ref(), catalog.as_ref())?;
    for g in &graphs {
        eprintln!("graph {}: {} triples, {} entities", g.path, g.triples, g.entities);
    }
    Ok(())
}

// ============================================================================
// reference
// ============================================================================

fn cmd_reference(config_path: &Path) -> Result<(), CliError> {
    let config = pipeline::load_config(config_path, None)?;
    let reference = pipeline::load_reference(&config)?;

    println!(
        "{} unique labels in '{}'",
        reference.index.len(),
        config.columns.reference_label()
    );
    match reference.catalog {
        Some(catalog) => {
            println!("{} unique codes", catalog.len());
            for (code, labels) in catalog.iter().take(5) {
                println!("  {}: {}", code, labels.join(", "));
            }
        }
        None => {
            for label in reference.index.iter().take(5) {
                println!("  {}", label);
            }
        }
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let config = pipeline::load_config(config_path, None)?;
    eprintln!(
        "{}: ok (threshold {}, label column '{}')",
        config.name, config.matching.threshold, config.columns.label
    );
    Ok(())
}
