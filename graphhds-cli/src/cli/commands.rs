//! Argument parsing and the `run` command.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use graphhds_core::{
    ClusterPolicy, GraphHdsBuilder, GraphHdsError, HdsResult, LevelOutcome, StabilityMeasure,
    WeightScale,
};
use graphhds_providers_jsonl::{
    ArtifactWriter, GraphLoader, JsonlProviderError, load_cluster_labels,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "graphhds",
    about = "Density-based hierarchical clustering of similarity graphs."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster a JSONL graph.
    Run(RunCommand),
}

/// Flood-fill policy names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Join pairs whose shared flow reaches `min_flow`.
    Edge,
    /// Join revealed edges between dense nodes.
    Node,
}

impl From<PolicyArg> for ClusterPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Edge => Self::Edge,
            PolicyArg::Node => Self::Node,
        }
    }
}

/// Stability measure names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MeasureArg {
    /// Number of hierarchy levels a cluster spans.
    Levels,
    /// Intra-cluster two-hop flow.
    Flow,
}

impl From<MeasureArg> for StabilityMeasure {
    fn from(value: MeasureArg) -> Self {
        match value {
            MeasureArg::Levels => Self::LevelCount,
            MeasureArg::Flow => Self::Flow,
        }
    }
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// JSONL file with one `{"id", "connections"}` record per line.
    pub graph: PathBuf,

    /// TSV node mapping: `<node id>\t<original id>\t<raw weight>`.
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Override name for the graph (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,

    /// Flow a node or pair needs to count as dense.
    #[arg(long = "min-flow", default_value_t = 10.0)]
    pub min_flow: f64,

    /// Fraction of edges shaved per level.
    #[arg(long = "shave-rate", default_value_t = 0.05)]
    pub shave_rate: f64,

    /// Fraction of points that may stay unclustered when shaving stops.
    #[arg(long = "min-shave", default_value_t = 0.3)]
    pub min_shave: f64,

    /// Flood-fill policy.
    #[arg(long, value_enum, default_value_t = PolicyArg::Node)]
    pub policy: PolicyArg,

    /// Node weight scale: 0 uniform, 1 linear, larger values a log base.
    #[arg(long = "weight-scale", default_value_t = 1)]
    pub weight_scale: u32,

    /// Clusters scoring below this are left out of the flat partition.
    #[arg(long = "min-stability", default_value_t = 0.0)]
    pub min_stability: f64,

    /// Score used to rank clusters.
    #[arg(long, value_enum, default_value_t = MeasureArg::Levels)]
    pub stability: MeasureArg,

    /// Directory receiving the viewer artifacts.
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Sparse JSONL of known `{"id", "label"}` pairs written alongside the
    /// artifacts as `graph_cluster_labels.txt`.
    #[arg(long = "cluster-labels", requires = "output_dir")]
    pub cluster_labels: Option<PathBuf>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading input or writing artifacts failed.
    #[error(transparent)]
    Provider(#[from] JsonlProviderError),
    /// Configuration or clustering failed.
    #[error(transparent)]
    Core(#[from] GraphHdsError),
}

impl CliError {
    /// The core error behind this failure, if any.
    #[must_use]
    pub const fn core_error(&self) -> Option<&GraphHdsError> {
        match self {
            Self::Core(error) => Some(error),
            Self::Provider(error) => error.core_error(),
        }
    }
}

/// Summarises the outcome of a run.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Graph name.
    pub graph: String,
    /// Number of graph nodes.
    pub nodes: usize,
    /// Number of graph edges.
    pub edges: usize,
    /// Pipeline output.
    pub result: HdsResult,
    /// Artifact files written, empty without `--output-dir`.
    pub artifacts: Vec<PathBuf>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, clustering, or writing fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use graphhds_cli::cli::{Cli, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "{\"id\": 1, \"connections\": [[2, 0.9]]}\n")?;
/// let path = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from(["graphhds", "run", path.as_str(), "--min-flow", "0"])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.nodes, 2);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(graph = field::Empty, policy = field::Empty, measure = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let policy = ClusterPolicy::from(command.policy);
    let measure = StabilityMeasure::from(command.stability);
    let hds = GraphHdsBuilder::new()
        .with_min_flow(command.min_flow)
        .with_shave_rate(command.shave_rate)
        .with_min_shave(command.min_shave)
        .with_policy(policy)
        .with_min_stability(command.min_stability)
        .with_stability_measure(measure)
        .build()?;

    let name = derive_graph_name(&command.graph, command.name.as_deref());
    let span = Span::current();
    span.record("graph", field::display(&name));
    span.record("policy", field::display(policy.as_str()));
    span.record("measure", field::display(measure.as_str()));

    let graph = GraphLoader::new(name)
        .with_weight_scale(WeightScale::from_level(command.weight_scale))
        .load_graph(&command.graph, command.mapping.as_deref())?;
    let result = hds.run(&graph)?;

    let artifacts = match &command.output_dir {
        Some(dir) => {
            let labels = command
                .cluster_labels
                .as_deref()
                .map(load_cluster_labels)
                .transpose()?
                .unwrap_or_default();
            ArtifactWriter::new(&graph, &result)
                .with_cluster_labels(labels)
                .write_all(dir)?
        }
        None => Vec::new(),
    };

    info!(
        graph = graph.name(),
        clusters = result.hierarchy().cluster_count(),
        selected = result.partition().len(),
        artifacts = artifacts.len(),
        "command completed"
    );
    Ok(ExecutionSummary {
        graph: graph.name().to_owned(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        result,
        artifacts,
    })
}

pub(super) fn derive_graph_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let result = &summary.result;
    let skipped = result
        .levels()
        .iter()
        .filter(|level| level.outcome != LevelOutcome::Retained)
        .count();
    writeln!(writer, "graph: {}", summary.graph)?;
    writeln!(writer, "nodes: {}", summary.nodes)?;
    writeln!(writer, "edges: {}", summary.edges)?;
    writeln!(
        writer,
        "levels: {} rows, {skipped} skipped",
        result.retained_levels()
    )?;
    writeln!(writer, "clusters: {}", result.hierarchy().cluster_count())?;
    writeln!(writer, "selected: {}", result.partition().len())?;
    for (id, members) in result.partition().clusters() {
        let stability = result.stabilities().get(id).copied().unwrap_or_default();
        writeln!(writer, "{id}\t{}\t{stability}", members.len())?;
    }
    for path in &summary.artifacts {
        writeln!(writer, "wrote {}", path.display())?;
    }
    Ok(())
}
