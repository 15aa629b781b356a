use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "concept-graph",
    version,
    about = "Bidirectional knowledge graph store and explorer",
    long_about = "Build a knowledge graph from (subject, predicate, object) triples and explore it. Every relation is stored with a reverse companion so neighborhoods can be walked both ways, while output always shows a predicate in the direction it was asserted."
)]
pub struct Cli {
    /// Only print errors
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Relation-list JSON: {"relations": [[s, p, o], ...]} or a bare array
    Json,
    /// One subject<TAB>predicate<TAB>object per line
    Tsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Dfs,
    Bfs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JudgeArg {
    Exact,
    Normalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnOffArg {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DotThemeArg {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DotRankDirArg {
    #[value(name = "LR")]
    LR,
    #[value(name = "TB")]
    TB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DotSplinesArg {
    Curved,
    Ortho,
    Polyline,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build (or extend) a graph from triple files
    Build {
        /// Triple files to ingest
        #[arg(long = "triples", value_name = "FILE", required = true, num_args = 1..)]
        triples: Vec<PathBuf>,
        /// Input format; inferred from the file extension when omitted
        #[arg(long, value_enum)]
        input: Option<InputFormat>,
        /// Graph JSON file to write
        #[arg(long)]
        graph: Option<PathBuf>,
        /// Store only the asserted direction (no reverse companions)
        #[arg(long, default_value_t = false)]
        one_way: bool,
        /// Add to the existing graph file instead of replacing it
        #[arg(long, default_value_t = false)]
        append: bool,
    },
    /// Add a single relation to the graph file
    Add {
        subject: String,
        predicate: String,
        object: String,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        one_way: bool,
    },
    /// List the adjacency of a node
    Neighbors {
        node: String,
        #[arg(long)]
        graph: Option<PathBuf>,
        /// Output format: text or json
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Neighborhood snapshot: BFS layers, relation frequencies and a DFS chain
    Explore {
        /// Node to center on (random when omitted)
        #[arg(long)]
        focus: Option<String>,
        /// BFS radius
        #[arg(long)]
        hops: Option<usize>,
        /// DFS chain depth limit
        #[arg(long)]
        depth: Option<usize>,
        /// Maximum number of nodes in the DFS chain
        #[arg(long)]
        limit: Option<usize>,
        /// Seed for the random focus pick
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Breadth-first layers around a node
    Layers {
        start: String,
        /// BFS radius (config `[explore] hops`, else 2)
        #[arg(long)]
        hops: Option<usize>,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Full DFS or BFS traversal from a node
    Traverse {
        start: String,
        #[arg(long, value_enum, default_value_t = OrderArg::Dfs)]
        order: OrderArg,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Depth- and size-bounded DFS chain from a node
    Sample {
        start: String,
        /// Depth limit (config `[explore] depth`, else 4)
        #[arg(long)]
        depth: Option<usize>,
        /// Maximum number of nodes (config `[explore] limit_nodes`, else unbounded)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Shortest path between two nodes
    Path {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Node, edge and predicate counts
    Stats {
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Export the graph as Graphviz DOT
    Dot {
        #[arg(long)]
        graph: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Node to highlight
        #[arg(long)]
        focus: Option<String>,
        #[arg(long, value_enum)]
        dot_theme: Option<DotThemeArg>,
        #[arg(long, value_enum)]
        dot_rankdir: Option<DotRankDirArg>,
        #[arg(long, value_enum)]
        dot_splines: Option<DotSplinesArg>,
        #[arg(long, value_enum)]
        dot_rounded: Option<OnOffArg>,
        #[arg(long, value_enum)]
        dot_legend: Option<OnOffArg>,
    },
    /// Merge two relation-list JSON files, skipping duplicates
    Merge {
        /// Relations already collected (missing file counts as empty)
        #[arg(long)]
        existing: PathBuf,
        /// Relations to add
        #[arg(long)]
        new: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = JudgeArg::Exact)]
        judge: JudgeArg,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
