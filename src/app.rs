use crate::cli::{
    Cli, Commands, DotRankDirArg, DotSplinesArg, DotThemeArg, InputFormat, JudgeArg, OnOffArg,
    OrderArg, OutputFormat,
};
use crate::errors::GraphError;
use crate::explore::{explore, ExploreOptions, Snapshot, DEFAULT_DEPTH, DEFAULT_HOPS};
use crate::graph::{normalize_entity, ConceptGraph, Triple};
use crate::ingest::{
    ingest_texts, merge_relations, ExactMatch, NormalizedMatch, RelationsJsonExtractor,
    SimilarityJudge, TabSeparatedExtractor, TripleExtractor,
};
use crate::query::format::{arrow, format_layers};
use crate::query::{
    predicate_frequencies, LayeredQuery, Query, SampleQuery, ShortestPathQuery, Traversal,
    TraverseQuery,
};
use crate::utils::config::{self, Config, ExploreConfig};
use crate::utils::table;
use crate::visualization::{DotGenerator, DotOptions, DotTheme, EdgeStyle, RankDir};
use clap::CommandFactory;
use clap_complete::generate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Graph file used when neither `--graph` nor `[graph] path` is set.
pub const DEFAULT_GRAPH_FILE: &str = "concept-graph.json";

/// Exit code for argument combinations the parser cannot catch.
const USAGE_ERROR: i32 = 2;

/// Run the CLI logic in-process.
///
/// Returns an exit code: 0 on success, 1 on errors, 2 on usage errors.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn run_cli(cli: Cli) -> i32 {
    let cfg = load_config(cli.config.as_deref());
    let quiet = cli.quiet;
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = crate::cli::Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            let mut out = io::stdout();
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::Build { triples, input, graph, one_way, append } => {
            let path = graph_path(graph, &cfg);
            let bidirectional = bidirectional(one_way, &cfg);
            let mut staged = if append {
                match ConceptGraph::load_or_default(&path) {
                    Ok(g) => g,
                    Err(e) => return fail("Load graph failed", &e),
                }
            } else {
                ConceptGraph::new()
            };

            let mut added = 0usize;
            for file in &triples {
                let Some(fmt) = input.or_else(|| infer_input(file)) else {
                    eprintln!(
                        "Cannot infer input format for {}; pass --input json|tsv",
                        file.display()
                    );
                    return USAGE_ERROR;
                };
                let text = match fs::read_to_string(file) {
                    Ok(t) => t,
                    Err(e) => return fail(&format!("Failed to read {}", file.display()), &e),
                };
                let extractor: &dyn TripleExtractor = match fmt {
                    InputFormat::Json => &RelationsJsonExtractor,
                    InputFormat::Tsv => &TabSeparatedExtractor,
                };
                // Staged graph is dropped on error, leaving the file untouched
                match ingest_texts(&mut staged, extractor, &[text], bidirectional) {
                    Ok(n) => added += n,
                    Err(e) => return fail(&format!("Ingest failed for {}", file.display()), &e),
                }
            }

            if let Err(e) = staged.save_json(&path) {
                return fail("Failed to save graph", &e);
            }
            if !quiet {
                println!(
                    "Built graph {}: {} nodes, {} relations ({added} added)",
                    path.display(),
                    staged.len(),
                    staged.relation_count()
                );
            }
            0
        }
        Commands::Add { subject, predicate, object, graph, one_way } => {
            let path = graph_path(graph, &cfg);
            let triple = Triple::new(subject, predicate, object).normalized();
            if triple.subject.is_empty() || triple.object.is_empty() || triple.predicate.trim().is_empty() {
                eprintln!("Subject, predicate and object must be non-empty");
                return USAGE_ERROR;
            }
            let mut g = match ConceptGraph::load_or_default(&path) {
                Ok(g) => g,
                Err(e) => return fail("Load graph failed", &e),
            };
            g.add_triple(&triple, bidirectional(one_way, &cfg));
            if let Err(e) = g.save_json(&path) {
                return fail("Failed to save graph", &e);
            }
            if !quiet {
                println!(
                    "Added {} {} {}",
                    triple.subject,
                    arrow(&triple.predicate, false),
                    triple.object
                );
            }
            0
        }
        Commands::Neighbors { node, graph, format } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let node = normalize_entity(&node);
            if !g.contains(&node) {
                return fail("Query failed", &GraphError::UnknownNode(node));
            }
            let adj = g.neighbors(&node);
            if matches!(output_format(format, &cfg), OutputFormat::Json) {
                return print_json(&adj);
            }
            if adj.is_empty() {
                println!("<no neighbors>");
            } else {
                let rows: Vec<Vec<String>> = adj
                    .iter()
                    .enumerate()
                    .map(|(i, n)| {
                        vec![
                            format!("{}", i + 1),
                            format!("{node} {} {}", arrow(&n.predicate, n.is_reverse), n.node),
                        ]
                    })
                    .collect();
                println!("{}", table::render(&["#", "Relation"], &rows));
            }
            0
        }
        Commands::Explore { focus, hops, depth, limit, seed, graph, format } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let ecfg = explore_config(&cfg);
            let opts = ExploreOptions {
                focus: focus.as_deref().map(normalize_entity),
                max_hops: hops.or(ecfg.hops).unwrap_or(DEFAULT_HOPS),
                dfs_depth: depth.or(ecfg.depth).unwrap_or(DEFAULT_DEPTH),
                limit_nodes: limit.or(ecfg.limit_nodes),
            };
            let result = match seed {
                Some(s) => explore(&g, &opts, &mut StdRng::seed_from_u64(s)),
                None => explore(&g, &opts, &mut rand::rng()),
            };
            let snap = match result {
                Ok(s) => s,
                Err(e) => return fail("Explore failed", &e),
            };
            if matches!(output_format(format, &cfg), OutputFormat::Json) {
                return print_json(&snap);
            }
            println!("{}", render_snapshot(&snap));
            0
        }
        Commands::Layers { start, hops, graph, format } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let hops = hops.or(explore_config(&cfg).hops).unwrap_or(DEFAULT_HOPS);
            let layers = match LayeredQuery::new(&normalize_entity(&start), hops).run(&g) {
                Ok(l) => l,
                Err(e) => return fail("Query failed", &e),
            };
            if matches!(output_format(format, &cfg), OutputFormat::Json) {
                return print_json(&layers);
            }
            println!("{}", format_layers(&layers));
            0
        }
        Commands::Traverse { start, order, graph, format } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let start = normalize_entity(&start);
            let q = match order {
                OrderArg::Dfs => TraverseQuery::depth_first(&start),
                OrderArg::Bfs => TraverseQuery::breadth_first(&start),
            };
            let t = match q.run(&g) {
                Ok(t) => t,
                Err(e) => return fail("Query failed", &e),
            };
            if matches!(output_format(format, &cfg), OutputFormat::Json) {
                return print_json(&t);
            }
            println!("{}", table::render(&["#", "Node", "Reached via"], &traversal_rows(&t)));
            0
        }
        Commands::Sample { start, depth, limit, graph, format } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let ecfg = explore_config(&cfg);
            let depth = depth.or(ecfg.depth).unwrap_or(DEFAULT_DEPTH);
            let limit = limit.or(ecfg.limit_nodes);
            let t = match SampleQuery::new(&normalize_entity(&start), depth, limit).run(&g) {
                Ok(t) => t,
                Err(e) => return fail("Query failed", &e),
            };
            if matches!(output_format(format, &cfg), OutputFormat::Json) {
                return print_json(&t);
            }
            println!("{}", t.chain());
            0
        }
        Commands::Path { from, to, graph, format } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let q = ShortestPathQuery::new(&normalize_entity(&from), &normalize_entity(&to));
            let path = match q.run(&g) {
                Ok(p) => p,
                Err(e) => return fail("Query failed", &e),
            };
            if matches!(output_format(format, &cfg), OutputFormat::Json) {
                return print_json(&path);
            }
            match path {
                Some(t) => println!("{}", t.chain()),
                None => println!("<no path>"),
            }
            0
        }
        Commands::Stats { graph, format } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let stats = GraphStats::of(&g);
            if matches!(output_format(format, &cfg), OutputFormat::Json) {
                return print_json(&stats);
            }
            let rows = vec![
                vec!["Nodes".to_string(), stats.nodes.to_string()],
                vec!["Relations".to_string(), stats.relations.to_string()],
                vec!["Adjacency entries".to_string(), stats.edges.to_string()],
                vec!["Predicates".to_string(), stats.predicates.len().to_string()],
            ];
            println!("{}", table::render(&["Metric", "Value"], &rows));
            if !stats.predicates.is_empty() {
                let body: Vec<Vec<String>> = stats
                    .predicates
                    .iter()
                    .map(|p| vec![p.predicate.clone(), p.count.to_string()])
                    .collect();
                println!("{}", table::render(&["Predicate", "Count"], &body));
            }
            0
        }
        Commands::Dot { graph, out, focus, dot_theme, dot_rankdir, dot_splines, dot_rounded, dot_legend } => {
            let g = match load_graph(graph, &cfg) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let opts = dot_options(&cfg, dot_theme, dot_rankdir, dot_splines, dot_rounded, dot_legend);
            let focus = focus.as_deref().map(normalize_entity);
            let content = match DotGenerator::new().generate_dot_with_options(&g, opts, focus.as_deref()) {
                Ok(c) => c,
                Err(e) => return fail("Visualization error", &e),
            };
            match out {
                Some(p) => {
                    if let Err(e) = fs::write(&p, content) {
                        return fail(&format!("Failed to write DOT output {}", p.display()), &e);
                    }
                    if !quiet {
                        println!("Wrote {}", p.display());
                    }
                }
                None => print!("{content}"),
            }
            0
        }
        Commands::Merge { existing, new, out, judge } => {
            let existing_rels = if existing.exists() {
                match read_relations(&existing) {
                    Ok(r) => r,
                    Err(e) => return fail(&format!("Failed to read {}", existing.display()), &e),
                }
            } else {
                Vec::new()
            };
            let new_rels = match read_relations(&new) {
                Ok(r) => r,
                Err(e) => return fail(&format!("Failed to read {}", new.display()), &e),
            };
            let judge: &dyn SimilarityJudge = match judge {
                JudgeArg::Exact => &ExactMatch,
                JudgeArg::Normalized => &NormalizedMatch,
            };
            let merged = match merge_relations(&new_rels, &existing_rels, judge) {
                Ok(m) => m,
                Err(e) => return fail("Merge failed", &e),
            };
            let doc = RelationsDocument { relations: &merged };
            let body = match serde_json::to_string_pretty(&doc) {
                Ok(s) => s,
                Err(e) => return fail("JSON encode error", &e),
            };
            match out {
                Some(p) => {
                    if let Err(e) = fs::write(&p, body) {
                        return fail(&format!("Failed to write {}", p.display()), &e);
                    }
                    if !quiet {
                        println!(
                            "Merged {} existing + {} new -> {} relations",
                            existing_rels.len(),
                            new_rels.len(),
                            merged.len()
                        );
                    }
                }
                None => println!("{body}"),
            }
            0
        }
    }
}

fn fail(context: &str, err: &dyn std::fmt::Display) -> i32 {
    eprintln!("{context}: {err}");
    1
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => fail("JSON encode error", &e),
    }
}

fn load_config(explicit: Option<&Path>) -> Config {
    let found = match explicit {
        Some(p) => config::load_config_at(p),
        None => std::env::current_dir().ok().and_then(|d| config::load_config_near(&d)),
    };
    found.unwrap_or_default()
}

fn graph_path(flag: Option<PathBuf>, cfg: &Config) -> PathBuf {
    flag.or_else(|| cfg.graph.as_ref().and_then(|g| g.path.clone()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GRAPH_FILE))
}

fn bidirectional(one_way: bool, cfg: &Config) -> bool {
    if one_way {
        return false;
    }
    cfg.graph.as_ref().and_then(|g| g.bidirectional).unwrap_or(true)
}

fn load_graph(flag: Option<PathBuf>, cfg: &Config) -> Result<ConceptGraph, i32> {
    let path = graph_path(flag, cfg);
    ConceptGraph::load_json(&path)
        .map_err(|e| fail(&format!("Load graph failed ({})", path.display()), &e))
}

fn explore_config(cfg: &Config) -> ExploreConfig {
    cfg.explore.clone().unwrap_or_default()
}

fn output_format(flag: Option<OutputFormat>, cfg: &Config) -> OutputFormat {
    if let Some(f) = flag {
        return f;
    }
    match cfg.query.as_ref().and_then(|q| q.default_format.as_deref()) {
        Some("json") => OutputFormat::Json,
        Some("text") | None => OutputFormat::Text,
        Some(other) => {
            tracing::warn!(format = other, "unknown default_format in config, using text");
            OutputFormat::Text
        }
    }
}

fn infer_input(path: &Path) -> Option<InputFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(InputFormat::Json),
        Some("tsv" | "txt") => Some(InputFormat::Tsv),
        _ => None,
    }
}

fn read_relations(path: &Path) -> Result<Vec<Triple>, GraphError> {
    let text = fs::read_to_string(path)?;
    RelationsJsonExtractor.extract(&text)
}

#[derive(Serialize)]
struct RelationsDocument<'a> {
    relations: &'a [Triple],
}

#[derive(Debug, Serialize)]
struct PredicateCount {
    predicate: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct GraphStats {
    nodes: usize,
    relations: usize,
    edges: usize,
    predicates: Vec<PredicateCount>,
}

impl GraphStats {
    fn of(g: &ConceptGraph) -> Self {
        let asserted: Vec<_> = g.relations().collect();
        let predicates = predicate_frequencies(&asserted)
            .into_iter()
            .map(|(p, count)| PredicateCount { predicate: p.to_string(), count })
            .collect();
        Self { nodes: g.len(), relations: asserted.len(), edges: g.edge_count(), predicates }
    }
}

fn traversal_rows(t: &Traversal) -> Vec<Vec<String>> {
    t.nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            // edges[i - 1] is the edge that discovered nodes[i]
            let via = match i.checked_sub(1).and_then(|k| t.edges.get(k)) {
                Some(e) => format!("{} {}", e.source, arrow(&e.predicate, e.is_reverse)),
                None => "-".to_string(),
            };
            vec![format!("{}", i + 1), n.to_string(), via]
        })
        .collect()
}

fn render_snapshot(snap: &Snapshot) -> String {
    let mut out = format!("Focus: {}\n\n{}\n", snap.focus, snap.layers_text);
    if !snap.relation_freqs.is_empty() {
        let rows: Vec<Vec<String>> = snap
            .relation_freqs
            .iter()
            .map(|f| vec![f.predicate.to_string(), f.count.to_string()])
            .collect();
        out.push('\n');
        out.push_str(&table::render(&["Predicate", "Count"], &rows));
        out.push('\n');
    }
    out.push_str("\nChain:\n");
    out.push_str(&snap.chain_text);
    out
}

fn dot_options(
    cfg: &Config,
    theme: Option<DotThemeArg>,
    rankdir: Option<DotRankDirArg>,
    splines: Option<DotSplinesArg>,
    rounded: Option<OnOffArg>,
    legend: Option<OnOffArg>,
) -> DotOptions {
    let mut opts = DotOptions::default();
    if let Some(dot) = cfg.dot.as_ref() {
        if let Some(v) = dot.legend {
            opts.legend = v;
        }
        if let Some(v) = dot.theme.as_deref() {
            opts.theme = if v == "dark" { DotTheme::Dark } else { DotTheme::Light };
        }
        if let Some(v) = dot.rankdir.as_deref() {
            opts.rankdir = if v == "TB" { RankDir::TB } else { RankDir::LR };
        }
        if let Some(v) = dot.splines.as_deref() {
            opts.splines = match v {
                "ortho" => EdgeStyle::Ortho,
                "polyline" => EdgeStyle::Polyline,
                _ => EdgeStyle::Curved,
            };
        }
        if let Some(v) = dot.rounded {
            opts.rounded = v;
        }
    }
    if let Some(t) = theme {
        opts.theme = match t {
            DotThemeArg::Light => DotTheme::Light,
            DotThemeArg::Dark => DotTheme::Dark,
        };
    }
    if let Some(r) = rankdir {
        opts.rankdir = match r {
            DotRankDirArg::LR => RankDir::LR,
            DotRankDirArg::TB => RankDir::TB,
        };
    }
    if let Some(s) = splines {
        opts.splines = match s {
            DotSplinesArg::Curved => EdgeStyle::Curved,
            DotSplinesArg::Ortho => EdgeStyle::Ortho,
            DotSplinesArg::Polyline => EdgeStyle::Polyline,
        };
    }
    if let Some(v) = rounded {
        opts.rounded = matches!(v, OnOffArg::On);
    }
    if let Some(v) = legend {
        opts.legend = matches!(v, OnOffArg::On);
    }
    opts
}
