use crate::errors::GraphError;
use crate::graph::ConceptGraph;
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotTheme { Light, Dark }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDir { LR, TB }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle { Curved, Ortho, Polyline }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotOptions {
    pub legend: bool,
    pub theme: DotTheme,
    pub rankdir: RankDir,
    pub splines: EdgeStyle,
    pub rounded: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self { legend: true, theme: DotTheme::Light, rankdir: RankDir::LR, splines: EdgeStyle::Curved, rounded: true }
    }
}

struct Palette {
    background: &'static str,
    font: &'static str,
    node_fill: &'static str,
    focus_fill: &'static str,
    edge: &'static str,
}

fn palette(theme: DotTheme) -> Palette {
    match theme {
        DotTheme::Light => Palette {
            background: "white",
            font: "black",
            node_fill: "#e0f3ff",
            focus_fill: "#ffd966",
            edge: "#555555",
        },
        DotTheme::Dark => Palette {
            background: "#1e1e1e",
            font: "#eeeeee",
            node_fill: "#124559",
            focus_fill: "#7a4c00",
            edge: "#aaaaaa",
        },
    }
}

#[derive(Debug, Default)]
pub struct DotGenerator;

impl DotGenerator {
    #[must_use]
    pub fn new() -> Self { Self {} }

    /// Generate DOT with default options and no focus.
    ///
    /// # Errors
    /// Returns a `GraphError` if DOT generation fails for any reason.
    pub fn generate_dot(&self, graph: &ConceptGraph) -> Result<String, GraphError> {
        self.generate_dot_with_options(graph, DotOptions::default(), None)
    }

    /// Generate DOT with the given `opts`, highlighting `focus` when it is a graph node.
    ///
    /// Nodes get positional ids (`n0`, `n1`, ...) in insertion order and carry
    /// their name as label. Only asserted relations are drawn, so every
    /// relation appears once, pointing the way it was stated.
    ///
    /// # Errors
    /// Returns `GraphError::UnknownConcept` if `focus` is given but not in the graph.
    pub fn generate_dot_with_options(
        &self,
        graph: &ConceptGraph,
        opts: DotOptions,
        focus: Option<&str>,
    ) -> Result<String, GraphError> {
        if let Some(f) = focus {
            if !graph.contains(f) {
                return Err(GraphError::UnknownConcept(f.to_string()));
            }
        }
        let colors = palette(opts.theme);
        let mut s = String::new();
        s.push_str("digraph ConceptGraph\n{");
        s.push('\n');
        let rank = match opts.rankdir { RankDir::LR => "LR", RankDir::TB => "TB" };
        let splines = match opts.splines { EdgeStyle::Curved => "curved", EdgeStyle::Ortho => "ortho", EdgeStyle::Polyline => "polyline" };
        let node_style = if opts.rounded { "filled,rounded" } else { "filled" };
        let _ = write!(
            s,
            "  rankdir={rank};\n  graph [fontname=Helvetica, splines={splines}, bgcolor=\"{}\"] ;\n  node [shape=box, fontsize=10, style=\"{node_style}\", fontcolor=\"{}\"] ;\n  edge [fontname=Helvetica, fontsize=9, color=\"{}\", fontcolor=\"{}\"];\n",
            colors.background, colors.font, colors.edge, colors.font
        );

        let mut ids: HashMap<&str, String> = HashMap::with_capacity(graph.len());
        for (i, name) in graph.nodes().enumerate() {
            let id = format!("n{i}");
            let is_focus = focus == Some(name);
            let fill = if is_focus { colors.focus_fill } else { colors.node_fill };
            let extra = if is_focus { ", penwidth=2" } else { "" };
            let _ = writeln!(s, "  {id} [label=\"{}\", fillcolor=\"{fill}\"{extra}];", escape_label(name));
            ids.insert(name, id);
        }

        for rel in graph.relations() {
            let (Some(from), Some(to)) = (ids.get(rel.source.as_ref()), ids.get(rel.target.as_ref())) else {
                continue;
            };
            let _ = writeln!(s, "  {from} -> {to} [label=\"{}\"];", escape_label(&rel.predicate));
        }

        if opts.legend {
            s.push_str("  subgraph cluster_legend {\n    label=\"Legend\";\n    color=grey;\n");
            let _ = writeln!(s, "    legend_concept [label=\"Concept\", fillcolor=\"{}\"];", colors.node_fill);
            if focus.is_some() {
                let _ = writeln!(s, "    legend_focus [label=\"Focus\", fillcolor=\"{}\"];", colors.focus_fill);
            }
            s.push_str("  }\n");
        }

        s.push_str("}\n");
        tracing::debug!(nodes = graph.len(), relations = graph.relation_count(), "generated dot");
        Ok(s)
    }
}

fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
