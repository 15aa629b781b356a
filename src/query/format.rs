//! Direction-aware rendering of traversal results.
//!
//! A predicate is always shown in the direction it was asserted: stepping over
//! a reverse companion edge prints the arrow pointing back at the walker.
use super::Layers;
use crate::graph::Edge;

/// `-[p]->` for an asserted edge, `<-[p]-` for a reverse companion.
#[must_use]
pub fn arrow(predicate: &str, is_reverse: bool) -> String {
    if is_reverse {
        format!("<-[{predicate}]-")
    } else {
        format!("-[{predicate}]->")
    }
}

/// One block per hop distance, each line `parent <arrow> child`; the root line
/// carries no arrow. Lines are joined with `\n`, without a trailing newline.
#[must_use]
pub fn format_layers(layers: &Layers) -> String {
    let mut lines: Vec<String> = Vec::new();
    for (depth, entries) in &layers.layers {
        lines.push(format!("Layer {depth}:"));
        for e in entries {
            match (&e.parent, &e.predicate) {
                (Some(parent), Some(pred)) => {
                    lines.push(format!("  {parent} {} {}", arrow(pred, e.is_reverse), e.node));
                }
                _ => lines.push(format!("  {}", e.node)),
            }
        }
    }
    lines.join("\n")
}

/// Left-to-right chain `start <arrow> n1 <arrow> n2 ...`, in edge order.
#[must_use]
pub fn format_chain(start: &str, edges: &[Edge]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(edges.len() * 2 + 1);
    parts.push(start.to_string());
    for e in edges {
        parts.push(arrow(&e.predicate, e.is_reverse));
        parts.push(e.target.to_string());
    }
    parts.join(" ")
}
