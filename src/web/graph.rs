//! Graph data structures for web visualization
//!
//! Converts a filtered [`Network`] into vis-network node and edge records,
//! styled from the active [`Palette`].

use std::collections::HashSet;

use serde::Serialize;

use crate::theme::{Palette, Polarity};
use crate::workbook::{Link, Network, Node};

/// Shape every vertex is drawn with
pub const NODE_SHAPE: &str = "dot";
/// Radius every vertex is drawn with
pub const NODE_SIZE: u32 = 15;

/// Complete graph data for visualization
#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A vertex (one stakeholder)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Hover tooltip
    pub title: String,
    pub shape: &'static str,
    pub size: u32,
    pub color: &'static str,
}

/// A directed edge (one influence link)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub title: String,
    pub color: &'static str,
    pub polarity: Polarity,
}

impl GraphData {
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn edge_pairs(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect()
    }
}

fn node_title(node: &Node) -> String {
    format!(
        "{}: {}",
        node.node_type,
        node.description.as_deref().unwrap_or("")
    )
}

fn edge_title(link: &Link) -> String {
    format!("{} ({})", link.influence_type, link.strength)
}

/// Convert a network to graph data.
///
/// A repeated node id keeps its first row. Links whose endpoints are not
/// vertices are left out.
pub fn network_to_graph(network: &Network, palette: &Palette) -> GraphData {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::with_capacity(network.nodes.len());

    for node in &network.nodes.rows {
        if !seen.insert(node.id.as_str()) {
            continue;
        }
        nodes.push(GraphNode {
            id: node.id.clone(),
            label: node.name.clone(),
            title: node_title(node),
            shape: NODE_SHAPE,
            size: NODE_SIZE,
            color: palette.node_color,
        });
    }

    let edges = network
        .links
        .rows
        .iter()
        .filter(|link| seen.contains(link.source.as_str()) && seen.contains(link.target.as_str()))
        .enumerate()
        .map(|(idx, link)| {
            let polarity = Polarity::parse(&link.polarity);
            GraphEdge {
                id: format!("e{}", idx),
                from: link.source.clone(),
                to: link.target.clone(),
                title: edge_title(link),
                color: palette.edge_color(polarity),
                polarity,
            }
        })
        .collect();

    GraphData { nodes, edges }
}
