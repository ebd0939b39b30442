//! The render pipeline
//!
//! One render is a single pass: load the workbook, apply the tier filter,
//! build the graph, write and re-read the fragment, then wrap it in the host
//! page. Nothing is cached between renders; every call reloads the workbook.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{MapConfig, PhysicsConfig};
use crate::filter::{TierFilter, tier_options};
use crate::theme::ThemeMode;
use crate::web::graph::{GraphData, network_to_graph};
use crate::web::page::{self, Controls, RenderError};
use crate::workbook::{LoadError, Network, load_network};

/// Any failure that aborts a render
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Everything one render needs, fixed before the render starts
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub theme: ThemeMode,
    pub tier: TierFilter,
    pub workbook: PathBuf,
    pub fragment: PathBuf,
    pub physics: PhysicsConfig,
    /// Include the theme and tier form in the page
    pub interactive: bool,
}

impl RenderContext {
    /// Context with the file locations and physics taken from `config`
    pub fn from_config(config: &MapConfig, theme: ThemeMode, tier: TierFilter) -> Self {
        Self {
            theme,
            tier,
            workbook: config.data.workbook.clone(),
            fragment: config.data.fragment.clone(),
            physics: config.physics,
            interactive: false,
        }
    }
}

/// The filtered working set plus the graph built from it
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Network after the tier filter
    pub network: Network,
    pub graph: GraphData,
    /// Tier select options, `All` first; `None` without a `Tier` column
    pub tier_options: Option<Vec<String>>,
}

/// A finished render
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub view: GraphView,
}

/// Load, filter and build the graph without touching the fragment file
pub fn build_view(ctx: &RenderContext) -> Result<GraphView, PipelineError> {
    let loaded = load_network(&ctx.workbook)?;
    let tier_options = tier_options(&loaded.nodes);

    let network = ctx.tier.apply(&loaded);
    debug!(
        tier = %ctx.tier,
        nodes = network.nodes.len(),
        links = network.links.len(),
        "applied tier filter"
    );

    let graph = network_to_graph(&network, ctx.theme.palette());

    Ok(GraphView {
        network,
        graph,
        tier_options,
    })
}

/// Run the full pipeline and return the host page
pub fn render(ctx: &RenderContext) -> Result<RenderedPage, PipelineError> {
    let view = build_view(ctx)?;
    let palette = ctx.theme.palette();

    let fragment = page::render_fragment(&view.graph, palette, &ctx.physics)?;
    let fragment = page::materialize_fragment(&ctx.fragment, &fragment)?;

    let controls = Controls {
        theme: ctx.theme,
        tier: &ctx.tier,
        tier_options: view.tier_options.as_deref(),
    };
    let html = page::render_page(palette, &fragment, ctx.interactive.then_some(&controls))?;

    info!(
        theme = %ctx.theme,
        tier = %ctx.tier,
        nodes = view.graph.nodes.len(),
        edges = view.graph.edges.len(),
        "rendered network"
    );

    Ok(RenderedPage { html, view })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::workbook::test_support::{write_sample, write_workbook};

    fn context(dir: &Path, theme: ThemeMode, tier: &str) -> RenderContext {
        RenderContext {
            theme,
            tier: TierFilter::from_option(tier),
            workbook: dir.join("network.xlsx"),
            fragment: dir.join("fragment.html"),
            physics: PhysicsConfig::default(),
            interactive: false,
        }
    }

    #[test]
    fn test_filter_prunes_links_to_removed_nodes() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(&dir.path().join("network.xlsx"));

        let view = build_view(&context(dir.path(), ThemeMode::Light, "T1")).unwrap();
        assert_eq!(view.graph.node_ids(), vec!["1"]);
        assert!(view.graph.edges.is_empty());
        assert!(view.network.links.is_empty());
    }

    #[test]
    fn test_all_keeps_every_node_and_link() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(&dir.path().join("network.xlsx"));

        let ctx = context(dir.path(), ThemeMode::Light, "All");
        let view = build_view(&ctx).unwrap();
        assert_eq!(view.graph.node_ids(), vec!["1", "2"]);
        assert_eq!(view.graph.edge_pairs(), vec![("1", "2")]);
        assert_eq!(
            view.graph.edges[0].color,
            ThemeMode::Light.palette().positive_edge_color
        );
        assert_eq!(view.graph.edges[0].title, "supports (5)");
        assert_eq!(
            view.tier_options,
            Some(vec!["All".to_string(), "T1".to_string(), "T2".to_string()])
        );
    }

    #[test]
    fn test_theme_does_not_change_working_set() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(&dir.path().join("network.xlsx"));

        for tier in ["All", "T1", "T2"] {
            let light = build_view(&context(dir.path(), ThemeMode::Light, tier)).unwrap();
            let dark = build_view(&context(dir.path(), ThemeMode::Dark, tier)).unwrap();

            assert_eq!(light.network, dark.network);
            assert_eq!(light.graph.node_ids(), dark.graph.node_ids());
            assert_eq!(light.graph.edge_pairs(), dark.graph.edge_pairs());
        }
    }

    #[test]
    fn test_render_writes_fragment_and_embeds_it() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(&dir.path().join("network.xlsx"));

        let mut ctx = context(dir.path(), ThemeMode::Dark, "All");
        ctx.interactive = true;
        let page = render(&ctx).unwrap();

        let fragment = std::fs::read_to_string(&ctx.fragment).unwrap();
        assert!(fragment.contains("vis.Network"));
        assert!(fragment.contains("\"color\":\"lime\""));
        assert!(page.html.contains("srcdoc="));
        assert!(page.html.contains("vis.Network"));
        assert!(page.html.contains("<option value=\"dark\" selected>Dark</option>"));
    }

    #[test]
    fn test_render_without_tier_column_ignores_filter() {
        let dir = tempfile::tempdir().unwrap();
        let nodes: &[&[&str]] = &[
            &["NodeID", "Name", "Type"],
            &["1", "A", "Farm"],
            &["2", "B", "Retail"],
        ];
        let links: &[&[&str]] = &[
            &["SourceID", "TargetID", "Polarity", "InfluenceType", "Strength"],
            &["2", "1", "-", "competes", "2"],
        ];
        write_workbook(
            &dir.path().join("network.xlsx"),
            &[("Nodes", nodes), ("Links", links)],
        );

        let view = build_view(&context(dir.path(), ThemeMode::Light, "T1")).unwrap();
        assert_eq!(view.tier_options, None);
        assert_eq!(view.graph.node_ids(), vec!["1", "2"]);
        assert_eq!(view.graph.edges[0].color, "red");
    }

    #[test]
    fn test_cell_values_are_not_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let nodes: &[&[&str]] = &[
            &["NodeID", "Name", "Type", "Tier"],
            &["1", "A", "Farm", "T1 "],
            &["2", "B", "Retail", "T1"],
        ];
        let links: &[&[&str]] = &[
            &["SourceID", "TargetID", "Polarity", "InfluenceType", "Strength"],
            &["1", "2", "+ ", "supports", "5"],
        ];
        write_workbook(
            &dir.path().join("network.xlsx"),
            &[("Nodes", nodes), ("Links", links)],
        );

        let view = build_view(&context(dir.path(), ThemeMode::Light, "All")).unwrap();
        assert_eq!(view.network.links.rows[0].polarity, "+ ");
        assert_eq!(view.graph.edges[0].color, "red");
        assert_eq!(
            view.tier_options,
            Some(vec!["All".to_string(), "T1".to_string(), "T1 ".to_string()])
        );

        let view = build_view(&context(dir.path(), ThemeMode::Light, "T1")).unwrap();
        assert_eq!(view.graph.node_ids(), vec!["2"]);
    }

    #[test]
    fn test_missing_workbook_aborts_render() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), ThemeMode::Light, "All");

        let err = render(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::NotFound(_))));
        assert!(!ctx.fragment.exists());
    }
}
