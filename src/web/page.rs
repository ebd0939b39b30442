//! HTML rendering
//!
//! Produces the self-contained graph fragment handed to vis-network and the
//! host page that embeds it. Both are filled from templates embedded in the
//! binary.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::graph::GraphData;
use crate::config::PhysicsConfig;
use crate::filter::TierFilter;
use crate::theme::{Palette, ThemeMode};

/// Embedded HTML templates
#[derive(RustEmbed)]
#[folder = "web-assets/"]
struct Assets;

pub const PAGE_TITLE: &str = "Stakeholder Network Mapping Tool";
pub const PAGE_SUBTITLE: &str = "Exploring stakeholder influence networks";
pub const CANVAS_HEIGHT: &str = "900px";
pub const CANVAS_WIDTH: &str = "100%";

/// Errors that can occur while rendering HTML
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Missing embedded template: {0}")]
    MissingAsset(&'static str),

    #[error("Failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write fragment {}: {source}", .path.display())]
    WriteFragment { path: PathBuf, source: io::Error },

    #[error("Failed to read fragment {}: {source}", .path.display())]
    ReadFragment { path: PathBuf, source: io::Error },
}

/// The selections shown in the sidebar form of an interactive page
#[derive(Debug, Clone, Copy)]
pub struct Controls<'a> {
    pub theme: ThemeMode,
    pub tier: &'a TierFilter,
    /// `None` when the workbook has no `Tier` column
    pub tier_options: Option<&'a [String]>,
}

fn template(name: &'static str) -> Result<String, RenderError> {
    Assets::get(name)
        .map(|file| String::from_utf8_lossy(&file.data).into_owned())
        .ok_or(RenderError::MissingAsset(name))
}

/// Substitute `{{key}}` placeholders in one pass; unknown keys are left as-is
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// JSON that is safe inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// vis-network options: directed edges, hover, connected-edge selection and
/// a Barnes-Hut simulation with the configured parameters
fn network_options(palette: &Palette, physics: &PhysicsConfig) -> serde_json::Value {
    json!({
        "nodes": {
            "font": { "color": palette.font_color }
        },
        "edges": {
            "arrows": { "to": { "enabled": true } },
            "smooth": { "type": "continuous" }
        },
        "interaction": {
            "hover": true,
            "dragNodes": true,
            "zoomView": true,
            "selectConnectedEdges": true
        },
        "physics": {
            "enabled": true,
            "solver": "barnesHut",
            "barnesHut": physics
        }
    })
}

/// Render the standalone graph fragment
pub fn render_fragment(
    graph: &GraphData,
    palette: &Palette,
    physics: &PhysicsConfig,
) -> Result<String, RenderError> {
    let nodes = script_json(&graph.nodes)?;
    let edges = script_json(&graph.edges)?;
    let options = script_json(&network_options(palette, physics))?;

    Ok(fill(
        &template("network.html")?,
        &[
            ("width", CANVAS_WIDTH),
            ("height", CANVAS_HEIGHT),
            ("background", palette.background),
            ("nodes", &nodes),
            ("edges", &edges),
            ("options", &options),
        ],
    ))
}

/// Write the fragment as UTF-8; the file is flushed and closed on return
pub fn write_fragment(path: &Path, html: &str) -> Result<(), RenderError> {
    let wrap = |source| RenderError::WriteFragment {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(html.as_bytes()).map_err(wrap)?;
    let file = writer.into_inner().map_err(|e| wrap(e.into_error()))?;
    file.sync_all().map_err(wrap)?;
    Ok(())
}

/// Read a fragment back as UTF-8 text
pub fn read_fragment(path: &Path) -> Result<String, RenderError> {
    fs::read_to_string(path).map_err(|source| RenderError::ReadFragment {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the fragment to `path`, then read it back for embedding
pub fn materialize_fragment(path: &Path, html: &str) -> Result<String, RenderError> {
    write_fragment(path, html)?;
    read_fragment(path)
}

fn option_tag(out: &mut String, value: &str, label: &str, selected: bool) {
    out.push_str(&format!(
        "      <option value=\"{}\"{}>{}</option>\n",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    ));
}

fn render_sidebar(controls: &Controls<'_>) -> String {
    let mut out = String::new();
    out.push_str("<aside id=\"sidebar\">\n  <form method=\"get\" action=\"/\">\n");
    out.push_str("    <label for=\"theme\">Select Theme Mode</label>\n");
    out.push_str("    <select id=\"theme\" name=\"theme\" onchange=\"this.form.submit()\">\n");
    for mode in ThemeMode::ALL {
        option_tag(
            &mut out,
            mode.as_str(),
            &mode.to_string(),
            mode == controls.theme,
        );
    }
    out.push_str("    </select>\n");

    if let Some(options) = controls.tier_options {
        let current = controls.tier.as_option();
        out.push_str("    <h3>🔍 Filter by Tier</h3>\n");
        out.push_str("    <label for=\"tier\">Select a Tier</label>\n");
        out.push_str("    <select id=\"tier\" name=\"tier\" onchange=\"this.form.submit()\">\n");
        for option in options {
            option_tag(&mut out, option, option, option == current);
        }
        // A tier requested by URL but absent from the data still shows as selected
        if !options.iter().any(|o| o == current) {
            option_tag(&mut out, current, current, true);
        }
        out.push_str("    </select>\n");
    }

    out.push_str("    <noscript><button type=\"submit\">Apply</button></noscript>\n");
    out.push_str("  </form>\n</aside>");
    out
}

/// Render the host page around an already materialized fragment.
///
/// `controls` adds the theme and tier selects; pages written to disk are
/// rendered without them.
pub fn render_page(
    palette: &Palette,
    fragment: &str,
    controls: Option<&Controls<'_>>,
) -> Result<String, RenderError> {
    let sidebar = controls.map(render_sidebar).unwrap_or_default();
    let fragment = escape_html(fragment);

    Ok(fill(
        &template("page.html")?,
        &[
            ("title", PAGE_TITLE),
            ("subtitle", PAGE_SUBTITLE),
            ("background", palette.background),
            ("font_color", palette.font_color),
            ("node_color", palette.node_color),
            ("positive_edge", palette.positive_edge_color),
            ("negative_edge", palette.negative_edge_color),
            ("instruction_bg", palette.instruction_background),
            ("instruction_text", palette.instruction_text_color),
            ("instruction_header", palette.instruction_header_color),
            ("height", CANVAS_HEIGHT),
            ("sidebar", &sidebar),
            ("fragment", &fragment),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::graph::{GraphEdge, GraphNode};
    use crate::theme::Polarity;

    fn sample_graph() -> GraphData {
        GraphData {
            nodes: vec![GraphNode {
                id: "1".to_string(),
                label: "</script><b>Co-op</b>".to_string(),
                title: "Farm: ".to_string(),
                shape: "dot",
                size: 15,
                color: "#2E8B57",
            }],
            edges: vec![GraphEdge {
                id: "e0".to_string(),
                from: "1".to_string(),
                to: "1".to_string(),
                title: "supports (5)".to_string(),
                color: "green",
                polarity: Polarity::Positive,
            }],
        }
    }

    #[test]
    fn test_fill() {
        assert_eq!(fill("a {{x}} b {{y}}", &[("x", "1"), ("y", "2")]), "a 1 b 2");
        assert_eq!(fill("{{unknown}}", &[]), "{{unknown}}");
        assert_eq!(fill("open {{", &[]), "open {{");
        // substituted values are not rescanned
        assert_eq!(fill("{{x}}{{y}}", &[("x", "{{y}}"), ("y", "2")]), "{{y}}2");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_fragment() {
        let palette = ThemeMode::Dark.palette();
        let html = render_fragment(&sample_graph(), palette, &PhysicsConfig::default()).unwrap();

        assert!(html.contains("vis-network"));
        assert!(html.contains("background-color: #121212"));
        assert!(html.contains("height: 900px"));
        assert!(html.contains("\"gravitationalConstant\":-20000.0"));
        assert!(html.contains("\"solver\":\"barnesHut\""));
        assert!(html.contains("\"color\":\"#ddd\""));
        assert!(!html.contains("{{"));
        // labels cannot close the script element
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("<\\/script><b>Co-op<\\/b>"));
    }

    #[test]
    fn test_materialize_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fragment.html");
        let html = "<p>Tánaiste → Teagasc</p>";

        let read_back = materialize_fragment(&path, html).unwrap();
        assert_eq!(read_back, html);
    }

    #[test]
    fn test_write_fragment_to_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("fragment.html");

        let err = write_fragment(&path, "x").unwrap_err();
        assert!(matches!(err, RenderError::WriteFragment { .. }));
    }

    #[test]
    fn test_render_static_page() {
        let palette = ThemeMode::Light.palette();
        let page = render_page(palette, "<div id=\"network\"></div>", None).unwrap();

        assert!(page.contains(PAGE_TITLE));
        assert!(page.contains(PAGE_SUBTITLE));
        assert!(page.contains("Interactive Network Map"));
        assert!(page.contains("background-color: #e8f5e9"));
        assert!(page.contains("srcdoc=\"&lt;div id=&quot;network&quot;&gt;&lt;/div&gt;\""));
        assert!(!page.contains("<form"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_render_interactive_page() {
        let palette = ThemeMode::Dark.palette();
        let tier = TierFilter::Tier("T2".to_string());
        let options = vec!["All".to_string(), "T1".to_string(), "T2".to_string()];
        let controls = Controls {
            theme: ThemeMode::Dark,
            tier: &tier,
            tier_options: Some(&options),
        };

        let page = render_page(palette, "", Some(&controls)).unwrap();
        assert!(page.contains("<option value=\"dark\" selected>Dark</option>"));
        assert!(page.contains("<option value=\"light\">Light</option>"));
        assert!(page.contains("<option value=\"T2\" selected>T2</option>"));
        assert!(page.contains("<option value=\"All\">All</option>"));
        assert!(page.contains("Filter by Tier"));
    }

    #[test]
    fn test_interactive_page_without_tier_column() {
        let tier = TierFilter::All;
        let controls = Controls {
            theme: ThemeMode::Light,
            tier: &tier,
            tier_options: None,
        };

        let page = render_page(ThemeMode::Light.palette(), "", Some(&controls)).unwrap();
        assert!(page.contains("name=\"theme\""));
        assert!(!page.contains("name=\"tier\""));
    }
}
