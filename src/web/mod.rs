//! Web visualization module for stakeholder-map
//!
//! Turns a filtered network into vis-network graph data, renders the graph
//! fragment and host page, and serves them over HTTP:
//! - `GET /` renders the themed page with theme and tier selects
//! - `GET /api/graph` returns the filtered graph as JSON
//! - `GET /api/tiers` returns the tier options

pub mod graph;
pub mod page;
pub mod routes;
pub mod server;

pub use graph::{GraphData, network_to_graph};
pub use page::{RenderError, render_fragment, render_page};
pub use server::{ServerConfig, start_server};
