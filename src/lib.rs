//! # stakeholder-map - Stakeholder Network Mapping Tool
//!
//! Loads a workbook describing a stakeholder network and renders it as an
//! interactive force-directed graph inside a themed web page.
//!
//! ## Overview
//!
//! A render is one linear pass over four stages:
//!
//! 1. **Theme** - pick the light or dark [`Palette`]
//! 2. **Workbook** - read the `Nodes` and `Links` sheets
//! 3. **Filter** - optionally keep a single `Tier`, pruning links whose
//!    endpoints were removed
//! 4. **Graph** - build the directed graph and hand layout to vis-network
//!
//! ## Usage
//!
//! ```bash
//! # Render the map to stakeholder_map.html
//! stakeholder-map irish_food_system_network.xlsx
//!
//! # Dark theme, one tier only
//! stakeholder-map --theme dark --tier "Tier 1" network.xlsx
//!
//! # Serve the map with live theme and tier selects
//! stakeholder-map --web network.xlsx
//! ```
//!
//! ## Workbook Layout
//!
//! | Sheet   | Columns                                                  |
//! |---------|----------------------------------------------------------|
//! | `Nodes` | NodeID, Name, Type, Description (optional), Tier (optional) |
//! | `Links` | SourceID, TargetID, Polarity, InfluenceType, Strength     |

pub mod config;
pub mod filter;
pub mod pipeline;
pub mod theme;
pub mod web;
pub mod workbook;

pub use config::{
    ConfigError, DataConfig, MapConfig, PhysicsConfig, ServerSection, ViewConfig, load_config,
    load_config_file,
};
pub use filter::{ALL_TIERS, TierFilter, available_tiers, tier_options};
pub use pipeline::{GraphView, PipelineError, RenderContext, RenderedPage, build_view, render};
pub use theme::{Palette, Polarity, ThemeMode};
pub use workbook::{Link, LinkTable, LoadError, Network, Node, NodeTable, load_network};
