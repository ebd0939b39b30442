//! Configuration file support for stakeholder-map
//!
//! This module handles parsing `.stakeholder-map.toml` files that override the
//! workbook location, the force-simulation defaults and the web server settings.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .stakeholder-map.toml
//!
//! [data]
//! # Workbook holding the Nodes and Links sheets
//! workbook = "irish_food_system_network.xlsx"
//!
//! # Intermediate graph fragment, rewritten on every render
//! fragment = "food_network.html"
//!
//! [physics]
//! # Barnes-Hut parameters handed to the client-side layout
//! gravitational_constant = -20000.0
//! central_gravity = 0.3
//! spring_length = 150.0
//! spring_constant = 0.05
//! damping = 0.25
//!
//! [view]
//! # Theme used when none is requested: "light" or "dark"
//! theme = "dark"
//!
//! [server]
//! port = 3000
//! open_browser = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::ThemeMode;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Input and intermediate file locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Workbook with `Nodes` and `Links` sheets
    #[serde(default = "default_workbook")]
    pub workbook: PathBuf,

    /// Where the graph fragment is written before being embedded
    #[serde(default = "default_fragment")]
    pub fragment: PathBuf,
}

fn default_workbook() -> PathBuf {
    PathBuf::from("irish_food_system_network.xlsx")
}

fn default_fragment() -> PathBuf {
    PathBuf::from("food_network.html")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            workbook: default_workbook(),
            fragment: default_fragment(),
        }
    }
}

/// Barnes-Hut force simulation parameters
///
/// Serialized with vis-network's option names so the struct can be handed
/// to the client-side layout as-is.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Negative values repel; strong global repulsion spreads the network out
    #[serde(default = "default_gravitational_constant", alias = "gravitational_constant")]
    pub gravitational_constant: f64,

    #[serde(default = "default_central_gravity", alias = "central_gravity")]
    pub central_gravity: f64,

    /// Rest length of the edge springs
    #[serde(default = "default_spring_length", alias = "spring_length")]
    pub spring_length: f64,

    #[serde(default = "default_spring_constant", alias = "spring_constant")]
    pub spring_constant: f64,

    #[serde(default = "default_damping")]
    pub damping: f64,
}

fn default_gravitational_constant() -> f64 {
    -20000.0
}

fn default_central_gravity() -> f64 {
    0.3
}

fn default_spring_length() -> f64 {
    150.0
}

fn default_spring_constant() -> f64 {
    0.05
}

fn default_damping() -> f64 {
    0.25
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: default_gravitational_constant(),
            central_gravity: default_central_gravity(),
            spring_length: default_spring_length(),
            spring_constant: default_spring_constant(),
            damping: default_damping(),
        }
    }
}

/// Page defaults
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ViewConfig {
    /// Theme used when neither the CLI nor the request picks one
    #[serde(default)]
    pub theme: ThemeMode,
}

/// Web server section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_open_browser() -> bool {
    true
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            open_browser: default_open_browser(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MapConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub physics: PhysicsConfig,

    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    pub server: ServerSection,
}

/// Load configuration, searching upward from `start_path`
///
/// Returns the defaults when no config file exists.
pub fn load_config(start_path: &Path) -> Result<MapConfig, ConfigError> {
    match find_config_file(start_path) {
        Some(path) => load_config_file(&path),
        None => Ok(MapConfig::default()),
    }
}

/// Load configuration from an explicit file
pub fn load_config_file(path: &Path) -> Result<MapConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: MapConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Find the config file by searching up the directory tree
fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".stakeholder-map.toml", "stakeholder-map.toml"];

    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    None
}
