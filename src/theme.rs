//! Theme palettes for the rendered page
//!
//! A render picks exactly one [`Palette`] from its [`ThemeMode`] and applies
//! it to the whole page: graph canvas, nodes, edges and the instruction panel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two supported theme modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// All modes, in the order they are offered in the theme select
    pub const ALL: [ThemeMode; 2] = [ThemeMode::Light, ThemeMode::Dark];

    /// The palette for this mode
    pub fn palette(self) -> &'static Palette {
        match self {
            ThemeMode::Light => &LIGHT,
            ThemeMode::Dark => &DARK,
        }
    }

    /// Lowercase value used in query strings and config files
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Light => write!(f, "Light"),
            ThemeMode::Dark => write!(f, "Dark"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!(
                "unknown theme mode '{}' (expected 'light' or 'dark')",
                other
            )),
        }
    }
}

/// The eight style values a render applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub font_color: &'static str,
    pub node_color: &'static str,
    pub positive_edge_color: &'static str,
    pub negative_edge_color: &'static str,
    pub instruction_background: &'static str,
    pub instruction_text_color: &'static str,
    pub instruction_header_color: &'static str,
}

const LIGHT: Palette = Palette {
    background: "#ffffff",
    font_color: "#000000",
    node_color: "#2E8B57",
    positive_edge_color: "green",
    negative_edge_color: "red",
    instruction_background: "#e8f5e9",
    instruction_text_color: "#000",
    instruction_header_color: "#2E8B57",
};

const DARK: Palette = Palette {
    background: "#121212",
    font_color: "#ddd",
    node_color: "#32cd32",
    positive_edge_color: "lime",
    negative_edge_color: "tomato",
    instruction_background: "#222",
    instruction_text_color: "#ccc",
    instruction_header_color: "#90ee90",
};

impl Palette {
    /// Edge color for a link polarity
    pub fn edge_color(&self, polarity: Polarity) -> &'static str {
        match polarity {
            Polarity::Positive => self.positive_edge_color,
            Polarity::Negative => self.negative_edge_color,
        }
    }

    /// The eight values in declaration order
    pub fn values(&self) -> [&'static str; 8] {
        [
            self.background,
            self.font_color,
            self.node_color,
            self.positive_edge_color,
            self.negative_edge_color,
            self.instruction_background,
            self.instruction_text_color,
            self.instruction_header_color,
        ]
    }
}

/// Sign of a link's influence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Only the exact symbol `+` is positive; anything else, empty included, is negative.
    pub fn parse(symbol: &str) -> Self {
        if symbol == "+" {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}
