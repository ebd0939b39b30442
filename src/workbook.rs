//! Workbook loading
//!
//! Reads the `Nodes` and `Links` sheets of a stakeholder workbook into
//! row-oriented tables. Row 1 of each sheet is the header row; columns are
//! located by header name, so column order in the workbook does not matter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Name of the sheet holding stakeholder nodes
pub const NODES_SHEET: &str = "Nodes";
/// Name of the sheet holding directed links
pub const LINKS_SHEET: &str = "Links";

const NODE_ID: &str = "NodeID";
const NAME: &str = "Name";
const TYPE: &str = "Type";
const DESCRIPTION: &str = "Description";
const TIER: &str = "Tier";

const SOURCE_ID: &str = "SourceID";
const TARGET_ID: &str = "TargetID";
const POLARITY: &str = "Polarity";
const INFLUENCE_TYPE: &str = "InfluenceType";
const STRENGTH: &str = "Strength";

const NODE_COLUMNS: [&str; 5] = [NODE_ID, NAME, TYPE, DESCRIPTION, TIER];
const LINK_COLUMNS: [&str; 5] = [SOURCE_ID, TARGET_ID, POLARITY, INFLUENCE_TYPE, STRENGTH];

/// Errors that can occur when loading a workbook
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Workbook not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read workbook {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Workbook has no '{0}' sheet")]
    MissingSheet(&'static str),

    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn {
        sheet: &'static str,
        column: &'static str,
    },
}

/// A stakeholder entity, one row of the `Nodes` sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub node_type: String,
    pub description: Option<String>,
    pub tier: Option<String>,
    /// Undeclared columns, keyed by header
    pub extra: BTreeMap<String, String>,
}

/// A directed relationship, one row of the `Links` sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    /// Raw polarity symbol; see [`crate::theme::Polarity::parse`]
    pub polarity: String,
    pub influence_type: String,
    pub strength: String,
    pub extra: BTreeMap<String, String>,
}

/// Rows of the `Nodes` sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTable {
    /// Whether the sheet declares a `Tier` column at all
    pub has_tier_column: bool,
    pub rows: Vec<Node>,
}

/// Rows of the `Links` sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    pub rows: Vec<Link>,
}

/// Both tables of a loaded workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    pub nodes: NodeTable,
    pub links: LinkTable,
}

/// A sheet as header names plus string rows
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn required(&self, sheet: &'static str, column: &'static str) -> Result<usize, LoadError> {
        self.column(column)
            .ok_or(LoadError::MissingColumn { sheet, column })
    }

    /// Cells of undeclared columns, skipping empty ones
    fn extra(&self, row: &[String], declared: &[&str]) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .zip(row.iter())
            .filter(|(h, v)| !h.is_empty() && !v.is_empty() && !declared.contains(&h.as_str()))
            .map(|(h, v)| (h.clone(), v.clone()))
            .collect()
    }
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

fn optional_cell(row: &[String], idx: Option<usize>) -> Option<String> {
    idx.map(|i| cell(row, i)).filter(|v| !v.is_empty())
}

impl NodeTable {
    /// Build the node table from a parsed `Nodes` sheet
    pub fn from_sheet(sheet: &SheetTable) -> Result<Self, LoadError> {
        let id = sheet.required(NODES_SHEET, NODE_ID)?;
        let name = sheet.required(NODES_SHEET, NAME)?;
        let node_type = sheet.required(NODES_SHEET, TYPE)?;
        let description = sheet.column(DESCRIPTION);
        let tier = sheet.column(TIER);

        let rows = sheet
            .rows
            .iter()
            .map(|row| Node {
                id: cell(row, id),
                name: cell(row, name),
                node_type: cell(row, node_type),
                description: optional_cell(row, description),
                tier: optional_cell(row, tier),
                extra: sheet.extra(row, &NODE_COLUMNS),
            })
            .collect();

        Ok(Self {
            has_tier_column: tier.is_some(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LinkTable {
    /// Build the link table from a parsed `Links` sheet
    pub fn from_sheet(sheet: &SheetTable) -> Result<Self, LoadError> {
        let source = sheet.required(LINKS_SHEET, SOURCE_ID)?;
        let target = sheet.required(LINKS_SHEET, TARGET_ID)?;
        let polarity = sheet.required(LINKS_SHEET, POLARITY)?;
        let influence_type = sheet.required(LINKS_SHEET, INFLUENCE_TYPE)?;
        let strength = sheet.required(LINKS_SHEET, STRENGTH)?;

        let rows = sheet
            .rows
            .iter()
            .map(|row| Link {
                source: cell(row, source),
                target: cell(row, target),
                polarity: cell(row, polarity),
                influence_type: cell(row, influence_type),
                strength: cell(row, strength),
                extra: sheet.extra(row, &LINK_COLUMNS),
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the `Nodes` and `Links` sheets from an `.xlsx` workbook
pub fn load_network(path: &Path) -> Result<Network, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let nodes_sheet = read_sheet(&book, NODES_SHEET)?;
    let links_sheet = read_sheet(&book, LINKS_SHEET)?;

    let network = Network {
        nodes: NodeTable::from_sheet(&nodes_sheet)?,
        links: LinkTable::from_sheet(&links_sheet)?,
    };

    debug!(
        path = %path.display(),
        nodes = network.nodes.len(),
        links = network.links.len(),
        "loaded workbook"
    );

    Ok(network)
}

fn read_sheet(
    book: &umya_spreadsheet::Spreadsheet,
    name: &'static str,
) -> Result<SheetTable, LoadError> {
    let sheet = book
        .get_sheet_by_name(name)
        .ok_or(LoadError::MissingSheet(name))?;
    Ok(sheet_to_table(sheet))
}

/// Convert a worksheet into headers plus rows, dropping rows with no values
fn sheet_to_table(sheet: &umya_spreadsheet::Worksheet) -> SheetTable {
    let max_col = sheet.get_highest_column();
    let max_row = sheet.get_highest_row();

    // umya coordinates are (column, row), both 1-based; data cells are kept verbatim
    let read_row = |row: u32| -> Vec<String> {
        (1..=max_col)
            .map(|col| sheet.get_value((col, row)))
            .collect()
    };

    if max_row == 0 {
        return SheetTable::default();
    }

    let headers = read_row(1)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let rows = (2..=max_row)
        .map(read_row)
        .filter(|row| row.iter().any(|v| !v.is_empty()))
        .collect();

    SheetTable { headers, rows }
}
