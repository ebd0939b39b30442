//! Tier filtering over the node and link tables

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::workbook::{LinkTable, Network, NodeTable};

/// Sentinel option that disables filtering
pub const ALL_TIERS: &str = "All";

/// The active tier selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TierFilter {
    #[default]
    All,
    Tier(String),
}

impl TierFilter {
    /// Parse a select value; `All` (or an empty value) means no filtering
    pub fn from_option(value: &str) -> Self {
        if value.is_empty() || value == ALL_TIERS {
            TierFilter::All
        } else {
            TierFilter::Tier(value.to_string())
        }
    }

    /// The value this filter shows as in the tier select
    pub fn as_option(&self) -> &str {
        match self {
            TierFilter::All => ALL_TIERS,
            TierFilter::Tier(tier) => tier,
        }
    }

    /// Apply the filter to a loaded network.
    ///
    /// With a concrete tier, nodes are kept when their tier matches, then
    /// links are kept only when both endpoints are among the kept nodes.
    /// `All`, or a node sheet without a `Tier` column, returns the input
    /// unchanged.
    pub fn apply(&self, network: &Network) -> Network {
        let tier = match self {
            TierFilter::Tier(tier) if network.nodes.has_tier_column => tier,
            _ => return network.clone(),
        };

        let rows: Vec<_> = network
            .nodes
            .rows
            .iter()
            .filter(|node| node.tier.as_deref() == Some(tier.as_str()))
            .cloned()
            .collect();

        let valid_ids: HashSet<&str> = rows.iter().map(|node| node.id.as_str()).collect();

        let links = network
            .links
            .rows
            .iter()
            .filter(|link| {
                valid_ids.contains(link.source.as_str()) && valid_ids.contains(link.target.as_str())
            })
            .cloned()
            .collect();

        Network {
            nodes: NodeTable {
                has_tier_column: true,
                rows,
            },
            links: LinkTable { rows: links },
        }
    }
}

impl fmt::Display for TierFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_option())
    }
}

impl FromStr for TierFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TierFilter::from_option(s))
    }
}

/// Distinct, sorted, non-missing tiers; `None` when the sheet has no `Tier` column.
///
/// Tiers sort numerically when every one of them is a number, otherwise as strings.
pub fn available_tiers(nodes: &NodeTable) -> Option<Vec<String>> {
    if !nodes.has_tier_column {
        return None;
    }

    let tiers: BTreeSet<&str> = nodes
        .rows
        .iter()
        .filter_map(|node| node.tier.as_deref())
        .collect();

    let numeric: Option<Vec<(f64, &str)>> = tiers
        .iter()
        .map(|tier| tier.trim().parse::<f64>().ok().map(|n| (n, *tier)))
        .collect();

    let sorted = match numeric {
        Some(mut numbers) => {
            numbers.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
            numbers.into_iter().map(|(_, tier)| tier.to_string()).collect()
        }
        None => tiers.into_iter().map(str::to_string).collect(),
    };

    Some(sorted)
}

/// Options for the tier select: `All` first, then every available tier
pub fn tier_options(nodes: &NodeTable) -> Option<Vec<String>> {
    available_tiers(nodes).map(|tiers| {
        std::iter::once(ALL_TIERS.to_string())
            .chain(tiers)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::workbook::{Link, Node};

    fn node(id: &str, tier: Option<&str>) -> Node {
        Node {
            id: id.to_string(),
            name: format!("Node {}", id),
            node_type: "Farm".to_string(),
            description: None,
            tier: tier.map(str::to_string),
            extra: BTreeMap::new(),
        }
    }

    fn link(source: &str, target: &str) -> Link {
        Link {
            source: source.to_string(),
            target: target.to_string(),
            polarity: "+".to_string(),
            influence_type: "supports".to_string(),
            strength: "3".to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn sample() -> Network {
        Network {
            nodes: NodeTable {
                has_tier_column: true,
                rows: vec![
                    node("1", Some("T1")),
                    node("2", Some("T2")),
                    node("3", Some("T1")),
                    node("4", None),
                ],
            },
            links: LinkTable {
                rows: vec![link("1", "2"), link("1", "3"), link("3", "1"), link("4", "1")],
            },
        }
    }

    #[test]
    fn test_filter_by_tier() {
        let network = sample();
        let filtered = TierFilter::Tier("T1".to_string()).apply(&network);

        assert!(
            filtered
                .nodes
                .rows
                .iter()
                .all(|n| n.tier.as_deref() == Some("T1"))
        );
        let ids: Vec<_> = filtered.nodes.rows.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let pairs: Vec<_> = filtered
            .links
            .rows
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("1", "3"), ("3", "1")]);
    }

    #[test]
    fn test_filter_all_is_identity() {
        let network = sample();
        assert_eq!(TierFilter::All.apply(&network), network);
    }

    #[test]
    fn test_filter_without_tier_column() {
        let mut network = sample();
        network.nodes.has_tier_column = false;

        let filtered = TierFilter::Tier("T1".to_string()).apply(&network);
        assert_eq!(filtered, network);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let network = sample();
        for filter in [
            TierFilter::All,
            TierFilter::Tier("T1".to_string()),
            TierFilter::Tier("T2".to_string()),
            TierFilter::Tier("missing".to_string()),
        ] {
            let once = filter.apply(&network);
            let twice = filter.apply(&once);
            assert_eq!(once, twice, "filter {} is not idempotent", filter);
        }
    }

    #[test]
    fn test_unknown_tier_yields_empty_set() {
        let filtered = TierFilter::Tier("T9".to_string()).apply(&sample());
        assert!(filtered.nodes.is_empty());
        assert!(filtered.links.is_empty());
    }

    #[test]
    fn test_tier_options() {
        let network = sample();
        assert_eq!(
            tier_options(&network.nodes),
            Some(vec!["All".to_string(), "T1".to_string(), "T2".to_string()])
        );

        let mut no_column = network.nodes.clone();
        no_column.has_tier_column = false;
        assert_eq!(tier_options(&no_column), None);
    }

    #[test]
    fn test_numeric_tiers_sort_by_value() {
        let nodes = NodeTable {
            has_tier_column: true,
            rows: vec![
                node("1", Some("10")),
                node("2", Some("2")),
                node("3", Some("1.5")),
                node("4", Some("2")),
            ],
        };

        assert_eq!(
            tier_options(&nodes),
            Some(vec![
                "All".to_string(),
                "1.5".to_string(),
                "2".to_string(),
                "10".to_string()
            ])
        );
    }

    #[test]
    fn test_mixed_tiers_sort_as_strings() {
        let nodes = NodeTable {
            has_tier_column: true,
            rows: vec![
                node("1", Some("10")),
                node("2", Some("Retail")),
                node("3", Some("2")),
            ],
        };

        assert_eq!(
            available_tiers(&nodes),
            Some(vec!["10".to_string(), "2".to_string(), "Retail".to_string()])
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(TierFilter::from_option("All"), TierFilter::All);
        assert_eq!(TierFilter::from_option(""), TierFilter::All);
        assert_eq!(
            TierFilter::from_option("T1"),
            TierFilter::Tier("T1".to_string())
        );
        assert_eq!(TierFilter::Tier("T1".to_string()).to_string(), "T1");
    }
}
