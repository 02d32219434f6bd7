//! Graph snapshots.
//!
//! A `GraphSnapshot` is a read-only, serializable picture of a graph's
//! values, input state and links at one point in time. UI mirrors and
//! debugging tools read it; it cannot be turned back into a live graph
//! because formula functions are not data.

use crate::graph::StatGraph;
use crate::link::LinkKind;
use crate::node::{NamedInputs, Node, NodeKind, NodeState, StatValue};
use crate::node_name::NodeName;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// Variant-specific input state of a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDetail {
    Independent,
    Parameter {
        add: StatValue,
        multi_cache: StatValue,
    },
    Formula {
        argument: StatValue,
    },
    NamedInputFormula {
        inputs: NamedInputs,
    },
    Gate {
        base_value: StatValue,
        threshold: StatValue,
        input_value: StatValue,
        is_above_threshold: bool,
    },
}

/// One node of a [`GraphSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSnapshot {
    pub name: NodeName,
    pub value: StatValue,
    pub detail: NodeDetail,
}

impl NodeSnapshot {
    pub fn kind(&self) -> NodeKind {
        match self.detail {
            NodeDetail::Independent => NodeKind::Independent,
            NodeDetail::Parameter { .. } => NodeKind::Parameter,
            NodeDetail::Formula { .. } => NodeKind::Formula,
            NodeDetail::NamedInputFormula { .. } => NodeKind::NamedInputFormula,
            NodeDetail::Gate { .. } => NodeKind::Gate,
        }
    }
}

impl From<&Node> for NodeSnapshot {
    fn from(node: &Node) -> Self {
        let detail = match node.state() {
            NodeState::Independent => NodeDetail::Independent,
            NodeState::Parameter(p) => NodeDetail::Parameter {
                add: p.add,
                multi_cache: p.multi_cache,
            },
            NodeState::Formula(f) => NodeDetail::Formula {
                argument: f.argument,
            },
            NodeState::NamedInputFormula(n) => NodeDetail::NamedInputFormula {
                inputs: n.inputs.clone(),
            },
            NodeState::Gate(g) => NodeDetail::Gate {
                base_value: g.base_value,
                threshold: g.threshold,
                input_value: g.input_value,
                is_above_threshold: g.is_above_threshold,
            },
        };
        Self {
            name: node.name().clone(),
            value: node.value(),
            detail,
        }
    }
}

/// One link of a [`GraphSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkSnapshot {
    pub source: NodeName,
    pub target: NodeName,
    pub kind: LinkKind,
}

/// Serializable picture of a whole graph.
///
/// Nodes are listed in creation order, links in connection order.
///
/// # Examples
///
/// ```rust
/// use statgraph::{LinkKind, StatGraph};
///
/// let mut graph = StatGraph::new();
/// graph.create_independent("wood", 5.0).unwrap();
/// graph.create_parameter("storage").unwrap();
/// graph.connect("wood", "storage", LinkKind::Add).unwrap();
///
/// let snapshot = graph.snapshot();
/// assert_eq!(snapshot.nodes.len(), 2);
/// assert_eq!(snapshot.value("storage"), Some(5.0));
/// assert!(snapshot.to_json().unwrap().contains("\"storage\""));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub links: Vec<LinkSnapshot>,
}

impl GraphSnapshot {
    /// Look up a node's value by name.
    pub fn value(&self, name: &str) -> Option<StatValue> {
        self.nodes
            .iter()
            .find(|n| n.name.as_str() == name)
            .map(|n| n.value)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl StatGraph {
    /// Capture the current values, input state and links.
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self.nodes().map(NodeSnapshot::from).collect();
        let mut edges: Vec<_> = self.arena.edge_references().collect();
        edges.sort_by_key(|e| e.id());
        let links = edges
            .into_iter()
            .map(|e| LinkSnapshot {
                source: self.arena[e.source()].name().clone(),
                target: self.arena[e.target()].name().clone(),
                kind: e.weight().clone(),
            })
            .collect();
        GraphSnapshot { nodes, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Formula, NamedFormula};

    fn sample() -> StatGraph {
        let mut graph = StatGraph::new();
        graph.create_independent("str", 4.0).unwrap();
        graph.create_independent("dex", 6.0).unwrap();
        graph.create_parameter("attack").unwrap();
        graph.create_formula("double", Formula::linear(2.0, 0.0)).unwrap();
        graph
            .create_named_input_formula("avg", NamedFormula::average(), None)
            .unwrap();
        graph.create_gate("gate", 1.0, true).unwrap();
        graph.connect("str", "attack", LinkKind::Add).unwrap();
        graph.connect("dex", "attack", LinkKind::Multiply).unwrap();
        graph.connect("str", "double", LinkKind::Formula).unwrap();
        graph.connect("str", "avg", LinkKind::named("str")).unwrap();
        graph.connect("dex", "avg", LinkKind::named("dex")).unwrap();
        graph.connect("dex", "gate", LinkKind::GateValue).unwrap();
        graph
    }

    #[test]
    fn test_snapshot_details() {
        let snapshot = sample().snapshot();
        assert_eq!(snapshot.nodes.len(), 6);
        assert_eq!(snapshot.links.len(), 6);

        let attack = &snapshot.nodes[2];
        assert_eq!(attack.kind(), NodeKind::Parameter);
        assert_eq!(
            attack.detail,
            NodeDetail::Parameter {
                add: 4.0,
                multi_cache: 6.0
            }
        );
        assert_eq!(attack.value, 24.0);
        assert_eq!(snapshot.value("double"), Some(8.0));
        assert_eq!(snapshot.value("avg"), Some(5.0));
        assert_eq!(snapshot.value("gate"), Some(6.0));
    }

    #[test]
    fn test_links_in_connection_order() {
        let snapshot = sample().snapshot();
        let first = &snapshot.links[0];
        assert_eq!(first.source.as_str(), "str");
        assert_eq!(first.target.as_str(), "attack");
        assert_eq!(first.kind, LinkKind::Add);
        assert_eq!(snapshot.links[4].kind, LinkKind::named("dex"));
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = sample().snapshot();
        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("\"kind\": \"named_input_formula\""));
        assert_eq!(GraphSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_empty_graph_snapshot() {
        let snapshot = StatGraph::new().snapshot();
        assert_eq!(snapshot, GraphSnapshot::default());
    }
}
