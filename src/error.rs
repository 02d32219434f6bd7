//! Error types for graph construction and mutation.
//!
//! All errors that can occur while building or mutating a stat graph are
//! represented by the `GraphError` enum. Precondition failures are reported
//! before anything is written, so a rejected operation is a no-op.

use crate::link::LinkKind;
use crate::node::NodeKind;
use crate::node_name::NodeName;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[NodeName]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors that can occur while building or mutating a stat graph.
///
/// # Examples
///
/// ```rust
/// use statgraph::{GraphError, NodeName};
///
/// let err = GraphError::NodeNotFound(NodeName::from_str("hero.strength"));
/// println!("{}", err); // "Node not found: hero.strength"
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// A node with this name is already registered.
    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(NodeName),

    /// No node is registered under this name (or the handle is stale).
    #[error("Node not found: {0}")]
    NodeNotFound(NodeName),

    /// The edge type cannot feed the target's variant.
    ///
    /// Also returned when the target is an independent node, which can
    /// never be the target of an edge.
    #[error("Invalid connection {from} -> {to}: {kind} cannot target a {found} node")]
    InvalidConnectionTarget {
        from: NodeName,
        to: NodeName,
        kind: LinkKind,
        found: NodeKind,
    },

    /// A named-input edge was requested without an input name.
    #[error("Missing input name for named-input connection {from} -> {to}")]
    MissingInputName { from: NodeName, to: NodeName },

    /// The target's input slot is already fed by a different source.
    ///
    /// Formula arguments, gate thresholds, gate inputs and each named input
    /// accept exactly one source.
    #[error("Input {kind} of {target} is already bound to {bound}")]
    InputAlreadyBound {
        target: NodeName,
        kind: LinkKind,
        bound: NodeName,
    },

    /// A direct value mutation was attempted on a derived node.
    #[error("Node {name} is a {found} node, not an independent node")]
    NotIndependent { name: NodeName, found: NodeKind },

    /// An additive modification was attempted on a non-parameter node.
    #[error("Node {name} is a {found} node, not a parameter")]
    NotParameter { name: NodeName, found: NodeKind },

    /// Establishing the edge would close a dependency cycle.
    ///
    /// # Example
    ///
    /// Connecting `C -> A` when `A -> B -> C` already exists reports
    /// `[A, B, C, A]`.
    #[error("Cycle detected: {}", format_cycle_path(.path))]
    Cycle { path: Vec<NodeName> },

    /// Propagation recursed deeper than the configured limit.
    ///
    /// Only reachable when cycle detection is disabled in `GraphConfig`.
    /// Nodes visited before the limit was hit keep their updated values.
    #[error("Propagation exceeded depth {limit} at node {name}")]
    PropagationDepthExceeded { name: NodeName, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::NodeNotFound(NodeName::from_str("HP"));
        assert!(err.to_string().contains("HP"));
    }

    #[test]
    fn test_cycle_error_display() {
        let a = NodeName::from_str("A");
        let b = NodeName::from_str("B");
        let c = NodeName::from_str("C");
        let err = GraphError::Cycle {
            path: vec![a.clone(), b, c, a],
        };
        assert_eq!(err.to_string(), "Cycle detected: A -> B -> C -> A");
    }

    #[test]
    fn test_empty_cycle_display() {
        let err = GraphError::Cycle { path: Vec::new() };
        assert!(err.to_string().contains("(empty cycle)"));
    }

    #[test]
    fn test_invalid_connection_display() {
        let err = GraphError::InvalidConnectionTarget {
            from: NodeName::from_str("gold"),
            to: NodeName::from_str("wood"),
            kind: LinkKind::Add,
            found: NodeKind::Independent,
        };
        let display = err.to_string();
        assert!(display.contains("gold -> wood"));
        assert!(display.contains("ADD"));
        assert!(display.contains("independent"));
    }
}
