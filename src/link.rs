//! Link (edge) types.
//!
//! A link is a directed, typed relationship from a source node to a target
//! node. The `LinkKind` decides which target variants it may feed and how a
//! change of the source value is folded into the target's input state.

use crate::node::NodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a link, which determines its propagation semantics.
///
/// | Kind             | Target variant       | Effect of `old -> new` on target |
/// |------------------|----------------------|----------------------------------|
/// | `Add`            | Parameter            | `add += new - old`               |
/// | `Sub`            | Parameter            | `add -= new - old`               |
/// | `Multiply`       | Parameter            | `multi_cache` recomputed         |
/// | `Divide`         | Parameter            | `multi_cache` recomputed         |
/// | `Formula`        | Formula              | `argument = new`                 |
/// | `NamedInput(n)`  | Named-input formula  | `inputs[n] = new`                |
/// | `GateThreshold`  | Gate                 | `threshold = new`                |
/// | `GateValue`      | Gate                 | `input_value = new`              |
///
/// # Examples
///
/// ```rust
/// use statgraph::{LinkKind, NodeKind};
///
/// assert!(LinkKind::Add.accepts(NodeKind::Parameter));
/// assert!(!LinkKind::Add.accepts(NodeKind::Formula));
/// assert!(LinkKind::named("str").accepts(NodeKind::NamedInputFormula));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkKind {
    Add,
    Sub,
    #[serde(rename = "MULTY")]
    Multiply,
    #[serde(rename = "DIV")]
    Divide,
    Formula,
    /// Feeds one named entry of a named-input formula's input map.
    NamedInput(String),
    GateThreshold,
    GateValue,
}

impl LinkKind {
    /// Shorthand for `LinkKind::NamedInput(name.into())`.
    pub fn named(name: impl Into<String>) -> Self {
        LinkKind::NamedInput(name.into())
    }

    /// Whether a link of this kind may target a node of the given variant.
    pub fn accepts(&self, target: NodeKind) -> bool {
        matches!(
            (self, target),
            (
                LinkKind::Add | LinkKind::Sub | LinkKind::Multiply | LinkKind::Divide,
                NodeKind::Parameter
            ) | (LinkKind::Formula, NodeKind::Formula)
                | (LinkKind::NamedInput(_), NodeKind::NamedInputFormula)
                | (
                    LinkKind::GateThreshold | LinkKind::GateValue,
                    NodeKind::Gate
                )
        )
    }

    /// Whether the link fills an input slot that accepts a single source.
    ///
    /// Parameter links accumulate any number of sources; every other kind
    /// writes a single scalar on the target.
    pub fn is_exclusive(&self) -> bool {
        !matches!(
            self,
            LinkKind::Add | LinkKind::Sub | LinkKind::Multiply | LinkKind::Divide
        )
    }

    /// Whether the link contributes to a parameter's multiplicative cache.
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, LinkKind::Multiply | LinkKind::Divide)
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Add => write!(f, "ADD"),
            LinkKind::Sub => write!(f, "SUB"),
            LinkKind::Multiply => write!(f, "MULTY"),
            LinkKind::Divide => write!(f, "DIV"),
            LinkKind::Formula => write!(f, "FORMULA"),
            LinkKind::NamedInput(name) => write!(f, "NAMED_INPUT({})", name),
            LinkKind::GateThreshold => write!(f, "GATE_THRESHOLD"),
            LinkKind::GateValue => write!(f, "GATE_VALUE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_kinds_accept_only_parameters() {
        for kind in [LinkKind::Add, LinkKind::Sub, LinkKind::Multiply, LinkKind::Divide] {
            assert!(kind.accepts(NodeKind::Parameter));
            assert!(!kind.accepts(NodeKind::Formula));
            assert!(!kind.accepts(NodeKind::Gate));
            assert!(!kind.accepts(NodeKind::Independent));
        }
    }

    #[test]
    fn test_nothing_targets_independent() {
        let kinds = [
            LinkKind::Formula,
            LinkKind::named("x"),
            LinkKind::GateThreshold,
            LinkKind::GateValue,
        ];
        for kind in kinds {
            assert!(!kind.accepts(NodeKind::Independent));
        }
    }

    #[test]
    fn test_exclusive_slots() {
        assert!(!LinkKind::Add.is_exclusive());
        assert!(!LinkKind::Divide.is_exclusive());
        assert!(LinkKind::Formula.is_exclusive());
        assert!(LinkKind::named("a").is_exclusive());
        assert!(LinkKind::GateValue.is_exclusive());
    }

    #[test]
    fn test_display_and_serde_names() {
        assert_eq!(LinkKind::Multiply.to_string(), "MULTY");
        assert_eq!(LinkKind::named("str").to_string(), "NAMED_INPUT(str)");
        assert_eq!(
            serde_json::to_string(&LinkKind::GateThreshold).unwrap(),
            "\"GATE_THRESHOLD\""
        );
        assert_eq!(serde_json::to_string(&LinkKind::Divide).unwrap(), "\"DIV\"");
        let named: LinkKind = serde_json::from_str(r#"{"NAMED_INPUT":"dex"}"#).unwrap();
        assert_eq!(named, LinkKind::named("dex"));
    }
}
