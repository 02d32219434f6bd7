//! Node variants module.
//!
//! A node is a named numeric value. Independent nodes are written by
//! callers; every other variant derives its value from the input state that
//! links push into it. `Node::evaluate` is the single place that states the
//! derivation rule of each variant.

use crate::node_name::NodeName;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Numeric type of every node value.
pub type StatValue = f64;

/// Input map of a named-input formula, keyed by input name.
///
/// Ordered so aggregation is deterministic regardless of connection order.
pub type NamedInputs = BTreeMap<String, StatValue>;

/// The variant of a node, without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Independent,
    Parameter,
    Formula,
    NamedInputFormula,
    Gate,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Independent => "independent",
            NodeKind::Parameter => "parameter",
            NodeKind::Formula => "formula",
            NodeKind::NamedInputFormula => "named-input formula",
            NodeKind::Gate => "gate",
        };
        f.write_str(label)
    }
}

/// A single-argument formula, `value = f(argument)`.
///
/// The function is shared between a graph and its hypothetical copies.
///
/// # Examples
///
/// ```rust
/// use statgraph::Formula;
///
/// let xp_to_next = Formula::new(|level| 100.0 * level * level);
/// assert_eq!(xp_to_next.eval(3.0), 900.0);
/// ```
#[derive(Clone)]
pub struct Formula(Arc<dyn Fn(StatValue) -> StatValue + Send + Sync>);

impl Formula {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(StatValue) -> StatValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// `f(x) = x`.
    pub fn identity() -> Self {
        Self::new(|x| x)
    }

    /// `f(x) = scale * x + offset`.
    pub fn linear(scale: StatValue, offset: StatValue) -> Self {
        Self::new(move |x| scale * x + offset)
    }

    /// Evaluate the formula.
    pub fn eval(&self, argument: StatValue) -> StatValue {
        (self.0)(argument)
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formula(<fn>)")
    }
}

/// A formula over a map of named inputs, `value = f(inputs)`.
///
/// # Examples
///
/// ```rust
/// use statgraph::{NamedFormula, NamedInputs};
///
/// let mut inputs = NamedInputs::new();
/// inputs.insert("str".to_string(), 4.0);
/// inputs.insert("dex".to_string(), 6.0);
///
/// assert_eq!(NamedFormula::average().eval(&inputs), 5.0);
/// assert_eq!(NamedFormula::sum().eval(&inputs), 10.0);
/// assert_eq!(NamedFormula::average().eval(&NamedInputs::new()), 0.0);
/// ```
#[derive(Clone)]
pub struct NamedFormula(Arc<dyn Fn(&NamedInputs) -> StatValue + Send + Sync>);

impl NamedFormula {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&NamedInputs) -> StatValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Arithmetic mean of all inputs; 0 for an empty map.
    pub fn average() -> Self {
        Self::new(|inputs| {
            if inputs.is_empty() {
                0.0
            } else {
                inputs.values().sum::<StatValue>() / inputs.len() as StatValue
            }
        })
    }

    /// Sum of all inputs; 0 for an empty map.
    pub fn sum() -> Self {
        Self::new(|inputs| inputs.values().sum())
    }

    /// Evaluate the formula.
    pub fn eval(&self, inputs: &NamedInputs) -> StatValue {
        (self.0)(inputs)
    }
}

impl fmt::Debug for NamedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NamedFormula(<fn>)")
    }
}

/// Accumulated input state of a parameter node.
///
/// `value == add * multi_cache` once propagation has settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterState {
    /// Sum of ADD sources, minus SUB sources, plus direct modifications.
    pub add: StatValue,
    /// Product of MULTY sources divided by DIV sources.
    pub multi_cache: StatValue,
    pub(crate) multi_sources: Vec<NodeIndex>,
    pub(crate) div_sources: Vec<NodeIndex>,
}

impl ParameterState {
    fn new() -> Self {
        Self {
            add: 0.0,
            multi_cache: 1.0,
            multi_sources: Vec::new(),
            div_sources: Vec::new(),
        }
    }

    /// Recompute the multiplicative factor from every MULTY/DIV source.
    ///
    /// A DIV source whose value is zero divides by 1.
    pub(crate) fn compute_multi_cache<F>(&self, value_of: F) -> StatValue
    where
        F: Fn(NodeIndex) -> StatValue,
    {
        let product: StatValue = self.multi_sources.iter().map(|&idx| value_of(idx)).product();
        self.div_sources
            .iter()
            .map(|&idx| value_of(idx))
            .fold(product, |acc, divisor| {
                if divisor == 0.0 {
                    acc
                } else {
                    acc / divisor
                }
            })
    }

    pub fn multi_source_count(&self) -> usize {
        self.multi_sources.len()
    }

    pub fn div_source_count(&self) -> usize {
        self.div_sources.len()
    }
}

/// Input state of a single-argument formula node.
#[derive(Debug, Clone)]
pub struct FormulaState {
    pub argument: StatValue,
    pub formula: Formula,
}

/// Input state of a named-input formula node.
#[derive(Debug, Clone)]
pub struct NamedInputState {
    pub inputs: NamedInputs,
    pub formula: NamedFormula,
}

/// Input state of a gate (latch) node.
#[derive(Debug, Clone, PartialEq)]
pub struct GateState {
    pub base_value: StatValue,
    pub threshold: StatValue,
    pub input_value: StatValue,
    pub is_above_threshold: bool,
}

impl GateState {
    /// Whether the current input is on the accepting side of the threshold.
    pub fn is_open(&self) -> bool {
        self.is_above_threshold == (self.base_value + self.input_value >= self.threshold)
    }
}

/// Variant-specific state of a node.
#[derive(Debug, Clone)]
pub enum NodeState {
    Independent,
    Parameter(ParameterState),
    Formula(FormulaState),
    NamedInputFormula(NamedInputState),
    Gate(GateState),
}

/// A named value in the graph.
///
/// Nodes are created through `StatGraph::create_*`; callers only ever read
/// them.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: NodeName,
    pub(crate) value: StatValue,
    pub(crate) state: NodeState,
}

impl Node {
    pub(crate) fn independent(name: NodeName, initial: StatValue) -> Self {
        Self {
            name,
            value: initial,
            state: NodeState::Independent,
        }
    }

    pub(crate) fn parameter(name: NodeName) -> Self {
        Self::derived(name, NodeState::Parameter(ParameterState::new()))
    }

    pub(crate) fn formula(name: NodeName, formula: Formula) -> Self {
        Self::derived(
            name,
            NodeState::Formula(FormulaState {
                argument: 0.0,
                formula,
            }),
        )
    }

    pub(crate) fn named_input_formula(
        name: NodeName,
        formula: NamedFormula,
        inputs: NamedInputs,
    ) -> Self {
        Self::derived(
            name,
            NodeState::NamedInputFormula(NamedInputState { inputs, formula }),
        )
    }

    pub(crate) fn gate(name: NodeName, base_value: StatValue, is_above_threshold: bool) -> Self {
        Self::derived(
            name,
            NodeState::Gate(GateState {
                base_value,
                threshold: 0.0,
                input_value: 0.0,
                is_above_threshold,
            }),
        )
    }

    fn derived(name: NodeName, state: NodeState) -> Self {
        let mut node = Self {
            name,
            value: 0.0,
            state,
        };
        node.value = node.evaluate();
        node
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// The current, fully propagated value.
    pub fn value(&self) -> StatValue {
        self.value
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn kind(&self) -> NodeKind {
        match self.state {
            NodeState::Independent => NodeKind::Independent,
            NodeState::Parameter(_) => NodeKind::Parameter,
            NodeState::Formula(_) => NodeKind::Formula,
            NodeState::NamedInputFormula(_) => NodeKind::NamedInputFormula,
            NodeState::Gate(_) => NodeKind::Gate,
        }
    }

    /// Compute the value this node's rule derives from its input state.
    ///
    /// Independent nodes and closed gates return their current value.
    pub fn evaluate(&self) -> StatValue {
        match &self.state {
            NodeState::Independent => self.value,
            NodeState::Parameter(p) => p.add * p.multi_cache,
            NodeState::Formula(f) => f.formula.eval(f.argument),
            NodeState::NamedInputFormula(n) => n.formula.eval(&n.inputs),
            NodeState::Gate(g) => {
                if g.is_open() {
                    g.input_value
                } else {
                    self.value
                }
            }
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterState> {
        match &self.state {
            NodeState::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_formula(&self) -> Option<&FormulaState> {
        match &self.state {
            NodeState::Formula(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_named_input_formula(&self) -> Option<&NamedInputState> {
        match &self.state {
            NodeState::NamedInputFormula(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_gate(&self) -> Option<&GateState> {
        match &self.state {
            NodeState::Gate(g) => Some(g),
            _ => None,
        }
    }
}
