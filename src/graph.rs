//! Stat graph module.
//!
//! Provides the `StatGraph` type: an arena of nodes (a petgraph `DiGraph`
//! whose node weights are [`Node`]s and whose edge weights are
//! [`LinkKind`]s) plus a name index. Nodes and links are only ever added;
//! every mutation is pushed through the graph before the call returns (see
//! the `propagation` module).

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::link::LinkKind;
use crate::node::{Formula, NamedFormula, NamedInputs, Node, NodeKind, NodeState, StatValue};
use crate::node_name::NodeName;
use petgraph::algo::{astar, has_path_connecting};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::ops::Index;

/// Typed handle to a node in a `StatGraph`.
///
/// Handles are stable for the lifetime of a graph and across
/// [`StatGraph::hypothetical`] copies of it, so a handle taken from the
/// canonical graph addresses the same node in a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) NodeIndex);

impl NodeHandle {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0.index()
    }
}

/// Anything that can address a node: a handle or a name.
pub trait NodeRef {
    /// Resolve to an arena index, or `NodeNotFound`.
    fn locate(&self, graph: &StatGraph) -> Result<NodeIndex, GraphError>;
}

impl NodeRef for NodeHandle {
    fn locate(&self, graph: &StatGraph) -> Result<NodeIndex, GraphError> {
        if graph.arena.node_weight(self.0).is_some() {
            Ok(self.0)
        } else {
            Err(GraphError::NodeNotFound(NodeName::from(format!(
                "#{}",
                self.index()
            ))))
        }
    }
}

impl NodeRef for str {
    fn locate(&self, graph: &StatGraph) -> Result<NodeIndex, GraphError> {
        graph
            .names
            .get(self)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(NodeName::from_str(self)))
    }
}

impl NodeRef for String {
    fn locate(&self, graph: &StatGraph) -> Result<NodeIndex, GraphError> {
        self.as_str().locate(graph)
    }
}

impl NodeRef for NodeName {
    fn locate(&self, graph: &StatGraph) -> Result<NodeIndex, GraphError> {
        graph
            .names
            .get(self)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(self.clone()))
    }
}

impl<T: NodeRef + ?Sized> NodeRef for &T {
    fn locate(&self, graph: &StatGraph) -> Result<NodeIndex, GraphError> {
        (**self).locate(graph)
    }
}

fn rejected(err: GraphError) -> GraphError {
    log::warn!("{}", err);
    err
}

/// An incremental stat dependency graph.
///
/// # Examples
///
/// ```rust
/// use statgraph::{LinkKind, StatGraph};
///
/// let mut graph = StatGraph::new();
/// graph.create_independent("strength", 10.0).unwrap();
/// graph.create_independent("rage", 3.0).unwrap();
/// graph.create_parameter("attack").unwrap();
///
/// graph.connect("strength", "attack", LinkKind::Add).unwrap();
/// graph.connect("rage", "attack", LinkKind::Multiply).unwrap();
/// assert_eq!(graph.value("attack"), Some(30.0));
///
/// graph.set_independent("rage", 5.0).unwrap();
/// assert_eq!(graph.value("attack"), Some(50.0));
/// ```
#[derive(Debug, Clone)]
pub struct StatGraph {
    pub(crate) arena: DiGraph<Node, LinkKind>,
    pub(crate) names: HashMap<NodeName, NodeIndex>,
    pub(crate) config: GraphConfig,
    pub(crate) recomputes: u64,
}

impl StatGraph {
    /// Create a new empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create a new empty graph with a custom configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            arena: DiGraph::new(),
            names: HashMap::new(),
            config,
            recomputes: 0,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Create an independent node holding `initial`.
    ///
    /// # Errors
    ///
    /// `DuplicateNodeName` if the name is taken.
    pub fn create_independent(
        &mut self,
        name: impl Into<NodeName>,
        initial: StatValue,
    ) -> Result<NodeHandle, GraphError> {
        self.register(Node::independent(name.into(), initial))
    }

    /// Create a parameter node (`add = 0`, `multi_cache = 1`).
    pub fn create_parameter(
        &mut self,
        name: impl Into<NodeName>,
    ) -> Result<NodeHandle, GraphError> {
        self.register(Node::parameter(name.into()))
    }

    /// Create a single-argument formula node, valued `formula(0)` until a
    /// FORMULA link feeds it.
    pub fn create_formula(
        &mut self,
        name: impl Into<NodeName>,
        formula: Formula,
    ) -> Result<NodeHandle, GraphError> {
        self.register(Node::formula(name.into(), formula))
    }

    /// Create a named-input formula node, evaluated over `initial_inputs`
    /// (or an empty map) until named inputs are connected.
    pub fn create_named_input_formula(
        &mut self,
        name: impl Into<NodeName>,
        formula: NamedFormula,
        initial_inputs: Option<NamedInputs>,
    ) -> Result<NodeHandle, GraphError> {
        self.register(Node::named_input_formula(
            name.into(),
            formula,
            initial_inputs.unwrap_or_default(),
        ))
    }

    /// Create a gate (latch) node.
    ///
    /// With `is_above_threshold`, the gate accepts inputs for which
    /// `base_value + input >= threshold`; otherwise it accepts inputs below
    /// the threshold.
    pub fn create_gate(
        &mut self,
        name: impl Into<NodeName>,
        base_value: StatValue,
        is_above_threshold: bool,
    ) -> Result<NodeHandle, GraphError> {
        self.register(Node::gate(name.into(), base_value, is_above_threshold))
    }

    fn register(&mut self, node: Node) -> Result<NodeHandle, GraphError> {
        if self.names.contains_key(&node.name) {
            return Err(rejected(GraphError::DuplicateNodeName(node.name)));
        }
        log::debug!(
            "create {} node {} = {}",
            node.kind(),
            node.name,
            node.value
        );
        let name = node.name.clone();
        let idx = self.arena.add_node(node);
        self.names.insert(name, idx);
        Ok(NodeHandle(idx))
    }

    /// Look up the handle registered under `name`.
    pub fn handle(&self, name: &str) -> Option<NodeHandle> {
        self.names.get(name).copied().map(NodeHandle)
    }

    /// Soft lookup.
    pub fn get(&self, node: impl NodeRef) -> Option<&Node> {
        node.locate(self).ok().map(|idx| &self.arena[idx])
    }

    /// Asserting lookup.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if nothing is registered under the name or handle.
    pub fn node(&self, node: impl NodeRef) -> Result<&Node, GraphError> {
        let idx = node.locate(self)?;
        Ok(&self.arena[idx])
    }

    /// Current value of a node, if it exists.
    pub fn value(&self, node: impl NodeRef) -> Option<StatValue> {
        self.get(node).map(Node::value)
    }

    /// Current value of a node, or `NodeNotFound`.
    pub fn require_value(&self, node: impl NodeRef) -> Result<StatValue, GraphError> {
        self.node(node).map(Node::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.arena.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.node_count() == 0
    }

    pub fn link_count(&self) -> usize {
        self.arena.edge_count()
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.arena.node_weights()
    }

    /// Outgoing links of a node as `(target, kind)`, in connection order.
    pub fn links_from(
        &self,
        node: impl NodeRef,
    ) -> Result<Vec<(NodeName, LinkKind)>, GraphError> {
        let idx = node.locate(self)?;
        let mut links: Vec<_> = self
            .arena
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight().clone()))
            .collect();
        links.sort_by_key(|(id, _, _)| *id);
        Ok(links
            .into_iter()
            .map(|(_, target, kind)| (self.arena[target].name.clone(), kind))
            .collect())
    }

    /// Number of derived-value recomputations performed by this graph.
    ///
    /// A hypothetical copy starts from the count of the graph it was
    /// cloned from.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Establish a typed link from `source` to `target`.
    ///
    /// On success the target is updated from the source's current value
    /// exactly as if the source had just changed, and the change is
    /// propagated, so connection order does not affect the settled values.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - the link was established
    /// * `Ok(false)` - the identical link already exists (no-op)
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` - either endpoint is missing
    /// * `MissingInputName` - `NamedInput` with an empty name
    /// * `InvalidConnectionTarget` - the kind cannot feed the target variant
    /// * `InputAlreadyBound` - an exclusive input already has another source
    /// * `Cycle` - the link would close a cycle (with cycle detection on)
    /// * `PropagationDepthExceeded` - the initial delivery did not settle
    ///   (with cycle detection off)
    ///
    /// Rejected links leave the graph untouched. A failed initial delivery
    /// removes the link again and restores every node it had reached.
    ///
    /// # Single-source inputs
    ///
    /// FORMULA, GATE_THRESHOLD, GATE_VALUE and each distinct NAMED_INPUT
    /// name hold a single scalar, so each accepts exactly one source. A
    /// second source is rejected with `InputAlreadyBound` instead of
    /// overwriting the first one's value. Parameter links (ADD, SUB,
    /// MULTY, DIV) accept any number of sources.
    pub fn connect(
        &mut self,
        source: impl NodeRef,
        target: impl NodeRef,
        kind: LinkKind,
    ) -> Result<bool, GraphError> {
        let from = source.locate(self).map_err(rejected)?;
        let to = target.locate(self).map_err(rejected)?;
        self.check_connection(from, to, &kind).map_err(rejected)?;

        if self
            .arena
            .edges_connecting(from, to)
            .any(|e| e.weight() == &kind)
        {
            log::debug!(
                "link {} -> {} ({}) already exists",
                self.arena[from].name,
                self.arena[to].name,
                kind
            );
            return Ok(false);
        }

        if kind.is_exclusive() {
            self.check_exclusive(from, to, &kind).map_err(rejected)?;
        }
        if self.config.detect_cycles {
            self.check_acyclic(from, to).map_err(rejected)?;
        }

        log::debug!(
            "connect {} -> {} ({})",
            self.arena[from].name,
            self.arena[to].name,
            kind
        );
        // Only a cyclic delivery can fail, and cycles need detection off.
        let restore = (!self.config.detect_cycles).then(|| self.arena.clone());
        self.arena.add_edge(from, to, kind.clone());
        if let NodeState::Parameter(p) = &mut self.arena[to].state {
            match kind {
                LinkKind::Multiply => p.multi_sources.push(from),
                LinkKind::Divide => p.div_sources.push(from),
                _ => {}
            }
        }

        let current = self.arena[from].value;
        if let Err(err) = self.deliver(to, &kind, 0.0, current, 1) {
            if let Some(arena) = restore {
                self.arena = arena;
            }
            return Err(rejected(err));
        }
        Ok(true)
    }

    fn check_connection(
        &self,
        from: NodeIndex,
        to: NodeIndex,
        kind: &LinkKind,
    ) -> Result<(), GraphError> {
        let source = &self.arena[from];
        let target = &self.arena[to];
        if let LinkKind::NamedInput(input) = kind {
            if input.is_empty() {
                return Err(GraphError::MissingInputName {
                    from: source.name.clone(),
                    to: target.name.clone(),
                });
            }
        }
        if !kind.accepts(target.kind()) {
            return Err(GraphError::InvalidConnectionTarget {
                from: source.name.clone(),
                to: target.name.clone(),
                kind: kind.clone(),
                found: target.kind(),
            });
        }
        Ok(())
    }

    fn check_exclusive(
        &self,
        from: NodeIndex,
        to: NodeIndex,
        kind: &LinkKind,
    ) -> Result<(), GraphError> {
        let bound = self
            .arena
            .edges_directed(to, Direction::Incoming)
            .find(|e| e.weight() == kind && e.source() != from);
        match bound {
            Some(e) => Err(GraphError::InputAlreadyBound {
                target: self.arena[to].name.clone(),
                kind: kind.clone(),
                bound: self.arena[e.source()].name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Reject `from -> to` if `to` already reaches `from`.
    fn check_acyclic(&self, from: NodeIndex, to: NodeIndex) -> Result<(), GraphError> {
        if !has_path_connecting(&self.arena, to, from, None) {
            return Ok(());
        }
        let mut path: Vec<NodeName> = astar(&self.arena, to, |n| n == from, |_| 1usize, |_| 0)
            .map(|(_, nodes)| {
                nodes
                    .into_iter()
                    .map(|idx| self.arena[idx].name.clone())
                    .collect()
            })
            .unwrap_or_else(|| vec![self.arena[to].name.clone(), self.arena[from].name.clone()]);
        path.push(self.arena[to].name.clone());
        Err(GraphError::Cycle { path })
    }

    /// Set an independent node's value and propagate.
    ///
    /// Setting the current value is a no-op.
    ///
    /// # Errors
    ///
    /// `NodeNotFound`, `NotIndependent`, or `PropagationDepthExceeded`.
    pub fn set_independent(
        &mut self,
        node: impl NodeRef,
        value: StatValue,
    ) -> Result<(), GraphError> {
        let idx = node.locate(self).map_err(rejected)?;
        self.require_kind(idx, NodeKind::Independent)?;
        self.set_node(idx, value, 0)
    }

    /// Add `delta` to an independent node's value and propagate.
    pub fn modify_independent(
        &mut self,
        node: impl NodeRef,
        delta: StatValue,
    ) -> Result<(), GraphError> {
        let idx = node.locate(self).map_err(rejected)?;
        self.require_kind(idx, NodeKind::Independent)?;
        let value = self.arena[idx].value + delta;
        self.set_node(idx, value, 0)
    }

    /// Add `delta` directly to a parameter's additive term and propagate.
    ///
    /// Used for externally driven bonuses that are not modelled as links.
    ///
    /// # Errors
    ///
    /// `NodeNotFound`, `NotParameter`, or `PropagationDepthExceeded`.
    pub fn modify_parameter_additive(
        &mut self,
        parameter: impl NodeRef,
        delta: StatValue,
    ) -> Result<(), GraphError> {
        let idx = parameter.locate(self).map_err(rejected)?;
        self.require_kind(idx, NodeKind::Parameter)?;
        let node = &mut self.arena[idx];
        if let NodeState::Parameter(p) = &mut node.state {
            p.add += delta;
        }
        let recomputed = node.evaluate();
        self.recomputes += 1;
        self.set_node(idx, recomputed, 0)
    }

    fn require_kind(&self, idx: NodeIndex, expected: NodeKind) -> Result<(), GraphError> {
        let node = &self.arena[idx];
        let found = node.kind();
        if found == expected {
            return Ok(());
        }
        let name = node.name.clone();
        Err(rejected(match expected {
            NodeKind::Parameter => GraphError::NotParameter { name, found },
            _ => GraphError::NotIndependent { name, found },
        }))
    }

    /// Deep copy of the whole graph for speculative evaluation.
    ///
    /// The copy shares no mutable state with `self`; formula functions are
    /// immutable and shared by reference.
    pub fn hypothetical(&self) -> StatGraph {
        log::trace!("hypothetical copy of {} nodes", self.len());
        self.clone()
    }

    /// Run `f` against a hypothetical copy and return its result.
    ///
    /// The copy is discarded afterwards; `self` is never modified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statgraph::{LinkKind, StatGraph};
    ///
    /// let mut graph = StatGraph::new();
    /// graph.create_independent("skill_points", 2.0).unwrap();
    /// graph.create_parameter("proficiency").unwrap();
    /// graph.connect("skill_points", "proficiency", LinkKind::Add).unwrap();
    ///
    /// let next = graph
    ///     .what_if(|g| {
    ///         g.modify_independent("skill_points", 1.0)?;
    ///         g.require_value("proficiency")
    ///     })
    ///     .unwrap();
    /// assert_eq!(next, 3.0);
    /// assert_eq!(graph.value("proficiency"), Some(2.0));
    /// ```
    pub fn what_if<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut StatGraph) -> R,
    {
        let mut copy = self.hypothetical();
        f(&mut copy)
    }
}

impl Default for StatGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<&str> for StatGraph {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if no node is registered under `name`.
    fn index(&self, name: &str) -> &Node {
        match self.names.get(name) {
            Some(&idx) => &self.arena[idx],
            None => panic!("no node named {}", name),
        }
    }
}

impl Index<NodeHandle> for StatGraph {
    type Output = Node;

    fn index(&self, handle: NodeHandle) -> &Node {
        &self.arena[handle.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(names: &[&str]) -> StatGraph {
        let mut graph = StatGraph::new();
        graph.create_independent(names[0], 1.0).unwrap();
        for name in &names[1..] {
            graph.create_parameter(*name).unwrap();
        }
        for pair in names.windows(2) {
            graph.connect(pair[0], pair[1], LinkKind::Add).unwrap();
        }
        graph
    }

    #[test]
    fn test_create_and_lookup() {
        let mut graph = StatGraph::new();
        let hp = graph.create_independent("HP", 100.0).unwrap();

        assert!(graph.contains("HP"));
        assert_eq!(graph.handle("HP"), Some(hp));
        assert_eq!(graph.value(hp), Some(100.0));
        assert_eq!(graph.value("HP"), Some(100.0));
        assert_eq!(graph["HP"].kind(), NodeKind::Independent);
        assert_eq!(graph[hp].name().as_str(), "HP");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut graph = StatGraph::new();
        graph.create_parameter("ATK").unwrap();
        let err = graph.create_independent("ATK", 1.0).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNodeName(NodeName::from_str("ATK")));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_missing_node_lookups() {
        let graph = StatGraph::new();
        assert!(graph.get("nope").is_none());
        assert_eq!(graph.value("nope"), None);
        assert_eq!(
            graph.require_value("nope"),
            Err(GraphError::NodeNotFound(NodeName::from_str("nope")))
        );
    }

    #[test]
    #[should_panic(expected = "no node named ghost")]
    fn test_index_panics_on_missing() {
        let graph = StatGraph::new();
        let _ = &graph["ghost"];
    }

    #[test]
    fn test_stale_handle_is_not_found() {
        let mut other = StatGraph::new();
        other.create_independent("a", 0.0).unwrap();
        let b = other.create_independent("b", 0.0).unwrap();

        let graph = StatGraph::new();
        assert!(matches!(graph.node(b), Err(GraphError::NodeNotFound(_))));
    }

    #[test]
    fn test_links_from_in_connection_order() {
        let mut graph = StatGraph::new();
        graph.create_independent("src", 1.0).unwrap();
        graph.create_parameter("b").unwrap();
        graph.create_parameter("a").unwrap();
        graph.create_parameter("c").unwrap();
        graph.connect("src", "b", LinkKind::Add).unwrap();
        graph.connect("src", "a", LinkKind::Sub).unwrap();
        graph.connect("src", "c", LinkKind::Multiply).unwrap();

        let targets: Vec<_> = graph
            .links_from("src")
            .unwrap()
            .into_iter()
            .map(|(name, _)| name.as_str().to_string())
            .collect();
        assert_eq!(targets, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_cycle_path_simple_2_node() {
        let mut graph = chain(&["X", "A", "B"]);
        let err = graph.connect("B", "A", LinkKind::Add).unwrap_err();
        match err {
            GraphError::Cycle { path } => {
                let names: Vec<_> = path.iter().map(|n| n.as_str()).collect();
                assert_eq!(names, vec!["A", "B", "A"]);
            }
            other => panic!("Expected Cycle error, got {:?}", other),
        }
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn test_cycle_path_excludes_non_cycle_nodes() {
        let mut graph = chain(&["X", "Y", "A", "B", "C"]);
        let err = graph.connect("C", "A", LinkKind::Sub).unwrap_err();
        if let GraphError::Cycle { path } = err {
            let names: Vec<_> = path.iter().map(|n| n.as_str()).collect();
            assert_eq!(names, vec!["A", "B", "C", "A"]);
        } else {
            panic!("Expected Cycle error");
        }
    }

    #[test]
    fn test_self_cycle() {
        let mut graph = StatGraph::new();
        graph.create_parameter("A").unwrap();
        let err = graph.connect("A", "A", LinkKind::Add).unwrap_err();
        if let GraphError::Cycle { path } = err {
            assert_eq!(path.len(), 2);
            assert_eq!(path[0], path[1]);
        } else {
            panic!("Expected Cycle error");
        }
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = StatGraph::new();
        graph.create_independent("base", 2.0).unwrap();
        graph.create_parameter("left").unwrap();
        graph.create_parameter("right").unwrap();
        graph.create_parameter("top").unwrap();
        graph.connect("base", "left", LinkKind::Add).unwrap();
        graph.connect("base", "right", LinkKind::Add).unwrap();
        graph.connect("left", "top", LinkKind::Add).unwrap();
        graph.connect("right", "top", LinkKind::Add).unwrap();

        assert_eq!(graph.value("top"), Some(4.0));
        graph.set_independent("base", 5.0).unwrap();
        assert_eq!(graph.value("top"), Some(10.0));
    }

    #[test]
    fn test_wrong_kind_mutations() {
        let mut graph = StatGraph::new();
        graph.create_independent("I", 1.0).unwrap();
        graph.create_parameter("P").unwrap();

        assert!(matches!(
            graph.set_independent("P", 3.0),
            Err(GraphError::NotIndependent { found: NodeKind::Parameter, .. })
        ));
        assert!(matches!(
            graph.modify_parameter_additive("I", 3.0),
            Err(GraphError::NotParameter { found: NodeKind::Independent, .. })
        ));
        assert_eq!(graph.value("I"), Some(1.0));
        assert_eq!(graph.value("P"), Some(0.0));
    }

    #[test]
    fn test_mutations_on_missing_nodes() {
        let mut graph = chain(&["I", "P"]);
        let missing = GraphError::NodeNotFound(NodeName::from_str("ghost"));

        assert_eq!(graph.set_independent("ghost", 2.0), Err(missing.clone()));
        assert_eq!(graph.modify_independent("ghost", 2.0), Err(missing.clone()));
        assert_eq!(graph.modify_parameter_additive("ghost", 2.0), Err(missing));
        assert_eq!(graph.value("P"), Some(1.0));
    }

    #[test]
    fn test_unsettled_connect_is_rolled_back() {
        let config = GraphConfig::new()
            .with_cycle_detection(false)
            .with_max_propagation_depth(16);
        let mut graph = StatGraph::with_config(config);
        graph.create_independent("seed", 1.0).unwrap();
        graph.create_parameter("A").unwrap();
        graph.create_parameter("B").unwrap();
        graph.connect("seed", "A", LinkKind::Add).unwrap();
        graph.connect("A", "B", LinkKind::Add).unwrap();
        let before = graph.snapshot();

        // B -> A keeps growing and never settles
        let err = graph.connect("B", "A", LinkKind::Add).unwrap_err();
        assert!(matches!(
            err,
            GraphError::PropagationDepthExceeded { limit: 16, .. }
        ));

        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.snapshot(), before);
        assert_eq!(graph.value("A"), Some(1.0));
        assert_eq!(graph.value("B"), Some(1.0));

        // the link was never kept, so a retry fails the same way
        assert!(graph.connect("B", "A", LinkKind::Add).is_err());
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn test_unsettled_connect_keeps_multiplier_sources() {
        let config = GraphConfig::new()
            .with_cycle_detection(false)
            .with_max_propagation_depth(16);
        let mut graph = StatGraph::with_config(config);
        graph.create_independent("seed", 2.0).unwrap();
        graph.create_parameter("A").unwrap();
        graph.create_parameter("B").unwrap();
        graph.connect("seed", "A", LinkKind::Add).unwrap();
        graph.connect("A", "B", LinkKind::Add).unwrap();

        assert!(graph.connect("B", "A", LinkKind::Multiply).is_err());
        let a = graph["A"].as_parameter().unwrap();
        assert_eq!(a.multi_source_count(), 0);
        assert_eq!(a.multi_cache, 1.0);
        assert_eq!(graph.value("A"), Some(2.0));
    }
}
