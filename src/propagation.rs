//! Propagation engine.
//!
//! Depth-first, synchronous, push-based: when a node's value changes, each
//! outgoing link (in connection order) folds `(old, new)` into its target's
//! input state, the target is re-evaluated, and the walk recurses into it
//! only if its value actually changed.

use crate::error::GraphError;
use crate::graph::StatGraph;
use crate::link::LinkKind;
use crate::node::{NodeState, StatValue};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

impl StatGraph {
    /// Store `new_value` on `idx` and push the change downstream.
    ///
    /// Unchanged values stop here, which is what keeps latched gates and
    /// no-op writes from triggering any downstream work.
    pub(crate) fn set_node(
        &mut self,
        idx: NodeIndex,
        new_value: StatValue,
        depth: usize,
    ) -> Result<(), GraphError> {
        let old_value = self.arena[idx].value;
        if new_value == old_value {
            return Ok(());
        }
        if !self.config.detect_cycles && depth > self.config.max_propagation_depth {
            return Err(GraphError::PropagationDepthExceeded {
                name: self.arena[idx].name.clone(),
                limit: self.config.max_propagation_depth,
            });
        }

        self.arena[idx].value = new_value;
        log::trace!(
            "{}{} {} -> {}",
            "  ".repeat(depth.min(32)),
            self.arena[idx].name,
            old_value,
            new_value
        );

        let mut links: Vec<_> = self
            .arena
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight().clone()))
            .collect();
        links.sort_by_key(|(id, _, _)| *id);

        for (_, target, kind) in links {
            self.deliver(target, &kind, old_value, new_value, depth + 1)?;
        }
        Ok(())
    }

    /// Fold a source change into `target`'s input state, re-evaluate it and
    /// continue propagation from it.
    pub(crate) fn deliver(
        &mut self,
        target: NodeIndex,
        kind: &LinkKind,
        old_value: StatValue,
        new_value: StatValue,
        depth: usize,
    ) -> Result<(), GraphError> {
        let Some(node) = self.arena.node_weight(target) else {
            return Ok(());
        };
        let multi_cache = match (&node.state, kind.is_multiplicative()) {
            (NodeState::Parameter(p), true) => {
                Some(p.compute_multi_cache(|idx| self.arena[idx].value))
            }
            _ => None,
        };

        let node = &mut self.arena[target];
        let applied = match (&mut node.state, kind) {
            (NodeState::Parameter(p), LinkKind::Add) => {
                p.add += new_value - old_value;
                true
            }
            (NodeState::Parameter(p), LinkKind::Sub) => {
                p.add -= new_value - old_value;
                true
            }
            (NodeState::Parameter(p), LinkKind::Multiply | LinkKind::Divide) => {
                if let Some(cache) = multi_cache {
                    p.multi_cache = cache;
                }
                true
            }
            (NodeState::Formula(f), LinkKind::Formula) => {
                f.argument = new_value;
                true
            }
            (NodeState::NamedInputFormula(n), LinkKind::NamedInput(input)) => {
                n.inputs.insert(input.clone(), new_value);
                true
            }
            (NodeState::Gate(g), LinkKind::GateThreshold) => {
                g.threshold = new_value;
                true
            }
            (NodeState::Gate(g), LinkKind::GateValue) => {
                g.input_value = new_value;
                true
            }
            _ => false,
        };
        if !applied {
            // connect never creates these
            log::warn!("ignoring {} link into {} node {}", kind, node.kind(), node.name);
            return Ok(());
        }

        let recomputed = node.evaluate();
        self.recomputes += 1;
        self.set_node(target, recomputed, depth)
    }
}
