//! # statgraph - Incremental Stat Dependency Graph
//!
//! The engine behind every derived number in a life-simulation game:
//! attributes, skill proficiencies, resource income and capacity, upkeep
//! and leveling thresholds.
//!
//! - **Incremental**: a mutation only touches the nodes downstream of it
//! - **Push-based**: values are always settled when a call returns
//! - **Typed links**: each edge kind has its own combination rule
//! - **Speculative**: isolated deep copies answer "what if" queries
//!
//! ## Core Concepts
//!
//! ### Nodes
//!
//! | Variant             | Value                                        |
//! |---------------------|----------------------------------------------|
//! | Independent         | set by the caller                            |
//! | Parameter           | `add * multi_cache`                          |
//! | Formula             | `formula(argument)`                          |
//! | Named-input formula | `formula(inputs)`                            |
//! | Gate                | last input accepted by the threshold latch   |
//!
//! ### Links
//!
//! ```text
//! [Independent] --ADD/SUB/MULTY/DIV--> [Parameter] --FORMULA--> [Formula]
//!                                           |
//!                                           +--NAMED_INPUT(n)--> [Named-input formula]
//!                                           +--GATE_VALUE------> [Gate]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use statgraph::*;
//!
//! let mut graph = StatGraph::new();
//!
//! graph.create_independent("A", 10.0).unwrap();
//! graph.create_independent("B", 3.0).unwrap();
//! graph.create_parameter("P").unwrap();
//!
//! graph.connect("A", "P", LinkKind::Add).unwrap();
//! graph.connect("B", "P", LinkKind::Multiply).unwrap();
//! assert_eq!(graph.value("P"), Some(30.0));
//!
//! // Speculate without touching the canonical graph
//! let speculative = graph.what_if(|g| {
//!     g.set_independent("B", 5.0)?;
//!     g.require_value("P")
//! });
//! assert_eq!(speculative, Ok(50.0));
//! assert_eq!(graph.value("P"), Some(30.0));
//! ```
//!
//! ## Modules
//!
//! - [`node_name`] - Node name type and naming convention
//! - [`node`] - Node variants and formulas
//! - [`link`] - Link kinds
//! - [`graph`] - Registry, connections, mutations and hypothetical copies
//! - [`propagation`] - Incremental propagation
//! - [`snapshot`] - Serializable graph snapshots
//! - [`config`] - Graph configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod graph;
pub mod link;
pub mod node;
pub mod node_name;
pub mod propagation;
pub mod snapshot;

// Re-export main types for convenience
pub use config::GraphConfig;
pub use error::GraphError;
pub use graph::{NodeHandle, NodeRef, StatGraph};
pub use link::LinkKind;
pub use node::{
    Formula, GateState, NamedFormula, NamedInputs, Node, NodeKind, NodeState, ParameterState,
    StatValue,
};
pub use node_name::NodeName;
pub use snapshot::{GraphSnapshot, LinkSnapshot, NodeDetail, NodeSnapshot};
