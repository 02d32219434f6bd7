//! Graph configuration.
//!
//! `GraphConfig` controls how a `StatGraph` guards against cyclic
//! dependencies. It is plain serde data so games can ship it alongside
//! their content files.

use serde::{Deserialize, Serialize};

/// Configuration for a `StatGraph`.
///
/// Missing fields fall back to their defaults when deserializing.
///
/// # Examples
///
/// ```rust
/// use statgraph::GraphConfig;
///
/// let config = GraphConfig::from_json(r#"{ "max_propagation_depth": 64 }"#).unwrap();
/// assert!(config.detect_cycles);
/// assert_eq!(config.max_propagation_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Reject edges that would close a dependency cycle at connect time.
    pub detect_cycles: bool,

    /// Maximum recursion depth of a single propagation pass.
    ///
    /// Checked only while `detect_cycles` is off, since an acyclic pass
    /// is bounded by the node count.
    pub max_propagation_depth: usize,
}

impl GraphConfig {
    /// Default propagation depth limit.
    pub const DEFAULT_MAX_PROPAGATION_DEPTH: usize = 256;

    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Builder-style toggle for connect-time cycle detection.
    pub fn with_cycle_detection(mut self, detect: bool) -> Self {
        self.detect_cycles = detect;
        self
    }

    /// Builder-style setter for the propagation depth limit.
    pub fn with_max_propagation_depth(mut self, depth: usize) -> Self {
        self.max_propagation_depth = depth;
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_propagation_depth: Self::DEFAULT_MAX_PROPAGATION_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::new();
        assert!(config.detect_cycles);
        assert_eq!(config.max_propagation_depth, 256);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = GraphConfig::from_json("{}").unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = GraphConfig::new()
            .with_cycle_detection(false)
            .with_max_propagation_depth(8);
        let json = config.to_json().unwrap();
        assert_eq!(GraphConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(GraphConfig::from_json("{ \"detect_cycles\": 3 }").is_err());
    }
}
