//! Node name module.
//!
//! Provides the `NodeName` type, the immutable string identifier every
//! node is registered under. Uses `Arc<str>` so names are cheap to clone
//! into error values, snapshots and hypothetical graphs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Shared string identifier for graph nodes.
///
/// Callers outside the engine build names with a naming convention: a
/// component-specific prefix, an entity id and a field name concatenated
/// together (see [`NodeName::compose`]).
///
/// # Examples
///
/// ```rust
/// use statgraph::NodeName;
///
/// let gold = NodeName::from_str("res_gold_income");
///
/// // Can be created from string slices or owned strings
/// let gold2: NodeName = "res_gold_income".into();
/// let gold3: NodeName = String::from("res_gold_income").into();
///
/// assert_eq!(gold, gold2);
/// assert_eq!(gold, gold3);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeName(Arc<str>);

impl Serialize for NodeName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NodeName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(NodeName::from(s))
    }
}

impl NodeName {
    /// Create a new `NodeName` from a string slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statgraph::NodeName;
    ///
    /// let name = NodeName::from_str("hero_strength");
    /// assert_eq!(name.as_str(), "hero_strength");
    /// ```
    pub fn from_str(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Build a name from the prefix + entity id + field convention.
    ///
    /// The three parts are concatenated verbatim, so prefixes usually end
    /// with a separator of the caller's choice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statgraph::NodeName;
    ///
    /// let name = NodeName::compose("skill_", 42, "_xp");
    /// assert_eq!(name.as_str(), "skill_42_xp");
    /// ```
    pub fn compose(prefix: &str, entity_id: impl std::fmt::Display, field: &str) -> Self {
        Self::from(format!("{}{}{}", prefix, entity_id, field))
    }

    /// Get the string representation of this `NodeName`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeName {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for NodeName {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for NodeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
