//! Source-data node identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The identifier a fragment record uses for a node: an integer or a string.
///
/// `Int(7)` and `Str("7")` are different keys.  Use
/// [`NodeKey::parse_lenient`] when the key comes from free text (a CLI flag,
/// a form field) and the caller cannot know which form the data uses.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Str(String),
}

impl NodeKey {
    /// Integer if `text` parses as one, string otherwise.
    pub fn parse_lenient(text: &str) -> Self {
        let trimmed = text.trim();
        trimmed
            .parse::<i64>()
            .map(NodeKey::Int)
            .unwrap_or_else(|_| NodeKey::Str(trimmed.to_owned()))
    }
}

impl From<i64> for NodeKey {
    fn from(n: i64) -> Self {
        NodeKey::Int(n)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey::Str(s.to_owned())
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        NodeKey::Str(s)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(n) => write!(f, "{n}"),
            NodeKey::Str(s) => f.write_str(s),
        }
    }
}
