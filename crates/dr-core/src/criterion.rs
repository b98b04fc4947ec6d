//! Edge-weight criterion used to rank routes.
//!
//! Each variant maps to one numeric edge attribute in the fragment files.
//! Free-form names are accepted only at the parsing boundary
//! ([`FromStr`](std::str::FromStr)); everything past it works with the enum.

use std::fmt;
use std::str::FromStr;

/// Which edge attribute a shortest-path query minimises.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Aggregate flood-risk cost (`costo_total`).
    #[default]
    Cost,
    /// Travel time (`tiempo`).
    Time,
    /// Physical distance (`distancia`).
    Distance,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Cost, Criterion::Time, Criterion::Distance];

    /// Name of the edge attribute holding this criterion's weight.
    pub fn field(self) -> &'static str {
        match self {
            Criterion::Cost     => "costo_total",
            Criterion::Time     => "tiempo",
            Criterion::Distance => "distancia",
        }
    }

    /// Short human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Cost     => "cost",
            Criterion::Time     => "time",
            Criterion::Distance => "distance",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`Criterion::from_str`] for an unknown name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCriterionError(pub String);

impl fmt::Display for ParseCriterionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown criterion {:?}: expected cost, time, distance \
             (or costo_total, tiempo, distancia)",
            self.0
        )
    }
}

impl std::error::Error for ParseCriterionError {}

impl FromStr for Criterion {
    type Err = ParseCriterionError;

    /// Accepts the short label or the attribute name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Criterion::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered || c.field() == lowered)
            .ok_or_else(|| ParseCriterionError(s.to_owned()))
    }
}
