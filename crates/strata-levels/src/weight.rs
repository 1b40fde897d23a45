use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const HEAVY: &str = "heavy";

/// Weight of a level edge.
///
/// `Heavy` marks a segment of a dummy chain: its endpoints belong to the same logical node (or
/// long edge) and should stay vertically aligned wherever possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeWeight {
    Finite(u32),
    Heavy,
}

impl EdgeWeight {
    pub const ONE: EdgeWeight = EdgeWeight::Finite(1);

    pub fn is_heavy(self) -> bool {
        matches!(self, EdgeWeight::Heavy)
    }

    /// The weight seen by crossing minimization. Heavy edges count as a single ordinary edge there
    /// so that one chain cannot swamp the mean position of its endpoint.
    pub fn ordering_weight(self) -> u32 {
        match self {
            EdgeWeight::Finite(w) => w,
            EdgeWeight::Heavy => 1,
        }
    }

    /// Merges the weights of two parallel edges.
    pub fn combine(self, other: EdgeWeight) -> EdgeWeight {
        match (self, other) {
            (EdgeWeight::Finite(a), EdgeWeight::Finite(b)) => EdgeWeight::Finite(a.saturating_add(b)),
            _ => EdgeWeight::Heavy,
        }
    }
}

impl Default for EdgeWeight {
    fn default() -> Self {
        EdgeWeight::ONE
    }
}

impl From<u32> for EdgeWeight {
    fn from(value: u32) -> Self {
        EdgeWeight::Finite(value)
    }
}

impl fmt::Display for EdgeWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeWeight::Finite(w) => write!(f, "{w}"),
            EdgeWeight::Heavy => f.write_str(HEAVY),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WeightRepr {
    Finite(u32),
    Sentinel(String),
}

impl Serialize for EdgeWeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            EdgeWeight::Finite(w) => WeightRepr::Finite(w),
            EdgeWeight::Heavy => WeightRepr::Sentinel(HEAVY.to_string()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EdgeWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match WeightRepr::deserialize(deserializer)? {
            WeightRepr::Finite(0) => Err(serde::de::Error::custom(
                "edge weight must be positive",
            )),
            WeightRepr::Finite(w) => Ok(EdgeWeight::Finite(w)),
            WeightRepr::Sentinel(s) if s == HEAVY => Ok(EdgeWeight::Heavy),
            WeightRepr::Sentinel(s) => Err(serde::de::Error::custom(format!(
                "unknown edge weight sentinel: {s}"
            ))),
        }
    }
}
