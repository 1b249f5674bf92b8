use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Outcome of a single cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryKind {
    /// Answered from a near-duplicate earlier query.
    SemanticHit,
    /// Answered from a byte-identical (after normalization) earlier query.
    ExactHit,
    /// Not cached; the language model was called.
    Miss,
}

impl QueryKind {
    /// Returns `true` for both kinds of hit.
    pub fn is_hit(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_snake_case_names() {
        assert_eq!(QueryKind::from_str("semantic_hit").unwrap(), QueryKind::SemanticHit);
        assert_eq!(QueryKind::ExactHit.to_string(), "exact_hit");
        assert!(QueryKind::from_str("hit").is_err());
        assert!(!QueryKind::Miss.is_hit());
    }
}
