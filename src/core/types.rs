//! Strongly-typed wrappers for game concepts
//!
//! Bare strings for card ids, names and counter names would be easy to mix
//! up, so each gets its own newtype.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_newtype!(
    /// Reference to a static card definition held by the catalog
    CardDefId
);

string_newtype!(
    /// Card name (distinct from other string types)
    CardName
);

string_newtype!(
    /// Player display name
    PlayerName
);

string_newtype!(
    /// Counter name, on a card or on a player (e.g. "+1/+1", "poison", "loyalty")
    CounterName
);

impl CounterName {
    pub fn loyalty() -> Self {
        CounterName::new("loyalty")
    }

    pub fn is_loyalty(&self) -> bool {
        self.0.eq_ignore_ascii_case("loyalty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_name() {
        assert!(CounterName::loyalty().is_loyalty());
        assert!(CounterName::new("Loyalty").is_loyalty());
        assert!(!CounterName::new("+1/+1").is_loyalty());
    }

    #[test]
    fn test_card_def_id() {
        let id = CardDefId::new("abc-123");
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }
}
