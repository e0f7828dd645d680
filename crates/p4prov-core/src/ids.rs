//! Strongly-typed ID wrappers for telemetry concepts.
//!
//! Device agent ids arrive as raw strings on the wire; wrapping them keeps
//! them from being confused with provenance vertex ids.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id_type!(
    /// Device agent identifier carried at field index 2 of every message.
    AgentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_serializes_transparently() {
        let id = AgentId::new("switch-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"switch-1\"");
        assert_eq!(id.to_string(), "switch-1");
    }
}
