//! Identifier newtypes.
//!
//! Every identifier wraps a `String` so that ids coming from the outside
//! (CLI arguments, configuration, stored sessions) and ids generated here
//! share one representation. Generated ids are UUID v4 based and carry a
//! short prefix so that log lines stay readable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh identifier.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a submitted objective. Also used as the task-group id
    /// when the supervisor synthesizes the results of one objective.
    ObjectiveId,
    "obj"
);

string_id!(
    /// Identifier of a single routed task. Never reused for the process lifetime.
    TaskId,
    "task"
);

string_id!(
    /// Identifier of a long-lived worker agent (e.g. `research-1`).
    AgentId,
    "agent"
);

string_id!(
    /// Identifier of a vote session.
    DecisionId,
    "decision"
);

string_id!(
    /// Identifier of a voter in a vote session.
    VoterId,
    "voter"
);

impl DecisionId {
    /// Decision id used when finalizing the synthesis of an objective.
    pub fn for_finalization(objective_id: &ObjectiveId) -> Self {
        Self(format!("finalize-{}", objective_id))
    }
}

impl From<&AgentId> for VoterId {
    fn from(agent: &AgentId) -> Self {
        Self::new(agent.as_str())
    }
}
