//! Strongly typed identifiers.
//!
//! Every id is a string newtype. Fresh ids are ULIDs; ids coming from an
//! external store are wrapped with `from_string`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a new unique id
            pub fn new() -> Self {
                Self(ulid::Ulid::new().to_string())
            }

            /// Wrap an existing id
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_id!(
    /// Identifies a status node
    StatusId
);
define_id!(
    /// Identifies a workflow graph
    WorkflowId
);
define_id!(
    /// Identifies a work item (activity, meeting, order, ...)
    EntityId
);
define_id!(
    /// Identifies a work item subtype
    EntityTypeId
);
define_id!(UserId);
define_id!(SprintId);
define_id!(ProjectId);
define_id!(
    /// Identifies a project role used to restrict workflow edges
    RoleId
);
