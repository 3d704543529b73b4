//! Strongly typed identifier wrappers.
//!
//! Numeric IDs are `Copy + Ord + Hash` so they work as map keys and sort
//! without ceremony.  Agents and jobs reference each other only through these
//! IDs, never through handles, so there are no ownership cycles between the
//! agent arena and the job queues.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// The ID following `self`; used by allocators.
            #[inline]
            pub fn next(self) -> $name {
                $name(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// Identifier of a swarm agent.  Allocated monotonically, so ascending
    /// order is insertion order.
    pub struct AgentId(u32);
}

typed_id! {
    /// Key of a job, unique within its queue.
    pub struct JobKey(u32);
}

typed_id! {
    /// Identifier of a host object (structure, site, source, …).
    pub struct ObjectId(u32);
}

/// Name of a zone (a spatially bounded area owning its own queues).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneName(pub String);

impl ZoneName {
    pub fn new(name: impl Into<String>) -> Self {
        ZoneName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneName {
    fn from(s: &str) -> Self {
        ZoneName(s.to_owned())
    }
}

impl From<String> for ZoneName {
    fn from(s: String) -> Self {
        ZoneName(s)
    }
}
