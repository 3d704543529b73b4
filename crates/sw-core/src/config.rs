//! Swarm configuration.
//!
//! Typically written as a TOML file next to the host's launcher and parsed
//! with [`SwarmConfig::from_toml_str`].  Every field has a default, so an
//! empty document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::{SwarmError, SwarmResult};

/// Tuning knobs of the movement engine and path cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveConfig {
    /// How many steps a computed path is followed before it is recomputed.
    pub reuse_limit: u32,

    /// Node-expansion budget of one path search.
    pub max_search_cost: u32,

    /// Distance at which a waypoint counts as reached.
    pub waypoint_tolerance: u32,

    /// Consecutive "crossing allowed but still blocked" ticks tolerated
    /// before the engine routes around other agents anyway.
    pub max_stuck_ticks: u32,

    /// Ticks a shared path-cache entry survives without being used.
    pub cache_ttl_ticks: u64,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            reuse_limit:        20,
            max_search_cost:    4_000,
            waypoint_tolerance: 1,
            max_stuck_ticks:    3,
            cache_ttl_ticks:    300,
        }
    }
}

/// Top-level swarm configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Ticks to run when driven by `Swarm::run`.
    pub total_ticks: u64,

    /// Radius around the rally point idle agents spread over.
    pub standby_spread: u32,

    pub movement: MoveConfig,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            seed:           0,
            total_ticks:    1_000,
            standby_spread: 2,
            movement:       MoveConfig::default(),
        }
    }
}

impl SwarmConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SwarmResult<Self> {
        let config: SwarmConfig =
            toml::from_str(text).map_err(|e| SwarmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the movement engine degenerate.
    pub fn validate(&self) -> SwarmResult<()> {
        if self.movement.reuse_limit == 0 {
            return Err(SwarmError::Config("movement.reuse_limit must be > 0".into()));
        }
        if self.movement.max_search_cost == 0 {
            return Err(SwarmError::Config("movement.max_search_cost must be > 0".into()));
        }
        Ok(())
    }
}
