//! Deterministic per-agent RNG.
//!
//! Each agent's generator is seeded by
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio, so
//! consecutive agent IDs land far apart in seed space.  Re-creating an
//! `AgentRng` for the same `(seed, agent)` always replays the same stream,
//! which is what keeps standby spreads stable from tick to tick.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, Position};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-agent deterministic RNG.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// A cell within Chebyshev `radius` of `center`.
    pub fn scatter(&mut self, center: Position, radius: u32) -> Position {
        if radius == 0 {
            return center;
        }
        let r = radius as i32;
        center.offset(self.gen_range(-r..=r), self.gen_range(-r..=r))
    }
}
