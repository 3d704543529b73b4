//! Shared reuse of computed paths.
//!
//! Entries are keyed by `(zone, origin, destination, range, constraints)`.
//! `constraints` is an opaque tag chosen by the caller; the movement engine
//! uses it to keep paths that avoid other agents apart from terrain-only
//! paths.  An entry is dropped after `reuse_limit` hits or after `ttl` ticks
//! without a hit, whichever comes first.

use rustc_hash::FxHashMap;

use sw_core::{Position, Tick, ZoneName};

use crate::GridPath;

// ── PathKey ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathKey {
    pub zone:        ZoneName,
    pub from:        Position,
    pub to:          Position,
    pub range:       u32,
    pub constraints: &'static str,
}

impl PathKey {
    pub fn new(zone: ZoneName, from: Position, to: Position, range: u32) -> Self {
        Self { zone, from, to, range, constraints: "" }
    }

    pub fn with_constraints(mut self, constraints: &'static str) -> Self {
        self.constraints = constraints;
        self
    }
}

// ── PathCache ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct CacheEntry {
    path:      String,
    last_used: Tick,
    hits:      u32,
}

/// Hit/miss counters, reset only with the cache.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits:    u64,
    pub misses:  u64,
    pub evicted: u64,
}

pub struct PathCache {
    entries:     FxHashMap<PathKey, CacheEntry>,
    reuse_limit: u32,
    ttl:         u64,
    stats:       CacheStats,
}

impl PathCache {
    pub fn new(reuse_limit: u32, ttl: u64) -> Self {
        Self { entries: FxHashMap::default(), reuse_limit: reuse_limit.max(1), ttl, stats: CacheStats::default() }
    }

    /// Look up a path and count the hit.  An entry that has reached its reuse
    /// limit is evicted and reported as a miss.
    pub fn get(&mut self, key: &PathKey, now: Tick) -> Option<GridPath> {
        let expired = match self.entries.get_mut(key) {
            Some(entry) if entry.hits < self.reuse_limit => {
                entry.hits += 1;
                entry.last_used = now;
                self.stats.hits += 1;
                return GridPath::deserialize(key.from, &entry.path).ok();
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
            self.stats.evicted += 1;
        }
        self.stats.misses += 1;
        None
    }

    pub fn insert(&mut self, key: PathKey, path: &GridPath, now: Tick) {
        self.entries.insert(key, CacheEntry { path: path.serialize(), last_used: now, hits: 0 });
    }

    /// Drop one entry, e.g. after a follower found it blocked.
    pub fn invalidate(&mut self, key: &PathKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry of `zone`.
    pub fn invalidate_zone(&mut self, zone: &ZoneName) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| &k.zone != zone);
        before - self.entries.len()
    }

    /// Evict entries idle for more than the TTL.  Returns how many went.
    pub fn prune(&mut self, now: Tick) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| now.since(e.last_used) <= ttl);
        let removed = before - self.entries.len();
        self.stats.evicted += removed as u64;
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
