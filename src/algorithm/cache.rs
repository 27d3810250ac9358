use crate::io::configuration::REJECTED_ERROR;
use crate::math::vector;
use std::collections::HashMap;

/// Key for caching pairwise registrations
///
/// Identifies an unordered tile pair; the smaller index is always stored
/// first so `(a, b)` and `(b, a)` share one entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PairKey {
    low: usize,
    high: usize,
}

impl PairKey {
    /// Create the canonical key for a tile pair in either order
    pub const fn new(first: usize, second: usize) -> Self {
        if first <= second {
            Self {
                low: first,
                high: second,
            }
        } else {
            Self {
                low: second,
                high: first,
            }
        }
    }

    /// Tile indices in canonical (ascending) order
    pub const fn tiles(&self) -> (usize, usize) {
        (self.low, self.high)
    }
}

/// Outcome of registering one tile against another
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegistrationResult {
    /// Translation `[dy, dx]` aligning the second tile's content with the first's
    pub shift: [f64; 2],
    /// Goodness of fit in `[0, 1]`; [`REJECTED_ERROR`] marks a rejected result
    pub error: f64,
}

impl RegistrationResult {
    /// The untrustworthy result: zero shift with the sentinel error
    pub const fn rejected() -> Self {
        Self {
            shift: [0.0, 0.0],
            error: REJECTED_ERROR,
        }
    }

    /// Whether the nominal position should be used instead of this shift
    pub fn is_rejected(&self) -> bool {
        self.error >= REJECTED_ERROR
    }

    /// Result for the same pair queried in the opposite order
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            shift: vector::neg(self.shift),
            error: self.error,
        }
    }
}

/// Memoization cache for pairwise registrations
///
/// Entries are written once, after a complete computation, and never
/// replaced for the lifetime of the cache.
#[derive(Default, Debug, Clone)]
pub struct RegistrationCache {
    /// Canonical pair to registration mapping
    entries: HashMap<PairKey, RegistrationResult>,

    /// Cache performance statistics
    pub stats: CacheStats,
}

/// Performance metrics for cache effectiveness
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl RegistrationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a pair, recording a hit or miss
    pub fn lookup(&mut self, key: PairKey) -> Option<RegistrationResult> {
        let found = self.entries.get(&key).copied();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    /// Look up a pair without touching the statistics
    pub fn get(&self, key: PairKey) -> Option<RegistrationResult> {
        self.entries.get(&key).copied()
    }

    /// Store a computed result unless the pair is already present
    ///
    /// Returns the result held by the cache afterwards, which is the earlier
    /// entry when one exists.
    pub fn insert(&mut self, key: PairKey, result: RegistrationResult) -> RegistrationResult {
        *self.entries.entry(key).or_insert(result)
    }

    /// Fold in results computed elsewhere, keeping existing entries
    pub fn merge(&mut self, other: Self) {
        for (key, result) in other.entries {
            self.entries.entry(key).or_insert(result);
        }
        self.stats.hits += other.stats.hits;
        self.stats.misses += other.stats.misses;
    }

    /// Number of cached pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All cached pairs in ascending key order
    pub fn sorted_entries(&self) -> Vec<(PairKey, RegistrationResult)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }
}
