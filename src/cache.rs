//! Bounded memo for elevation and moisture samples.
//!
//! Eviction is by insertion order and happens in batches: when the cache is
//! full, the oldest `evict_batch` entries are dropped at once instead of one
//! per insert. A miss only costs a recomputation, but the key packing has to
//! stay collision-free or neighbouring cells would share samples.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

/// Default maximum number of cached samples
pub const DEFAULT_CACHE_CAPACITY: usize = 5000;
/// Default number of entries dropped per eviction
pub const DEFAULT_EVICT_BATCH: usize = 1000;

const Y_BITS: u32 = 16;
const Y_MASK: u64 = (1 << Y_BITS) - 1;

/// Pack a world cell into a single key.
///
/// `x` occupies the high 48 bits (two's complement) and `y` the low 16 bits,
/// so the packing is exact for `x` in `[-2^47, 2^47)` and `y` in `[0, 65536)`.
#[inline]
pub fn pack_key(x: i64, y: i32) -> u64 {
    ((x as u64) << Y_BITS) | (y as u64 & Y_MASK)
}

/// Inverse of [`pack_key`].
#[inline]
pub fn unpack_key(key: u64) -> (i64, i32) {
    let x = (key as i64) >> Y_BITS;
    let y = (key & Y_MASK) as i32;
    (x, y)
}

/// Cache statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub len: usize,
}

impl CacheStats {
    /// Hit rate in [0, 1]
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Hits: {} | Misses: {} | Rate: {:.1}% | Entries: {} | Evicted: {}",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.len,
            self.evictions,
        )
    }
}

/// Insertion-ordered noise sample cache.
pub struct NoiseCache {
    values: HashMap<u64, f64>,
    order: VecDeque<u64>,
    capacity: usize,
    evict_batch: usize,
    stats: CacheStats,
}

impl NoiseCache {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CACHE_CAPACITY, DEFAULT_EVICT_BATCH)
    }

    /// Both limits are clamped to at least 1; the batch never exceeds the capacity.
    pub fn with_limits(capacity: usize, evict_batch: usize) -> Self {
        let capacity = capacity.max(1);
        let evict_batch = evict_batch.clamp(1, capacity);
        Self {
            values: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            evict_batch,
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, x: i64, y: i32) -> Option<f64> {
        match self.values.get(&pack_key(x, y)) {
            Some(&v) => {
                self.stats.hits += 1;
                Some(v)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn set(&mut self, x: i64, y: i32, value: f64) {
        let key = pack_key(x, y);
        if let Some(slot) = self.values.get_mut(&key) {
            *slot = value;
            return;
        }

        if self.values.len() >= self.capacity {
            self.evict_oldest();
        }

        self.values.insert(key, value);
        self.order.push_back(key);
    }

    /// Return the cached value or compute, store and return it.
    pub fn get_or_insert_with<F: FnOnce() -> f64>(&mut self, x: i64, y: i32, compute: F) -> f64 {
        if let Some(v) = self.get(x, y) {
            return v;
        }
        let v = compute();
        self.set(x, y, v);
        v
    }

    fn evict_oldest(&mut self) {
        let count = self.evict_batch.min(self.order.len());
        for key in self.order.drain(..count) {
            self.values.remove(&key);
        }
        self.stats.evictions += count;
        debug!(evicted = count, remaining = self.values.len(), "noise cache eviction");
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats { len: self.values.len(), ..self.stats }
    }
}

impl Default for NoiseCache {
    fn default() -> Self {
        Self::new()
    }
}
