use crate::collatz::{Collatz, StepCounter};
use crate::list::BoundedList;
use core::fmt::{Display, Formatter};

/// `AdaptiveCacheBuilder` is used to help build a [`AdaptiveCache`] with custom configuration.
///
/// [`AdaptiveCache`]: struct.AdaptiveCache.html
pub struct AdaptiveCacheBuilder<C = Collatz> {
    size: usize,
    counter: C,
}

impl Default for AdaptiveCacheBuilder {
    /// Create a default `AdaptiveCacheBuilder`.
    ///
    /// # Example
    /// ```rust
    /// use collatz_arc::{AdaptiveCacheBuilder, AdaptiveCache};
    /// let mut cache: AdaptiveCache = AdaptiveCacheBuilder::default()
    ///     .set_size(8)
    ///     .finalize();
    ///
    /// assert_eq!(cache.lookup(27), 111);
    /// ```
    fn default() -> Self {
        Self {
            size: 0,
            counter: Collatz,
        }
    }
}

impl AdaptiveCacheBuilder {
    /// Returns a default [`AdaptiveCacheBuilder`] with the given total size.
    ///
    /// [`AdaptiveCacheBuilder`]: struct.AdaptiveCacheBuilder.html
    pub fn new(size: usize) -> Self {
        Self::default().set_size(size)
    }
}

impl<C: StepCounter> AdaptiveCacheBuilder<C> {
    /// Set the total cache size. Each of the four lists gets `size / 2` slots.
    pub fn set_size(self, size: usize) -> Self {
        Self {
            size,
            counter: self.counter,
        }
    }

    /// Set the [`StepCounter`] invoked on misses.
    ///
    /// [`StepCounter`]: trait.StepCounter.html
    pub fn set_step_counter<NC: StepCounter>(self, counter: NC) -> AdaptiveCacheBuilder<NC> {
        AdaptiveCacheBuilder {
            size: self.size,
            counter,
        }
    }

    /// Finalize the builder to [`AdaptiveCache`]. Any size is accepted: sizes
    /// `0` and `1` give lists of capacity `0`, so nothing is ever cached.
    ///
    /// [`AdaptiveCache`]: struct.AdaptiveCache.html
    pub fn finalize(self) -> AdaptiveCache<C> {
        let list_cap = self.size / 2;

        AdaptiveCache {
            size: self.size,
            p: 0,
            recent: BoundedList::new(list_cap),
            frequent: BoundedList::new(list_cap),
            recent_ghost: BoundedList::new(list_cap),
            frequent_ghost: BoundedList::new(list_cap),
            counter: self.counter,
            stats: LookupStats::default(),
        }
    }
}

/// `AdaptiveCache` memoizes Collatz step counts with a four list cache shaped
/// after the Adaptive Replacement Cache (ARC).
///
/// - `recent` (T1) holds keys seen once.
/// - `frequent` (T2) holds keys which came back through a ghost list.
/// - `recent_ghost` (B1) and `frequent_ghost` (B2) hold ghost keys. Their
///   values are never trusted, a ghost hit always recomputes.
/// - `p` is the preference towards T1, nudged by one on every ghost hit.
///
/// Unlike textbook ARC every list has its own fixed capacity of `size / 2`,
/// a hit in T1 stays in T1, and entries dropped from a full T1 or T2 are gone
/// for good instead of moving to B1 or B2. The ghost lists are only filled by
/// [`seed_recent_ghost`] and [`seed_frequent_ghost`]. `p` is tracked but never
/// used to size the lists.
///
/// # Example
///
/// ```rust
/// use collatz_arc::AdaptiveCache;
///
/// let mut cache = AdaptiveCache::new(4);
///
/// // miss, 6 goes to recent
/// assert_eq!(cache.lookup(6), 8);
/// // hit in recent, stays there
/// assert_eq!(cache.lookup(6), 8);
/// assert_eq!(cache.recent_len(), 1);
///
/// // current state
/// // recent:          (MRU) [6] (LRU)
/// // frequent:        (MRU) [] (LRU)
/// // recent ghost:    (MRU) [] (LRU)
/// // frequent ghost:  (MRU) [] (LRU)
///
/// // 27 has been seen before, record it as a recent ghost
/// cache.seed_recent_ghost(27);
///
/// // ghost hit: p grows, 27 is recomputed and lands in frequent
/// assert_eq!(cache.lookup(27), 111);
/// assert_eq!(cache.partition(), 1);
/// assert_eq!(cache.frequent_len(), 1);
///
/// // current state
/// // recent:          (MRU) [6] (LRU)
/// // frequent:        (MRU) [27] (LRU)
/// // recent ghost:    (MRU) [27] (LRU)
/// // frequent ghost:  (MRU) [] (LRU)
/// ```
///
/// [`seed_recent_ghost`]: struct.AdaptiveCache.html#method.seed_recent_ghost
/// [`seed_frequent_ghost`]: struct.AdaptiveCache.html#method.seed_frequent_ghost
pub struct AdaptiveCache<C = Collatz> {
    /// `size` is the total capacity the cache was built with
    size: usize,

    /// `p` is the dynamic preference towards T1, in `[0, recent.cap()]`
    p: usize,

    /// `recent` (T1) is the list for keys seen once
    recent: BoundedList<u64, u64>,

    /// `frequent` (T2) is the list for keys promoted through a ghost hit
    frequent: BoundedList<u64, u64>,

    /// `recent_ghost` (B1) is the ghost history of `recent`
    recent_ghost: BoundedList<u64, u64>,

    /// `frequent_ghost` (B2) is the ghost history of `frequent`
    frequent_ghost: BoundedList<u64, u64>,

    counter: C,
    stats: LookupStats,
}

impl AdaptiveCache {
    /// Create an `AdaptiveCache` with total size `size` and the default [`Collatz`] step counter.
    ///
    /// [`Collatz`]: struct.Collatz.html
    pub fn new(size: usize) -> Self {
        AdaptiveCacheBuilder::new(size).finalize()
    }

    /// Returns a [`AdaptiveCacheBuilder`] to help build a [`AdaptiveCache`].
    ///
    /// # Example
    /// ```rust
    /// use collatz_arc::AdaptiveCache;
    ///
    /// let mut cache = AdaptiveCache::builder(4)
    ///     .set_step_counter(|n: u64| n * 2)
    ///     .finalize();
    ///
    /// assert_eq!(cache.lookup(21), 42);
    /// ```
    ///
    /// [`AdaptiveCacheBuilder`]: struct.AdaptiveCacheBuilder.html
    /// [`AdaptiveCache`]: struct.AdaptiveCache.html
    pub fn builder(size: usize) -> AdaptiveCacheBuilder {
        AdaptiveCacheBuilder::new(size)
    }
}

impl<C: StepCounter> AdaptiveCache<C> {
    /// Create an `AdaptiveCache` with total size `size` which computes misses with `counter`.
    pub fn with_step_counter(size: usize, counter: C) -> Self {
        AdaptiveCacheBuilder::new(size)
            .set_step_counter(counter)
            .finalize()
    }

    /// Create a [`AdaptiveCache`] from [`AdaptiveCacheBuilder`].
    ///
    /// [`AdaptiveCacheBuilder`]: struct.AdaptiveCacheBuilder.html
    /// [`AdaptiveCache`]: struct.AdaptiveCache.html
    pub fn from_builder(builder: AdaptiveCacheBuilder<C>) -> Self {
        builder.finalize()
    }

    /// Returns the step count of `key`, from the cache if it is resident,
    /// otherwise from the step counter.
    ///
    /// The lists are consulted in order, first match wins:
    ///
    /// 1. `recent` hit: the entry moves to the front of `recent`.
    /// 2. `frequent` hit: the entry moves to the front of `frequent`.
    /// 3. Otherwise the step count is computed, then
    ///    - `recent_ghost` hit: `p` grows by one (up to `recent.cap()`) and the key
    ///      is inserted in `frequent`;
    ///    - `frequent_ghost` hit: `p` shrinks by one (down to `0`) and the key is
    ///      inserted in `frequent`;
    ///    - full miss: the key is inserted in `recent`.
    ///
    /// Ghost entries are left where they are. A full list silently drops its oldest entry.
    ///
    /// # Panics
    ///
    /// Panics if the step counter has no step count for `key`. With the default
    /// step counter that is `0`, or a key whose trajectory overflows a `u64`.
    /// Use [`try_lookup`] to get `None` instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use collatz_arc::AdaptiveCache;
    ///
    /// let mut cache = AdaptiveCache::new(4);
    /// let steps: Vec<u64> = [6, 6, 27, 6].iter().map(|k| cache.lookup(*k)).collect();
    /// assert_eq!(steps, vec![8, 8, 111, 8]);
    /// assert_eq!(cache.stats().misses(), 2);
    /// ```
    ///
    /// [`try_lookup`]: struct.AdaptiveCache.html#method.try_lookup
    pub fn lookup(&mut self, key: u64) -> u64 {
        match self.try_lookup(key) {
            Some(steps) => steps,
            None => panic!("no step count for key {}", key),
        }
    }

    /// Like [`lookup`], but returns `None` if the step counter has no step count
    /// for `key`. The cache is left untouched in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use collatz_arc::AdaptiveCache;
    ///
    /// let mut cache = AdaptiveCache::new(4);
    /// assert_eq!(cache.try_lookup(27), Some(111));
    /// assert_eq!(cache.try_lookup(u64::MAX), None);
    /// assert_eq!(cache.len(), 1);
    /// ```
    ///
    /// [`lookup`]: struct.AdaptiveCache.html#method.lookup
    pub fn try_lookup(&mut self, key: u64) -> Option<u64> {
        if let Some(idx) = self.recent.contains(&key) {
            if let Some((_, v)) = self.recent.get(idx) {
                let steps = *v;
                self.recent.promote(idx);
                self.record(key, Outcome::RecentHit);
                return Some(steps);
            }
        }

        if let Some(idx) = self.frequent.contains(&key) {
            if let Some((_, v)) = self.frequent.get(idx) {
                let steps = *v;
                self.frequent.promote(idx);
                self.record(key, Outcome::FrequentHit);
                return Some(steps);
            }
        }

        let steps = self.counter.checked_steps(key)?;

        // check if this key was recorded as part of the recent history
        if self.recent_ghost.contains(&key).is_some() {
            // recent set is too small, increase p
            self.p = (self.p + 1).min(self.recent.cap());
            if let Some((evicted, _)) = self.frequent.insert_front(key, steps) {
                tracing::trace!(evicted, "dropped from frequent");
            }
            self.record(key, Outcome::RecentGhostHit);
            return Some(steps);
        }

        // check if this key was recorded as part of the frequent history
        if self.frequent_ghost.contains(&key).is_some() {
            // frequent set is too small, decrease p
            self.p = self.p.saturating_sub(1);
            if let Some((evicted, _)) = self.frequent.insert_front(key, steps) {
                tracing::trace!(evicted, "dropped from frequent");
            }
            self.record(key, Outcome::FrequentGhostHit);
            return Some(steps);
        }

        if let Some((evicted, _)) = self.recent.insert_front(key, steps) {
            tracing::trace!(evicted, "dropped from recent");
        }
        self.record(key, Outcome::Miss);
        Some(steps)
    }

    /// Records `key` in the recent ghost list (B1), so that the next lookup of `key`
    /// missing the resident lists counts as a recent ghost hit.
    ///
    /// Returns `true` if `key` is in the recent ghost list afterwards. Keys already
    /// there are left untouched; with a ghost capacity of `0` nothing is recorded.
    pub fn seed_recent_ghost(&mut self, key: u64) -> bool {
        Self::seed_ghost(&mut self.recent_ghost, key)
    }

    /// Records `key` in the frequent ghost list (B2), so that the next lookup of `key`
    /// missing the resident lists counts as a frequent ghost hit.
    ///
    /// Returns `true` if `key` is in the frequent ghost list afterwards.
    pub fn seed_frequent_ghost(&mut self, key: u64) -> bool {
        Self::seed_ghost(&mut self.frequent_ghost, key)
    }

    /// Returns the current partition value `p` of the cache.
    pub fn partition(&self) -> usize {
        self.p
    }

    /// Returns a bool indicating whether `key` is resident, either in the recent
    /// or in the frequent list. Ghost entries do not count. Does not update the lists.
    pub fn contains(&self, key: &u64) -> bool {
        self.recent.contains(key).is_some() || self.frequent.contains(key).is_some()
    }

    /// Returns the number of resident entries, recent and frequent.
    pub fn len(&self) -> usize {
        self.recent.len() + self.frequent.len()
    }

    /// Returns the total size the cache was built with.
    pub fn cap(&self) -> usize {
        self.size
    }

    /// Returns a bool indicating whether all four lists are empty.
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
            && self.frequent.is_empty()
            && self.recent_ghost.is_empty()
            && self.frequent_ghost.is_empty()
    }

    /// Returns the number of entries that are currently in the recent list.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Returns the number of entries that are currently in the frequent list.
    pub fn frequent_len(&self) -> usize {
        self.frequent.len()
    }

    /// Returns the number of keys that are currently in the recent ghost list.
    pub fn recent_ghost_len(&self) -> usize {
        self.recent_ghost.len()
    }

    /// Returns the number of keys that are currently in the frequent ghost list.
    pub fn frequent_ghost_len(&self) -> usize {
        self.frequent_ghost.len()
    }

    /// Returns the recent list (T1).
    pub fn recent(&self) -> &BoundedList<u64, u64> {
        &self.recent
    }

    /// Returns the frequent list (T2).
    pub fn frequent(&self) -> &BoundedList<u64, u64> {
        &self.frequent
    }

    /// Returns the recent ghost list (B1). Its values are meaningless.
    pub fn recent_ghost(&self) -> &BoundedList<u64, u64> {
        &self.recent_ghost
    }

    /// Returns the frequent ghost list (B2). Its values are meaningless.
    pub fn frequent_ghost(&self) -> &BoundedList<u64, u64> {
        &self.frequent_ghost
    }

    /// Returns the step counter used on misses.
    pub fn step_counter(&self) -> &C {
        &self.counter
    }

    /// Returns the lookup counters collected since the cache was built or last purged.
    pub fn stats(&self) -> LookupStats {
        self.stats
    }

    /// Clears all four lists, and resets `p` and the lookup counters.
    pub fn purge(&mut self) {
        self.recent.purge();
        self.frequent.purge();
        self.recent_ghost.purge();
        self.frequent_ghost.purge();
        self.p = 0;
        self.stats = LookupStats::default();
    }

    fn seed_ghost(list: &mut BoundedList<u64, u64>, key: u64) -> bool {
        if list.contains(&key).is_some() {
            return true;
        }
        list.insert_front(key, 0);
        list.contains(&key).is_some()
    }

    fn record(&mut self, key: u64, outcome: Outcome) {
        match outcome {
            Outcome::RecentHit => self.stats.recent_hits += 1,
            Outcome::FrequentHit => self.stats.frequent_hits += 1,
            Outcome::RecentGhostHit => self.stats.recent_ghost_hits += 1,
            Outcome::FrequentGhostHit => self.stats.frequent_ghost_hits += 1,
            Outcome::Miss => self.stats.misses += 1,
        }
        tracing::trace!(key, %outcome, p = self.p, "lookup");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    RecentHit,
    FrequentHit,
    RecentGhostHit,
    FrequentGhostHit,
    Miss,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Outcome::RecentHit => write!(f, "recent hit"),
            Outcome::FrequentHit => write!(f, "frequent hit"),
            Outcome::RecentGhostHit => write!(f, "recent ghost hit"),
            Outcome::FrequentGhostHit => write!(f, "frequent ghost hit"),
            Outcome::Miss => write!(f, "miss"),
        }
    }
}

/// `LookupStats` counts how [`AdaptiveCache::lookup`] calls were answered.
///
/// [`AdaptiveCache::lookup`]: struct.AdaptiveCache.html#method.lookup
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    recent_hits: u64,
    frequent_hits: u64,
    recent_ghost_hits: u64,
    frequent_ghost_hits: u64,
    misses: u64,
}

impl LookupStats {
    /// Lookups answered from the recent list.
    pub fn recent_hits(&self) -> u64 {
        self.recent_hits
    }

    /// Lookups answered from the frequent list.
    pub fn frequent_hits(&self) -> u64 {
        self.frequent_hits
    }

    /// Lookups which missed the resident lists but were found in the recent ghost list.
    pub fn recent_ghost_hits(&self) -> u64 {
        self.recent_ghost_hits
    }

    /// Lookups which missed the resident lists but were found in the frequent ghost list.
    pub fn frequent_ghost_hits(&self) -> u64 {
        self.frequent_ghost_hits
    }

    /// Lookups answered without calling the step counter.
    pub fn hits(&self) -> u64 {
        self.recent_hits + self.frequent_hits
    }

    /// Lookups absent from all four lists.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Lookups which called the step counter, ghost hits included.
    pub fn computed(&self) -> u64 {
        self.recent_ghost_hits + self.frequent_ghost_hits + self.misses
    }

    /// Total number of lookups.
    pub fn lookups(&self) -> u64 {
        self.hits() + self.computed()
    }

    /// Fraction of lookups answered from the cache, `0.0` if there were none.
    pub fn hit_ratio(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits() as f64 / total as f64,
        }
    }
}
