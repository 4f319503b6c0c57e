//! Cache builder and facade.
//!
//! Provides a simple API to configure and create a W-TinyLFU cache while
//! hiding the policy internals (region caps, sketch sizing).
//!
//! ## Example
//!
//! ```rust
//! use tinylfu::builder::CacheBuilder;
//!
//! let mut cache = CacheBuilder::new()
//!     .maximum_size(100)
//!     .build::<u64, String>()
//!     .unwrap();
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::tiny_lfu::TinyLfuCore;
use crate::sketch::key_hash::SketchKey;
use crate::traits::{CoreCache, ReadOnlyCache};

/// Builder for creating cache instances.
///
/// Two bounds are recognised: `maximum_size` (entry count, active) and
/// `maximum_weight` (recognised for forward compatibility; selecting it is
/// rejected at build time because weighted eviction is not implemented).
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder {
    maximum_size: Option<usize>,
    maximum_weight: Option<u64>,
}

impl CacheBuilder {
    /// Creates a builder with no bounds configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the cache by entry count.
    ///
    /// Region caps are derived from this size; small values round up to the
    /// minimum viable regions (see
    /// [`TinyLfuCore::new`](crate::policy::tiny_lfu::TinyLfuCore::new)).
    pub fn maximum_size(mut self, size: usize) -> Self {
        self.maximum_size = Some(size);
        self
    }

    /// Bounds the cache by total entry weight.
    ///
    /// Recognised but inactive: building with a weight bound returns a
    /// [`ConfigError`].
    pub fn maximum_weight(mut self, weight: u64) -> Self {
        self.maximum_weight = Some(weight);
        self
    }

    /// Builds the cache.
    ///
    /// # Errors
    ///
    /// - `maximum_weight` was set: weighted eviction is not implemented.
    /// - `maximum_size` was never set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tinylfu::builder::CacheBuilder;
    ///
    /// let cache = CacheBuilder::new().maximum_size(4).build::<u64, i32>().unwrap();
    /// assert_eq!(cache.capacity(), 12); // derived region caps sum
    ///
    /// assert!(CacheBuilder::new().build::<u64, i32>().is_err());
    /// ```
    pub fn build<K, V>(self) -> Result<Cache<K, V>, ConfigError>
    where
        K: SketchKey + Clone + Eq + Hash,
    {
        if self.maximum_weight.is_some() {
            return Err(ConfigError::WeightBoundUnsupported);
        }
        let Some(size) = self.maximum_size else {
            return Err(ConfigError::MissingMaximumSize);
        };
        Ok(Cache {
            core: TinyLfuCore::new(size),
        })
    }
}

/// Bounded key/value cache with W-TinyLFU admission.
///
/// Thin facade over [`TinyLfuCore`] exposing only the stable surface;
/// construct it through [`CacheBuilder`].
pub struct Cache<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    core: TinyLfuCore<K, V>,
}

impl<K, V> Cache<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    /// Inserts a key-value pair. Returns the previous value if the key was
    /// already resident.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.core.insert(key, value)
    }

    /// Gets a reference to a value by key, recording the access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.core.get(key)
    }

    /// Checks if a key is resident without recording an access.
    pub fn contains(&self, key: &K) -> bool {
        self.core.contains(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Returns the effective maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.core.maximum_size()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.core.clear();
    }
}

impl<K, V> std::fmt::Debug for Cache<K, V>
where
    K: SketchKey + Clone + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("core", &self.core).finish()
    }
}

impl<K, V> ReadOnlyCache<K> for Cache<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        Cache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: SketchKey + Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Cache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        Cache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        Cache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }

    fn clear(&mut self) {
        Cache::clear(self);
    }
}
