//! Fast hash map and hash set type aliases.
//!
//! Type aliases for [`FxHashMap`] and [`FxHashSet`] from the `rustc-hash`
//! crate. The Fx hash algorithm is roughly twice as fast as the standard
//! library hasher for the short string keys this workspace leans on
//! (entity names, file paths). Denial-of-service resistance is not needed
//! for internal lookups.
//!
//! # Examples
//!
//! ```
//! use ag_core::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
//!
//! let mut map: FxHashMap<String, u32> = fx_hash_map();
//! map.insert("Order".to_owned(), 3);
//!
//! let mut set: FxHashSet<&str> = fx_hash_set();
//! set.insert("Order");
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_operations() {
        let mut map: FxHashMap<&str, i32> = fx_hash_map();
        map.insert("one", 1);
        map.insert("two", 2);
        assert_eq!(map.get("one"), Some(&1));
        assert_eq!(map.get("three"), None);
    }

    #[test]
    fn test_fx_hash_set_operations() {
        let mut set: FxHashSet<&str> = fx_hash_set();
        set.insert("one");
        assert!(set.contains("one"));
        assert!(!set.contains("two"));
    }
}
