//! # Common Types

/// A dense vocabulary identifier.
///
/// IDs occupy ``[0, vocab.size())``; see [`crate::vocab::reserved`].
pub type WordId = u32;

/// A pair of adjacent symbols.
pub type Pair<T> = (T, T);

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type NmtHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Create a new empty hash map.
        pub fn hash_map_new<K, V>() -> NmtHashMap<K, V> {
            NmtHashMap::new()
        }

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> NmtHashMap<K, V> {
            NmtHashMap::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type NmtHashSet<V> = ahash::AHashSet<V>;

    } else {
        /// Type Alias for hash maps in this crate.
        pub type NmtHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Create a new empty hash map.
        pub fn hash_map_new<K, V>() -> NmtHashMap<K, V> {
            NmtHashMap::new()
        }

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> NmtHashMap<K, V> {
            NmtHashMap::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type NmtHashSet<V> = std::collections::HashSet<V>;
    }
}
