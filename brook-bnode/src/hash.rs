//! Digest-based blank node allocation.
//!
//! Identities are the first 128 bits of `sha256(seed ‖ 0x01 ‖ label)`, hex
//! encoded. Fresh nodes hash `seed ‖ 0x00 ‖ counter` instead: a NUL byte never
//! occurs in a syntactically valid label, so `create()` cannot collide with
//! `alloc()`. Memory is bounded by the LRU cache, not by the input size.

use std::num::NonZeroUsize;

use brook_graph_ir::BlankId;
use lru::LruCache;
use sha2::{Digest, Sha256};

use crate::NodeAllocator;

/// Default number of label lookups kept in the cache.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

const SEED_LEN: usize = 16;
const IDENTITY_BYTES: usize = 16;
const FRESH_MARKER: u8 = 0x00;
const LABEL_MARKER: u8 = 0x01;

/// Where the seed comes from, which decides what `reset()` does.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Seed {
    /// Drawn per run; replaced on reset
    Random(Vec<u8>),
    /// Caller supplied; kept across resets
    Fixed(Vec<u8>),
}

impl Seed {
    fn bytes(&self) -> &[u8] {
        match self {
            Seed::Random(b) | Seed::Fixed(b) => b,
        }
    }
}

fn random_seed() -> Vec<u8> {
    rand::random::<[u8; SEED_LEN]>().to_vec()
}

/// Hash allocator with a random or caller-supplied seed.
pub struct HashAllocator {
    seed: Seed,
    cache: LruCache<String, BlankId>,
    counter: u64,
}

impl HashAllocator {
    /// Allocator with a fresh random seed: stable within a run, different
    /// across runs.
    pub fn random(cache_size: usize) -> Self {
        Self::from_seed(Seed::Random(random_seed()), cache_size)
    }

    /// Allocator with a fixed seed: the same seed and label give the same
    /// identity in every run.
    pub fn seeded(seed: impl AsRef<[u8]>, cache_size: usize) -> Self {
        Self::from_seed(Seed::Fixed(seed.as_ref().to_vec()), cache_size)
    }

    fn from_seed(seed: Seed, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            seed,
            cache: LruCache::new(capacity),
            counter: 0,
        }
    }

    /// Whether the seed survives `reset()`.
    pub fn is_fixed_seed(&self) -> bool {
        matches!(self.seed, Seed::Fixed(_))
    }

    /// Number of cached label lookups.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn digest(&self, parts: &[&[u8]]) -> BlankId {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.bytes());
        for part in parts {
            hasher.update(part);
        }
        let digest = hasher.finalize();
        BlankId::new(hex::encode(&digest[..IDENTITY_BYTES]))
    }
}

impl NodeAllocator for HashAllocator {
    fn alloc(&mut self, label: &str) -> BlankId {
        if let Some(id) = self.cache.get(label) {
            return id.clone();
        }
        let id = self.digest(&[&[LABEL_MARKER][..], label.as_bytes()]);
        self.cache.put(label.to_string(), id.clone());
        id
    }

    fn create(&mut self) -> BlankId {
        self.counter += 1;
        let counter = self.counter.to_be_bytes();
        self.digest(&[&[FRESH_MARKER][..], &counter[..]])
    }

    fn reset(&mut self) {
        self.cache.clear();
        self.counter = 0;
        if let Seed::Random(_) = self.seed {
            self.seed = Seed::Random(random_seed());
        }
    }
}

impl std::fmt::Debug for HashAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashAllocator")
            .field("fixed_seed", &self.is_fixed_seed())
            .field("cached", &self.cache.len())
            .field("cache_capacity", &self.cache.cap())
            .field("counter", &self.counter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_fixed_width_hex() {
        let mut alloc = HashAllocator::random(DEFAULT_CACHE_SIZE);
        let id = alloc.alloc("b0");
        assert_eq!(id.as_str().len(), IDENTITY_BYTES * 2);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut alloc = HashAllocator::random(4);
        for i in 0..100 {
            alloc.alloc(&format!("n{}", i));
        }
        assert_eq!(alloc.cached(), 4);
    }

    #[test]
    fn test_eviction_does_not_change_identity() {
        let mut alloc = HashAllocator::seeded("seed", 1);
        let first = alloc.alloc("a");
        alloc.alloc("b");
        assert_eq!(alloc.alloc("a"), first);
    }

    #[test]
    fn test_fixed_seed_is_stable_across_instances() {
        let a = HashAllocator::seeded("fixed", 10).alloc("node");
        let b = HashAllocator::seeded("fixed", 10).alloc("node");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_seed_survives_reset() {
        let mut alloc = HashAllocator::seeded("fixed", 10);
        let before = alloc.alloc("x");
        let fresh_before = alloc.create();
        alloc.reset();
        assert_eq!(alloc.alloc("x"), before);
        assert_eq!(alloc.create(), fresh_before);
    }

    #[test]
    fn test_random_seeds_differ() {
        let a = HashAllocator::random(10).alloc("node");
        let b = HashAllocator::random(10).alloc("node");
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_reset_draws_new_seed() {
        let mut alloc = HashAllocator::random(10);
        let before = alloc.alloc("x");
        alloc.reset();
        assert_ne!(alloc.alloc("x"), before);
    }
}
