// Tier 1: Phrase Score Cache
//
// Request-scoped memo of phrase emotion packets keyed by a content hash.
// Owned by a single analysis call and dropped with it; bounded by capacity
// with first-in-first-out eviction.

use crate::types::PhraseEmotionPacket;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

type PhraseKey = [u8; 16];

/// Hit/miss counters reported in diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Bounded phrase score cache
#[derive(Debug)]
pub struct PhraseCache {
    capacity: usize,
    entries: HashMap<PhraseKey, PhraseEmotionPacket>,
    order: VecDeque<PhraseKey>,
    hits: usize,
    misses: usize,
}

impl PhraseCache {
    /// Capacity 0 disables caching (every lookup is a miss)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn key(phrase: &str) -> PhraseKey {
        let digest = Sha256::digest(phrase.as_bytes());
        let mut key = [0u8; 16];
        key.copy_from_slice(&digest[..16]);
        key
    }

    /// Return the cached packet for `phrase`, computing and storing it on a miss
    pub fn get_or_insert_with<F>(&mut self, phrase: &str, compute: F) -> PhraseEmotionPacket
    where
        F: FnOnce() -> PhraseEmotionPacket,
    {
        let key = Self::key(phrase);
        if let Some(packet) = self.entries.get(&key) {
            self.hits += 1;
            return packet.clone();
        }

        self.misses += 1;
        let packet = compute();
        if self.capacity > 0 {
            if self.entries.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            self.entries.insert(key, packet.clone());
            self.order.push_back(key);
        }
        packet
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
