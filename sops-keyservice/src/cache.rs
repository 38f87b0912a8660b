//! A TTL cache for unwrapped plaintexts, so an out-of-process server can
//! avoid re-prompting (e.g. a passphrase) on repeated requests for the
//! same ciphertext.
//!
//! Clients must not assume caching happens at all — this is a server-side
//! optimization, never part of the protocol's contract.

use sha2::{Digest, Sha256};
use sops_types::MasterKeyKind;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use zeroize::Zeroizing;

/// `(masterKeyKind, identifier, ciphertext-hash)`, as named by the
/// protocol's caching guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: MasterKeyKind,
    identifier: String,
    ciphertext_hash: [u8; 32],
}

impl CacheKey {
    pub fn new(kind: MasterKeyKind, identifier: impl Into<String>, ciphertext: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ciphertext.as_bytes());
        let ciphertext_hash: [u8; 32] = hasher.finalize().into();
        CacheKey {
            kind,
            identifier: identifier.into(),
            ciphertext_hash,
        }
    }
}

struct Entry {
    plaintext: Zeroizing<Vec<u8>>,
    inserted_at: Instant,
}

/// A lazily-swept TTL cache of unwrapped plaintext data keys.
///
/// Swept on access rather than via a background task: every call that
/// touches the cache first drops entries older than `ttl`, so there is no
/// sweeper task to manage or shut down.
pub struct PlaintextCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl PlaintextCache {
    pub fn new(ttl: Duration) -> Self {
        PlaintextCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a cached plaintext, sweeping expired entries first.
    pub async fn get(&self, key: &CacheKey) -> Option<Zeroizing<Vec<u8>>> {
        let mut entries = self.entries.lock().await;
        self.sweep(&mut entries);
        entries.get(key).map(|e| e.plaintext.clone())
    }

    pub async fn insert(&self, key: CacheKey, plaintext: Zeroizing<Vec<u8>>) {
        let mut entries = self.entries.lock().await;
        self.sweep(&mut entries);
        entries.insert(
            key,
            Entry {
                plaintext,
                inserted_at: Instant::now(),
            },
        );
    }

    fn sweep(&self, entries: &mut HashMap<CacheKey, Entry>) {
        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn caches_and_returns_plaintext() {
        let cache = PlaintextCache::new(Duration::from_secs(60));
        let key = CacheKey::new(MasterKeyKind::Age, "age1abc", "ENC[...]");
        cache.insert(key.clone(), Zeroizing::new(vec![1, 2, 3])).await;
        assert_eq!(cache.get(&key).await.unwrap().as_slice(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = PlaintextCache::new(Duration::from_millis(10));
        let key = CacheKey::new(MasterKeyKind::Age, "age1abc", "ENC[...]");
        cache.insert(key.clone(), Zeroizing::new(vec![9])).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn distinct_ciphertexts_hash_differently() {
        let a = CacheKey::new(MasterKeyKind::Age, "id", "ENC[one]");
        let b = CacheKey::new(MasterKeyKind::Age, "id", "ENC[two]");
        assert_ne!(a, b);
    }
}
