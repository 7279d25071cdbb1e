//! Time-bounded store for rendered images.
//!
//! Backs the store-then-redirect flow: the upload handler stores a
//! freshly rendered image under a random key and redirects the client
//! to a URL containing that key; the fetch handler reads it back.
//!
//! ## Expiry
//!
//! Every entry lives exactly `ttl` from insertion. Reads never extend
//! lifetime and there is no size-based eviction. Expiry is enforced two
//! ways:
//! - lazily on `get`, so a stale entry is never returned
//! - by an optional background sweeper, so memory is reclaimed for
//!   entries nobody fetches
//!
//! ## Locking
//!
//! The index is a `RwLock<HashMap>`. Payloads are `Bytes`, so a hit only
//! bumps a reference count under the read lock; no payload copy ever
//! happens while the index is locked.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Configuration for an [`ArtifactCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCacheConfig {
    /// Lifetime of every entry
    pub ttl: Duration,
    /// How often the background sweeper runs; `None` disables it
    pub sweep_interval: Option<Duration>,
}

impl Default for ArtifactCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

struct StoredArtifact {
    data: Bytes,
    created_at: Instant,
}

impl StoredArtifact {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// Statistics for the artifact cache.
///
/// All fields are atomic for lock-free reads from metrics endpoints.
#[derive(Debug, Default)]
pub struct ArtifactCacheStats {
    /// Total artifacts stored
    pub inserts: AtomicU64,
    /// Total successful lookups
    pub hits: AtomicU64,
    /// Total lookups for unknown or expired keys
    pub misses: AtomicU64,
    /// Entries removed on read after their TTL
    pub expired: AtomicU64,
    /// Entries removed by the background sweeper
    pub swept: AtomicU64,
    /// Current number of entries
    pub entry_count: AtomicU64,
    /// Current payload bytes held
    pub size_bytes: AtomicU64,
}

impl ArtifactCacheStats {
    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    fn record_removal(&self, size: u64) {
        self.entry_count.fetch_sub(1, Ordering::Relaxed);
        self.size_bytes.fetch_sub(size, Ordering::Relaxed);
    }
}

struct CacheInner {
    entries: RwLock<HashMap<String, StoredArtifact>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    stats: ArtifactCacheStats,
}

impl CacheInner {
    async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, artifact| {
            if artifact.is_expired(now, self.ttl) {
                self.stats.record_removal(artifact.data.len() as u64);
                false
            } else {
                true
            }
        });
        let removed = before - entries.len();
        if removed > 0 {
            self.stats.swept.fetch_add(removed as u64, Ordering::Relaxed);
        }
        removed
    }
}

struct Sweeper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// In-memory TTL cache for rendered images.
pub struct ArtifactCache {
    inner: Arc<CacheInner>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl std::fmt::Debug for ArtifactCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("ttl", &self.inner.ttl)
            .field("entries", &self.inner.stats.entry_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl ArtifactCache {
    /// Create a cache using the system clock, without a sweeper.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`, without a sweeper.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                ttl,
                clock,
                stats: ArtifactCacheStats::default(),
            }),
            sweeper: Mutex::new(None),
        }
    }

    /// Create a cache from `config`, starting the sweeper if one is
    /// configured. Must be called inside a Tokio runtime when sweeping.
    pub fn from_config(config: &ArtifactCacheConfig) -> Self {
        let cache = Self::new(config.ttl);
        if let Some(interval) = config.sweep_interval {
            cache.start_sweeper(interval);
        }
        info!(
            ttl_secs = config.ttl.as_secs(),
            sweep_interval_secs = ?config.sweep_interval.map(|d| d.as_secs()),
            "ArtifactCache initialized"
        );
        cache
    }

    /// Spawn the background sweeper, replacing any running one.
    pub fn start_sweeper(&self, interval: Duration) {
        let token = CancellationToken::new();
        let inner = Arc::clone(&self.inner);
        let child = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = inner.sweep().await;
                        if removed > 0 {
                            debug!(removed, "Swept expired artifacts");
                        }
                    }
                }
            }
        });

        let previous = self
            .lock_sweeper()
            .replace(Sweeper { token, handle });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
    }

    fn lock_sweeper(&self) -> std::sync::MutexGuard<'_, Option<Sweeper>> {
        self.sweeper.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Store `data` under a fresh random key and return the key.
    pub async fn put(&self, data: Bytes) -> String {
        let size = data.len() as u64;
        let created_at = self.inner.clock.now();
        let mut entries = self.inner.entries.write().await;

        let key = loop {
            let candidate = Uuid::new_v4().to_string();
            if let Entry::Vacant(slot) = entries.entry(candidate.clone()) {
                slot.insert(StoredArtifact { data, created_at });
                break candidate;
            }
        };

        let stats = &self.inner.stats;
        stats.inserts.fetch_add(1, Ordering::Relaxed);
        stats.entry_count.fetch_add(1, Ordering::Relaxed);
        stats.size_bytes.fetch_add(size, Ordering::Relaxed);
        debug!(key = %key, bytes = size, "Stored artifact");
        key
    }

    /// Fetch the artifact stored under `key` if it has not expired.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let now = self.inner.clock.now();
        let stats = &self.inner.stats;

        {
            let entries = self.inner.entries.read().await;
            match entries.get(key) {
                None => {
                    stats.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
                Some(artifact) if !artifact.is_expired(now, self.inner.ttl) => {
                    stats.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(artifact.data.clone());
                }
                Some(_) => {}
            }
        }

        // Expired: upgrade to a write lock and drop it, unless a sweep got
        // there first.
        let mut entries = self.inner.entries.write().await;
        if let Entry::Occupied(slot) = entries.entry(key.to_string()) {
            if slot.get().is_expired(now, self.inner.ttl) {
                let removed = slot.remove();
                stats.record_removal(removed.data.len() as u64);
                stats.expired.fetch_add(1, Ordering::Relaxed);
            }
        }
        stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Remove every expired entry now. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        self.inner.sweep().await
    }

    /// Number of entries currently held, including expired ones not yet
    /// swept.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    pub fn stats(&self) -> &ArtifactCacheStats {
        &self.inner.stats
    }

    /// Stop the sweeper and drop every entry.
    ///
    /// Idempotent. The cache stays usable afterwards, without sweeping.
    pub async fn close(&self) {
        let sweeper = self.lock_sweeper().take();
        if let Some(sweeper) = sweeper {
            sweeper.token.cancel();
            if let Err(e) = sweeper.handle.await {
                warn!(error = %e, "Artifact sweeper ended abnormally");
            }
        }

        let mut entries = self.inner.entries.write().await;
        let count = entries.len();
        entries.clear();
        self.inner.stats.entry_count.store(0, Ordering::Relaxed);
        self.inner.stats.size_bytes.store(0, Ordering::Relaxed);
        info!(dropped = count, "ArtifactCache closed");
    }
}

impl Drop for ArtifactCache {
    fn drop(&mut self) {
        if let Some(sweeper) = self.lock_sweeper().take() {
            sweeper.token.cancel();
        }
    }
}
