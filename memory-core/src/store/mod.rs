//! Per-session triple store pool (C8).
//!
//! One [`oxigraph::store::Store`] per session, opened lazily and evicted
//! on an LRU + idle-timeout policy. Store handles are cheap to clone
//! (`Arc`-backed internally by oxigraph) so callers hold them across
//! `await` points without re-locking the pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_CLEANUP_INTERVAL_MS, DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_MAX_OPEN_STORES, DEFAULT_STORE_CLOSE_TIMEOUT_MS};
use crate::error::{Error, Result};
use crate::triple_store::load_ontology;

struct StoreEntry {
    store: Arc<Store>,
    last_used: Instant,
    ontology_loaded: bool,
}

/// Point-in-time metadata about one open store, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct StoreMetadata {
    pub idle_for: Duration,
    pub ontology_loaded: bool,
}

/// Pool-wide health snapshot.
#[derive(Debug, Clone, Copy)]
pub struct StoreManagerHealth {
    pub open_count: usize,
    pub max_open: usize,
}

/// Liveness of one session's store (spec §4.7 `health(session_id)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreHealth {
    Healthy,
    Unhealthy(String),
    NotFound,
}

/// Configuration for [`StoreManager::new`].
#[derive(Debug, Clone)]
pub struct StoreManagerConfig {
    pub base_path: PathBuf,
    pub max_open_stores: usize,
    pub idle_timeout: Duration,
    pub cleanup_interval: Duration,
    pub close_timeout: Duration,
}

impl StoreManagerConfig {
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            max_open_stores: DEFAULT_MAX_OPEN_STORES,
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            cleanup_interval: Duration::from_millis(DEFAULT_CLEANUP_INTERVAL_MS),
            close_timeout: Duration::from_millis(DEFAULT_STORE_CLOSE_TIMEOUT_MS),
        }
    }
}

/// Owns every session's long-term store, bounding how many are open at
/// once and closing stores nobody has touched recently.
pub struct StoreManager {
    config: StoreManagerConfig,
    pool: Mutex<LruCache<String, StoreEntry>>,
}

impl StoreManager {
    #[must_use]
    pub fn new(config: StoreManagerConfig) -> Self {
        let capacity = std::num::NonZeroUsize::new(config.max_open_stores.max(1)).expect("max_open_stores > 0");
        Self {
            config,
            pool: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    fn store_path(&self, session_id: &str) -> PathBuf {
        self.config.base_path.join(session_id).join("store.db")
    }

    /// Open (or create) the store for `session_id`, loading the ontology
    /// into it the first time it's opened in this process. If the pool is
    /// already at capacity, evicts the least-recently-used store first.
    pub async fn get_or_create(&self, session_id: &str) -> Result<Arc<Store>> {
        if let Some(store) = self.get(session_id) {
            return Ok(store);
        }

        let path = self.store_path(session_id);
        let session_id_owned = session_id.to_string();
        let (store, needs_ontology) = tokio::task::spawn_blocking(move || -> Result<(Store, bool)> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let is_new = !path.exists();
            let store = Store::open(&path)
                .map_err(|e| Error::StoreUnavailable(format!("failed to open store for {session_id_owned}: {e}")))?;
            Ok((store, is_new))
        })
        .await
        .map_err(|e| Error::AdapterInternal(format!("store open task panicked: {e}")))??;

        let store = Arc::new(store);
        if needs_ontology {
            let store_for_load = Arc::clone(&store);
            tokio::task::spawn_blocking(move || load_ontology(&store_for_load))
                .await
                .map_err(|e| Error::AdapterInternal(format!("ontology load task panicked: {e}")))??;
        }

        let evicted = {
            let mut pool = self.pool.lock();
            let evicted = pool.push(
                session_id.to_string(),
                StoreEntry {
                    store: Arc::clone(&store),
                    last_used: Instant::now(),
                    ontology_loaded: true,
                },
            );
            evicted
        };
        crate::telemetry::telemetry().incr(crate::telemetry::events::STORE_OPENED);
        if let Some((evicted_id, _)) = evicted {
            crate::telemetry::telemetry().incr(crate::telemetry::events::STORE_EVICTED);
            debug!(session_id = %evicted_id, "evicted least-recently-used store to stay within capacity");
        }
        Ok(store)
    }

    /// Return the store for `session_id` if it's already open, without
    /// opening it.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<Arc<Store>> {
        let mut pool = self.pool.lock();
        pool.get_mut(session_id).map(|entry| {
            entry.last_used = Instant::now();
            Arc::clone(&entry.store)
        })
    }

    /// Close one session's store, if open.
    pub fn close(&self, session_id: &str) -> Result<()> {
        if self.pool.lock().pop(session_id).is_some() {
            crate::telemetry::telemetry().incr(crate::telemetry::events::STORE_CLOSED);
        }
        Ok(())
    }

    /// Close every open store, with bounded parallelism and a per-store
    /// timeout. Used on graceful shutdown.
    pub async fn close_all(&self) -> Result<()> {
        let entries: Vec<(String, Arc<Store>)> = {
            let mut pool = self.pool.lock();
            let ids: Vec<String> = pool.iter().map(|(id, _)| id.clone()).collect();
            ids.into_iter()
                .filter_map(|id| pool.pop(&id).map(|entry| (id, entry.store)))
                .collect()
        };
        let close_timeout = self.config.close_timeout;
        let tasks = entries.into_iter().map(|(id, store)| async move {
            let result = tokio::time::timeout(
                close_timeout,
                tokio::task::spawn_blocking(move || drop(store)),
            )
            .await;
            (id, result.is_ok())
        });
        let results = futures::future::join_all(tasks).await;
        for (id, ok) in results {
            if ok {
                crate::telemetry::telemetry().incr(crate::telemetry::events::STORE_CLOSED);
            } else {
                warn!(session_id = %id, "store close timed out");
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn list_open(&self) -> Vec<String> {
        self.pool.lock().iter().map(|(id, _)| id.clone()).collect()
    }

    #[must_use]
    pub fn get_metadata(&self, session_id: &str) -> Option<StoreMetadata> {
        self.pool.lock().peek(session_id).map(|entry| StoreMetadata {
            idle_for: entry.last_used.elapsed(),
            ontology_loaded: entry.ontology_loaded,
        })
    }

    #[must_use]
    pub fn health(&self) -> StoreManagerHealth {
        StoreManagerHealth {
            open_count: self.pool.lock().len(),
            max_open: self.config.max_open_stores,
        }
    }

    /// Whether `session_id`'s store is currently open, without affecting
    /// its position in the LRU.
    #[must_use]
    pub fn open(&self, session_id: &str) -> bool {
        self.pool.lock().contains(session_id)
    }

    /// Liveness check for one session's store: an `ASK` query that touches
    /// the store without reading any data out of it. Returns
    /// [`SessionStoreHealth::NotFound`] if the store isn't currently open
    /// (callers that want to force it open should call
    /// [`Self::get_or_create`] first).
    #[must_use]
    pub fn session_health(&self, session_id: &str) -> SessionStoreHealth {
        let Some(store) = self.get(session_id) else {
            return SessionStoreHealth::NotFound;
        };
        match store.query("ASK { ?s ?p ?o }") {
            Ok(QueryResults::Boolean(_)) => SessionStoreHealth::Healthy,
            Ok(_) => SessionStoreHealth::Unhealthy("unexpected ASK query result shape".into()),
            Err(error) => SessionStoreHealth::Unhealthy(error.to_string()),
        }
    }

    /// Close every store that's been idle longer than the configured idle
    /// timeout. Returns how many were closed.
    pub fn run_cleanup_tick(&self) -> usize {
        let idle_timeout = self.config.idle_timeout;
        let expired: Vec<String> = {
            let pool = self.pool.lock();
            pool.iter()
                .filter(|(_, entry)| entry.last_used.elapsed() >= idle_timeout)
                .map(|(id, _)| id.clone())
                .collect()
        };
        let mut pool = self.pool.lock();
        for id in &expired {
            pool.pop(id);
        }
        if !expired.is_empty() {
            crate::telemetry::telemetry().incr_by(crate::telemetry::events::STORE_IDLE_CLEANED, expired.len() as u64);
        }
        expired.len()
    }

    /// Spawn a background task that calls [`Self::run_cleanup_tick`] on the
    /// configured interval, for as long as `self` is alive.
    pub fn spawn_cleanup_loop(self: Arc<Self>) -> JoinHandle<()> {
        let interval = self.config.cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let closed = self.run_cleanup_tick();
                if closed > 0 {
                    debug!(closed, "idle store cleanup closed stores");
                }
            }
        })
    }
}
