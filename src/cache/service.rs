//! Cache Service Module
//!
//! Best-effort key/value cache that prefers a remote store and falls back to
//! the local store when the remote one is unreachable or misbehaves.
//!
//! Nothing here returns an error to the caller. Backend failures are logged,
//! counted, and turned into a miss (reads) or a dropped write.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStats, GlobPattern, LocalStore, RemoteStore};
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, CacheResult};

// == Cache Mode ==
/// Which store is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Not yet connected, or explicitly disconnected; the local store serves
    Disconnected,
    /// Remote store connected and serving
    ConnectedRemote,
    /// Remote store failed; the local store serves until the process ends
    LocalFallback,
}

/// Tunables for [`CacheService`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// TTL in seconds for writes that do not pass one
    pub default_ttl: u64,
    /// Upper bound for any single remote store call
    pub remote_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            remote_timeout: Duration::from_secs(2),
        }
    }
}

// == Cache Service ==
pub struct CacheService {
    settings: CacheSettings,
    remote: Option<Arc<dyn RemoteStore>>,
    mode: RwLock<CacheMode>,
    local: RwLock<LocalStore>,
    stats: Mutex<CacheStats>,
    clock: Arc<dyn Clock>,
}

impl CacheService {
    // == Constructor ==
    /// Creates a disconnected service. Call [`connect`](Self::connect) during startup.
    ///
    /// With `remote = None` the service runs on the local store only.
    pub fn new(settings: CacheSettings, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self {
            settings,
            remote,
            mode: RwLock::new(CacheMode::Disconnected),
            local: RwLock::new(LocalStore::new()),
            stats: Mutex::new(CacheStats::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for local expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub async fn mode(&self) -> CacheMode {
        *self.mode.read().await
    }

    // == Lifecycle ==
    /// Connects to the remote store.
    ///
    /// Only acts from `Disconnected`: success moves to `ConnectedRemote`, any
    /// failure (or no remote store configured) moves to `LocalFallback`.
    /// The mode lock is not held while the remote store answers.
    /// Returns the resulting mode.
    pub async fn connect(&self) -> CacheMode {
        let current = self.mode().await;
        if current != CacheMode::Disconnected {
            return current;
        }

        let target = match &self.remote {
            None => {
                info!("No remote cache store configured, using in-memory cache");
                CacheMode::LocalFallback
            }
            Some(remote) => match self.bounded(remote.connect()).await {
                Ok(()) => {
                    info!("Remote cache store connected");
                    CacheMode::ConnectedRemote
                }
                Err(e) => {
                    self.stats.lock().await.record_error();
                    warn!(
                        error = %e,
                        "Failed to connect to remote cache store, using in-memory cache as fallback"
                    );
                    CacheMode::LocalFallback
                }
            },
        };

        let mut mode = self.mode.write().await;
        // A concurrent connect may have settled the mode first
        if *mode == CacheMode::Disconnected {
            self.switch_mode(&mut mode, target).await;
        }
        *mode
    }

    /// Closes the remote connection and returns to `Disconnected`.
    pub async fn disconnect(&self) {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.disconnect().await {
                error!(error = %e, "Cache disconnect error");
            }
        }
        let mut mode = self.mode.write().await;
        self.switch_mode(&mut mode, CacheMode::Disconnected).await;
        info!("Cache service disconnected");
    }

    // == Get ==
    /// Reads and decodes `key`. Absent, expired, undecodable, and failed reads
    /// all come back as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.active_remote().await {
            Some(remote) => self.remote_call("get", key, remote.get(key)).await.flatten(),
            None => self.local.write().await.get(key, self.clock.now_ms()),
        };

        let value = match raw.map(|raw| serde_json::from_str::<T>(&raw)) {
            Some(Ok(value)) => Some(value),
            Some(Err(e)) => {
                self.report("get", key, &e.into()).await;
                None
            }
            None => None,
        };

        let mut stats = self.stats.lock().await;
        if value.is_some() {
            stats.record_hit();
        } else {
            stats.record_miss();
        }
        value
    }

    // == Set ==
    /// Encodes and stores `value` for `ttl` seconds (default TTL when `None`).
    ///
    /// A zero TTL stores nothing and removes any previous value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) {
        let ttl = ttl.unwrap_or(self.settings.default_ttl);
        if ttl == 0 {
            self.delete(key).await;
            return;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.report("set", key, &e.into()).await;
                return;
            }
        };

        match self.active_remote().await {
            Some(remote) => {
                self.remote_call("set", key, remote.set_ex(key, &raw, ttl))
                    .await;
            }
            None => {
                self.local
                    .write()
                    .await
                    .set(key.to_string(), raw, ttl, self.clock.now_ms());
            }
        }
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) {
        match self.active_remote().await {
            Some(remote) => {
                self.remote_call("delete", key, remote.del(vec![key.to_string()]))
                    .await;
            }
            None => {
                self.local.write().await.delete(key);
            }
        }
    }

    // == Clear ==
    /// Removes every entry from the authoritative store.
    pub async fn clear(&self) {
        match self.active_remote().await {
            Some(remote) => {
                self.remote_call("clear", "*", remote.flush_all()).await;
            }
            None => self.local.write().await.clear(),
        }
    }

    // == Invalidate By Pattern ==
    /// Deletes every key matching the glob `pattern`. Returns how many were removed.
    ///
    /// A pattern too large to compile removes nothing.
    pub async fn invalidate_by_pattern(&self, pattern: &str) -> usize {
        let glob = match GlobPattern::new(pattern) {
            Ok(glob) => glob,
            Err(e) => {
                let shown: String = pattern.chars().take(64).collect();
                self.report("invalidate", &shown, &e.into()).await;
                return 0;
            }
        };

        match self.active_remote().await {
            Some(remote) => {
                let removed = self
                    .remote_call("invalidate", pattern, async {
                        let keys = remote.keys(pattern).await?;
                        let count = keys.len();
                        remote.del(keys).await?;
                        Ok::<_, CacheError>(count)
                    })
                    .await
                    .unwrap_or(0);
                debug!(pattern, removed, "Invalidated remote cache keys");
                removed
            }
            None => {
                let removed = self.local.write().await.delete_matching(&glob);
                debug!(pattern, removed, "Invalidated local cache keys");
                removed
            }
        }
    }

    // == Sweep ==
    /// Drops expired local entries. Returns the number removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        self.local.write().await.cleanup_expired(now)
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().await.clone();
        stats.local_entries = self.local.read().await.len();
        stats.mode = self.mode().await;
        stats
    }

    // == Internals ==
    async fn active_remote(&self) -> Option<Arc<dyn RemoteStore>> {
        if *self.mode.read().await == CacheMode::ConnectedRemote {
            self.remote.clone()
        } else {
            None
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = CacheResult<T>>) -> CacheResult<T> {
        tokio::time::timeout(self.settings.remote_timeout, fut)
            .await
            .unwrap_or(Err(CacheError::Timeout(self.settings.remote_timeout)))
    }

    /// Runs a remote call under the timeout; on failure logs it and falls back.
    async fn remote_call<T>(
        &self,
        operation: &'static str,
        key: &str,
        fut: impl Future<Output = CacheResult<T>>,
    ) -> Option<T> {
        match self.bounded(fut).await {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(operation, key, &e).await;
                self.fall_back().await;
                None
            }
        }
    }

    async fn report(&self, operation: &'static str, key: &str, err: &CacheError) {
        error!(operation, key, error = %err, "Cache {} error", operation);
        self.stats.lock().await.record_error();
    }

    async fn fall_back(&self) {
        let mut mode = self.mode.write().await;
        if *mode == CacheMode::ConnectedRemote {
            self.switch_mode(&mut mode, CacheMode::LocalFallback).await;
            warn!("Remote cache store unavailable, using in-memory cache as fallback");
        }
    }

    /// Moves to `next`. Values never carry across a mode change, so the
    /// local store is emptied whenever the mode actually changes.
    async fn switch_mode(&self, mode: &mut CacheMode, next: CacheMode) {
        if *mode != next {
            *mode = next;
            self.local.write().await.clear();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use serde::Deserialize;

    use super::*;
    use crate::clock::ManualClock;

    /// Remote store double with switchable failures.
    #[derive(Default)]
    struct FakeRemote {
        data: parking_lot::Mutex<HashMap<String, (String, u64)>>,
        fail_connect: AtomicBool,
        fail_writes: AtomicBool,
        hang: AtomicBool,
    }

    impl FakeRemote {
        fn check(&self) -> CacheResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(CacheError::NotConnected)
            } else {
                Ok(())
            }
        }

        fn ttl_of(&self, key: &str) -> Option<u64> {
            self.data.lock().get(key).map(|(_, ttl)| *ttl)
        }
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        async fn connect(&self) -> CacheResult<()> {
            if self.hang.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.fail_connect.load(Ordering::SeqCst) {
                return Err(CacheError::NotConnected);
            }
            Ok(())
        }

        async fn disconnect(&self) -> CacheResult<()> {
            Ok(())
        }

        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            if self.hang.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(self.data.lock().get(key).map(|(value, _)| value.clone()))
        }

        async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
            self.check()?;
            self.data
                .lock()
                .insert(key.to_string(), (value.to_string(), ttl_secs));
            Ok(())
        }

        async fn del(&self, keys: Vec<String>) -> CacheResult<()> {
            self.check()?;
            let mut data = self.data.lock();
            for key in keys {
                data.remove(&key);
            }
            Ok(())
        }

        async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
            let glob = GlobPattern::new(pattern).unwrap();
            Ok(self
                .data
                .lock()
                .keys()
                .filter(|key| glob.matches(key))
                .cloned()
                .collect())
        }

        async fn flush_all(&self) -> CacheResult<()> {
            self.check()?;
            self.data.lock().clear();
            Ok(())
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Listing {
        id: u32,
        title: String,
    }

    fn listing() -> Listing {
        Listing {
            id: 7,
            title: "Harbour loft".to_string(),
        }
    }

    async fn remote_service() -> (CacheService, Arc<FakeRemote>) {
        let remote = Arc::new(FakeRemote::default());
        let service = CacheService::new(CacheSettings::default(), Some(remote.clone()));
        assert_eq!(service.connect().await, CacheMode::ConnectedRemote);
        (service, remote)
    }

    async fn local_service(clock: Arc<ManualClock>) -> CacheService {
        let service = CacheService::new(CacheSettings::default(), None).with_clock(clock);
        assert_eq!(service.connect().await, CacheMode::LocalFallback);
        service
    }

    #[tokio::test]
    async fn test_set_get_in_remote_mode() {
        let (service, remote) = remote_service().await;

        service.set("property:7", &listing(), None).await;

        assert_eq!(service.get::<Listing>("property:7").await, Some(listing()));
        assert_eq!(remote.ttl_of("property:7"), Some(300));
        assert_eq!(service.stats().await.local_entries, 0);
    }

    #[tokio::test]
    async fn test_set_get_in_local_mode() {
        let service = local_service(Arc::new(ManualClock::default())).await;

        service.set("property:7", &listing(), Some(60)).await;

        assert_eq!(service.get::<Listing>("property:7").await, Some(listing()));
    }

    #[tokio::test]
    async fn test_disconnected_service_serves_locally() {
        let service = CacheService::new(CacheSettings::default(), None);

        service.set("k", &1u32, None).await;

        assert_eq!(service.mode().await, CacheMode::Disconnected);
        assert_eq!(service.get::<u32>("k").await, Some(1));
    }

    #[tokio::test]
    async fn test_local_expiry_follows_clock() {
        let clock = Arc::new(ManualClock::default());
        let service = local_service(clock.clone()).await;

        service.set("k", "v", Some(1)).await;

        clock.advance(ChronoDuration::milliseconds(500));
        assert_eq!(service.get::<String>("k").await.as_deref(), Some("v"));

        clock.advance(ChronoDuration::milliseconds(1000));
        assert_eq!(service.get::<String>("k").await, None);
    }

    #[tokio::test]
    async fn test_invalidate_by_pattern_local() {
        let service = local_service(Arc::new(ManualClock::default())).await;
        service.set("property:1", &1, None).await;
        service.set("property:2", &2, None).await;
        service.set("user:1", &3, None).await;

        let removed = service.invalidate_by_pattern("property:*").await;

        assert_eq!(removed, 2);
        assert_eq!(service.get::<i32>("property:1").await, None);
        assert_eq!(service.get::<i32>("property:2").await, None);
        assert_eq!(service.get::<i32>("user:1").await, Some(3));
    }

    #[tokio::test]
    async fn test_invalidate_by_pattern_remote() {
        let (service, _remote) = remote_service().await;
        service.set("property:1", &1, None).await;
        service.set("property:2", &2, None).await;
        service.set("user:1", &3, None).await;

        let removed = service.invalidate_by_pattern("property:*").await;

        assert_eq!(removed, 2);
        assert_eq!(service.get::<i32>("user:1").await, Some(3));
        assert_eq!(service.mode().await, CacheMode::ConnectedRemote);
    }

    #[tokio::test]
    async fn test_failed_remote_write_is_swallowed_and_falls_back() {
        let (service, remote) = remote_service().await;
        remote.fail_writes.store(true, Ordering::SeqCst);

        service.set("property:7", &listing(), None).await;

        assert_eq!(service.mode().await, CacheMode::LocalFallback);
        assert_eq!(service.get::<Listing>("property:7").await, None);
        assert_eq!(service.stats().await.errors, 1);
    }

    #[tokio::test]
    async fn test_fallback_is_terminal() {
        let (service, remote) = remote_service().await;
        remote.fail_writes.store(true, Ordering::SeqCst);
        service.set("a", &1, None).await;

        remote.fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(service.connect().await, CacheMode::LocalFallback);

        service.set("b", &2, None).await;
        assert!(remote.ttl_of("b").is_none());
        assert_eq!(service.get::<i32>("b").await, Some(2));
    }

    #[tokio::test]
    async fn test_failed_connect_falls_back() {
        let remote = Arc::new(FakeRemote::default());
        remote.fail_connect.store(true, Ordering::SeqCst);
        let service = CacheService::new(CacheSettings::default(), Some(remote));

        assert_eq!(service.connect().await, CacheMode::LocalFallback);

        service.set("k", &5, None).await;
        assert_eq!(service.get::<i32>("k").await, Some(5));
    }

    #[tokio::test]
    async fn test_slow_remote_times_out() {
        let remote = Arc::new(FakeRemote::default());
        let settings = CacheSettings {
            default_ttl: 300,
            remote_timeout: Duration::from_millis(20),
        };
        let service = CacheService::new(settings, Some(remote.clone()));
        service.connect().await;
        remote.hang.store(true, Ordering::SeqCst);

        assert_eq!(service.get::<i32>("k").await, None);
        assert_eq!(service.mode().await, CacheMode::LocalFallback);
    }

    #[tokio::test]
    async fn test_values_do_not_migrate_between_stores() {
        let (service, remote) = remote_service().await;
        service.set("k", &1, None).await;

        remote.fail_writes.store(true, Ordering::SeqCst);
        service.delete("other").await;

        assert_eq!(service.mode().await, CacheMode::LocalFallback);
        assert_eq!(service.get::<i32>("k").await, None);
    }

    #[tokio::test]
    async fn test_local_values_do_not_survive_failover() {
        let remote = Arc::new(FakeRemote::default());
        let service = CacheService::new(CacheSettings::default(), Some(remote.clone()));
        service.set("price", &100, None).await;

        assert_eq!(service.connect().await, CacheMode::ConnectedRemote);
        remote.fail_writes.store(true, Ordering::SeqCst);
        service.set("price", &200, None).await;

        assert_eq!(service.mode().await, CacheMode::LocalFallback);
        assert_eq!(service.get::<i32>("price").await, None);
    }

    #[tokio::test]
    async fn test_mode_changes_empty_the_local_store() {
        let remote = Arc::new(FakeRemote::default());
        remote.fail_connect.store(true, Ordering::SeqCst);
        let service = CacheService::new(CacheSettings::default(), Some(remote));

        service.set("written_disconnected", &1, None).await;
        assert_eq!(service.connect().await, CacheMode::LocalFallback);
        assert_eq!(service.get::<i32>("written_disconnected").await, None);

        service.set("written_in_fallback", &2, None).await;
        service.disconnect().await;
        assert_eq!(service.get::<i32>("written_in_fallback").await, None);
    }

    #[tokio::test]
    async fn test_connect_does_not_block_reads() {
        let remote = Arc::new(FakeRemote::default());
        remote.hang.store(true, Ordering::SeqCst);
        let settings = CacheSettings {
            default_ttl: 300,
            remote_timeout: Duration::from_millis(300),
        };
        let service = Arc::new(CacheService::new(settings, Some(remote)));

        let connecting = tokio::spawn({
            let service = service.clone();
            async move { service.connect().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let read = tokio::time::timeout(Duration::from_millis(100), service.get::<i32>("k")).await;
        assert_eq!(read.ok(), Some(None));
        assert_eq!(connecting.await.unwrap(), CacheMode::LocalFallback);
    }

    #[tokio::test]
    async fn test_oversized_pattern_invalidates_nothing() {
        let service = local_service(Arc::new(ManualClock::default())).await;
        service.set("property:1", &1, None).await;

        let removed = service.invalidate_by_pattern(&"*a".repeat(500_000)).await;

        assert_eq!(removed, 0);
        assert_eq!(service.get::<i32>("property:1").await, Some(1));
        assert_eq!(service.stats().await.errors, 1);
    }

    #[tokio::test]
    async fn test_type_mismatch_reads_as_absent() {
        let service = local_service(Arc::new(ManualClock::default())).await;
        service.set("k", "not a listing", None).await;

        assert_eq!(service.get::<Listing>("k").await, None);
        assert_eq!(service.stats().await.errors, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_removes_value() {
        let (service, remote) = remote_service().await;
        service.set("k", &1, None).await;

        service.set("k", &2, Some(0)).await;

        assert!(remote.ttl_of("k").is_none());
        assert_eq!(service.mode().await, CacheMode::ConnectedRemote);
    }

    #[tokio::test]
    async fn test_clear_and_delete() {
        let service = local_service(Arc::new(ManualClock::default())).await;
        service.set("a", &1, None).await;
        service.set("b", &2, None).await;

        service.delete("a").await;
        assert_eq!(service.get::<i32>("a").await, None);

        service.clear().await;
        assert_eq!(service.stats().await.local_entries, 0);
    }

    #[tokio::test]
    async fn test_clear_remote() {
        let (service, remote) = remote_service().await;
        service.set("a", &1, None).await;

        service.clear().await;

        assert!(remote.data.lock().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let clock = Arc::new(ManualClock::default());
        let service = local_service(clock.clone()).await;
        service.set("short", &1, Some(1)).await;
        service.set("long", &2, Some(60)).await;

        clock.advance(ChronoDuration::seconds(2));

        assert_eq!(service.sweep_expired().await, 1);
        assert_eq!(service.stats().await.local_entries, 1);
    }

    #[tokio::test]
    async fn test_disconnect_returns_to_disconnected() {
        let (service, _remote) = remote_service().await;

        service.disconnect().await;

        assert_eq!(service.mode().await, CacheMode::Disconnected);
        assert_eq!(service.connect().await, CacheMode::ConnectedRemote);
    }

    #[tokio::test]
    async fn test_stats_count_hits_and_misses() {
        let service = local_service(Arc::new(ManualClock::default())).await;
        service.set("a", &1, None).await;

        service.get::<i32>("a").await;
        service.get::<i32>("missing").await;

        let stats = service.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.mode, CacheMode::LocalFallback);
    }
}
