// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Per-bearer-token session manager (spec.md §4.1).
//!
//! Owns every [`PlatformClient`] the process holds. Sessions are created
//! lazily on first acquisition, ref-counted while in flight, quarantined on
//! failure, and evicted by a background sweep once idle past `idle_ttl`.
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use tgmcp_config::SessionConfig;

use crate::error::CoreError;
use crate::platform::PlatformClient;

/// Builds a fresh, authenticated [`PlatformClient`] for a given bearer token.
///
/// This is the seam a concrete platform adapter crate (e.g.
/// `tgmcp-platform-teloxide`) plugs into; `SessionManager` only knows how to
/// call it, never how a client is actually constructed.
#[async_trait]
pub trait PlatformClientFactory: Send + Sync {
    async fn connect(&self, token: &str) -> Result<Arc<dyn PlatformClient>, CoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Healthy,
    Failed,
}

struct SessionEntry {
    client: Arc<dyn PlatformClient>,
    last_used: StdMutex<Instant>,
    ref_count: AtomicI64,
    state: StdMutex<SessionState>,
}

impl SessionEntry {
    fn touch(&self) {
        *self.last_used.lock().unwrap() = Instant::now();
    }

    fn idle_for(&self) -> std::time::Duration {
        self.last_used.lock().unwrap().elapsed()
    }
}

/// A handle to an acquired session. Holds the entry directly (not a token
/// lookup) so ref-counting stays correct even if the map entry for this
/// token is later replaced (e.g. after quarantine).
///
/// `ref_count` is decremented on [`Drop`] rather than requiring an explicit
/// `release()` call — this satisfies spec.md §5's "ref_count must be
/// decremented on every exit path (normal, error, cancel)" for free: a
/// cancelled `tokio::select!` branch drops its held futures (and any
/// `SessionHandle`s they own) exactly as on a normal return.
pub struct SessionHandle {
    token: String,
    entry: Arc<SessionEntry>,
}

impl SessionHandle {
    pub fn client(&self) -> &Arc<dyn PlatformClient> {
        &self.entry.client
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Mark this session Failed; the cleaner tears it down once every
    /// outstanding handle (including this one) has been dropped.
    pub fn mark_failed(&self) {
        *self.entry.state.lock().unwrap() = SessionState::Failed;
        warn!(token = %redact(&self.token), "session marked failed");
    }

    /// Explicit release, equivalent to `drop(handle)` — kept for call sites
    /// that want the spec.md §4.1 method name in their control flow.
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.entry.ref_count.fetch_sub(1, Ordering::SeqCst);
    }
}

fn redact(token: &str) -> String {
    if token.len() <= 4 {
        "***".to_string()
    } else {
        format!("{}…", &token[..4])
    }
}

/// The process-wide `token -> Session` cache (spec.md §4.1).
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    factory: Arc<dyn PlatformClientFactory>,
    config: SessionConfig,
    sessions: StdMutex<HashMap<String, Arc<SessionEntry>>>,
    token_locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn PlatformClientFactory>, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                factory,
                config,
                sessions: StdMutex::new(HashMap::new()),
                token_locks: StdMutex::new(HashMap::new()),
            }),
        }
    }

    fn token_lock(&self, token: &str) -> Arc<AsyncMutex<()>> {
        self.inner
            .token_locks
            .lock()
            .unwrap()
            .entry(token.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Returns a healthy session for `token`, creating one on demand
    /// (spec.md §4.1 algorithm).
    pub async fn acquire(&self, token: &str) -> Result<SessionHandle, CoreError> {
        if token.is_empty() {
            return Err(CoreError::Validation("bearer token must not be empty".into()));
        }

        // Fast path: existing healthy entry.
        {
            let sessions = self.inner.sessions.lock().unwrap();
            if let Some(entry) = sessions.get(token) {
                if *entry.state.lock().unwrap() == SessionState::Healthy {
                    entry.ref_count.fetch_add(1, Ordering::SeqCst);
                    entry.touch();
                    return Ok(SessionHandle {
                        token: token.to_string(),
                        entry: entry.clone(),
                    });
                }
            }
        }

        // Slow path: at most one concurrent connect per token.
        let lock = self.token_lock(token);
        let _guard = lock.lock().await;

        // Re-check: another waiter on this lock may have just inserted.
        {
            let sessions = self.inner.sessions.lock().unwrap();
            if let Some(entry) = sessions.get(token) {
                if *entry.state.lock().unwrap() == SessionState::Healthy {
                    entry.ref_count.fetch_add(1, Ordering::SeqCst);
                    entry.touch();
                    return Ok(SessionHandle {
                        token: token.to_string(),
                        entry: entry.clone(),
                    });
                }
                // Failed and still referenced elsewhere: leave it for the
                // cleaner, fall through and build a fresh entry below.
                if entry.ref_count.load(Ordering::SeqCst) == 0 {
                    drop(sessions);
                    self.inner.sessions.lock().unwrap().remove(token);
                }
            }
        }

        let client = tokio::time::timeout(self.inner.config.connect_timeout, self.inner.factory.connect(token))
            .await
            .map_err(|_| CoreError::Unavailable("timed out connecting session".into()))??;

        if !client.is_authorized().await? {
            return Err(CoreError::Unauthorized("session is not authorized".into()));
        }

        let entry = Arc::new(SessionEntry {
            client,
            last_used: StdMutex::new(Instant::now()),
            ref_count: AtomicI64::new(1),
            state: StdMutex::new(SessionState::Healthy),
        });
        self.inner
            .sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), entry.clone());
        debug!(token = %redact(token), "created new session");

        Ok(SessionHandle {
            token: token.to_string(),
            entry,
        })
    }

    /// One sweep of the background cleaner (spec.md §4.1's "Algorithm —
    /// background cleaner"). Disconnects are best-effort: a failure is
    /// logged and does not abort the sweep.
    pub async fn cleanup_sweep(&self) {
        let idle_ttl = self.inner.config.idle_ttl;
        let condemned: Vec<(String, Arc<SessionEntry>)> = {
            let sessions = self.inner.sessions.lock().unwrap();
            sessions
                .iter()
                .filter(|(_, e)| {
                    let ref_count = e.ref_count.load(Ordering::SeqCst);
                    let state = *e.state.lock().unwrap();
                    (state == SessionState::Failed && ref_count == 0)
                        || (state == SessionState::Healthy && ref_count == 0 && e.idle_for() > idle_ttl)
                })
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };

        for (token, entry) in condemned {
            self.inner.sessions.lock().unwrap().remove(&token);
            if let Err(e) = entry.client.disconnect().await {
                warn!(token = %redact(&token), error = %e, "best-effort disconnect failed during cleanup sweep");
            }
            debug!(token = %redact(&token), "evicted session");
        }
    }

    /// Spawns the cleaner as a background task, sweeping every
    /// `cleanup_interval`. Cancel via `JoinHandle::abort()` at shutdown.
    pub fn spawn_cleaner(&self) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        let interval = self.inner.config.cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                ticker.tick().await;
                manager.cleanup_sweep().await;
            }
        })
    }

    /// Synchronous teardown of every session, used at process shutdown.
    pub async fn cleanup(&self) {
        let entries: Vec<(String, Arc<SessionEntry>)> = {
            let mut sessions = self.inner.sessions.lock().unwrap();
            sessions.drain().collect()
        };
        for (token, entry) in entries {
            if let Err(e) = entry.client.disconnect().await {
                warn!(token = %redact(&token), error = %e, "best-effort disconnect failed during shutdown");
            }
        }
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.inner.sessions.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatformClient;
    use std::sync::atomic::AtomicUsize;

    struct CountingFactory {
        calls: AtomicUsize,
        unauthorized: bool,
    }

    #[async_trait]
    impl PlatformClientFactory for CountingFactory {
        async fn connect(&self, _token: &str) -> Result<Arc<dyn PlatformClient>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let client = if self.unauthorized {
                MockPlatformClient::unauthorized()
            } else {
                MockPlatformClient::new()
            };
            Ok(Arc::new(client))
        }
    }

    fn manager(unauthorized: bool) -> (SessionManager, Arc<CountingFactory>) {
        let factory = Arc::new(CountingFactory {
            calls: AtomicUsize::new(0),
            unauthorized,
        });
        let config = SessionConfig {
            idle_ttl: std::time::Duration::from_millis(20),
            cleanup_interval: std::time::Duration::from_millis(10),
            connect_timeout: std::time::Duration::from_secs(5),
        };
        (SessionManager::new(factory.clone(), config), factory)
    }

    #[tokio::test]
    async fn acquire_creates_session_on_first_call() {
        let (mgr, factory) = manager(false);
        let h = mgr.acquire("tok").await.unwrap();
        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
        assert_eq!(mgr.session_count(), 1);
        drop(h);
    }

    #[tokio::test]
    async fn acquire_reuses_existing_session_for_same_token() {
        let (mgr, factory) = manager(false);
        let h1 = mgr.acquire("tok").await.unwrap();
        let h2 = mgr.acquire("tok").await.unwrap();
        assert_eq!(factory.calls.load(Ordering::SeqCst), 1, "only one connect for the same token");
        drop(h1);
        drop(h2);
    }

    #[tokio::test]
    async fn acquire_rejects_empty_token() {
        let (mgr, _factory) = manager(false);
        let err = mgr.acquire("").await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn acquire_surfaces_unauthorized_and_does_not_insert_entry() {
        let (mgr, _factory) = manager(true);
        let err = mgr.acquire("tok").await.unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
        assert_eq!(mgr.session_count(), 0, "failed auth must not poison the map");
    }

    #[tokio::test]
    async fn ref_count_decrements_on_drop() {
        let (mgr, _factory) = manager(false);
        let h = mgr.acquire("tok").await.unwrap();
        let count_while_held = {
            let sessions = mgr.inner.sessions.lock().unwrap();
            sessions.get("tok").unwrap().ref_count.load(Ordering::SeqCst)
        };
        assert_eq!(count_while_held, 1);
        drop(h);
        let count_after_drop = {
            let sessions = mgr.inner.sessions.lock().unwrap();
            sessions.get("tok").unwrap().ref_count.load(Ordering::SeqCst)
        };
        assert_eq!(count_after_drop, 0);
    }

    #[tokio::test]
    async fn concurrent_acquire_for_same_token_creates_exactly_one_session() {
        let (mgr, factory) = manager(false);
        let (a, b) = tokio::join!(mgr.acquire("tok"), mgr.acquire("tok"));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(factory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cleanup_sweep_evicts_idle_sessions_with_zero_ref_count() {
        let (mgr, _factory) = manager(false);
        let h = mgr.acquire("tok").await.unwrap();
        drop(h);
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        mgr.cleanup_sweep().await;
        assert_eq!(mgr.session_count(), 0);
    }

    #[tokio::test]
    async fn cleanup_sweep_keeps_sessions_still_in_use() {
        let (mgr, _factory) = manager(false);
        let h = mgr.acquire("tok").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        mgr.cleanup_sweep().await;
        assert_eq!(mgr.session_count(), 1, "held session must survive the sweep");
        drop(h);
    }

    #[tokio::test]
    async fn mark_failed_quarantines_session_for_next_sweep() {
        let (mgr, _factory) = manager(false);
        let h = mgr.acquire("tok").await.unwrap();
        h.mark_failed();
        drop(h);
        mgr.cleanup_sweep().await;
        assert_eq!(mgr.session_count(), 0);
    }

    #[tokio::test]
    async fn cleanup_tears_down_all_sessions_regardless_of_ref_count() {
        let (mgr, _factory) = manager(false);
        let h = mgr.acquire("tok").await.unwrap();
        mgr.cleanup().await;
        assert_eq!(mgr.session_count(), 0);
        drop(h);
    }
}
