//! Connection pools shared by every request issued through one client.
//!
//! Blocking and async execution run on different schedulers, so each mode
//! gets its own keep-alive pool. Both are created lazily on first use and
//! torn down together by [`ConnectionPool::close`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::client::ClientConfig;
use crate::{Error, Result};

pub(crate) struct ConnectionPool {
    config: ClientConfig,
    closed: AtomicBool,
    blocking: Mutex<Option<reqwest::blocking::Client>>,
    non_blocking: Mutex<Option<reqwest::Client>>,
}

impl ConnectionPool {
    pub(crate) fn new(config: ClientConfig) -> Self {
        Self {
            config,
            closed: AtomicBool::new(false),
            blocking: Mutex::new(None),
            non_blocking: Mutex::new(None),
        }
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Handle to the blocking pool, creating it on first use.
    ///
    /// Refused on an async runtime thread: the blocking client drives its own
    /// runtime, which tokio does not allow to be created or dropped there.
    pub(crate) fn blocking(&self) -> Result<reqwest::blocking::Client> {
        let mut slot = lock(&self.blocking);
        // Checked under the slot lock so a concurrent close cannot be undone.
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Config(
                "blocking call made inside an async runtime; use the async API there".into(),
            ));
        }
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let cfg = &self.config;
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(cfg.user_agent.clone())
            .pool_max_idle_per_host(cfg.pool_max_idle_per_host)
            .pool_idle_timeout(cfg.pool_idle_timeout);
        if let Some(t) = cfg.connect_timeout {
            builder = builder.connect_timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        debug!("created blocking connection pool for {}", cfg.base_url);
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Handle to the async pool, creating it on first use.
    pub(crate) fn non_blocking(&self) -> Result<reqwest::Client> {
        let mut slot = lock(&self.non_blocking);
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let cfg = &self.config;
        let mut builder = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(cfg.user_agent.clone())
            .pool_max_idle_per_host(cfg.pool_max_idle_per_host)
            .pool_idle_timeout(cfg.pool_idle_timeout);
        if let Some(t) = cfg.connect_timeout {
            builder = builder.connect_timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        debug!("created async connection pool for {}", cfg.base_url);
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Releases both pools. Calling it again is a no-op.
    ///
    /// Requests already in flight keep their own handle and finish normally.
    pub(crate) fn close(&self) {
        let mut blocking = lock(&self.blocking);
        let mut non_blocking = lock(&self.non_blocking);
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let released =
            usize::from(blocking.take().is_some()) + usize::from(non_blocking.take().is_some());
        debug!(
            "closed client for {} ({} pool(s) released)",
            self.config.base_url, released
        );
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
