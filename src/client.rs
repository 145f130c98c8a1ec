//! Client session and blocking execution.
//!
//! `ForgeClient` owns the base address, the default timeout and the two
//! connection pools. The blocking entry points live here; their async
//! counterparts are in [`crate::async_api`]. Both share request freezing and
//! response interpretation, only the I/O call differs.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::builder::RenderRequestBuilder;
use crate::pool::ConnectionPool;
use crate::request::{RenderRequest, RenderSource};
use crate::{response, Error, Result};

pub(crate) const RENDER_PATH: &str = "/render";
pub(crate) const HEALTH_PATH: &str = "/health";

/// Default request timeout (120 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for a [`ForgeClient`] and its connection pools
///
/// # Examples
///
/// ```
/// let cfg = forge_sdk::ClientConfig::default();
/// assert_eq!(cfg.timeout.as_secs(), 120);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base address, e.g. `http://localhost:3000`
    pub base_url: String,
    /// Default per-request timeout; a request's own `timeout` option overrides it
    pub timeout: Duration,
    /// Optional TCP connect timeout
    pub connect_timeout: Option<Duration>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Maximum idle keep-alive connections kept per pool
    pub pool_max_idle_per_host: usize,
    /// How long an idle connection is kept before being closed
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
            user_agent: concat!("forge-sdk-rust/", env!("CARGO_PKG_VERSION")).to_string(),
            pool_max_idle_per_host: 8,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Client for a Forge rendering server.
///
/// Cloning is cheap; clones share the same pools and the same closed state.
/// Pools are released when [`close`](Self::close) is called or when the last
/// clone is dropped, whichever comes first.
///
/// ```no_run
/// use forge_sdk::{ForgeClient, OutputFormat};
///
/// # fn main() -> forge_sdk::Result<()> {
/// let client = ForgeClient::new("http://localhost:3000")?;
/// let pdf = client
///     .render_html("<h1>Hello</h1>")
///     .format(OutputFormat::Pdf)
///     .send_blocking()?;
/// std::fs::write("hello.pdf", pdf).ok();
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ForgeClient {
    pool: Arc<ConnectionPool>,
}

impl std::fmt::Debug for ForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeClient")
            .field("base_url", &self.base_url())
            .field("timeout", &self.timeout())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ForgeClient {
    /// Creates a client with the default 120 second timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Creates a client with the given default timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_config(ClientConfig {
            base_url: base_url.into(),
            timeout,
            ..Default::default()
        })
    }

    /// Creates a client from a full configuration.
    pub fn with_config(mut config: ClientConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must use http or https, got {:?}",
                parsed.scheme()
            )));
        }
        if config.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            pool: Arc::new(ConnectionPool::new(config)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.pool.config()
    }

    pub fn base_url(&self) -> &str {
        &self.config().base_url
    }

    /// Session default timeout.
    pub fn timeout(&self) -> Duration {
        self.config().timeout
    }

    /// Start a render request from an HTML string.
    pub fn render_html(&self, html: impl Into<String>) -> RenderRequestBuilder {
        RenderRequestBuilder::new(self.clone(), RenderSource::Html(html.into()))
    }

    /// Start a render request from a URL.
    pub fn render_url(&self, url: impl Into<String>) -> RenderRequestBuilder {
        RenderRequestBuilder::new(self.clone(), RenderSource::Url(url.into()))
    }

    /// Send a frozen request, blocking the current thread until the service
    /// answers or the timeout elapses.
    ///
    /// Fails with [`Error::Config`] when called from inside an async runtime;
    /// use [`render`](Self::render) there.
    pub fn render_blocking(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        let payload = request.to_payload()?;
        let http = self.pool.blocking()?;
        let url = self.endpoint(RENDER_PATH);
        debug!("POST {} format={} (blocking)", url, request.format());

        let resp = http
            .post(&url)
            .timeout(self.request_timeout(request))
            .json(&payload)
            .send()
            .map_err(Error::Connection)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().map_err(Error::Connection)?;
        log::trace!("render answered {} with {} bytes", status, body.len());
        response::interpret(status, body.to_vec())
    }

    /// True when the service answers its health endpoint with a 2xx status.
    ///
    /// Every failure, including a closed client, reads as `false`.
    pub fn health_blocking(&self) -> bool {
        let url = self.endpoint(HEALTH_PATH);
        let outcome = self
            .pool
            .blocking()
            .and_then(|http| http.get(&url).send().map_err(Error::Connection));
        match outcome {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                debug!("health check against {} failed: {}", url, err);
                false
            }
        }
    }

    /// Release both connection pools. Safe to call more than once.
    ///
    /// Any later request fails with [`Error::Closed`].
    pub fn close(&self) {
        self.pool.close();
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    pub(crate) fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// The request's own `timeout` option wins over the session default.
    pub(crate) fn request_timeout(&self, request: &RenderRequest) -> Duration {
        request
            .options()
            .timeout
            .map(|secs| Duration::from_secs(u64::from(secs)))
            .unwrap_or_else(|| self.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RenderOptions;

    #[test]
    fn test_default_config() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert_eq!(cfg.base_url, "http://localhost:3000");
        assert!(cfg.user_agent.starts_with("forge-sdk-rust/"));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ForgeClient::new("http://render.local:3000///").unwrap();
        assert_eq!(client.base_url(), "http://render.local:3000");
        assert_eq!(client.endpoint(RENDER_PATH), "http://render.local:3000/render");
    }

    #[test]
    fn bad_configuration_is_rejected() {
        assert!(matches!(ForgeClient::new("not a url"), Err(Error::Config(_))));
        assert!(matches!(ForgeClient::new("ftp://host"), Err(Error::Config(_))));
        assert!(matches!(
            ForgeClient::with_timeout("http://localhost", Duration::ZERO),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn request_timeout_overrides_session_default() {
        let client = ForgeClient::with_timeout("http://localhost", Duration::from_secs(30)).unwrap();
        let plain = RenderRequest::new(RenderSource::Html("x".into()), RenderOptions::default()).unwrap();
        assert_eq!(client.request_timeout(&plain), Duration::from_secs(30));

        let opts = RenderOptions {
            timeout: Some(5),
            ..Default::default()
        };
        let custom = RenderRequest::new(RenderSource::Html("x".into()), opts).unwrap();
        assert_eq!(client.request_timeout(&custom), Duration::from_secs(5));
    }

    #[test]
    fn clones_share_close_state() {
        let a = ForgeClient::new("http://localhost").unwrap();
        let b = a.clone();
        a.close();
        assert!(b.is_closed());
        assert!(!b.health_blocking());
    }

    fn refused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[test]
    fn pools_released_when_last_clone_dropped() {
        let a = ForgeClient::new("http://localhost").unwrap();
        a.pool.blocking().unwrap();
        a.pool.non_blocking().unwrap();
        let weak = Arc::downgrade(&a.pool);

        let b = a.clone();
        drop(a);
        assert!(weak.upgrade().is_some());
        drop(b);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn pools_released_on_early_error_exit() {
        fn render_once(url: &str, weak: &mut Option<std::sync::Weak<ConnectionPool>>) -> Result<Vec<u8>> {
            let client = ForgeClient::new(url)?;
            client.pool.non_blocking()?;
            *weak = Some(Arc::downgrade(&client.pool));
            let bytes = client.render_html("<p>x</p>").send_blocking()?;
            client.close();
            Ok(bytes)
        }

        let mut weak = None;
        let err = render_once(&refused_url(), &mut weak).unwrap_err();
        assert!(err.is_connection());
        let weak = weak.unwrap();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn builder_keeps_pools_alive_until_dropped() {
        let client = ForgeClient::new("http://localhost").unwrap();
        let weak = Arc::downgrade(&client.pool);
        let builder = client.render_html("<p>x</p>");
        drop(client);

        assert!(weak.upgrade().is_some());
        assert!(!builder.client().is_closed());
        drop(builder);
        assert!(weak.upgrade().is_none());
    }
}
