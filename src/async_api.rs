//! Non-blocking execution.
//!
//! Each call awaits only on network I/O, so many renders can be in flight on
//! one client at once. Every call owns its own request future: dropping it
//! aborts that request without touching the others.

use log::debug;

use crate::builder::RenderRequestBuilder;
use crate::client::{ForgeClient, HEALTH_PATH, RENDER_PATH};
use crate::request::RenderRequest;
use crate::{response, Error, Result};

impl ForgeClient {
    /// Send a frozen request and return the rendered bytes.
    pub async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        let payload = request.to_payload()?;
        let http = self.pool().non_blocking()?;
        let url = self.endpoint(RENDER_PATH);
        debug!("POST {} format={}", url, request.format());

        let resp = http
            .post(&url)
            .timeout(self.request_timeout(request))
            .json(&payload)
            .send()
            .await
            .map_err(Error::Connection)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(Error::Connection)?;
        log::trace!("render answered {} with {} bytes", status, body.len());
        response::interpret(status, body.to_vec())
    }

    /// True when the service answers its health endpoint with a 2xx status.
    ///
    /// Every failure, including a closed client, reads as `false`.
    pub async fn health(&self) -> bool {
        let url = self.endpoint(HEALTH_PATH);
        let http = match self.pool().non_blocking() {
            Ok(http) => http,
            Err(err) => {
                debug!("health check against {} failed: {}", url, err);
                return false;
            }
        };
        match http.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                debug!("health check against {} failed: {}", url, err);
                false
            }
        }
    }
}

impl RenderRequestBuilder {
    /// Freeze the accumulated options and send them.
    ///
    /// Validation runs before any connection is touched. The builder is left
    /// unchanged and can be sent again.
    pub async fn send(&self) -> Result<Vec<u8>> {
        let request = self.build()?;
        self.client().render(&request).await
    }
}
