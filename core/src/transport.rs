//! HTTP execution with session cookies and bounded read retries.
//!
//! # Design
//! One `ureq` agent per session. The agent's cookie store carries the
//! catalog's session cookie across calls, which is the whole of the client's
//! auth context after login. Status codes are returned as data
//! (`http_status_as_error(false)`) so `Api::parse_*` owns status
//! interpretation.
//!
//! Retry policy: network-level failures on idempotent reads (GET) are
//! retried up to the configured count. Mutating verbs are never auto-retried
//! since create/delete/ACL writes are not guaranteed idempotent at the
//! transport level.

use std::time::Duration;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug)]
pub(crate) struct Transport {
    agent: ureq::Agent,
    retries: u32,
}

impl Transport {
    pub fn new(timeout: Duration, retries: u32) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, retries }
    }

    /// Execute a request, retrying idempotent reads on network failure.
    pub fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, Error> {
        let attempts = if req.is_idempotent_read() {
            self.retries + 1
        } else {
            1
        };

        let mut last_err = None;
        for _ in 0..attempts {
            match self.send(req) {
                Ok(response) => return Ok(response),
                Err(e) => last_err = Some(e),
            }
        }
        // attempts >= 1, so last_err is always populated here
        Err(Error::Transport(
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let result = match (&req.method, &req.body) {
            (HttpMethod::Get, _) => apply(self.agent.get(&req.path), req).call(),
            (HttpMethod::Delete, _) => apply(self.agent.delete(&req.path), req).call(),
            (HttpMethod::Post, Some(body)) => apply(self.agent.post(&req.path), req).send(&body[..]),
            (HttpMethod::Post, None) => apply(self.agent.post(&req.path), req).send_empty(),
            (HttpMethod::Put, Some(body)) => apply(self.agent.put(&req.path), req).send(&body[..]),
            (HttpMethod::Put, None) => apply(self.agent.put(&req.path), req).send_empty(),
        };

        let mut response = result?;
        let status = response.status().as_u16();
        // a failure while draining the body is a transport failure, not an
        // empty-body response
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse { status, body })
    }
}

/// Apply query parameters and headers from the plain-data request onto a
/// ureq builder of either body typestate.
fn apply<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (key, value) in &req.query {
        builder = builder.query(key, value);
    }
    for (key, value) in &req.headers {
        builder = builder.header(key, value);
    }
    builder
}
