//! Stateless request builder and response parser for the catalog API.
//!
//! # Design
//! `Api` holds only a `base_url` and carries no mutable state between calls.
//! Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`;
//! `Session` executes the round trip in between. The split keeps every
//! endpoint deterministic and testable without a server.
//!
//! Per-service `build_*`/`parse_*` impls live next to their session methods
//! in `items`, `upload`, `acl`, and `relations`; this module holds the
//! shared pieces: URL assembly, status checking, and JSON helpers.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Item;

pub(crate) const JSON_CONTENT_TYPE: (&str, &str) = ("content-type", "application/json");

#[derive(Debug, Clone)]
pub(crate) struct Api {
    base_url: String,
}

impl Api {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Start a JSON request with a serialized body.
    pub fn json_request<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
    ) -> Result<HttpRequest, Error> {
        let body =
            serde_json::to_vec(payload).map_err(|e| Error::Serialization(e.to_string()))?;
        let mut req = HttpRequest::new(method, self.url(path));
        req.headers
            .push((JSON_CONTENT_TYPE.0.to_string(), JSON_CONTENT_TYPE.1.to_string()));
        req.body = Some(body);
        Ok(req)
    }

    /// Parse any response whose success body is a single item.
    pub fn parse_item(&self, response: HttpResponse, expected: u16) -> Result<Item, Error> {
        check_status(&response, expected)?;
        parse_json(&response.body)
    }
}

/// Map non-success status codes onto the error taxonomy.
///
/// 401/403 become `Authentication`, 404 becomes `NotFound`, 400/422 become
/// `Validation`; anything else unexpected lands in `Http` with the raw body.
pub(crate) fn check_status(response: &HttpResponse, expected: u16) -> Result<(), Error> {
    if response.status == expected {
        return Ok(());
    }
    match response.status {
        401 | 403 => Err(Error::Authentication(server_message(&response.body))),
        404 => Err(Error::NotFound),
        400 | 422 => Err(Error::Validation {
            status: response.status,
            message: server_message(&response.body),
        }),
        _ => Err(Error::Http {
            status: response.status,
            body: response.body.clone(),
        }),
    }
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Pull the catalog's `message` field out of a JSON error body, falling back
/// to the raw body for non-JSON responses.
fn server_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}
