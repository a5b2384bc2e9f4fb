//! HTTP request/response types described as plain data.
//!
//! # Design
//! The `Api` builder produces `HttpRequest` values and the `parse_*` methods
//! consume `HttpResponse` values; only `Transport` ever touches the network.
//! Keeping the request shape as data makes every endpoint unit-testable
//! without a server and keeps the retry policy in one place.
//!
//! All fields use owned types (`String`, `Vec`) so requests can be built,
//! inspected, and executed without lifetime concerns.

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `Api::build_*` methods and executed by `Transport`. Query
/// parameters are kept as pairs rather than baked into the path so the
/// transport can apply proper encoding.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// True when the request may be replayed safely after a network-level
    /// failure. Only reads qualify; see the transport retry policy.
    pub fn is_idempotent_read(&self) -> bool {
        self.method == HttpMethod::Get
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by `Transport` after executing an `HttpRequest`, then passed
/// to `Api::parse_*` methods for status checking and deserialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_qualifies_as_an_idempotent_read() {
        let cases = [
            (HttpMethod::Get, true),
            (HttpMethod::Post, false),
            (HttpMethod::Put, false),
            (HttpMethod::Delete, false),
        ];
        for (method, expected) in cases {
            let req = HttpRequest::new(method.clone(), "http://localhost:3000/items".to_string());
            assert_eq!(req.is_idempotent_read(), expected, "{method:?}");
        }
    }
}
