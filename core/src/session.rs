//! Session lifecycle: environment selection, login, logout.
//!
//! # Design
//! Construction and authentication are two explicit steps: a
//! `SessionBuilder` carries transport configuration and the resolved base
//! URL, and its `login` performs the credential exchange and returns the
//! authenticated `Session`. The session handle is immutable after login
//! except for `logout`, which invalidates it. All service methods live on
//! `Session` (see `items`, `upload`, `acl`, `relations`) and share its
//! transport; nothing else mutates session state.
//!
//! Credentials are consumed by `login` and never stored; auth context after
//! login is the catalog's session cookie held by the transport agent.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::Api;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRIES: u32 = 2;

/// A named catalog deployment. Unknown names are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Beta,
    Development,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://catalog.example.gov/api",
            Environment::Beta => "https://beta.catalog.example.gov/api",
            Environment::Development => "http://localhost:3000/api",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name {
            "production" => Ok(Environment::Production),
            "beta" => Ok(Environment::Beta),
            "development" => Ok(Environment::Development),
            other => Err(Error::Configuration(format!(
                "unrecognized environment: {other:?}"
            ))),
        }
    }
}

/// Configures and authenticates a catalog session.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    base_url: String,
    timeout: Duration,
    retries: u32,
}

impl SessionBuilder {
    pub fn new(environment: Environment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Resolve an environment by name; `Error::Configuration` on unknown
    /// names.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        Ok(Self::new(name.parse()?))
    }

    /// Point the session at a deployment outside the fixed environment set
    /// (custom installs, test servers).
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry count for network-level failures on idempotent reads.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// Fails with `Error::Authentication` on invalid credentials or network
    /// failure during the exchange. On success the transport holds the
    /// catalog's session cookie and every subsequent call carries it.
    pub fn login(self, username: &str, password: &str) -> Result<Session, Error> {
        let api = Api::new(&self.base_url);
        let transport = Transport::new(self.timeout, self.retries);

        let req = api.build_login(username, password)?;
        let response = transport.execute(&req).map_err(|e| match e {
            Error::Transport(msg) => Error::Authentication(msg),
            other => other,
        })?;
        Api::parse_login(response)?;

        Ok(Session {
            api,
            transport,
            username: username.to_string(),
            authenticated: true,
        })
    }
}

/// An authenticated catalog session.
///
/// Owned exclusively by the caller; concurrent use from multiple threads is
/// the caller's responsibility to synchronize.
#[derive(Debug)]
pub struct Session {
    pub(crate) api: Api,
    pub(crate) transport: Transport,
    username: String,
    authenticated: bool,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentUser {
    my_items_id: String,
}

impl Api {
    fn build_login(&self, username: &str, password: &str) -> Result<HttpRequest, Error> {
        self.json_request(
            HttpMethod::Post,
            "auth/login",
            &LoginRequest { username, password },
        )
    }

    fn parse_login(response: HttpResponse) -> Result<(), Error> {
        crate::api::check_status(&response, 200)
    }

    fn build_logout(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, self.url("auth/logout"))
    }

    fn build_current_user(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url("user/me"))
    }

    fn parse_current_user(response: HttpResponse) -> Result<CurrentUser, Error> {
        crate::api::check_status(&response, 200)?;
        crate::api::parse_json(&response.body)
    }
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Id of the authenticated user's personal root container.
    pub fn get_my_items_id(&self) -> Result<String, Error> {
        self.ensure_authenticated()?;
        let req = self.api.build_current_user();
        let response = self.transport.execute(&req)?;
        Ok(Api::parse_current_user(response)?.my_items_id)
    }

    /// Invalidate the server-side session and clear local auth state.
    /// Idempotent: calling on an already logged-out session is a no-op.
    pub fn logout(&mut self) -> Result<(), Error> {
        if !self.authenticated {
            return Ok(());
        }
        let req = self.api.build_logout();
        let response = self.transport.execute(&req)?;
        crate::api::check_status(&response, 204)?;
        self.authenticated = false;
        Ok(())
    }

    pub(crate) fn ensure_authenticated(&self) -> Result<(), Error> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::Authentication("session is logged out".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_known_names() {
        assert_eq!(
            "beta".parse::<Environment>().unwrap(),
            Environment::Beta
        );
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn environment_rejects_unknown_name() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn environments_map_to_distinct_base_urls() {
        let urls = [
            Environment::Production.base_url(),
            Environment::Beta.base_url(),
            Environment::Development.base_url(),
        ];
        assert_ne!(urls[0], urls[1]);
        assert_ne!(urls[1], urls[2]);
        assert_ne!(urls[0], urls[2]);
    }

    #[test]
    fn build_login_posts_credentials_as_json() {
        let api = Api::new("http://localhost:3000");
        let req = api.build_login("user@example.gov", "secret").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/auth/login");
        let body: serde_json::Value =
            serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["username"], "user@example.gov");
        assert_eq!(body["password"], "secret");
    }

    #[test]
    fn parse_login_rejects_bad_credentials() {
        let response = HttpResponse {
            status: 401,
            body: r#"{"message":"invalid credentials"}"#.to_string(),
        };
        let err = Api::parse_login(response).unwrap_err();
        assert!(matches!(err, Error::Authentication(msg) if msg == "invalid credentials"));
    }

    #[test]
    fn builder_base_url_override_strips_trailing_slash() {
        let builder = SessionBuilder::new(Environment::Beta).base_url("http://127.0.0.1:4000/");
        assert_eq!(builder.base_url, "http://127.0.0.1:4000");
    }
}
