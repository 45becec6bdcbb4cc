// File: src/http/request.rs
// Purpose: Transport-agnostic description of an incoming request

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::Method;

/// Basic-auth style credentials supplied with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// An incoming request as seen by the dispatcher
///
/// The transport adapter fills this in; the dispatcher never reads from a
/// socket or from process globals. Header names are stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Method,
    path: String,
    query: Map<String, Value>,
    params: Map<String, Value>,
    headers: HashMap<String, String>,
    credentials: Option<Credentials>,
    remote_address: Option<String>,
    forwarded_for: Option<String>,
    host: Option<String>,
    secure: bool,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    /// Adds a single query parameter
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Adds a single body parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_remote_address(mut self, address: impl Into<String>) -> Self {
        self.remote_address = Some(address.into());
        self
    }

    pub fn with_forwarded_for(mut self, address: impl Into<String>) -> Self {
        self.forwarded_for = Some(address.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Request path; an empty path is reported as `/`
    pub fn path(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }

    /// Non-empty path segments
    pub fn path_parts(&self) -> Vec<&str> {
        self.path().split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Path segment at `index`, counting non-empty segments from 0
    pub fn path_part(&self, index: usize) -> Option<&str> {
        self.path().split('/').filter(|s| !s.is_empty()).nth(index)
    }

    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&Value> {
        self.query.get(name)
    }

    /// Body parameters, whatever the method
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params().get(name)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(super::headers::CONTENT_TYPE)
    }

    /// Requests sent by `XMLHttpRequest`
    pub fn is_ajax(&self) -> bool {
        self.header("x-requested-with")
            .map(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
            .unwrap_or(false)
    }

    pub fn has_auth(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn auth_user(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.user.as_str())
    }

    pub fn auth_password(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.password.as_str())
    }

    pub fn remote_address(&self) -> Option<&str> {
        self.remote_address.as_deref()
    }

    pub fn forwarded_for(&self) -> Option<&str> {
        self.forwarded_for.as_deref()
    }

    /// Best guess at the client address: the forwarded address wins
    pub fn client_address(&self) -> Option<&str> {
        self.forwarded_for().or_else(|| self.remote_address())
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// Turns a relative location into an absolute URL for this request's host
    ///
    /// Locations that already carry a scheme, and requests without a host,
    /// are returned unchanged.
    pub fn absolute_url(&self, location: &str) -> String {
        if location.contains("://") {
            return location.to_string();
        }

        match self.host() {
            Some(host) => format!(
                "{}://{}/{}",
                self.scheme(),
                host.trim_end_matches('/'),
                location.trim_start_matches('/')
            ),
            None => location.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_path_is_root() {
        let request = Request::new(Method::Get, "");
        assert_eq!(request.path(), "/");
        assert!(request.path_parts().is_empty());
    }

    #[test]
    fn test_path_parts() {
        let request = Request::new(Method::Get, "/users/42/edit/");
        assert_eq!(request.path_parts(), vec!["users", "42", "edit"]);
        assert_eq!(request.path_part(1), Some("42"));
        assert_eq!(request.path_part(3), None);
    }

    #[test]
    fn test_body_params_for_every_method() {
        let get = Request::new(Method::Get, "/").with_param("a", "1");
        assert_eq!(get.param("a"), Some(&json!("1")));

        let post = Request::new(Method::Post, "/").with_param("a", "1");
        assert_eq!(post.param("a"), Some(&json!("1")));
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let request = Request::new(Method::Get, "/")
            .with_header("X-Requested-With", "XMLHttpRequest")
            .with_header("Content-Type", "application/json");

        assert!(request.is_ajax());
        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_credentials() {
        let request = Request::new(Method::Get, "/");
        assert!(!request.has_auth());

        let request = request.with_credentials("admin", "secret");
        assert!(request.has_auth());
        assert_eq!(request.auth_user(), Some("admin"));
        assert_eq!(request.auth_password(), Some("secret"));
    }

    #[test]
    fn test_absolute_url() {
        let request = Request::new(Method::Get, "/").with_host("example.com");
        assert_eq!(request.absolute_url("/login"), "http://example.com/login");
        assert_eq!(
            request.absolute_url("https://other.org/x"),
            "https://other.org/x"
        );

        let secure = request.with_secure(true);
        assert_eq!(secure.absolute_url("login"), "https://example.com/login");

        let hostless = Request::new(Method::Get, "/");
        assert_eq!(hostless.absolute_url("/login"), "/login");
    }

    #[test]
    fn test_client_address_prefers_forwarded() {
        let request = Request::new(Method::Get, "/").with_remote_address("10.0.0.1");
        assert_eq!(request.client_address(), Some("10.0.0.1"));

        let request = request.with_forwarded_for("203.0.113.9");
        assert_eq!(request.client_address(), Some("203.0.113.9"));
    }
}
