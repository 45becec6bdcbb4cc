use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::headers::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, TEXT_HTML, TEXT_PLAIN, APPLICATION_JSON};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("invalid HTTP status code: {0}")]
    InvalidStatus(u16),
}

/// Well-known status codes
pub struct Status;

impl Status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NO_CONTENT: u16 = 204;
    pub const MOVED_PERMANENTLY: u16 = 301;
    pub const FOUND: u16 = 302;
    pub const SEE_OTHER: u16 = 303;
    pub const NOT_MODIFIED: u16 = 304;
    pub const BAD_REQUEST: u16 = 400;
    pub const UNAUTHORIZED: u16 = 401;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;

    /// Reason phrase for common codes
    pub fn reason(code: u16) -> &'static str {
        match code {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            422 => "Unprocessable Entity",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            503 => "Service Unavailable",
            _ => "",
        }
    }
}

// -- Shared helpers --

fn is_empty_status(code: u16) -> bool {
    matches!(code, 204 | 304)
}

// ============================================================================
// Response
// ============================================================================

/// Response produced by dispatching a request
///
/// Header names are stored lowercased and may carry several values.
///
/// ```
/// use leveret::http::Response;
///
/// let mut response = Response::text("Hello", 200);
/// response.append(" world");
/// assert_eq!(response.body(), "Hello world");
/// assert!(response.is_successful());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
    headers: BTreeMap<String, Vec<String>>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: Status::OK,
            body: String::new(),
            headers: BTreeMap::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain text response
    pub fn text(body: impl Into<String>, status: u16) -> Self {
        Self::with_status(status)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .body_text(body)
    }

    /// HTML response
    pub fn html(body: impl Into<String>, status: u16) -> Self {
        Self::with_status(status)
            .header(CONTENT_TYPE, TEXT_HTML)
            .body_text(body)
    }

    /// JSON response
    pub fn json(value: &serde_json::Value, status: u16) -> Self {
        Self::with_status(status)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body_text(value.to_string())
    }

    /// Redirect to `location` with an empty body
    pub fn redirect(location: impl Into<String>, status: u16) -> Self {
        Self::with_status(status).header(LOCATION, location)
    }

    /// Error response rendered from a failure message
    ///
    /// When `trace` is given it is appended below the message.
    pub fn exception(message: impl fmt::Display, status: u16, trace: Option<&str>) -> Self {
        let body = match trace {
            Some(trace) => format!("{}\n\nTrace:\n{}", message, trace),
            None => message.to_string(),
        };
        Self::text(body, status)
    }

    fn with_status(status: u16) -> Self {
        let status = if (100..=599).contains(&status) {
            status
        } else {
            Status::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            ..Self::default()
        }
    }

    fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    fn body_text(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    // -- Status --

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &'static str {
        Status::reason(self.status)
    }

    /// Sets the status code; only codes in 100..=599 are accepted
    pub fn set_status_code(&mut self, status: u16) -> Result<&mut Self, ResponseError> {
        if !(100..=599).contains(&status) {
            return Err(ResponseError::InvalidStatus(status));
        }
        self.status = status;
        Ok(self)
    }

    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.status)
    }

    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::OK
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Status::NOT_FOUND
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == Status::FORBIDDEN
    }

    pub fn is_empty(&self) -> bool {
        is_empty_status(self.status)
    }

    // -- Body --

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Body with line breaks replaced by `eol`
    pub fn body_single_line(&self, eol: &str) -> String {
        self.body.replace("\r\n", eol).replace('\n', eol)
    }

    /// Replaces the body, or appends to it when `append` is set
    pub fn set_body(&mut self, body: impl AsRef<str>, append: bool) -> &mut Self {
        if !append {
            self.body.clear();
        }
        self.body.push_str(body.as_ref());
        self
    }

    pub fn append(&mut self, body: impl AsRef<str>) -> &mut Self {
        self.set_body(body, true)
    }

    // -- Headers --

    /// Replaces every value of `name`
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers
            .insert(name.to_ascii_lowercase(), vec![value.into()]);
        self
    }

    /// Adds a value to `name`, keeping the existing ones
    pub fn add_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(&name.to_ascii_lowercase());
        self
    }

    /// First value of `name`
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    pub fn headers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header_value(CONTENT_TYPE)
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.set_header(CONTENT_TYPE, content_type)
    }

    pub fn location(&self) -> Option<&str> {
        self.header_value(LOCATION)
    }

    /// Prepares the response for sending
    ///
    /// Responses with an empty status lose their body and content headers.
    pub fn finalize(&mut self) -> &mut Self {
        if is_empty_status(self.status) {
            self.body.clear();
            self.headers.remove(CONTENT_TYPE);
            self.headers.remove(CONTENT_LENGTH);
        }
        self
    }
}
