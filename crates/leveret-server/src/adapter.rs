// File: src/adapter.rs
// Purpose: Conversion between axum requests/responses and leveret ones

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method as HttpMethod, StatusCode, Uri};
use axum::response::{IntoResponse, Response as AxumResponse};
use base64::Engine;
use leveret::http::UnknownMethod;
use leveret::{Method, Request, Response};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Method(#[from] UnknownMethod),
}

// -- Shared helpers --

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Parses `a=1&b=2` pairs; later duplicates replace earlier ones
pub fn parse_pairs(input: &str) -> Map<String, Value> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode(k), Value::String(decode(v))),
            None => (decode(pair), Value::String(String::new())),
        })
        .collect()
}

/// Decodes a `Basic` authorization header into user and password
pub fn basic_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn parse_body(headers: &HeaderMap, body: &Bytes) -> Map<String, Value> {
    let Some(content_type) = header_str(headers, "content-type") else {
        return Map::new();
    };

    if content_type.contains("application/json") {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    } else if content_type.contains("application/x-www-form-urlencoded") {
        parse_pairs(&String::from_utf8_lossy(body))
    } else {
        Map::new()
    }
}

// ============================================================================
// axum → leveret
// ============================================================================

/// Builds a leveret request from the parts axum extracted
pub fn to_request(
    method: &HttpMethod,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
    remote: Option<SocketAddr>,
) -> Result<Request, AdapterError> {
    let method: Method = method.as_str().parse()?;
    let path = urlencoding::decode(uri.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| uri.path().to_string());

    let mut request = Request::new(method, path)
        .with_query(uri.query().map(parse_pairs).unwrap_or_default())
        .with_params(parse_body(headers, body));

    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    if let Some((user, password)) = header_str(headers, "authorization").and_then(basic_credentials) {
        request = request.with_credentials(user, password);
    }
    if let Some(forwarded) = header_str(headers, "x-forwarded-for").and_then(|v| v.split(',').next()) {
        request = request.with_forwarded_for(forwarded.trim());
    }
    if let Some(host) = header_str(headers, "host") {
        request = request.with_host(host);
    }
    if let Some(remote) = remote {
        request = request.with_remote_address(remote.ip().to_string());
    }

    let secure = header_str(headers, "x-forwarded-proto")
        .map(|p| p.eq_ignore_ascii_case("https"))
        .unwrap_or(false);

    Ok(request.with_secure(secure))
}

// ============================================================================
// leveret → axum
// ============================================================================

/// Converts a finished leveret response into an axum response
pub fn into_axum(response: Response) -> AxumResponse {
    let status = StatusCode::from_u16(response.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, values) in response.headers() {
        for value in values {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }
    }

    (status, headers, Body::from(response.body().to_string())).into_response()
}
