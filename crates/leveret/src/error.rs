// File: src/error.rs
// Purpose: Typed dispatch failures and their HTTP classification

use std::fmt;

use thiserror::Error;

use crate::controller::ControllerError;
use crate::http::{Method, Status};

/// Coarse classification of a dispatch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    RouteNotFound,
    AccessDenied,
    AuthenticationRequired,
    AuthenticationFailed,
    BadRequest,
    NoActionDefined,
    ControllerResolution,
    Internal,
}

/// Validation violations per parameter, in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<(String, Vec<String>)>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, param: &str) -> &mut Vec<String> {
        let index = match self.0.iter().position(|(name, _)| name == param) {
            Some(index) => index,
            None => {
                self.0.push((param.to_string(), Vec::new()));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }

    pub fn add(&mut self, param: impl Into<String>, message: impl Into<String>) {
        let param = param.into();
        self.entry(&param).push(message.into());
    }

    pub fn extend(&mut self, param: &str, messages: impl IntoIterator<Item = String>) {
        let mut messages = messages.into_iter().peekable();
        if messages.peek().is_some() {
            self.entry(param).extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, param: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == param)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Flattened `param: message` lines
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(param, msgs)| msgs.iter().map(move |m| format!("{}: {}", param, m)))
            .collect()
    }

    pub fn as_string(&self, separator: &str) -> String {
        self.messages().join(separator)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string("\n"))
    }
}

/// Failures raised while dispatching a request
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Impossible to match route ({method}) {path}")]
    RouteNotFound { method: Method, path: String },

    #[error("Access not allowed{}", access_suffix(.message))]
    AccessDenied { message: Option<String> },

    #[error("Authentication required!")]
    AuthenticationRequired,

    #[error("Authentication failed! ({message})")]
    AuthenticationFailed { message: String },

    #[error("{violations}")]
    BadRequest { violations: Violations },

    #[error("No action defined for route {pattern}.")]
    NoActionDefined { pattern: String },

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Internal(anyhow::Error),
}

fn access_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!(": {}", message),
        _ => "!".to_string(),
    }
}

impl DispatchError {
    /// Reclassifies an error raised by user code
    ///
    /// Typed dispatch failures keep their kind; anything else is internal.
    pub fn from_handler(error: anyhow::Error) -> Self {
        match error.downcast::<DispatchError>() {
            Ok(typed) => typed,
            Err(error) => match error.downcast::<ControllerError>() {
                Ok(controller) => DispatchError::Controller(controller),
                Err(error) => DispatchError::Internal(error),
            },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::RouteNotFound { .. } => FailureKind::RouteNotFound,
            DispatchError::AccessDenied { .. } => FailureKind::AccessDenied,
            DispatchError::AuthenticationRequired => FailureKind::AuthenticationRequired,
            DispatchError::AuthenticationFailed { .. } => FailureKind::AuthenticationFailed,
            DispatchError::BadRequest { .. } => FailureKind::BadRequest,
            DispatchError::NoActionDefined { .. } => FailureKind::NoActionDefined,
            DispatchError::Controller(_) => FailureKind::ControllerResolution,
            DispatchError::Internal(_) => FailureKind::Internal,
        }
    }

    /// HTTP status this failure is reported with
    pub fn status(&self) -> u16 {
        match self.kind() {
            FailureKind::RouteNotFound => Status::NOT_FOUND,
            FailureKind::BadRequest => Status::BAD_REQUEST,
            FailureKind::AccessDenied
            | FailureKind::AuthenticationRequired
            | FailureKind::AuthenticationFailed => Status::UNAUTHORIZED,
            FailureKind::NoActionDefined
            | FailureKind::ControllerResolution
            | FailureKind::Internal => Status::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic detail including the cause chain
    pub fn trace(&self) -> String {
        match self {
            DispatchError::Internal(error) => format!("{:?}", error),
            other => format!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                DispatchError::RouteNotFound { method: Method::Get, path: "/x".into() },
                404,
            ),
            (DispatchError::AccessDenied { message: None }, 401),
            (DispatchError::AuthenticationRequired, 401),
            (DispatchError::AuthenticationFailed { message: String::new() }, 401),
            (DispatchError::BadRequest { violations: Violations::new() }, 400),
            (DispatchError::NoActionDefined { pattern: "/x".into() }, 500),
            (
                DispatchError::Controller(ControllerError::NotRegistered("Ghost".into())),
                500,
            ),
            (DispatchError::Internal(anyhow::anyhow!("boom")), 500),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status, "{:?}", error);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DispatchError::RouteNotFound { method: Method::Post, path: "/nope".into() }.to_string(),
            "Impossible to match route (POST) /nope"
        );
        assert_eq!(
            DispatchError::AccessDenied { message: None }.to_string(),
            "Access not allowed!"
        );
        assert_eq!(
            DispatchError::AccessDenied { message: Some("admins only".into()) }.to_string(),
            "Access not allowed: admins only"
        );
        assert_eq!(
            DispatchError::AuthenticationFailed { message: "bad password".into() }.to_string(),
            "Authentication failed! (bad password)"
        );
    }

    #[test]
    fn test_violations_rendering() {
        let mut violations = Violations::new();
        violations.add("name", "Required param missing!");
        violations.add("age", "too young");
        violations.add("age", "not a number");

        assert_eq!(
            violations.as_string("\n"),
            "name: Required param missing!\nage: too young\nage: not a number"
        );
        assert_eq!(violations.len(), 2);
        assert_eq!(violations.get("age").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_from_handler_keeps_typed_failures() {
        let typed = anyhow::Error::new(DispatchError::AuthenticationRequired);
        assert_eq!(
            DispatchError::from_handler(typed).kind(),
            FailureKind::AuthenticationRequired
        );

        let plain: anyhow::Result<()> = Err(anyhow::anyhow!("disk full")).context("saving upload");
        let error = DispatchError::from_handler(plain.unwrap_err());
        assert_eq!(error.kind(), FailureKind::Internal);
        assert!(error.trace().contains("disk full"));

        let controller = anyhow::Error::new(ControllerError::NotRegistered("Ghost".into()));
        assert_eq!(
            DispatchError::from_handler(controller).kind(),
            FailureKind::ControllerResolution
        );
    }
}
