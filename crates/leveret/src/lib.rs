// Leveret - micro web-framework core
// Typed route patterns, per-method routing and a staged dispatch pipeline

pub mod http;
pub mod error;

// Framework modules
pub mod acl;
pub mod auth;
pub mod filter;
pub mod validation;
pub mod route;
pub mod router;
pub mod controller;
pub mod context;
pub mod config;
pub mod application;

// Re-export core types
pub use application::{Application, Stage};
pub use config::{Config, Environment, ValidationMode};
pub use context::RequestContext;
pub use controller::{Controller, ControllerError};
pub use error::{DispatchError, FailureKind, Violations};
pub use http::{Method, Request, Response};
pub use route::{Action, ResolvedRoute, RouteTemplate, DEFAULT_ROUTE_NAME};
pub use router::Router;

// Re-export pattern types
pub use leveret_pattern::{Params, PatternError, RoutePattern};
