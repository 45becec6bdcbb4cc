// File: src/router.rs
// Purpose: Per-method route tables and request resolution

use std::collections::HashMap;
use std::sync::Arc;

use leveret_pattern::{PatternError, RoutePattern};
use tracing::{debug, trace};

use crate::error::DispatchError;
use crate::http::{Method, Request};
use crate::route::{ResolvedRoute, RouteTemplate};

#[derive(Default)]
struct MethodTable {
    routes: Vec<Arc<RouteTemplate>>,
    by_pattern: HashMap<String, usize>,
}

/// Routes grouped by HTTP method, kept in registration order
///
/// Resolution walks the table of the request method and picks the first
/// template whose pattern matches.
///
/// ```
/// use leveret::{Method, Request, Router};
///
/// let mut router = Router::new();
/// router.register_route(Method::Get, "/users/:(int)id").unwrap().set_name("user");
///
/// let route = router.resolve(&Request::new(Method::Get, "/users/42/")).unwrap();
/// assert_eq!(route.name(), "user");
/// assert_eq!(route.param_by_name("id"), Some("42"));
/// assert!(router.resolve(&Request::new(Method::Post, "/users/42")).is_err());
/// ```
#[derive(Default)]
pub struct Router {
    tables: HashMap<Method, MethodTable>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template and returns it for configuration
    ///
    /// Registering the same method and pattern again replaces the earlier
    /// route but keeps its place in the match order.
    pub fn register_route(
        &mut self,
        method: Method,
        pattern: &str,
    ) -> Result<&mut RouteTemplate, PatternError> {
        let pattern = RoutePattern::compile(pattern)?;
        let key = pattern.raw().to_string();
        let table = self.tables.entry(method).or_default();

        let template = Arc::new(RouteTemplate::new(pattern));
        let index = match table.by_pattern.get(&key) {
            Some(&index) => {
                debug!(%method, pattern = %key, "Replacing route");
                table.routes[index] = template;
                index
            }
            None => {
                debug!(%method, pattern = %key, "Registering route");
                table.routes.push(template);
                table.by_pattern.insert(key, table.routes.len() - 1);
                table.routes.len() - 1
            }
        };

        Ok(Arc::make_mut(&mut table.routes[index]))
    }

    /// Finds the first route of `method` matching `path`
    pub fn resolve_path(&self, method: Method, path: &str) -> Option<ResolvedRoute> {
        let table = self.tables.get(&method)?;

        table.routes.iter().find_map(|template| {
            trace!(pattern = template.pattern().raw(), path, "Trying route");
            template
                .pattern()
                .captures(path)
                .map(|raw| template.bind_params(&raw))
        })
    }

    /// Resolves a request to a route
    pub fn resolve(&self, request: &Request) -> Result<ResolvedRoute, DispatchError> {
        self.resolve_path(request.method(), request.path())
            .ok_or_else(|| DispatchError::RouteNotFound {
                method: request.method(),
                path: request.path().to_string(),
            })
    }

    /// Templates registered for `method`, in match order
    pub fn routes(&self, method: Method) -> impl Iterator<Item = &RouteTemplate> {
        self.tables
            .get(&method)
            .into_iter()
            .flat_map(|table| table.routes.iter().map(|r| r.as_ref()))
    }

    /// Looks a template up by its route name
    pub fn find_by_name(&self, name: &str) -> Option<(Method, &RouteTemplate)> {
        Method::ALL.into_iter().find_map(|method| {
            self.routes(method)
                .find(|r| r.has_name() && r.name() == name)
                .map(|r| (method, r))
        })
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(|t| t.routes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router.register_route(Method::Get, "/items/:(int)id").unwrap().set_name("numeric");
        router.register_route(Method::Get, "/items/:slug").unwrap().set_name("any");

        let get = |path: &str| router.resolve_path(Method::Get, path).map(|r| r.name().to_string());
        assert_eq!(get("/items/12"), Some("numeric".to_string()));
        assert_eq!(get("/items/abc"), Some("any".to_string()));
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut router = Router::new();
        router.register_route(Method::Get, "/a/:x").unwrap().set_name("first");
        router.register_route(Method::Get, "/a/b").unwrap().set_name("literal");
        router.register_route(Method::Get, "/a/:x/").unwrap().set_name("replaced");

        assert_eq!(router.len(), 2);
        let names: Vec<&str> = router.routes(Method::Get).map(|r| r.name()).collect();
        assert_eq!(names, vec!["replaced", "literal"]);

        let route = router.resolve_path(Method::Get, "/a/b").unwrap();
        assert_eq!(route.name(), "replaced");
    }

    #[test]
    fn test_methods_are_separate() {
        let mut router = Router::new();
        router.register_route(Method::Post, "/form").unwrap();

        assert!(router.resolve_path(Method::Get, "/form").is_none());
        assert!(router.resolve_path(Method::Post, "/form").is_some());
    }

    #[test]
    fn test_not_found_error() {
        let router = Router::new();
        let err = router.resolve(&Request::new(Method::Delete, "/gone")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::RouteNotFound);
        assert_eq!(err.to_string(), "Impossible to match route (DELETE) /gone");
    }

    #[test]
    fn test_root_and_empty_path() {
        let mut router = Router::new();
        router.register_route(Method::Get, "/").unwrap().set_name("home");

        assert!(router.resolve(&Request::new(Method::Get, "")).is_ok());
        assert!(router.resolve(&Request::new(Method::Get, "/")).is_ok());
    }

    #[test]
    fn test_find_by_name() {
        let mut router = Router::new();
        router.register_route(Method::Put, "/profile").unwrap().set_name("profile");

        let (method, route) = router.find_by_name("profile").unwrap();
        assert_eq!(method, Method::Put);
        assert_eq!(route.pattern().raw(), "/profile");
        assert!(router.find_by_name("UnnamedRoute").is_none());
    }
}
