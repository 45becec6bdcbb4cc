// File: src/route.rs
// Purpose: Route templates (registration-time configuration) and resolved routes

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use leveret_pattern::{Params, RoutePattern};

use crate::auth::Authenticator;
use crate::context::RequestContext;
use crate::filter::Filter;
use crate::validation::{Constraint, ParamConstraints};

/// Name reported by routes that were never named
pub const DEFAULT_ROUTE_NAME: &str = "UnnamedRoute";

/// Callable action; receives the positional route parameters
pub type Handler =
    Arc<dyn Fn(&mut RequestContext<'_>, &[&str]) -> anyhow::Result<()> + Send + Sync>;

/// Pre/post dispatch hook
pub type Hook =
    Arc<dyn Fn(&ResolvedRoute, &mut RequestContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Filters attached to one parameter, in registration order
pub type ParamFilters = (String, Vec<Arc<dyn Filter>>);

/// What a route runs once the pipeline reaches invocation
#[derive(Clone, Default)]
pub enum Action {
    #[default]
    None,
    Controller { controller: String, action: String },
    Callable(Handler),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::None => f.write_str("None"),
            Action::Controller { controller, action } => {
                write!(f, "Controller({}::{})", controller, action)
            }
            Action::Callable(_) => f.write_str("Callable"),
        }
    }
}

/// Configuration of one registered route
///
/// Templates are configured through the `&mut` returned at registration and
/// are never modified by dispatch.
///
/// ```
/// use leveret::{Application, Config, Method};
/// use leveret::validation::OneOf;
///
/// let mut app = Application::new(Config::default());
/// app.register_route(Method::Get, "/hello/:name")
///     .unwrap()
///     .set_name("hello")
///     .set_required_param("lang")
///     .add_request_constraint("name", OneOf::new(["paco", "maria"]));
/// ```
#[derive(Clone)]
pub struct RouteTemplate {
    pattern: RoutePattern,
    name: Option<String>,
    action: Action,
    required_params: Vec<String>,
    authenticator: Option<Arc<dyn Authenticator>>,
    request_constraints: Vec<ParamConstraints>,
    request_filters: Vec<ParamFilters>,
    pre_dispatch: Vec<Hook>,
    post_dispatch: Vec<Hook>,
    metadata: HashMap<String, String>,
}

impl RouteTemplate {
    pub fn new(pattern: RoutePattern) -> Self {
        Self {
            pattern,
            name: None,
            action: Action::None,
            required_params: Vec::new(),
            authenticator: None,
            request_constraints: Vec::new(),
            request_filters: Vec::new(),
            pre_dispatch: Vec::new(),
            post_dispatch: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    // -- Identity --

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_ROUTE_NAME)
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    // -- Action --

    /// Routes to `action` of the controller registered as `controller`
    pub fn use_controller(&mut self, controller: impl Into<String>, action: impl Into<String>) -> &mut Self {
        self.action = Action::Controller {
            controller: controller.into(),
            action: action.into(),
        };
        self
    }

    pub fn set_action<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext<'_>, &[&str]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Action::Callable(Arc::new(handler));
        self
    }

    pub fn set_handler(&mut self, handler: Handler) -> &mut Self {
        self.action = Action::Callable(handler);
        self
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn has_controller(&self) -> bool {
        matches!(self.action, Action::Controller { .. })
    }

    /// `(controller, action)` when the route targets a controller
    pub fn controller_target(&self) -> Option<(&str, &str)> {
        match &self.action {
            Action::Controller { controller, action } => Some((controller.as_str(), action.as_str())),
            _ => None,
        }
    }

    // -- Requirements --

    /// Marks a parameter as required; repeated names are kept once
    pub fn set_required_param(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.required_params.contains(&name) {
            self.required_params.push(name);
        }
        self
    }

    /// Replaces the required parameter list
    pub fn set_required_params<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_params.clear();
        for name in names {
            self.set_required_param(name);
        }
        self
    }

    pub fn required_params(&self) -> &[String] {
        &self.required_params
    }

    pub fn has_required_params(&self) -> bool {
        !self.required_params.is_empty()
    }

    pub fn auth_required<A: Authenticator + 'static>(&mut self, authenticator: A) -> &mut Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    pub fn auth_required_with(&mut self, authenticator: Arc<dyn Authenticator>) -> &mut Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn has_auth_requirements(&self) -> bool {
        self.authenticator.is_some()
    }

    pub fn authenticator(&self) -> Option<&Arc<dyn Authenticator>> {
        self.authenticator.as_ref()
    }

    // -- Constraints and filters --

    pub fn add_request_constraint<C: Constraint + 'static>(&mut self, param: &str, constraint: C) -> &mut Self {
        self.add_request_constraints(param, [Arc::new(constraint) as Arc<dyn Constraint>])
    }

    pub fn add_request_constraints<I>(&mut self, param: &str, constraints: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Constraint>>,
    {
        push_keyed(&mut self.request_constraints, param, constraints);
        self
    }

    pub fn request_constraints(&self) -> &[ParamConstraints] {
        &self.request_constraints
    }

    pub fn has_request_constraints(&self) -> bool {
        !self.request_constraints.is_empty()
    }

    pub fn add_request_filter<F: Filter + 'static>(&mut self, param: &str, filter: F) -> &mut Self {
        self.add_request_filters(param, [Arc::new(filter) as Arc<dyn Filter>])
    }

    pub fn add_request_filters<I>(&mut self, param: &str, filters: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Filter>>,
    {
        push_keyed(&mut self.request_filters, param, filters);
        self
    }

    pub fn request_filters(&self) -> &[ParamFilters] {
        &self.request_filters
    }

    /// Filters registered for one parameter
    pub fn filters_for(&self, param: &str) -> &[Arc<dyn Filter>] {
        self.request_filters
            .iter()
            .find(|(name, _)| name == param)
            .map(|(_, filters)| filters.as_slice())
            .unwrap_or(&[])
    }

    // -- Hooks --

    pub fn add_pre_dispatch_action<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ResolvedRoute, &mut RequestContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_dispatch.push(Arc::new(hook));
        self
    }

    pub fn add_post_dispatch_action<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ResolvedRoute, &mut RequestContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_dispatch.push(Arc::new(hook));
        self
    }

    pub fn pre_dispatch_actions(&self) -> &[Hook] {
        &self.pre_dispatch
    }

    pub fn post_dispatch_actions(&self) -> &[Hook] {
        &self.post_dispatch
    }

    /// Binds raw matches to this template's placeholders
    pub fn bind_params<S: AsRef<str>>(self: &Arc<Self>, raw_matches: &[S]) -> ResolvedRoute {
        ResolvedRoute {
            template: Arc::clone(self),
            params: self.pattern.bind(raw_matches),
        }
    }
}

fn push_keyed<T>(entries: &mut Vec<(String, Vec<T>)>, key: &str, items: impl IntoIterator<Item = T>) {
    match entries.iter_mut().find(|(name, _)| name == key) {
        Some((_, existing)) => existing.extend(items),
        None => entries.push((key.to_string(), items.into_iter().collect())),
    }
}

impl fmt::Debug for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTemplate")
            .field("pattern", &self.pattern.raw())
            .field("name", &self.name())
            .field("action", &self.action)
            .field("required_params", &self.required_params)
            .field("auth_required", &self.has_auth_requirements())
            .field(
                "constraints",
                &self.request_constraints.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// ResolvedRoute
// ============================================================================

/// A template matched against one request, with its bound parameters
///
/// Dereferences to the shared template.
#[derive(Clone)]
pub struct ResolvedRoute {
    template: Arc<RouteTemplate>,
    params: Params,
}

impl ResolvedRoute {
    pub fn template(&self) -> &Arc<RouteTemplate> {
        &self.template
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param_by_name(&self, name: &str) -> Option<&str> {
        self.params.by_name(name)
    }

    pub fn param_by_position(&self, position: usize) -> Option<&str> {
        self.params.by_position(position)
    }

    pub fn param_by_name_or<'s>(&'s self, name: &str, default: &'s str) -> &'s str {
        self.param_by_name(name).unwrap_or(default)
    }

    pub fn param_by_position_or<'s>(&'s self, position: usize, default: &'s str) -> &'s str {
        self.param_by_position(position).unwrap_or(default)
    }

    /// Positional values as passed to actions
    pub fn args(&self) -> Vec<&str> {
        self.params.values()
    }
}

impl Deref for ResolvedRoute {
    type Target = RouteTemplate;

    fn deref(&self) -> &Self::Target {
        &self.template
    }
}

impl fmt::Debug for ResolvedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("pattern", &self.template.pattern().raw())
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::NotBlank;
    use pretty_assertions::assert_eq;

    fn template(pattern: &str) -> RouteTemplate {
        RouteTemplate::new(RoutePattern::compile(pattern).unwrap())
    }

    #[test]
    fn test_defaults() {
        let route = template("/x");
        assert_eq!(route.name(), DEFAULT_ROUTE_NAME);
        assert!(!route.has_name());
        assert!(!route.has_controller());
        assert!(!route.has_auth_requirements());
        assert!(matches!(route.action(), Action::None));
    }

    #[test]
    fn test_required_params_are_a_set() {
        let mut route = template("/x");
        route
            .set_required_param("a")
            .set_required_param("b")
            .set_required_param("a");
        assert_eq!(route.required_params(), &["a".to_string(), "b".to_string()]);

        route.set_required_params(["c", "c"]);
        assert_eq!(route.required_params(), &["c".to_string()]);
    }

    #[test]
    fn test_constraints_accumulate_per_param() {
        let mut route = template("/x");
        route
            .add_request_constraint("name", NotBlank)
            .add_request_constraint("age", NotBlank)
            .add_request_constraint("name", NotBlank);

        let summary: Vec<(&str, usize)> = route
            .request_constraints()
            .iter()
            .map(|(p, c)| (p.as_str(), c.len()))
            .collect();
        assert_eq!(summary, vec![("name", 2), ("age", 1)]);
    }

    #[test]
    fn test_bind_params_leaves_template_alone() {
        let shared = Arc::new(template("/hello/:name"));
        let first = shared.bind_params(&["maria"]);
        let second = shared.bind_params(&["paco"]);

        assert_eq!(first.param_by_name("name"), Some("maria"));
        assert_eq!(second.param_by_name("name"), Some("paco"));
        assert_eq!(second.param_by_position(1), Some("paco"));
        assert_eq!(second.param_by_position_or(0, "none"), "none");
        assert_eq!(second.param_by_name_or("lang", "es"), "es");
        assert!(Arc::ptr_eq(first.template(), second.template()));
    }

    #[test]
    fn test_controller_target() {
        let mut route = template("/users");
        route.use_controller("Users", "index");
        assert_eq!(route.controller_target(), Some(("Users", "index")));
    }
}
