// File: src/application.rs
// Purpose: Application registry and the request dispatch pipeline

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use leveret_pattern::PatternError;
use tracing::{debug, error, info, warn};

use crate::acl::{Acl, Acls};
use crate::config::{Config, RouteCallback, ValidationMode};
use crate::context::RequestContext;
use crate::controller::{Controller, ControllerRegistry};
use crate::error::{DispatchError, FailureKind};
use crate::filter::Filter;
use crate::http::{Method, Request, Response, Status};
use crate::route::{Action, Handler, ResolvedRoute, RouteTemplate};
use crate::router::Router;

/// Pipeline stage a request is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    AclChecking,
    Authenticating,
    Validating,
    PreDispatching,
    Invoking,
    PostDispatching,
    Done,
    Failed(FailureKind),
}

type PreRouteHook = Arc<dyn Fn(&Request) + Send + Sync>;
type PostRouteHook = Arc<dyn Fn(&Request, &ResolvedRoute) + Send + Sync>;

/// Routes, access rules, controllers and the dispatch pipeline
///
/// Registration happens through `&mut self` before serving; dispatch only
/// needs `&self`, so a configured application can be shared across threads.
pub struct Application {
    config: Config,
    router: Router,
    acls: Acls,
    controllers: ControllerRegistry,
    callbacks: HashMap<String, Handler>,
    default_filter: Arc<dyn Filter>,
    validation_mode: ValidationMode,
    pre_route: Vec<PreRouteHook>,
    post_route: Vec<PostRouteHook>,
}

impl Application {
    pub fn new(config: Config) -> Self {
        let default_filter = config.application.default_input_filter.build();
        let validation_mode = config.application.auto_request_validation_mode;

        Self {
            config,
            router: Router::new(),
            acls: Acls::new(),
            controllers: ControllerRegistry::new(),
            callbacks: HashMap::new(),
            default_filter,
            validation_mode,
            pre_route: Vec::new(),
            post_route: Vec::new(),
        }
    }

    /// Builds an application from a TOML configuration file
    pub fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Config::load(path)?;
        Ok(Self::new(config))
    }

    // -- Accessors --

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.application.name
    }

    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    pub fn default_filter(&self) -> &Arc<dyn Filter> {
        &self.default_filter
    }

    pub fn set_default_filter<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.default_filter = Arc::new(filter);
        self
    }

    pub fn auto_request_validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    pub fn set_auto_request_validation_mode(&mut self, mode: ValidationMode) -> &mut Self {
        self.validation_mode = mode;
        self
    }

    // -- Registration --

    pub fn register_route(
        &mut self,
        method: Method,
        pattern: &str,
    ) -> Result<&mut RouteTemplate, PatternError> {
        self.router.register_route(method, pattern)
    }

    pub fn register_controller<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Application) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.controllers.register(name, factory);
        self
    }

    /// Registers a callback that configured routes can refer to by name
    pub fn register_callback<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext<'_>, &[&str]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn register_acl_for_controller<A: Acl + 'static>(
        &mut self,
        acl: A,
        controller: &str,
        apply_to: &[&str],
        exclude: &[&str],
    ) -> &mut Self {
        self.acls
            .add_for_controller(Arc::new(acl), controller, apply_to, exclude);
        self
    }

    pub fn register_acl_for_route<A: Acl + 'static>(&mut self, acl: A, route_name: &str) -> &mut Self {
        self.acls.add_for_route(Arc::new(acl), route_name);
        self
    }

    /// Runs before every request, ahead of route resolution
    pub fn on_pre_route<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        self.pre_route.push(Arc::new(hook));
        self
    }

    /// Runs once a route has been resolved, before access checks
    pub fn on_post_route<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Request, &ResolvedRoute) + Send + Sync + 'static,
    {
        self.post_route.push(Arc::new(hook));
        self
    }

    /// Registers the routes declared in the configuration file
    ///
    /// Routes naming an unknown callback are skipped with a warning.
    /// Returns how many routes were registered.
    pub fn register_config_routes(&mut self) -> anyhow::Result<usize> {
        if !self.config.application.register_routes_defined_in_config_file {
            debug!("Config file routes disabled");
            return Ok(0);
        }

        let routes = self.config.routes.clone();
        let mut registered = 0;

        for entry in &routes {
            let handler = match entry.target() {
                RouteCallback::Named(name) => match self.callbacks.get(name) {
                    Some(handler) => Some(Arc::clone(handler)),
                    None => {
                        warn!(route = %entry.name, callback = name, "Unknown callback, skipping route");
                        continue;
                    }
                },
                RouteCallback::ControllerAction { .. } => None,
            };

            let template = self
                .router
                .register_route(entry.method, &entry.pattern)
                .with_context(|| format!("Invalid pattern for configured route {:?}", entry.name))?;

            template.set_name(entry.name.as_str());
            match (entry.target(), handler) {
                (RouteCallback::ControllerAction { controller, action }, _) => {
                    template.use_controller(controller, action);
                }
                (RouteCallback::Named(_), Some(handler)) => {
                    template.set_handler(handler);
                }
                (RouteCallback::Named(_), None) => {}
            }
            for (key, value) in &entry.options {
                template.set_meta(key.as_str(), value.as_str());
            }

            info!(route = %entry.name, method = %entry.method, pattern = %entry.pattern, "Registered configured route");
            registered += 1;
        }

        Ok(registered)
    }

    // -- Dispatch --

    /// Dispatches a request and always produces a response
    ///
    /// Failures are turned into error responses here and nowhere else.
    pub fn handle(&self, request: &Request) -> Response {
        let mut response = match self.dispatch(request) {
            Ok(response) => response,
            Err(error) => self.failure_response(&error),
        };
        response.finalize();

        info!(
            method = %request.method(),
            path = request.path(),
            status = response.status_code(),
            "Request handled"
        );
        response
    }

    /// Runs the dispatch pipeline, reporting failures as typed errors
    pub fn dispatch(&self, request: &Request) -> Result<Response, DispatchError> {
        for hook in &self.pre_route {
            hook(request);
        }
        let route = self.router.resolve(request)?;
        for hook in &self.post_route {
            hook(request, &route);
        }

        info!(
            method = %request.method(),
            path = request.path(),
            pattern = route.pattern().raw(),
            route = route.name(),
            "Dispatching route"
        );

        let mut ctx = RequestContext::new(self, request, route);
        match self.run_stages(&mut ctx) {
            Ok(()) => {
                ctx.enter(Stage::Done);
                Ok(ctx.into_response())
            }
            Err(error) => {
                ctx.enter(Stage::Failed(error.kind()));
                Err(error)
            }
        }
    }

    /// Stages after resolution; an ACL redirect ends the run early
    fn run_stages(&self, ctx: &mut RequestContext<'_>) -> Result<(), DispatchError> {
        ctx.enter(Stage::AclChecking);
        if let Some(location) = self.check_acls(ctx)? {
            ctx.redirect(&location, Status::SEE_OTHER);
            return Ok(());
        }

        match self.validation_mode {
            ValidationMode::None => self.authenticate(ctx)?,
            ValidationMode::BeforeAuth => {
                self.validate(ctx)?;
                self.authenticate(ctx)?;
            }
            ValidationMode::AfterAuth => {
                self.authenticate(ctx)?;
                self.validate(ctx)?;
            }
        }

        let route = ctx.route().clone();

        ctx.enter(Stage::PreDispatching);
        run_hooks(route.pre_dispatch_actions(), &route, ctx)?;

        ctx.enter(Stage::Invoking);
        self.invoke(&route, ctx)?;

        ctx.enter(Stage::PostDispatching);
        run_hooks(route.post_dispatch_actions(), &route, ctx)?;

        Ok(())
    }

    /// Evaluates applicable ACLs; the first denial decides
    ///
    /// Returns the redirect location when the denying ACL has one.
    fn check_acls(&self, ctx: &RequestContext<'_>) -> Result<Option<String>, DispatchError> {
        let route = ctx.route();

        for acl in self.acls.applicable(route) {
            if acl.is_allowed(ctx.request(), route) {
                continue;
            }

            if let Some(location) = acl.redirect_url() {
                info!(route = route.name(), %location, "Access denied, redirecting");
                return Ok(Some(location));
            }
            return Err(DispatchError::AccessDenied {
                message: acl.message(),
            });
        }

        Ok(None)
    }

    fn authenticate(&self, ctx: &mut RequestContext<'_>) -> Result<(), DispatchError> {
        let Some(authenticator) = ctx.route().authenticator().cloned() else {
            return Ok(());
        };
        ctx.enter(Stage::Authenticating);

        let request = ctx.request();
        let credentials = request
            .credentials()
            .ok_or(DispatchError::AuthenticationRequired)?;

        if authenticator.authenticate(&credentials.user, &credentials.password, request.remote_address()) {
            debug!(user = %credentials.user, "Authenticated");
            Ok(())
        } else {
            Err(DispatchError::AuthenticationFailed {
                message: authenticator.message(),
            })
        }
    }

    fn validate(&self, ctx: &mut RequestContext<'_>) -> Result<(), DispatchError> {
        ctx.enter(Stage::Validating);

        if ctx.is_valid_request() {
            Ok(())
        } else {
            Err(DispatchError::BadRequest {
                violations: ctx.violations().clone(),
            })
        }
    }

    fn invoke(&self, route: &ResolvedRoute, ctx: &mut RequestContext<'_>) -> Result<(), DispatchError> {
        let args = route.args();

        match route.action() {
            Action::None => Err(DispatchError::NoActionDefined {
                pattern: route.pattern().raw().to_string(),
            }),
            Action::Callable(handler) => handler(ctx, &args).map_err(DispatchError::from_handler),
            Action::Controller { controller, action } => {
                let mut instance = self.controllers.instantiate(controller, action, self)?;
                debug!(%controller, %action, "Invoking controller action");

                instance.pre_dispatch(ctx).map_err(DispatchError::from_handler)?;
                instance
                    .call_action(action, ctx, &args)
                    .map_err(DispatchError::from_handler)?;
                instance.post_dispatch(ctx).map_err(DispatchError::from_handler)
            }
        }
    }

    fn failure_response(&self, failure: &DispatchError) -> Response {
        let status = failure.status();

        if status >= Status::INTERNAL_SERVER_ERROR {
            error!(error = %failure, "Dispatch failed");
        } else {
            warn!(error = %failure, status, "Request rejected");
        }

        let trace = (status >= Status::INTERNAL_SERVER_ERROR && !self.is_production())
            .then(|| failure.trace());
        Response::exception(failure, status, trace.as_deref())
    }
}

fn run_hooks(
    hooks: &[crate::route::Hook],
    route: &ResolvedRoute,
    ctx: &mut RequestContext<'_>,
) -> Result<(), DispatchError> {
    for hook in hooks {
        hook(route, ctx).map_err(DispatchError::from_handler)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route_without_action_is_internal_error() {
        let mut app = Application::new(Config::default());
        app.register_route(Method::Get, "/empty").unwrap();

        let response = app.handle(&Request::new(Method::Get, "/empty"));
        assert_eq!(response.status_code(), 500);
        assert!(response.body().starts_with("No action defined for route /empty."));
    }

    #[test]
    fn test_production_hides_trace() {
        let mut app = Application::new(Config::default());
        app.register_route(Method::Get, "/boom")
            .unwrap()
            .set_action(|_, _| Err(anyhow::anyhow!("exploded")));

        let response = app.handle(&Request::new(Method::Get, "/boom"));
        assert_eq!(response.status_code(), 500);
        assert_eq!(response.body(), "exploded");
    }

    #[test]
    fn test_development_shows_trace() {
        let mut config = Config::default();
        config.application.environment = crate::config::Environment::Development;
        let mut app = Application::new(config);
        app.register_route(Method::Get, "/boom")
            .unwrap()
            .set_action(|_, _| Err(anyhow::anyhow!("exploded")));

        let response = app.handle(&Request::new(Method::Get, "/boom"));
        assert!(response.body().starts_with("exploded\n\nTrace:\n"));
    }

    #[test]
    fn test_config_routes() {
        let config = Config::parse(
            r#"
            [application]
            register_routes_defined_in_config_file = true

            [[routes]]
            name = "ping"
            pattern = "/ping"
            callback = "pong"
            options = { public = "yes" }

            [[routes]]
            name = "ghost"
            pattern = "/ghost"
            callback = "missing"

            [[routes]]
            name = "home"
            pattern = "/"
            callback = "Pages::home"
            "#,
        )
        .unwrap();

        let mut app = Application::new(config);
        app.register_callback("pong", |ctx, _| {
            ctx.response_mut().set_body("pong", false);
            Ok(())
        });

        assert_eq!(app.register_config_routes().unwrap(), 2);

        let (_, ping) = app.router().find_by_name("ping").unwrap();
        assert_eq!(ping.meta("public"), Some("yes"));
        assert!(app.router().find_by_name("ghost").is_none());

        let (_, home) = app.router().find_by_name("home").unwrap();
        assert_eq!(home.controller_target(), Some(("Pages", "home")));

        let response = app.handle(&Request::new(Method::Get, "/ping"));
        assert_eq!(response.body(), "pong");
    }

    #[test]
    fn test_config_routes_can_be_disabled() {
        let mut config = Config::default();
        config.routes.push(crate::config::RouteConfig {
            name: "x".into(),
            method: Method::Get,
            pattern: "/x".into(),
            callback: "X::y".into(),
            options: HashMap::new(),
        });

        let mut app = Application::new(config);
        assert_eq!(app.register_config_routes().unwrap(), 0);
        assert!(app.router().is_empty());
    }
}
