// File: src/context.rs
// Purpose: Per-request state handed to hooks, actions and controllers

use once_cell::unsync::OnceCell;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::application::{Application, Stage};
use crate::filter::Filter;
use crate::http::{Request, Response};
use crate::route::ResolvedRoute;
use crate::error::Violations;
use crate::validation::{merge_sources, validate_params, value_to_string};

/// Everything known about the request being dispatched
///
/// Body and query parameters are exposed filtered: each parameter goes
/// through the application default filter, then through its route filters
/// in registration order.
pub struct RequestContext<'a> {
    app: &'a Application,
    request: &'a Request,
    route: ResolvedRoute,
    params: Map<String, Value>,
    query: Map<String, Value>,
    response: Response,
    violations: OnceCell<Violations>,
    stage: Stage,
}

impl<'a> RequestContext<'a> {
    pub fn new(app: &'a Application, request: &'a Request, route: ResolvedRoute) -> Self {
        let params = filter_map(request.params(), &route, app.default_filter());
        let query = filter_map(request.query(), &route, app.default_filter());

        let mut response = Response::new();
        response.set_content_type(app.config().application.default_content_type.as_str());

        Self {
            app,
            request,
            route,
            params,
            query,
            response,
            violations: OnceCell::new(),
            stage: Stage::Resolving,
        }
    }

    pub fn app(&self) -> &'a Application {
        self.app
    }

    pub fn request(&self) -> &'a Request {
        self.request
    }

    pub fn route(&self) -> &ResolvedRoute {
        &self.route
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        tracing::debug!(?stage, route = self.route.name(), "Entering stage");
        self.stage = stage;
    }

    // -- Parameters --

    /// Filtered body parameters
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Filtered body parameter rendered as a string
    pub fn param_str(&self, name: &str) -> Option<String> {
        self.param(name).map(value_to_string)
    }

    /// Filtered query parameters
    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&Value> {
        self.query.get(name)
    }

    /// Route parameter value by name
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.route.param_by_name(name)
    }

    /// Body, query and route parameters merged; earlier sources win
    pub fn merged_params(&self) -> Map<String, Value> {
        let route_params: Map<String, Value> = self
            .route
            .params()
            .named()
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();

        merge_sources([&self.params, &self.query, &route_params])
    }

    // -- Validation --

    /// Validates the request against the route requirements
    ///
    /// The result is computed once and reused.
    pub fn violations(&self) -> &Violations {
        self.violations.get_or_init(|| {
            validate_params(
                &self.merged_params(),
                self.route.required_params(),
                self.route.request_constraints(),
            )
        })
    }

    pub fn is_valid_request(&self) -> bool {
        self.violations().is_empty()
    }

    pub fn violation_messages(&self) -> Vec<String> {
        self.violations().messages()
    }

    pub fn violation_messages_as_string(&self, separator: &str) -> String {
        self.violations().as_string(separator)
    }

    // -- Response --

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn set_response(&mut self, response: Response) {
        self.response = response;
    }

    /// Replaces the response with a redirect to an absolute location
    pub fn redirect(&mut self, location: &str, status: u16) -> &mut Response {
        let location = self.request.absolute_url(location);
        tracing::info!(%location, status, "Redirecting");
        self.response = Response::redirect(location, status);
        &mut self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

fn filter_map(
    source: &Map<String, Value>,
    route: &ResolvedRoute,
    default_filter: &Arc<dyn Filter>,
) -> Map<String, Value> {
    source
        .iter()
        .map(|(name, value)| {
            let filtered = route
                .filters_for(name)
                .iter()
                .fold(default_filter.filter(value.clone()), |value, filter| {
                    filter.filter(value)
                });
            (name.clone(), filtered)
        })
        .collect()
}
