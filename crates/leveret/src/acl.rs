// File: src/acl.rs
// Purpose: Access control rules attached to controllers and named routes

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::Request;
use crate::route::{ResolvedRoute, RouteTemplate, DEFAULT_ROUTE_NAME};

/// Wildcard matching every action of a controller
pub const ALL_ACTIONS: &str = "*";

/// An access rule evaluated before authentication
pub trait Acl: Send + Sync {
    fn is_allowed(&self, request: &Request, route: &ResolvedRoute) -> bool;

    /// Detail reported when access is denied
    fn message(&self) -> Option<String> {
        None
    }

    /// Where to send denied clients instead of failing the request
    fn redirect_url(&self) -> Option<String> {
        None
    }
}

struct ControllerAcl {
    acl: Arc<dyn Acl>,
    apply_to: Vec<String>,
    exclude: Vec<String>,
}

impl ControllerAcl {
    fn applies_to(&self, action: &str) -> bool {
        let included = self
            .apply_to
            .iter()
            .any(|a| a == ALL_ACTIONS || a == action);
        included && !self.exclude.iter().any(|a| a == action)
    }
}

/// ACL registry keyed by controller and by route name
#[derive(Default)]
pub struct Acls {
    controllers: HashMap<String, Vec<ControllerAcl>>,
    routes: HashMap<String, Vec<Arc<dyn Acl>>>,
}

impl Acls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ACL for a controller's actions
    ///
    /// An empty `apply_to` means every action; `exclude` always wins.
    pub fn add_for_controller(
        &mut self,
        acl: Arc<dyn Acl>,
        controller: &str,
        apply_to: &[&str],
        exclude: &[&str],
    ) {
        let apply_to = if apply_to.is_empty() {
            vec![ALL_ACTIONS.to_string()]
        } else {
            apply_to.iter().map(|a| a.to_string()).collect()
        };

        self.controllers
            .entry(controller.to_string())
            .or_default()
            .push(ControllerAcl {
                acl,
                apply_to,
                exclude: exclude.iter().map(|a| a.to_string()).collect(),
            });
    }

    pub fn add_for_route(&mut self, acl: Arc<dyn Acl>, route_name: &str) {
        self.routes
            .entry(route_name.to_string())
            .or_default()
            .push(acl);
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty() && self.routes.is_empty()
    }

    /// ACLs covering `action` of `controller`, in registration order
    pub fn for_controller(&self, controller: &str, action: &str) -> Vec<Arc<dyn Acl>> {
        self.controllers
            .get(controller)
            .map(|acls| {
                acls.iter()
                    .filter(|c| c.applies_to(action))
                    .map(|c| Arc::clone(&c.acl))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// ACLs registered for a route name; the default name never has any
    pub fn for_route(&self, name: &str) -> Vec<Arc<dyn Acl>> {
        if name == DEFAULT_ROUTE_NAME {
            return Vec::new();
        }
        self.routes.get(name).cloned().unwrap_or_default()
    }

    /// Every ACL applying to a route: controller ACLs first, then route ACLs
    pub fn applicable(&self, route: &RouteTemplate) -> Vec<Arc<dyn Acl>> {
        let mut acls = match route.controller_target() {
            Some((controller, action)) => self.for_controller(controller, action),
            None => Vec::new(),
        };
        acls.extend(self.for_route(route.name()));
        acls
    }
}
