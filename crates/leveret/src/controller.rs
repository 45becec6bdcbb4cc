// File: src/controller.rs
// Purpose: Controller abstraction and the registry used to instantiate them

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::application::Application;
use crate::context::RequestContext;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Controller \"{0}\" is not registered.")]
    NotRegistered(String),

    #[error("Method \"{action}\" is not defined in controller \"{controller}\".")]
    UnknownAction { controller: String, action: String },
}

/// A group of related actions
///
/// A fresh instance is created for every dispatched request.
pub trait Controller: Send {
    fn has_action(&self, action: &str) -> bool;

    fn call_action(
        &mut self,
        action: &str,
        ctx: &mut RequestContext<'_>,
        params: &[&str],
    ) -> anyhow::Result<()>;

    /// Runs before the action
    fn pre_dispatch(&mut self, _ctx: &mut RequestContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the action
    fn post_dispatch(&mut self, _ctx: &mut RequestContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub type ControllerFactory = Arc<dyn Fn(&Application) -> Box<dyn Controller> + Send + Sync>;

/// Controller factories keyed by the name routes refer to
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Application) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiates `name` and checks that it defines `action`
    pub fn instantiate(
        &self,
        name: &str,
        action: &str,
        app: &Application,
    ) -> Result<Box<dyn Controller>, ControllerError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ControllerError::NotRegistered(name.to_string()))?;

        let controller = factory(app);
        if !controller.has_action(action) {
            return Err(ControllerError::UnknownAction {
                controller: name.to_string(),
                action: action.to_string(),
            });
        }
        Ok(controller)
    }
}
