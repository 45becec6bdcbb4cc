// File: src/config.rs
// Purpose: Configuration parsing from leveret.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::filter::InputFilter;
use crate::http::Method;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Routes declared in the file, in match priority order
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
    Maintenance,
}

/// When automatic request validation runs relative to authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationMode {
    #[default]
    #[serde(rename = "NO_VALIDATION")]
    None,
    #[serde(rename = "VALIDATION_BEFORE_AUTH")]
    BeforeAuth,
    #[serde(rename = "VALIDATION_AFTER_AUTH")]
    AfterAuth,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_content_type")]
    pub default_content_type: String,

    #[serde(default)]
    pub default_input_filter: InputFilter,

    #[serde(default)]
    pub auto_request_validation_mode: ValidationMode,

    /// Whether `[[routes]]` entries are registered at startup
    #[serde(default)]
    pub register_routes_defined_in_config_file: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// A route declared in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub name: String,

    #[serde(default)]
    pub method: Method,

    pub pattern: String,

    /// `Controller::action`, or the name of a registered callback
    pub callback: String,

    /// Free-form options stored as route metadata
    #[serde(default)]
    pub options: HashMap<String, String>,
}

/// Target of a configured route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCallback<'a> {
    ControllerAction { controller: &'a str, action: &'a str },
    Named(&'a str),
}

impl RouteConfig {
    pub fn target(&self) -> RouteCallback<'_> {
        match self.callback.split_once("::") {
            Some((controller, action)) => RouteCallback::ControllerAction { controller, action },
            None => RouteCallback::Named(&self.callback),
        }
    }
}

// Default values
fn default_name() -> String {
    "NoNamedApp".to_string()
}

fn default_content_type() -> String {
    "text/html".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            environment: Environment::default(),
            default_content_type: default_content_type(),
            default_input_filter: InputFilter::default(),
            auto_request_validation_mode: ValidationMode::default(),
            register_routes_defined_in_config_file: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./leveret.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("leveret.toml")
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn is_production(&self) -> bool {
        self.application.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.application.name, "NoNamedApp");
        assert_eq!(config.application.environment, Environment::Production);
        assert_eq!(config.application.default_content_type, "text/html");
        assert_eq!(config.application.default_input_filter, InputFilter::StripTags);
        assert_eq!(config.application.auto_request_validation_mode, ValidationMode::None);
        assert_eq!(config.server.port, 3000);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.application.register_routes_defined_in_config_file);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [application]
            name = "shop"
            environment = "maintenance"
            default_input_filter = "raw"
            auto_request_validation_mode = "VALIDATION_AFTER_AUTH"

            [[routes]]
            name = "home"
            pattern = "/"
            callback = "Pages::home"

            [[routes]]
            name = "ping"
            method = "POST"
            pattern = "/ping"
            callback = "ping"
            options = { cache = "no" }
        "#;
        let config = Config::parse(toml).unwrap();

        assert!(!config.is_production());
        assert_eq!(config.application.environment, Environment::Maintenance);
        assert_eq!(config.application.default_input_filter, InputFilter::Raw);
        assert_eq!(config.application.auto_request_validation_mode, ValidationMode::AfterAuth);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].method, Method::Get);
        assert_eq!(
            config.routes[0].target(),
            RouteCallback::ControllerAction { controller: "Pages", action: "home" }
        );
        assert_eq!(config.routes[1].method, Method::Post);
        assert_eq!(config.routes[1].target(), RouteCallback::Named("ping"));
        assert_eq!(config.routes[1].options.get("cache").map(String::as_str), Some("no"));
    }

    #[test]
    fn test_unknown_validation_mode_is_rejected() {
        let toml = r#"
            [application]
            auto_request_validation_mode = "SOMETIMES"
        "#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load("does/not/exist.toml").unwrap();
        assert_eq!(config.application.name, "NoNamedApp");
    }
}
