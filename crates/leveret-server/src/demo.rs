// File: src/demo.rs
// Purpose: Demo application wired with routes, a controller, an ACL and auth

use std::env;

use leveret::acl::Acl;
use leveret::auth::StaticCredentials;
use leveret::validation::{Length, NotBlank, OneOf};
use leveret::{
    Application, Config, Controller, DispatchError, Method, Request, RequestContext, ResolvedRoute,
};
use serde_json::json;
use tracing::info;

/// Static pages served through the controller registry
struct Pages;

impl Controller for Pages {
    fn has_action(&self, action: &str) -> bool {
        matches!(action, "home" | "about")
    }

    fn call_action(
        &mut self,
        action: &str,
        ctx: &mut RequestContext<'_>,
        _params: &[&str],
    ) -> anyhow::Result<()> {
        let body = match action {
            "home" => format!("<h1>Welcome to {}</h1>", ctx.app().name()),
            _ => "<p>A tiny framework for tiny apps.</p>".to_string(),
        };
        ctx.response_mut().set_body(body, false);
        Ok(())
    }
}

/// Only lets loopback clients through
struct LocalOnly;

impl Acl for LocalOnly {
    fn is_allowed(&self, request: &Request, _route: &ResolvedRoute) -> bool {
        matches!(request.remote_address(), Some("127.0.0.1") | Some("::1"))
    }

    fn message(&self) -> Option<String> {
        Some("local clients only".to_string())
    }
}

fn require_valid(ctx: &RequestContext<'_>) -> anyhow::Result<()> {
    if ctx.is_valid_request() {
        Ok(())
    } else {
        Err(DispatchError::BadRequest {
            violations: ctx.violations().clone(),
        }
        .into())
    }
}

/// Builds the demo application on top of `config`
pub fn build(config: Config) -> anyhow::Result<Application> {
    let mut app = Application::new(config);

    app.register_controller("Pages", |_app: &Application| Box::new(Pages) as Box<dyn Controller>);

    app.register_callback("ping", |ctx, _| {
        let body = json!({"pong": true, "app": ctx.app().name()});
        ctx.set_response(leveret::Response::json(&body, 200));
        Ok(())
    });

    app.register_route(Method::Get, "/")?
        .set_name("home")
        .use_controller("Pages", "home");

    app.register_route(Method::Get, "/about")?
        .set_name("about")
        .use_controller("Pages", "about");

    app.register_route(Method::Get, "/hello/:(string)name")?
        .set_name("hello")
        .add_request_constraint("name", OneOf::new(["paco", "maria"]))
        .set_action(|ctx, params| {
            require_valid(ctx)?;
            let name = params.first().copied().unwrap_or_default();
            ctx.response_mut().set_body(format!("Hello {}!", name), false);
            Ok(())
        });

    app.register_route(Method::Get, "/bye/:(string)name")?
        .set_name("bye")
        .set_required_param("name")
        .add_request_constraint("name", NotBlank)
        .add_request_constraint("name", Length::between(3, 10))
        .set_action(|ctx, params| {
            require_valid(ctx)?;
            let name = params.first().copied().unwrap_or_default();
            ctx.response_mut().set_body(format!("Bye {}!", name), false);
            Ok(())
        });

    let user = env::var("LEVERET_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
    let password = env::var("LEVERET_ADMIN_PASSWORD").unwrap_or_else(|_| "secret".to_string());

    app.register_route(Method::Get, "/admin/item/:(int)id")?
        .set_name("admin_item")
        .auth_required(StaticCredentials::new().with_user(user, password))
        .set_action(|ctx, params| {
            let id = params.first().copied().unwrap_or_default();
            let body = json!({"id": id, "user": ctx.request().auth_user()});
            ctx.set_response(leveret::Response::json(&body, 200));
            Ok(())
        });
    app.register_acl_for_route(LocalOnly, "admin_item");

    let configured = app.register_config_routes()?;
    info!(routes = app.router().len(), configured, "Demo application ready");

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn app() -> Application {
        build(Config::default()).unwrap()
    }

    #[rstest]
    #[case("/hello/maria", 200, "Hello maria!")]
    #[case("/hello/paco/", 200, "Hello paco!")]
    #[case("/hello/pepe", 400, "name: The value \"pepe\" is not allowed. Allowed values: paco, maria.")]
    fn test_hello(#[case] path: &str, #[case] status: u16, #[case] body: &str) {
        let response = app().handle(&Request::new(Method::Get, path));
        assert_eq!(response.status_code(), status);
        assert_eq!(response.body(), body);
    }

    #[rstest]
    #[case("/bye/ana", 200)]
    #[case("/bye/an", 400)]
    #[case("/bye/anastasia-maria", 400)]
    #[case("/bye/ ", 400)]
    #[case("/bye", 404)]
    fn test_bye(#[case] path: &str, #[case] status: u16) {
        let response = app().handle(&Request::new(Method::Get, path));
        assert_eq!(response.status_code(), status, "{}", response.body());
    }

    #[test]
    fn test_home_uses_controller() {
        let response = app().handle(&Request::new(Method::Get, "/"));
        assert_eq!(response.body(), "<h1>Welcome to NoNamedApp</h1>");
        assert_eq!(response.content_type(), Some("text/html"));
    }

    #[test]
    fn test_admin_requires_local_client_and_credentials() {
        let app = app();
        let remote = Request::new(Method::Get, "/admin/item/3").with_remote_address("10.0.0.8");
        assert_eq!(app.handle(&remote).body(), "Access not allowed: local clients only");

        let local = Request::new(Method::Get, "/admin/item/3").with_remote_address("127.0.0.1");
        assert_eq!(app.handle(&local).body(), "Authentication required!");
    }
}
