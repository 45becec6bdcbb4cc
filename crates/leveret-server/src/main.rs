mod adapter;
mod demo;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use leveret::{Application, Config};
use tracing::{error, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    app: Arc<Application>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config_path = std::env::var("LEVERET_CONFIG").unwrap_or_else(|_| "leveret.toml".to_string());
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        warn!("Failed to load config: {:#}, using defaults", e);
        Config::default()
    });

    info!(
        app = %config.application.name,
        environment = ?config.application.environment,
        "leveret starting..."
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        app: Arc::new(demo::build(config)?),
    };

    let router = Router::new().fallback(dispatch).with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Hands every request to the leveret application
async fn dispatch(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match adapter::to_request(&method, &uri, &headers, &body, Some(remote)) {
        Ok(request) => request,
        Err(e) => {
            warn!(%method, %uri, "Rejected request: {}", e);
            return (StatusCode::METHOD_NOT_ALLOWED, e.to_string()).into_response();
        }
    };

    // Dispatch is synchronous; keep it off the async workers
    let app = Arc::clone(&state.app);
    match tokio::task::spawn_blocking(move || app.handle(&request)).await {
        Ok(response) => adapter::into_axum(response),
        Err(e) => {
            error!("Dispatch task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
