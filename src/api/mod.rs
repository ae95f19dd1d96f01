//! Jocarsa Suite Module Server
//!
//! HTTP API layer serving the business modules, built with Axum.
//!
//! # Endpoints
//!
//! ## Modules
//! - `GET /api/modules` - List available modules
//! - `GET /api/dashboard` - Cross-module statistics
//! - `GET /api/module/:module` - Fetch a module's data
//! - `POST /api/module/:module` - Execute a module action (`{action, params}`)
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use jocarsa_suite::api::{serve, ApiConfig, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::new("127.0.0.1", 5000, "data");
//!     serve(AppState::new(config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/modules", get(routes::modules::list_modules))
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .route(
            "/module/:module",
            get(routes::modules::get_module_data).post(routes::modules::execute_action),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let module_count = state.registry.len();
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(modules = module_count, "Jocarsa Suite API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Jocarsa Suite API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = ApiConfig::new("127.0.0.1", 0, dir.path());
        (build_router(AppState::new(config)), dir)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _dir) = create_test_app();
        let (status, _) = send(app, get("/health/live")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_modules() {
        let (app, _dir) = create_test_app();
        let (status, body) = send(app, get("/api/modules")).await;

        assert_eq!(status, StatusCode::OK);
        let modules = body["modules"].as_array().unwrap();
        assert_eq!(modules.len(), 4);
        assert_eq!(
            modules[0],
            json!({
                "type": "crm",
                "name": "CRM - Gestión de Clientes",
                "icon": "👥",
                "description": "Gestiona clientes, contactos y oportunidades de venta",
                "category": "marketing"
            })
        );
    }

    #[tokio::test]
    async fn test_module_data_empty() {
        let (app, _dir) = create_test_app();
        let (status, body) = send(app, get("/api/module/crm")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(
            body["data"],
            json!({"clientes": [], "contactos": [], "oportunidades": []})
        );
    }

    #[tokio::test]
    async fn test_unknown_module() {
        let (app, _dir) = create_test_app();
        let (status, body) = send(app, get("/api/module/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Módulo no encontrado");
    }

    #[tokio::test]
    async fn test_execute_action_then_read() {
        let (app, _dir) = create_test_app();

        let (status, body) = send(
            app.clone(),
            post(
                "/api/module/proyectos",
                r#"{"action": "add_proyecto", "params": {"nombre": "Web", "descripcion": "Sitio"}}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["result"]["message"], "Proyecto creado");

        let (_, body) = send(app, get("/api/module/proyectos")).await;
        assert_eq!(body["data"]["proyectos"][0]["nombre"], "Web");
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let (app, _dir) = create_test_app();
        let (status, body) = send(
            app,
            post("/api/module/crm", r#"{"action": "fly", "params": {}}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Acción desconocida: fly");
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let (app, _dir) = create_test_app();
        let (status, body) = send(app, post("/api/module/crm", "not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_dashboard_summaries() {
        let (app, _dir) = create_test_app();
        let (status, body) = send(app, get("/api/dashboard")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["timestamp"].is_string());
        let entries = body["modules_summary"].as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0]["module"], "crm");
        assert_eq!(entries[0]["summary"]["total_clientes"], 0);
    }

    #[tokio::test]
    async fn test_dashboard_reports_broken_module() {
        let (app, dir) = create_test_app();
        std::fs::write(dir.path().join("proyectos.json"), "{broken").unwrap();

        let (status, body) = send(app, get("/api/dashboard")).await;
        assert_eq!(status, StatusCode::OK);

        let entry = body["modules_summary"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["module"] == "proyectos")
            .unwrap()
            .clone();
        assert!(entry.get("summary").is_none());
        assert!(entry["error"].is_string());
    }
}
