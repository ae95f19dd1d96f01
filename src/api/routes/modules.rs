//! Module Routes
//!
//! - GET /api/modules - List available modules
//! - GET /api/module/:module - Full data set of one module
//! - POST /api/module/:module - Execute a named action on one module
//!
//! Rejected actions (unknown name, missing record) answer 400 with
//! `{ok: false, error}` instead of a 200 whose `result` carries the error.
//! Clients still accept the older `{ok: true, result: {error}}` shape.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ActionBody, ActionResponse, ModuleDataResponse, ModuleListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::modules::ModuleBackend;

fn backend<'a>(state: &'a AppState, module: &str) -> ApiResult<&'a Arc<dyn ModuleBackend>> {
    state
        .registry
        .get(module)
        .ok_or_else(|| ApiError::ModuleNotFound(module.to_string()))
}

/// GET /api/modules
pub async fn list_modules(State(state): State<Arc<AppState>>) -> Json<ModuleListResponse> {
    Json(ModuleListResponse {
        modules: state.registry.descriptors(),
    })
}

/// GET /api/module/:module
pub async fn get_module_data(
    State(state): State<Arc<AppState>>,
    Path(module): Path<String>,
) -> ApiResult<Json<ModuleDataResponse>> {
    let backend = backend(&state, &module)?;
    let data = backend.get_data(&state.module_context()).await?;

    Ok(Json(ModuleDataResponse {
        ok: true,
        data: Some(data),
        error: None,
    }))
}

/// POST /api/module/:module
///
/// An empty body is treated as `{}` (empty action, no params).
pub async fn execute_action(
    State(state): State<Arc<AppState>>,
    Path(module): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ActionResponse>> {
    let backend = backend(&state, &module)?;

    let body: ActionBody = if body.iter().all(u8::is_ascii_whitespace) {
        ActionBody {
            action: String::new(),
            params: Default::default(),
        }
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::Validation(e.to_string()))?
    };

    let result = backend
        .execute(&state.module_context(), &body.action, &body.params)
        .await?;

    tracing::info!(module = %module, action = %body.action, "Executed module action");

    Ok(Json(ActionResponse {
        ok: true,
        result: Some(result),
        error: None,
    }))
}
