//! Dashboard Route
//!
//! - GET /api/dashboard - One statistics block per module

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{DashboardResponse, SummaryEntry};
use crate::api::state::AppState;
use crate::modules::now_iso;

/// GET /api/dashboard
///
/// A module whose summary fails is reported with an `error` instead of
/// failing the whole response.
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let ctx = state.module_context();
    let mut modules_summary = Vec::with_capacity(state.registry.len());

    for backend in state.registry.iter() {
        let info = backend.info();
        let entry = match backend.get_summary(&ctx).await {
            Ok(summary) => SummaryEntry {
                module: info.id.to_string(),
                name: Some(info.name.to_string()),
                summary: Some(summary),
                error: None,
            },
            Err(e) => {
                tracing::warn!(module = info.id, error = %e, "Module summary failed");
                SummaryEntry {
                    module: info.id.to_string(),
                    name: Some(info.name.to_string()),
                    summary: None,
                    error: Some(e.to_string()),
                }
            }
        };
        modules_summary.push(entry);
    }

    Json(DashboardResponse {
        timestamp: Some(now_iso()),
        modules_summary,
    })
}
