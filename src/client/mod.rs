//! Suite API Client
//!
//! Transport between the dashboard and a suite server. Everything above this
//! layer talks to a [`SuiteApi`], so sessions can be driven by the HTTP client
//! or by an in-memory fake in tests.

mod error;
mod http;

pub use error::ClientError;
pub use http::HttpSuiteClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::actions::ActionResult;
use crate::api::dto::{ActionRequest, DashboardResponse, ModuleDescriptor};

/// Operations the dashboard needs from a suite server
#[async_trait]
pub trait SuiteApi: Send + Sync {
    /// `GET /api/modules`
    async fn fetch_modules(&self) -> Result<Vec<ModuleDescriptor>, ClientError>;

    /// `GET /api/dashboard`
    async fn fetch_dashboard(&self) -> Result<DashboardResponse, ClientError>;

    /// `GET /api/module/{id}`, returning the `data` payload
    async fn fetch_module_data(&self, module: &str) -> Result<Value, ClientError>;

    /// `POST /api/module/{id}`. A server-side refusal is an `Ok` result with
    /// `success == false`; only transport and decode failures are errors.
    async fn execute_action(&self, request: &ActionRequest) -> Result<ActionResult, ClientError>;
}
