//! Data Transfer Objects
//!
//! Request and response types for the module endpoints. The same types are
//! serialized by the server and deserialized by the dashboard client, so the
//! field names here are the wire contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category used when a module does not declare one
pub const DEFAULT_CATEGORY: &str = "general";

/// Icon used when a module does not declare one
pub const DEFAULT_ICON: &str = "📦";

// ============================================
// MODULE LIST
// ============================================

/// A server-declared module as listed by `GET /api/modules`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Stable identifier, also the path segment of the module endpoint
    #[serde(rename = "type")]
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl ModuleDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            description: description.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Declared category, or [`DEFAULT_CATEGORY`] when absent or empty
    pub fn category(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }
}

/// `GET /api/modules` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleListResponse {
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
}

// ============================================
// DASHBOARD
// ============================================

/// Per-module statistics block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Identifier of the owning module
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Statistic name → value, in server order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Map<String, Value>>,
    /// Set instead of `summary` when the module failed to summarise itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /api/dashboard` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub modules_summary: Vec<SummaryEntry>,
}

// ============================================
// MODULE DATA & ACTIONS
// ============================================

/// `GET /api/module/{type}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDataResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `POST /api/module/{type}` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBody {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// `POST /api/module/{type}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A named action against one module. The module identifier travels in the
/// URL path, the rest in an [`ActionBody`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub module: String,
    pub action: String,
    pub params: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(module: impl Into<String>, action: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            params,
        }
    }

    /// Wire body for this request
    pub fn body(&self) -> ActionBody {
        ActionBody {
            action: self.action.clone(),
            params: self.params.clone(),
        }
    }
}

// ============================================
// HEALTH
// ============================================

/// `GET /health` response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub modules: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
