//! Module Backends
//!
//! Server-side implementations of the business modules. Each backend owns one
//! JSON file in the data directory and exposes the same four capabilities:
//! descriptive info, its full data set, named actions, and a dashboard summary.
//!
//! ## Modules
//!
//! - `crm`: clients, contacts and sales opportunities
//! - `proyectos`: projects and their tasks
//! - `formularios`: dynamic forms and their responses
//! - `informes`: reports computed across the other modules' files

mod crm;
mod forms;
mod projects;
mod reports;
mod store;

pub use crm::{Cliente, Contacto, CrmBackend, CrmData, Oportunidad, CRM_FILE};
pub use forms::{Formulario, FormsBackend, FormsData, Respuesta, FORMS_FILE};
pub use projects::{Proyecto, ProjectsBackend, ProjectsData, Tarea, PROJECTS_FILE};
pub use reports::{Informe, ReportsBackend, ReportsData, REPORTS_FILE};
pub use store::{read_json, JsonStore};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::api::dto::ModuleDescriptor;

/// Static description of a backend module
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
}

impl ModuleInfo {
    /// Descriptor as served by `GET /api/modules`
    pub fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new(self.id, self.name, self.icon, self.description)
            .with_category(self.category)
    }
}

/// Per-request context handed to backends
#[derive(Debug, Clone)]
pub struct ModuleContext {
    /// Directory holding the module data files
    pub data_dir: PathBuf,
    /// Name recorded as the author of contacts and reports
    pub user: String,
}

impl ModuleContext {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            user: "Sistema".to_string(),
        }
    }
}

/// Common trait for all module backends
#[async_trait]
pub trait ModuleBackend: Send + Sync {
    /// Identifier, name, icon and category
    fn info(&self) -> &ModuleInfo;

    /// Full data set of the module
    async fn get_data(&self, ctx: &ModuleContext) -> Result<Value, BackendError>;

    /// Run a named action. The returned object carries a `message` on success.
    async fn execute(
        &self,
        ctx: &ModuleContext,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, BackendError>;

    /// Statistics shown on the dashboard
    async fn get_summary(&self, _ctx: &ModuleContext) -> Result<Map<String, Value>, BackendError> {
        Ok(Map::new())
    }
}

/// Errors raised by module backends
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Acción desconocida: {0}")]
    UnknownAction(String),

    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Errors caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, BackendError::UnknownAction(_) | BackendError::NotFound(_))
    }
}

/// Set of backends keyed by module identifier, iterated in identifier order
#[derive(Clone, Default)]
pub struct BackendRegistry {
    modules: BTreeMap<String, Arc<dyn ModuleBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four built-in modules
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CrmBackend::new()));
        registry.register(Arc::new(ProjectsBackend::new()));
        registry.register(Arc::new(FormsBackend::new()));
        registry.register(Arc::new(ReportsBackend::new()));
        registry
    }

    pub fn register(&mut self, backend: Arc<dyn ModuleBackend>) {
        let id = backend.info().id.to_string();
        tracing::debug!(module = %id, "Registered module backend");
        self.modules.insert(id, backend);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn ModuleBackend>> {
        self.modules.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ModuleBackend>> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.iter().map(|b| b.info().descriptor()).collect()
    }
}

// ============================================
// Parameter helpers
// ============================================

/// Record field deserializer treating an explicit `null` like a missing key.
/// Older data files store `null` for skipped optional answers.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Current local time in the `YYYY-MM-DDTHH:MM:SS.ffffff` form stored in records
pub(crate) fn now_iso() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// String parameter; missing or null yields `default`, non-strings are stringified
pub(crate) fn param_str(params: &Map<String, Value>, key: &str, default: &str) -> String {
    match params.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric parameter, accepting numbers and numeric strings
pub(crate) fn param_f64(params: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match params.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Integer parameter; fractional numbers are truncated
pub(crate) fn param_i64(params: &Map<String, Value>, key: &str, default: i64) -> i64 {
    match params.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Raw parameter value for reference fields (ids may be numbers or strings)
pub(crate) fn param_ref(params: &Map<String, Value>, key: &str) -> Option<Value> {
    match params.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}

/// Does a stored record id match a reference value sent by a client?
pub(crate) fn id_matches(id: u64, reference: Option<&Value>) -> bool {
    match reference {
        Some(Value::Number(n)) => n.as_u64() == Some(id),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok() == Some(id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_registry_defaults_sorted() {
        let registry = BackendRegistry::with_defaults();
        let ids: Vec<_> = registry.descriptors().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["crm", "formularios", "informes", "proyectos"]);
    }

    #[test]
    fn test_param_helpers() {
        let p = params(json!({"a": null, "b": "x", "n": 12.7, "s": " 42 ", "bad": "abc"}));

        assert_eq!(param_str(&p, "a", "d"), "d");
        assert_eq!(param_str(&p, "b", "d"), "x");
        assert_eq!(param_str(&p, "missing", ""), "");
        assert_eq!(param_f64(&p, "n", 0.0), 12.7);
        assert_eq!(param_f64(&p, "bad", 3.0), 3.0);
        assert_eq!(param_i64(&p, "n", 0), 12);
        assert_eq!(param_i64(&p, "s", 0), 42);
        assert_eq!(param_ref(&p, "a"), None);
    }

    #[test]
    fn test_id_matches() {
        assert!(id_matches(3, Some(&json!(3))));
        assert!(id_matches(3, Some(&json!("3"))));
        assert!(!id_matches(3, Some(&json!(4))));
        assert!(!id_matches(3, None));
    }

    #[test]
    fn test_backend_error_classification() {
        assert!(BackendError::UnknownAction("x".into()).is_client_error());
        assert!(!BackendError::Io(std::io::Error::other("disk")).is_client_error());
        assert_eq!(
            BackendError::UnknownAction("fly".into()).to_string(),
            "Acción desconocida: fly"
        );
    }
}
