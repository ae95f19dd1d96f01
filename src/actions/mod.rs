//! Action Dispatcher
//!
//! Collects input for a named module action, sends it, interprets the
//! result and announces the outcome on the [`EventBus`]:
//!
//! - success: a notice, then a dashboard refresh request, then a module
//!   refresh request if the acted-on module is the active one
//! - failure: an error notice and nothing else

mod forms;
mod prompt;

pub use forms::{ActionForm, ReportKind};
pub use prompt::{
    collect_input, Collected, FieldKind, FieldSpec, Prompter, ScriptedPrompter, StdinPrompter,
};

use serde_json::Value;

use crate::api::dto::{ActionRequest, ActionResponse};
use crate::client::SuiteApi;
use crate::events::{EventBus, Notice, RefreshTarget, SuiteEvent};

const DEFAULT_SUCCESS_MESSAGE: &str = "Acción completada";
const UNKNOWN_ERROR: &str = "Error desconocido";
const CONNECTION_ERROR: &str = "Error de conexión";

/// Normalised outcome of an action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub success: bool,
    /// Informational message on success
    pub message: Option<String>,
    /// The server's `result` object
    pub payload: Option<Value>,
    /// Set exactly when `success` is false
    pub error: Option<String>,
}

impl ActionResult {
    pub fn success(message: Option<String>, payload: Option<Value>) -> Self {
        Self {
            success: true,
            message,
            payload,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            payload: None,
            error: Some(error.into()),
        }
    }

    /// Interpret a server reply. A reply with `ok: true` whose result
    /// carries an `error` string is a failure.
    pub fn from_response(response: ActionResponse) -> Self {
        if !response.ok {
            return Self::failure(response.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()));
        }

        let payload = response.result;
        let field = |key: &str| {
            payload
                .as_ref()
                .and_then(|p| p.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let error = field("error");
        let message = field("message");

        match error {
            Some(error) => Self {
                payload,
                ..Self::failure(error)
            },
            None => Self::success(message, payload),
        }
    }

    /// Notice shown to the user for this result
    pub fn notice(&self) -> Notice {
        if self.success {
            let message = self
                .message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_SUCCESS_MESSAGE);
            Notice::Success(format!("✅ {}", message))
        } else {
            Notice::Error(
                self.error
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            )
        }
    }
}

/// Sends actions and publishes their consequences
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    bus: EventBus,
}

impl ActionDispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    /// Send `request`. `active_module` is the module shown in the content
    /// panel, if any. Transport failures come back as a failed result.
    pub async fn execute<A: SuiteApi + ?Sized>(
        &self,
        api: &A,
        request: &ActionRequest,
        active_module: Option<&str>,
    ) -> ActionResult {
        let result = match api.execute_action(request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    module = %request.module,
                    action = %request.action,
                    error = %e,
                    "Action request failed"
                );
                ActionResult::failure(CONNECTION_ERROR)
            }
        };

        self.bus.notify(result.notice());

        if result.success {
            tracing::info!(module = %request.module, action = %request.action, "Action executed");
            self.bus
                .publish(SuiteEvent::RefreshRequested(RefreshTarget::Dashboard));
            if active_module == Some(request.module.as_str()) {
                self.bus.publish(SuiteEvent::RefreshRequested(RefreshTarget::Module(
                    request.module.clone(),
                )));
            }
        } else {
            tracing::warn!(
                module = %request.module,
                action = %request.action,
                error = result.error.as_deref().unwrap_or_default(),
                "Action rejected"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{DashboardResponse, ModuleDescriptor};
    use crate::client::ClientError;
    use crate::events::drain;
    use async_trait::async_trait;
    use serde_json::{json, Map};

    struct StaticApi(Result<ActionResult, ClientError>);

    #[async_trait]
    impl SuiteApi for StaticApi {
        async fn fetch_modules(&self) -> Result<Vec<ModuleDescriptor>, ClientError> {
            Ok(Vec::new())
        }

        async fn fetch_dashboard(&self) -> Result<DashboardResponse, ClientError> {
            Ok(DashboardResponse::default())
        }

        async fn fetch_module_data(&self, _module: &str) -> Result<Value, ClientError> {
            Ok(json!({}))
        }

        async fn execute_action(&self, _request: &ActionRequest) -> Result<ActionResult, ClientError> {
            self.0.clone()
        }
    }

    fn request(module: &str) -> ActionRequest {
        ActionRequest::new(module, "add_proyecto", Map::new())
    }

    fn response(value: Value) -> ActionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_response_success() {
        let result = ActionResult::from_response(response(json!({
            "ok": true, "result": {"message": "Proyecto creado", "proyecto": {"id": 1}}
        })));
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some("Proyecto creado"));
        assert_eq!(result.payload.unwrap()["proyecto"]["id"], 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_from_response_failure() {
        let result = ActionResult::from_response(response(json!({"ok": false, "error": "Acción desconocida: x"})));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Acción desconocida: x"));

        let result = ActionResult::from_response(response(json!({"error": "Módulo no encontrado"})));
        assert!(!result.success);

        let result = ActionResult::from_response(response(json!({"ok": false})));
        assert_eq!(result.error.as_deref(), Some("Error desconocido"));
    }

    #[test]
    fn test_error_inside_ok_result_is_failure() {
        let result = ActionResult::from_response(response(json!({
            "ok": true, "result": {"error": "Acción desconocida"}
        })));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Acción desconocida"));
        assert!(result.payload.is_some());
    }

    #[test]
    fn test_notice_text() {
        assert_eq!(
            ActionResult::success(None, None).notice(),
            Notice::Success("✅ Acción completada".into())
        );
        assert_eq!(
            ActionResult::success(Some(String::new()), None).notice(),
            Notice::Success("✅ Acción completada".into())
        );
        assert_eq!(
            ActionResult::success(Some("Formulario creado".into()), None).notice(),
            Notice::Success("✅ Formulario creado".into())
        );
        assert_eq!(ActionResult::failure("mal").notice(), Notice::Error("mal".into()));
    }

    #[tokio::test]
    async fn test_success_on_active_module_refreshes_both() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let api = StaticApi(Ok(ActionResult::success(Some("Proyecto creado".into()), None)));

        let result = ActionDispatcher::new(bus)
            .execute(&api, &request("proyectos"), Some("proyectos"))
            .await;

        assert!(result.success);
        assert_eq!(
            drain(&mut rx),
            vec![
                SuiteEvent::Notice(Notice::Success("✅ Proyecto creado".into())),
                SuiteEvent::RefreshRequested(RefreshTarget::Dashboard),
                SuiteEvent::RefreshRequested(RefreshTarget::Module("proyectos".into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_success_on_inactive_module_refreshes_dashboard_only() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let api = StaticApi(Ok(ActionResult::success(None, None)));
        let dispatcher = ActionDispatcher::new(bus);

        dispatcher.execute(&api, &request("informes"), Some("crm")).await;
        dispatcher.execute(&api, &request("informes"), None).await;

        let refreshes: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, SuiteEvent::RefreshRequested(_)))
            .collect();
        assert_eq!(
            refreshes,
            vec![
                SuiteEvent::RefreshRequested(RefreshTarget::Dashboard),
                SuiteEvent::RefreshRequested(RefreshTarget::Dashboard),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_never_refreshes() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let api = StaticApi(Ok(ActionResult::failure("Acción desconocida: x")));

        let result = ActionDispatcher::new(bus)
            .execute(&api, &request("crm"), Some("crm"))
            .await;

        assert!(!result.success);
        assert_eq!(
            drain(&mut rx),
            vec![SuiteEvent::Notice(Notice::Error("Acción desconocida: x".into()))]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_connection_error() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let api = StaticApi(Err(ClientError::Network("refused".into())));

        let result = ActionDispatcher::new(bus)
            .execute(&api, &request("crm"), Some("crm"))
            .await;

        assert_eq!(result.error.as_deref(), Some("Error de conexión"));
        assert_eq!(
            drain(&mut rx),
            vec![SuiteEvent::Notice(Notice::Error("Error de conexión".into()))]
        );
    }
}
