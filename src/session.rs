//! Dashboard Session
//!
//! Single owner of the client-side state: the module registry, the last
//! dashboard summary, the view state and the event bus. Every user
//! operation goes through here.
//!
//! After each operation the session services the refresh requests that
//! were published on the bus. Dashboard and module refreshes run
//! concurrently and may complete in either order.

use serde_json::Value;
use std::collections::BTreeSet;
use tokio::sync::broadcast;

use crate::actions::{ActionDispatcher, ActionForm, ActionResult, Prompter};
use crate::api::dto::{ActionRequest, DashboardResponse, ModuleDescriptor};
use crate::client::{ClientError, SuiteApi};
use crate::dashboard::dashboard_cards;
use crate::events::{drain, EventBus, Notice, RefreshTarget, SuiteEvent};
use crate::registry::ModuleRegistry;
use crate::state::{RequestTicket, ViewState};
use crate::view::render_module;

const MODULES_LOAD_FAILED: &str = "No se pudieron cargar los módulos";

pub struct Session<A> {
    api: A,
    registry: ModuleRegistry,
    last_dashboard: DashboardResponse,
    view: ViewState,
    bus: EventBus,
    dispatcher: ActionDispatcher,
    requests: broadcast::Receiver<SuiteEvent>,
}

impl<A: SuiteApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self::with_bus(api, EventBus::default())
    }

    pub fn with_bus(api: A, bus: EventBus) -> Self {
        let requests = bus.subscribe();
        Self {
            api,
            registry: ModuleRegistry::new(),
            last_dashboard: DashboardResponse::default(),
            view: ViewState::new(),
            dispatcher: ActionDispatcher::new(bus.clone()),
            bus,
            requests,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuiteEvent> {
        self.bus.subscribe()
    }

    /// Load the registry and the dashboard concurrently
    pub async fn initialize(&mut self) {
        tracing::info!("Initialising dashboard session");
        let ticket = self.view.begin_dashboard_load();

        let (modules, dashboard) =
            tokio::join!(self.api.fetch_modules(), self.api.fetch_dashboard());

        self.apply_modules(modules);
        self.apply_dashboard(ticket, dashboard);
        self.process_refreshes().await;
    }

    /// Reload the module registry
    pub async fn load_modules(&mut self) -> usize {
        let modules = self.api.fetch_modules().await;
        self.apply_modules(modules);
        self.process_refreshes().await;
        self.registry.len()
    }

    /// Reload the dashboard summary
    pub async fn load_dashboard(&mut self) {
        let ticket = self.view.begin_dashboard_load();
        let dashboard = self.api.fetch_dashboard().await;
        self.apply_dashboard(ticket, dashboard);
        self.process_refreshes().await;
    }

    /// Activate a module and load its data. Identifiers missing from the
    /// registry are rejected without any request.
    pub async fn select_module(&mut self, id: &str) -> Result<(), ClientError> {
        if !self.registry.contains(id) {
            tracing::warn!(module = %id, "Rejected selection of unknown module");
            return Err(ClientError::UnknownModule(id.to_string()));
        }

        tracing::info!(module = %id, "Selecting module");
        let ticket = self.view.select_module(id);
        let data = self.api.fetch_module_data(id).await;
        self.apply_module(ticket, id, data);
        self.process_refreshes().await;
        Ok(())
    }

    /// Return to the dashboard and reload it
    pub async fn show_dashboard(&mut self) {
        let ticket = self.view.show_dashboard();
        let dashboard = self.api.fetch_dashboard().await;
        self.apply_dashboard(ticket, dashboard);
        self.process_refreshes().await;
    }

    /// Send an action and refresh whatever it affected
    pub async fn execute_action(&mut self, request: &ActionRequest) -> ActionResult {
        let result = self
            .dispatcher
            .execute(&self.api, request, self.view.active_module())
            .await;
        self.process_refreshes().await;
        result
    }

    /// Prompt for a form and run it. `None` when the user cancelled.
    pub async fn run_form(
        &mut self,
        form: &ActionForm,
        prompter: &mut dyn Prompter,
    ) -> Option<ActionResult> {
        let Some(request) = form.collect(prompter) else {
            tracing::debug!(action = form.action(), "Form cancelled");
            return None;
        };
        Some(self.execute_action(&request).await)
    }

    /// Ask for a refresh, serviced at the end of the next operation or by
    /// [`Session::process_refreshes`]
    pub fn request_refresh(&self, target: RefreshTarget) {
        self.bus.publish(SuiteEvent::RefreshRequested(target));
    }

    /// Service every pending refresh request
    pub async fn process_refreshes(&mut self) {
        let mut want_dashboard = false;
        let mut modules = BTreeSet::new();
        for event in drain(&mut self.requests) {
            match event {
                SuiteEvent::RefreshRequested(RefreshTarget::Dashboard) => want_dashboard = true,
                SuiteEvent::RefreshRequested(RefreshTarget::Module(id)) => {
                    modules.insert(id);
                }
                _ => {}
            }
        }

        let dashboard_ticket = want_dashboard.then(|| self.view.begin_dashboard_load());
        let module_ticket = modules
            .into_iter()
            .find_map(|id| self.view.begin_module_refresh(&id).map(|t| (t, id)));

        if dashboard_ticket.is_none() && module_ticket.is_none() {
            return;
        }

        let api = &self.api;
        let (dashboard, module) = tokio::join!(
            async move {
                match dashboard_ticket {
                    Some(ticket) => Some((ticket, api.fetch_dashboard().await)),
                    None => None,
                }
            },
            async move {
                match module_ticket {
                    Some((ticket, id)) => {
                        let data = api.fetch_module_data(&id).await;
                        Some((ticket, id, data))
                    }
                    None => None,
                }
            }
        );

        if let Some((ticket, result)) = dashboard {
            self.apply_dashboard(ticket, result);
        }
        if let Some((ticket, id, data)) = module {
            self.apply_module(ticket, &id, data);
        }
    }

    fn apply_modules(&mut self, result: Result<Vec<ModuleDescriptor>, ClientError>) {
        match result {
            Ok(modules) => {
                self.registry = ModuleRegistry::from_descriptors(modules);
                tracing::info!(count = self.registry.len(), "Modules loaded");
                self.bus.publish(SuiteEvent::ModulesLoaded(self.registry.len()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load modules");
                self.registry = ModuleRegistry::new();
                self.bus.notify(Notice::Error(MODULES_LOAD_FAILED.to_string()));
            }
        }

        // Cards join against the registry, so they follow it
        let cards = dashboard_cards(&self.registry, &self.last_dashboard);
        self.view.rerender_dashboard(cards);
    }

    fn apply_dashboard(
        &mut self,
        ticket: RequestTicket,
        result: Result<DashboardResponse, ClientError>,
    ) {
        match result {
            Ok(dashboard) => {
                let cards = dashboard_cards(&self.registry, &dashboard);
                let count = cards.len();
                if self.view.complete_dashboard(ticket, cards) {
                    self.last_dashboard = dashboard;
                    tracing::debug!(cards = count, "Dashboard loaded");
                    self.bus.publish(SuiteEvent::DashboardLoaded(count));
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load dashboard");
            }
        }
    }

    fn apply_module(&mut self, ticket: RequestTicket, id: &str, result: Result<Value, ClientError>) {
        let outcome = match (&result, self.registry.get(id)) {
            (Ok(payload), Some(descriptor)) => Ok(render_module(descriptor, payload)),
            (Ok(_), None) => Err(ClientError::UnknownModule(id.to_string()).module_load_message()),
            (Err(e), _) => {
                tracing::error!(module = %id, error = %e, "Failed to load module data");
                Err(e.module_load_message())
            }
        };

        let message = outcome.as_ref().err().cloned();
        if !self.view.complete_module(ticket, id, outcome) {
            return;
        }

        match message {
            None => {
                self.bus.publish(SuiteEvent::ModuleRendered(id.to_string()));
            }
            Some(message) => {
                self.bus.notify(Notice::Error(message));
            }
        }
    }
}
