//! View and Navigation State
//!
//! Two views share the screen: the dashboard and the content panel of the
//! active module. Every fetch is issued a [`RequestTicket`]; a response is
//! applied only if its ticket is still the latest for that region (and, for
//! module data, the module is still active). Late responses are dropped
//! instead of overwriting a newer view.

use crate::dashboard::DashboardCard;
use crate::view::ModuleView;

/// Which top-level view is showing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Navigation {
    #[default]
    Dashboard,
    ModuleActive(String),
}

impl Navigation {
    pub fn active_module(&self) -> Option<&str> {
        match self {
            Navigation::Dashboard => None,
            Navigation::ModuleActive(id) => Some(id),
        }
    }
}

/// Contents of the module panel
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModulePanel {
    #[default]
    Empty,
    Loading(String),
    Ready(ModuleView),
    Failed { module: String, message: String },
}

/// Sequence number of an issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    navigation: Navigation,
    panel: ModulePanel,
    dashboard: Vec<DashboardCard>,
    next_ticket: u64,
    module_ticket: Option<RequestTicket>,
    dashboard_ticket: Option<RequestTicket>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn active_module(&self) -> Option<&str> {
        self.navigation.active_module()
    }

    pub fn panel(&self) -> &ModulePanel {
        &self.panel
    }

    pub fn dashboard(&self) -> &[DashboardCard] {
        &self.dashboard
    }

    fn issue(&mut self) -> RequestTicket {
        self.next_ticket += 1;
        RequestTicket(self.next_ticket)
    }

    /// Activate `id` and issue the ticket for its data fetch
    pub fn select_module(&mut self, id: &str) -> RequestTicket {
        self.navigation = Navigation::ModuleActive(id.to_string());
        self.begin_module_load(id)
    }

    /// Return to the dashboard and issue the ticket for its reload. Any
    /// module fetch still in flight becomes stale.
    pub fn show_dashboard(&mut self) -> RequestTicket {
        self.navigation = Navigation::Dashboard;
        self.panel = ModulePanel::Empty;
        self.module_ticket = None;
        self.begin_dashboard_load()
    }

    /// Ticket for reloading the active module, `None` if `id` is not active
    pub fn begin_module_refresh(&mut self, id: &str) -> Option<RequestTicket> {
        if self.active_module() == Some(id) {
            Some(self.begin_module_load(id))
        } else {
            None
        }
    }

    fn begin_module_load(&mut self, id: &str) -> RequestTicket {
        let ticket = self.issue();
        self.module_ticket = Some(ticket);
        self.panel = ModulePanel::Loading(id.to_string());
        ticket
    }

    pub fn begin_dashboard_load(&mut self) -> RequestTicket {
        let ticket = self.issue();
        self.dashboard_ticket = Some(ticket);
        ticket
    }

    /// Apply a module fetch outcome. Returns false when the response was stale.
    pub fn complete_module(
        &mut self,
        ticket: RequestTicket,
        id: &str,
        outcome: Result<ModuleView, String>,
    ) -> bool {
        if self.module_ticket != Some(ticket) || self.active_module() != Some(id) {
            tracing::debug!(module = %id, ticket = ticket.value(), "Discarding stale module response");
            return false;
        }

        self.panel = match outcome {
            Ok(view) => ModulePanel::Ready(view),
            Err(message) => ModulePanel::Failed {
                module: id.to_string(),
                message,
            },
        };
        true
    }

    /// Replace the cards without a fetch, e.g. after the registry changed
    pub fn rerender_dashboard(&mut self, cards: Vec<DashboardCard>) {
        self.dashboard = cards;
    }

    /// Apply a dashboard fetch. Returns false when the response was stale.
    pub fn complete_dashboard(&mut self, ticket: RequestTicket, cards: Vec<DashboardCard>) -> bool {
        if self.dashboard_ticket != Some(ticket) {
            tracing::debug!(ticket = ticket.value(), "Discarding stale dashboard response");
            return false;
        }
        self.dashboard = cards;
        true
    }
}
