//! # Jocarsa Suite
//!
//! Dashboard client for the Jocarsa Suite business modules (CRM, projects,
//! forms, reports) together with the HTTP module server it talks to.
//!
//! ## Modules
//!
//! - [`client`]: HTTP client for the module server
//! - [`session`]: client-side state, navigation and refresh handling
//! - [`view`]: per-module templates and terminal rendering
//! - [`actions`]: prompted forms and the action dispatcher
//! - [`api`]: REST server with Axum
//! - [`modules`]: JSON-file backed module backends served by [`api`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jocarsa_suite::{ClientConfig, HttpSuiteClient, Session, TextRenderer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpSuiteClient::new(&ClientConfig::new("http://127.0.0.1:5000"))?;
//!     let mut session = Session::new(client);
//!     session.initialize().await;
//!
//!     let renderer = TextRenderer::new(false);
//!     print!("{}", renderer.dashboard(session.view().dashboard()));
//!
//!     session.select_module("crm").await?;
//!     print!("{}", renderer.panel(session.view().panel()));
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod api;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod logging;
pub mod modules;
pub mod registry;
pub mod session;
pub mod state;
pub mod view;

pub use actions::{ActionDispatcher, ActionForm, ActionResult, Prompter, ReportKind, StdinPrompter};

pub use api::dto::{ActionRequest, DashboardResponse, ModuleDescriptor};
pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use client::{ClientError, HttpSuiteClient, SuiteApi};

pub use config::{generate_default_config, ClientConfig, Config, ConfigError, LoggingConfig, ServerConfig};

pub use dashboard::{dashboard_cards, DashboardCard, DashboardStat};
pub use events::{EventBus, Notice, RefreshTarget, SuiteEvent};
pub use registry::{ModuleCard, ModuleRegistry};
pub use session::Session;
pub use state::{ModulePanel, Navigation, ViewState};
pub use view::{render_module, ModuleView, TextRenderer};
