//! Jocarsa Suite CLI
//!
//! One-shot commands against the module server:
//! - List modules and the dashboard
//! - Show a module's data
//! - Run actions, directly or through their prompted form
//! - Generate a config file

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::sync::broadcast;

use jocarsa_suite::actions::{ActionForm, StdinPrompter};
use jocarsa_suite::config::{generate_default_config, Config};
use jocarsa_suite::events::{drain, SuiteEvent};
use jocarsa_suite::logging::init_logging;
use jocarsa_suite::{ActionRequest, ActionResult, HttpSuiteClient, Session, SuiteApi, TextRenderer};

#[derive(Parser)]
#[command(name = "jocarsa-suite-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for Jocarsa Suite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Module server URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Disable coloured status tags
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available modules
    Modules,

    /// Show the cross-module dashboard
    Dashboard,

    /// Show a module's data
    Show {
        /// Module identifier (crm, proyectos, formularios, informes)
        module: String,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Execute a module action with explicit parameters
    Action {
        /// Module identifier
        module: String,
        /// Action name, e.g. add_cliente
        name: String,
        /// Parameters in key=value format. Values are read as JSON when they parse.
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Run an action through its prompted form (e.g. add_proyecto, generar_informe:ventas)
    Form {
        /// Action name
        action: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let config = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &config)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", config),
        }
        return Ok(());
    }

    let mut config = Config::load_default();
    if let Some(url) = cli.api_url {
        config.client.base_url = url;
    }
    if cli.no_color {
        config.client.color = false;
    }
    init_logging(&config.logging, &[]);

    let renderer = TextRenderer::new(config.client.color);
    let client = HttpSuiteClient::new(&config.client)?;
    let mut session = Session::new(client);
    let mut events = session.subscribe();

    match cli.command {
        Commands::Modules => {
            session.load_modules().await;
            let failed = print_notices(&renderer, &mut events);
            print!("{}", renderer.module_list(session.registry()));
            if failed {
                std::process::exit(1);
            }
        }

        Commands::Dashboard => {
            session.initialize().await;
            let failed = print_notices(&renderer, &mut events);
            print!("{}", renderer.dashboard(session.view().dashboard()));
            if failed {
                std::process::exit(1);
            }
        }

        Commands::Show {
            module,
            format: OutputFormat::Json,
        } => match session.api().fetch_module_data(&module).await {
            Ok(data) => println!("{}", serde_json::to_string_pretty(&data)?),
            Err(e) => {
                eprintln!("❌ Error: {}", e.module_load_message());
                std::process::exit(1);
            }
        },

        Commands::Show {
            module,
            format: OutputFormat::Text,
        } => {
            session.load_modules().await;
            if print_notices(&renderer, &mut events) {
                std::process::exit(1);
            }
            if let Err(e) = session.select_module(&module).await {
                eprintln!("❌ Error: {}", e.module_load_message());
                std::process::exit(1);
            }
            print!("{}", renderer.panel(session.view().panel()));
        }

        Commands::Action {
            module,
            name,
            params,
        } => {
            let params = match parse_params(&params) {
                Ok(params) => params,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(2);
                }
            };
            let request = ActionRequest::new(module, name, params);
            let result = session.execute_action(&request).await;
            print_notices(&renderer, &mut events);
            finish_action(&result)?;
        }

        Commands::Form { action } => {
            let form = match action.parse::<ActionForm>() {
                Ok(form) => form,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(2);
                }
            };

            match session.run_form(&form, &mut StdinPrompter::new()).await {
                Some(result) => {
                    print_notices(&renderer, &mut events);
                    finish_action(&result)?;
                }
                None => println!("Acción cancelada"),
            }
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Print the result payload; exit non-zero when the action failed
fn finish_action(result: &ActionResult) -> anyhow::Result<()> {
    if let Some(payload) = &result.payload {
        println!("{}", serde_json::to_string_pretty(payload)?);
    }
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Print queued notices. Returns true if any of them was an error.
fn print_notices(renderer: &TextRenderer, events: &mut broadcast::Receiver<SuiteEvent>) -> bool {
    let mut failed = false;
    for event in drain(events) {
        if let SuiteEvent::Notice(notice) = event {
            if notice.is_error() {
                failed = true;
                eprintln!("{}", renderer.notice(&notice));
            } else {
                println!("{}", renderer.notice(&notice));
            }
        }
    }
    failed
}

/// Parse `key=value` pairs. Values that are valid JSON keep their type,
/// anything else is sent as a string.
fn parse_params(pairs: &[String]) -> Result<Map<String, Value>, String> {
    let mut params = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("Invalid parameter '{}', expected key=value", pair))?;
        if key.is_empty() {
            return Err(format!("Invalid parameter '{}', empty key", pair));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
