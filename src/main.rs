//! Jocarsa Suite
//!
//! Interactive dashboard for the Jocarsa Suite module server.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tokio::sync::broadcast;

use jocarsa_suite::actions::{ActionForm, StdinPrompter};
use jocarsa_suite::config::Config;
use jocarsa_suite::events::{drain, RefreshTarget, SuiteEvent};
use jocarsa_suite::logging::init_logging;
use jocarsa_suite::state::{ModulePanel, Navigation};
use jocarsa_suite::{HttpSuiteClient, Session, TextRenderer};

#[derive(Parser)]
#[command(name = "jocarsa-suite")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive dashboard for Jocarsa Suite")]
struct Args {
    /// Module server URL
    #[arg(long)]
    api_url: Option<String>,

    /// Disable coloured status tags
    #[arg(long)]
    no_color: bool,
}

const HELP: &str = "\
Comandos:
  modules          Lista de módulos
  dashboard        Volver al dashboard
  open <id|n>      Abrir un módulo por identificador o número
  do <n>           Ejecutar la acción [n] del módulo abierto
  refresh          Recargar la vista actual
  help             Mostrar esta ayuda
  quit             Salir
";

#[derive(Debug, PartialEq)]
enum Command {
    Modules,
    Dashboard,
    Open(String),
    Do(usize),
    Refresh,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (command, arg) {
            ("modules" | "m", None) => Ok(Command::Modules),
            ("dashboard" | "d", None) => Ok(Command::Dashboard),
            ("open" | "o", Some(target)) => Ok(Command::Open(target.to_string())),
            ("do", Some(n)) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Command::Do)
                .ok_or_else(|| format!("Número de acción no válido: {}", n)),
            ("refresh" | "r", None) => Ok(Command::Refresh),
            ("help" | "?", None) => Ok(Command::Help),
            ("quit" | "exit" | "q", None) => Ok(Command::Quit),
            ("open" | "o" | "do", None) => Err(format!("Falta el argumento de '{}'", command)),
            _ => Err(format!("Comando desconocido: {}", line.trim())),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::load_default();
    if let Some(url) = args.api_url {
        config.client.base_url = url;
    }
    if args.no_color {
        config.client.color = false;
    }

    init_logging(&config.logging, &[]);

    let client = HttpSuiteClient::new(&config.client)?;
    tracing::info!("Connecting to {}", client.base_url());

    let renderer = TextRenderer::new(config.client.color);
    let mut session = Session::new(client);
    let mut events = session.subscribe();

    session.initialize().await;
    print_notices(&renderer, &mut events);
    print!("{}", renderer.module_list(session.registry()));
    println!();
    print!("{}", renderer.dashboard(session.view().dashboard()));
    println!("Escribe 'help' para ver los comandos.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => print!("{}", HELP),
            Command::Modules => {
                session.load_modules().await;
                print_notices(&renderer, &mut events);
                print!("{}", renderer.module_list(session.registry()));
            }
            Command::Dashboard => {
                session.show_dashboard().await;
                print_notices(&renderer, &mut events);
                print_current(&renderer, &session);
            }
            Command::Open(target) => {
                let id = resolve_module(&session, &target);
                if let Err(e) = session.select_module(&id).await {
                    eprintln!("❌ Error: {}", e.module_load_message());
                    continue;
                }
                print_notices(&renderer, &mut events);
                print_current(&renderer, &session);
            }
            Command::Do(n) => {
                let Some(form) = action_at(session.view().panel(), n) else {
                    eprintln!("No hay ninguna acción [{}] en la vista actual", n);
                    continue;
                };

                if session.run_form(&form, &mut StdinPrompter::new()).await.is_none() {
                    println!("Acción cancelada");
                    continue;
                }
                print_notices(&renderer, &mut events);
                print_current(&renderer, &session);
            }
            Command::Refresh => {
                session.request_refresh(RefreshTarget::Dashboard);
                if let Some(id) = session.view().active_module().map(str::to_string) {
                    session.request_refresh(RefreshTarget::Module(id));
                }
                session.process_refreshes().await;
                print_notices(&renderer, &mut events);
                print_current(&renderer, &session);
            }
        }
    }

    tracing::info!("Session closed");
    Ok(())
}

/// Card number (as listed by `modules`) or module identifier
fn resolve_module(session: &Session<HttpSuiteClient>, target: &str) -> String {
    let cards = session.registry().cards();
    match target.parse::<usize>() {
        Ok(n) if n >= 1 && n <= cards.len() => cards[n - 1].id.clone(),
        _ => target.to_string(),
    }
}

/// Action `[n]` of the module shown in the panel, numbered from 1 across sections
fn action_at(panel: &ModulePanel, n: usize) -> Option<ActionForm> {
    match panel {
        ModulePanel::Ready(view) => view.actions().get(n.checked_sub(1)?).cloned(),
        _ => None,
    }
}

fn print_current(renderer: &TextRenderer, session: &Session<HttpSuiteClient>) {
    match session.view().navigation() {
        Navigation::Dashboard => print!("{}", renderer.dashboard(session.view().dashboard())),
        Navigation::ModuleActive(_) => print!("{}", renderer.panel(session.view().panel())),
    }
}

fn print_notices(renderer: &TextRenderer, events: &mut broadcast::Receiver<SuiteEvent>) {
    for event in drain(events) {
        if let SuiteEvent::Notice(notice) = event {
            if notice.is_error() {
                eprintln!("{}", renderer.notice(&notice));
            } else {
                println!("{}", renderer.notice(&notice));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jocarsa_suite::{render_module, ModuleDescriptor};
    use serde_json::json;

    #[test]
    fn test_parse_commands() {
        assert_eq!("modules".parse::<Command>(), Ok(Command::Modules));
        assert_eq!("  open crm \n".parse::<Command>(), Ok(Command::Open("crm".into())));
        assert_eq!("o 2".parse::<Command>(), Ok(Command::Open("2".into())));
        assert_eq!("do 3".parse::<Command>(), Ok(Command::Do(3)));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_do_resolves_action_in_ready_view() {
        let descriptor = ModuleDescriptor::new("crm", "CRM", "👥", "Clientes");
        let panel = ModulePanel::Ready(render_module(
            &descriptor,
            &json!({"clientes": [], "oportunidades": []}),
        ));

        assert_eq!(action_at(&panel, 1), Some(ActionForm::AddCliente));
        assert_eq!(action_at(&panel, 2), Some(ActionForm::AddOportunidad));
        assert_eq!(action_at(&panel, 3), None);
        assert_eq!(action_at(&panel, 0), None);
        assert_eq!(action_at(&ModulePanel::Loading("crm".into()), 1), None);
        assert_eq!(action_at(&ModulePanel::Empty, 1), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!("do 0".parse::<Command>().is_err());
        assert!("do x".parse::<Command>().is_err());
        assert!("open".parse::<Command>().is_err());
        assert!("borrar todo".parse::<Command>().is_err());
    }
}
