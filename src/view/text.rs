//! Terminal rendering

use std::fmt::Write;

use super::{ModuleView, Record, Section, StatusTag, ViewBody};
use crate::dashboard::DashboardCard;
use crate::events::Notice;
use crate::registry::ModuleRegistry;
use crate::state::ModulePanel;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Renders registry, dashboard and module views as plain text, optionally
/// with ANSI colour
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    color: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("{}{}{}", BOLD, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            format!("{}{}{}", DIM, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn tag(&self, tag: &StatusTag) -> String {
        if self.color {
            let (r, g, b) = tag.color.rgb();
            format!("\x1b[97;48;2;{};{};{}m {} {}", r, g, b, tag.label, RESET)
        } else {
            format!("[{}]", tag.label)
        }
    }

    /// Module list grouped by category. Cards are numbered in display order.
    pub fn module_list(&self, registry: &ModuleRegistry) -> String {
        if registry.is_empty() {
            return "No hay módulos disponibles\n".to_string();
        }

        let mut out = String::new();
        let mut n = 0;
        for bucket in registry.by_category() {
            let _ = writeln!(out, "{}", self.dim(&format!("[{}]", bucket.category)));
            for module in bucket.modules {
                n += 1;
                let _ = writeln!(
                    out,
                    "  {:>2}. {}",
                    n,
                    self.bold(&format!("{} {}", module.icon, module.name))
                );
                if !module.description.is_empty() {
                    let _ = writeln!(out, "      {}", module.description);
                }
            }
        }
        out
    }

    /// Dashboard cards
    pub fn dashboard(&self, cards: &[DashboardCard]) -> String {
        if cards.is_empty() {
            return "No hay datos disponibles\n".to_string();
        }

        let mut out = String::new();
        for card in cards {
            let _ = writeln!(out, "{}", self.bold(&card.title));
            if let Some(error) = &card.error {
                let _ = writeln!(out, "  ⚠ {}", error);
            }
            let width = card
                .stats
                .iter()
                .map(|s| s.label.chars().count())
                .max()
                .unwrap_or(0);
            for stat in &card.stats {
                let pad = width - stat.label.chars().count();
                let _ = writeln!(out, "  {}{}  {}", stat.label, " ".repeat(pad), stat.value);
            }
            out.push('\n');
        }
        out
    }

    /// A rendered module. Action triggers are numbered across sections.
    pub fn module(&self, view: &ModuleView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.bold(&view.title));
        if !view.description.is_empty() {
            let _ = writeln!(out, "{}", view.description);
        }
        out.push('\n');

        match &view.body {
            ViewBody::Dump(json) => {
                out.push_str(json);
                out.push('\n');
            }
            ViewBody::Sections(sections) => {
                let mut action_no = 0;
                for section in sections {
                    self.section(&mut out, section, &mut action_no);
                }
            }
        }
        out
    }

    fn section(&self, out: &mut String, section: &Section, action_no: &mut usize) {
        let _ = writeln!(out, "{}", self.bold(&section.heading()));
        for action in &section.actions {
            *action_no += 1;
            let _ = writeln!(out, "  [{}] {}", action_no, action.label());
        }
        if section.is_empty() {
            let _ = writeln!(out, "  {}", section.empty_message);
        }
        for record in &section.records {
            self.record(out, record);
        }
        out.push('\n');
    }

    fn record(&self, out: &mut String, record: &Record) {
        let mut head = format!("  • {}", self.bold(&record.title));
        if let Some(subtitle) = &record.subtitle {
            let _ = write!(head, " - {}", subtitle);
        }
        if let Some(tag) = &record.tag {
            let _ = write!(head, " {}", self.tag(tag));
        }
        let _ = writeln!(out, "{}", head);

        for line in &record.lines {
            let _ = writeln!(out, "    {}", self.dim(line));
        }
        if let Some(detail) = &record.detail {
            for line in detail.lines() {
                let _ = writeln!(out, "      {}", line);
            }
        }
    }

    /// Content panel
    pub fn panel(&self, panel: &ModulePanel) -> String {
        match panel {
            ModulePanel::Empty => String::new(),
            ModulePanel::Loading(_) => "Cargando datos del módulo...\n".to_string(),
            ModulePanel::Ready(view) => self.module(view),
            ModulePanel::Failed { message, .. } => format!("❌ Error: {}\n", message),
        }
    }

    pub fn notice(&self, notice: &Notice) -> String {
        notice.text()
    }
}
