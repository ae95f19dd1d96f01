//! Module Viewer
//!
//! Pure render templates from a module's data payload to a displayable
//! structure. Known modules get a dedicated template; anything else is shown
//! as a pretty-printed dump of its payload.
//!
//! Templates never fail: absent collections render as empty and missing
//! scalar fields render as `-`.

mod crm;
mod forms;
mod projects;
mod reports;
mod status;
mod text;
mod values;

pub use status::{StatusColor, StatusTag};
pub use text::TextRenderer;
pub use values::{collection, count_where, display_value, field, is_truthy, json_eq, MISSING};

use serde_json::Value;

use crate::actions::ActionForm;
use crate::api::dto::ModuleDescriptor;

/// Modules with a dedicated template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    Crm,
    Projects,
    Forms,
    Reports,
    Other(String),
}

impl ModuleKind {
    pub fn from_id(id: &str) -> Self {
        match id {
            "crm" => ModuleKind::Crm,
            "proyectos" => ModuleKind::Projects,
            "formularios" => ModuleKind::Forms,
            "informes" => ModuleKind::Reports,
            other => ModuleKind::Other(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ModuleKind::Crm => "crm",
            ModuleKind::Projects => "proyectos",
            ModuleKind::Forms => "formularios",
            ModuleKind::Reports => "informes",
            ModuleKind::Other(id) => id,
        }
    }
}

/// One line-per-record entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub title: String,
    /// Shown after the title, separated by ` - `
    pub subtitle: Option<String>,
    pub lines: Vec<String>,
    pub tag: Option<StatusTag>,
    /// Preformatted block below the record
    pub detail: Option<String>,
}

impl Record {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn tag(mut self, tag: StatusTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A titled collection with its count badge and action triggers
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub icon: &'static str,
    pub title: &'static str,
    pub count: usize,
    pub actions: Vec<ActionForm>,
    pub records: Vec<Record>,
    /// Shown in place of records when there are none
    pub empty_message: &'static str,
}

impl Section {
    /// `{icon} {title} ({count})`
    pub fn heading(&self) -> String {
        format!("{} {} ({})", self.icon, self.title, self.count)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Content below the module header
#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Sections(Vec<Section>),
    /// Pretty-printed payload of a module without a template
    Dump(String),
}

/// A rendered module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleView {
    pub module: String,
    /// `{icon} {name}`
    pub title: String,
    pub description: String,
    pub body: ViewBody,
}

impl ModuleView {
    pub fn sections(&self) -> &[Section] {
        match &self.body {
            ViewBody::Sections(sections) => sections,
            ViewBody::Dump(_) => &[],
        }
    }

    /// Every action trigger, in display order
    pub fn actions(&self) -> Vec<ActionForm> {
        self.sections()
            .iter()
            .flat_map(|s| s.actions.iter().cloned())
            .collect()
    }
}

/// Render a module's data payload
pub fn render_module(descriptor: &ModuleDescriptor, payload: &Value) -> ModuleView {
    let body = match ModuleKind::from_id(&descriptor.id) {
        ModuleKind::Crm => ViewBody::Sections(crm::render(payload)),
        ModuleKind::Projects => ViewBody::Sections(projects::render(payload)),
        ModuleKind::Forms => ViewBody::Sections(forms::render(payload)),
        ModuleKind::Reports => ViewBody::Sections(reports::render(payload)),
        ModuleKind::Other(_) => ViewBody::Dump(pretty_json(payload)),
    };

    ModuleView {
        module: descriptor.id.clone(),
        title: format!("{} {}", descriptor.icon, descriptor.name),
        description: descriptor.description.clone(),
        body,
    }
}

/// Two-space indented JSON, keys in payload order
pub(crate) fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_kind_round_trip() {
        for id in ["crm", "proyectos", "formularios", "informes", "inventario"] {
            assert_eq!(ModuleKind::from_id(id).id(), id);
        }
        assert_eq!(
            ModuleKind::from_id("inventario"),
            ModuleKind::Other("inventario".into())
        );
    }

    #[test]
    fn test_unknown_module_renders_dump() {
        let descriptor = ModuleDescriptor::new("inventario", "Inventario", "📦", "Stock");
        let payload = json!({"zeta": 1, "alpha": [true]});

        let view = render_module(&descriptor, &payload);
        assert_eq!(view.title, "📦 Inventario");
        assert_eq!(
            view.body,
            ViewBody::Dump("{\n  \"zeta\": 1,\n  \"alpha\": [\n    true\n  ]\n}".into())
        );
        assert!(view.actions().is_empty());
    }

    #[test]
    fn test_render_does_not_mutate_payload() {
        let descriptor = ModuleDescriptor::new("crm", "CRM", "👥", "");
        let payload = json!({"clientes": [{"nombre": "Ana"}]});
        let before = payload.clone();
        let _ = render_module(&descriptor, &payload);
        assert_eq!(payload, before);
    }
}
