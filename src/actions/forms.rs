//! Action form catalogue

use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::prompt::{collect_input, Collected, FieldKind, FieldSpec, Prompter};
use crate::api::dto::ActionRequest;

/// Report types the reports module can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    General,
    Ventas,
    Proyectos,
    Integracion,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::General,
        ReportKind::Ventas,
        ReportKind::Proyectos,
        ReportKind::Integracion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::General => "general",
            ReportKind::Ventas => "ventas",
            ReportKind::Proyectos => "proyectos",
            ReportKind::Integracion => "integracion",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Tipo de informe desconocido: {}", s))
    }
}

/// A prompted action offered by a module view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionForm {
    AddCliente,
    AddOportunidad,
    AddProyecto,
    CreateFormulario,
    GenerarInforme(ReportKind),
}

static ADD_CLIENTE: [FieldSpec; 4] = [
    FieldSpec::new("nombre", "Nombre del cliente:", FieldKind::Required),
    FieldSpec::new("email", "Email:", FieldKind::Text),
    FieldSpec::new("telefono", "Teléfono:", FieldKind::Text),
    FieldSpec::new("empresa", "Empresa:", FieldKind::Text),
];

static ADD_OPORTUNIDAD: [FieldSpec; 3] = [
    FieldSpec::new("titulo", "Título de la oportunidad:", FieldKind::Required),
    FieldSpec::new("valor", "Valor estimado (€):", FieldKind::Number { default: 0.0 }),
    FieldSpec::new(
        "probabilidad",
        "Probabilidad (0-100):",
        FieldKind::Integer { default: 50 },
    ),
];

static ADD_PROYECTO: [FieldSpec; 2] = [
    FieldSpec::new("nombre", "Nombre del proyecto:", FieldKind::Required),
    FieldSpec::new("descripcion", "Descripción:", FieldKind::Text),
];

static CREATE_FORMULARIO: [FieldSpec; 2] = [
    FieldSpec::new("titulo", "Título del formulario:", FieldKind::Required),
    FieldSpec::new("descripcion", "Descripción:", FieldKind::Text),
];

impl ActionForm {
    /// Every form, in the order the views offer them
    pub fn catalogue() -> Vec<ActionForm> {
        let mut forms = vec![
            ActionForm::AddCliente,
            ActionForm::AddOportunidad,
            ActionForm::AddProyecto,
            ActionForm::CreateFormulario,
        ];
        forms.extend(ReportKind::ALL.into_iter().map(ActionForm::GenerarInforme));
        forms
    }

    /// Module the action is sent to
    pub fn module(&self) -> &'static str {
        match self {
            ActionForm::AddCliente | ActionForm::AddOportunidad => "crm",
            ActionForm::AddProyecto => "proyectos",
            ActionForm::CreateFormulario => "formularios",
            ActionForm::GenerarInforme(_) => "informes",
        }
    }

    /// Action name sent to the server
    pub fn action(&self) -> &'static str {
        match self {
            ActionForm::AddCliente => "add_cliente",
            ActionForm::AddOportunidad => "add_oportunidad",
            ActionForm::AddProyecto => "add_proyecto",
            ActionForm::CreateFormulario => "create_formulario",
            ActionForm::GenerarInforme(_) => "generar_informe",
        }
    }

    /// Trigger label
    pub fn label(&self) -> &'static str {
        match self {
            ActionForm::AddCliente => "➕ Nuevo Cliente",
            ActionForm::AddOportunidad => "➕ Nueva Oportunidad",
            ActionForm::AddProyecto => "➕ Nuevo Proyecto",
            ActionForm::CreateFormulario => "➕ Nuevo Formulario",
            ActionForm::GenerarInforme(ReportKind::General) => "📄 Informe General",
            ActionForm::GenerarInforme(ReportKind::Ventas) => "💰 Informe de Ventas",
            ActionForm::GenerarInforme(ReportKind::Proyectos) => "📋 Informe de Proyectos",
            ActionForm::GenerarInforme(ReportKind::Integracion) => "🔗 Informe de Integración",
        }
    }

    /// Prompted fields, in prompt order
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            ActionForm::AddCliente => &ADD_CLIENTE,
            ActionForm::AddOportunidad => &ADD_OPORTUNIDAD,
            ActionForm::AddProyecto => &ADD_PROYECTO,
            ActionForm::CreateFormulario => &CREATE_FORMULARIO,
            ActionForm::GenerarInforme(_) => &[],
        }
    }

    /// Parameters sent without prompting, after the prompted ones
    pub fn fixed_params(&self) -> Map<String, Value> {
        let fixed = match self {
            ActionForm::AddOportunidad => json!({"cliente_id": 1}),
            ActionForm::CreateFormulario => json!({
                "campos": [
                    {"name": "nombre", "label": "Nombre", "type": "text", "required": true},
                    {"name": "email", "label": "Email", "type": "email", "required": true},
                    {"name": "comentario", "label": "Comentario", "type": "textarea", "required": false}
                ]
            }),
            ActionForm::GenerarInforme(kind) => json!({"tipo": kind.as_str()}),
            ActionForm::AddCliente | ActionForm::AddProyecto => json!({}),
        };
        match fixed {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Prompt for every field and build the request. `None` when cancelled.
    pub fn collect(&self, prompter: &mut dyn Prompter) -> Option<ActionRequest> {
        match collect_input(prompter, self.fields()) {
            Collected::Params(mut params) => {
                params.extend(self.fixed_params());
                Some(ActionRequest::new(self.module(), self.action(), params))
            }
            Collected::Cancelled => None,
        }
    }
}

impl fmt::Display for ActionForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionForm::GenerarInforme(kind) => write!(f, "{}:{}", self.action(), kind.as_str()),
            _ => f.write_str(self.action()),
        }
    }
}

impl FromStr for ActionForm {
    type Err = String;

    /// Accepts an action name, with `generar_informe[:tipo]` for reports
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("generar_informe", kind)) => Ok(ActionForm::GenerarInforme(kind.parse()?)),
            None if s == "generar_informe" => Ok(ActionForm::GenerarInforme(ReportKind::General)),
            None => ActionForm::catalogue()
                .into_iter()
                .find(|form| form.action() == s)
                .ok_or_else(|| format!("Acción desconocida: {}", s)),
            Some(_) => Err(format!("Acción desconocida: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ScriptedPrompter;

    #[test]
    fn test_add_cliente_params_in_order() {
        let mut prompter = ScriptedPrompter::new(vec![
            Some("Ana"),
            Some("ana@acme.es"),
            None,
            Some("Acme"),
        ]);
        let request = ActionForm::AddCliente.collect(&mut prompter).unwrap();

        assert_eq!(request.module, "crm");
        assert_eq!(request.action, "add_cliente");
        assert_eq!(
            serde_json::to_string(&request.params).unwrap(),
            r#"{"nombre":"Ana","email":"ana@acme.es","telefono":null,"empresa":"Acme"}"#
        );
    }

    #[test]
    fn test_add_oportunidad_blank_defaults() {
        let mut prompter = ScriptedPrompter::new(vec![Some("Licencias"), Some(""), Some("")]);
        let request = ActionForm::AddOportunidad.collect(&mut prompter).unwrap();

        assert_eq!(request.params["probabilidad"], 50);
        assert_eq!(request.params["valor"], 0);
        assert_eq!(request.params["cliente_id"], 1);
        assert_eq!(
            prompter.asked(),
            ["Título de la oportunidad:", "Valor estimado (€):", "Probabilidad (0-100):"]
        );
    }

    #[test]
    fn test_cancelled_required_field() {
        let mut prompter = ScriptedPrompter::new(vec![Some("")]);
        assert!(ActionForm::AddProyecto.collect(&mut prompter).is_none());
    }

    #[test]
    fn test_create_formulario_has_fixed_fields() {
        let mut prompter = ScriptedPrompter::new(vec![Some("Encuesta"), Some("Satisfacción")]);
        let request = ActionForm::CreateFormulario.collect(&mut prompter).unwrap();

        let campos = request.params["campos"].as_array().unwrap();
        assert_eq!(campos.len(), 3);
        assert_eq!(campos[2]["required"], false);
    }

    #[test]
    fn test_report_needs_no_prompts() {
        let mut prompter = ScriptedPrompter::new(Vec::<Option<&str>>::new());
        let request = ActionForm::GenerarInforme(ReportKind::Ventas)
            .collect(&mut prompter)
            .unwrap();

        assert!(prompter.asked().is_empty());
        assert_eq!(request.module, "informes");
        assert_eq!(request.params["tipo"], "ventas");
    }

    #[test]
    fn test_parse() {
        assert_eq!("add_cliente".parse::<ActionForm>(), Ok(ActionForm::AddCliente));
        assert_eq!(
            "generar_informe".parse::<ActionForm>(),
            Ok(ActionForm::GenerarInforme(ReportKind::General))
        );
        assert_eq!(
            "generar_informe:integracion".parse::<ActionForm>(),
            Ok(ActionForm::GenerarInforme(ReportKind::Integracion))
        );
        assert!("generar_informe:anual".parse::<ActionForm>().is_err());
        assert!("borrar_todo".parse::<ActionForm>().is_err());

        for form in ActionForm::catalogue() {
            assert_eq!(form.to_string().parse::<ActionForm>(), Ok(form));
        }
    }
}
