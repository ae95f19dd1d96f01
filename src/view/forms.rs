//! Forms template

use serde_json::Value;

use super::{collection, display_value, field, is_truthy, Record, Section};
use crate::actions::ActionForm;

pub(super) fn render(payload: &Value) -> Vec<Section> {
    let formularios = collection(payload, "formularios");

    let records = formularios
        .iter()
        .map(|f| {
            let respuestas = match f.get("respuestas_count") {
                Some(v) if is_truthy(Some(v)) => display_value(v),
                _ => "0".to_string(),
            };
            let estado = if is_truthy(f.get("activo")) {
                "✅ Activo"
            } else {
                "❌ Inactivo"
            };

            Record::new(field(f, "titulo"))
                .line(field(f, "descripcion"))
                .line(format!("📊 Respuestas: {} | Estado: {}", respuestas, estado))
        })
        .collect();

    vec![Section {
        icon: "📝",
        title: "Formularios",
        count: formularios.len(),
        actions: vec![ActionForm::CreateFormulario],
        records,
        empty_message: "No hay formularios creados.",
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records() {
        let sections = render(&json!({
            "formularios": [
                {"titulo": "Encuesta", "descripcion": "Satisfacción", "respuestas_count": 4, "activo": true},
                {"titulo": "Alta", "descripcion": "", "activo": false}
            ],
            "respuestas": []
        }));

        let records = &sections[0].records;
        assert_eq!(sections[0].heading(), "📝 Formularios (2)");
        assert_eq!(records[0].lines[1], "📊 Respuestas: 4 | Estado: ✅ Activo");
        assert_eq!(records[1].lines[0], "");
        assert_eq!(records[1].lines[1], "📊 Respuestas: 0 | Estado: ❌ Inactivo");
    }

    #[test]
    fn test_empty() {
        let sections = render(&json!({}));
        assert!(sections[0].is_empty());
        assert_eq!(sections[0].empty_message, "No hay formularios creados.");
    }
}
