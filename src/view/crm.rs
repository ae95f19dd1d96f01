//! CRM template: clients and sales opportunities

use serde_json::Value;

use super::{collection, field, Record, Section, StatusTag};
use crate::actions::ActionForm;

pub(super) fn render(payload: &Value) -> Vec<Section> {
    let clientes = collection(payload, "clientes");
    let oportunidades = collection(payload, "oportunidades");

    vec![
        Section {
            icon: "👥",
            title: "Clientes",
            count: clientes.len(),
            actions: vec![ActionForm::AddCliente],
            records: clientes.iter().map(cliente).collect(),
            empty_message: "No hay clientes registrados. Crea el primero para comenzar.",
        },
        Section {
            icon: "💼",
            title: "Oportunidades de Venta",
            count: oportunidades.len(),
            actions: vec![ActionForm::AddOportunidad],
            records: oportunidades.iter().map(oportunidad).collect(),
            empty_message: "No hay oportunidades registradas.",
        },
    ]
}

fn cliente(c: &Value) -> Record {
    Record::new(field(c, "nombre"))
        .subtitle(field(c, "empresa"))
        .line(format!("📧 {} | 📱 {}", field(c, "email"), field(c, "telefono")))
}

fn oportunidad(op: &Value) -> Record {
    Record::new(field(op, "titulo"))
        .subtitle(format!("{}€", field(op, "valor")))
        .line(format!("Probabilidad: {}%", field(op, "probabilidad")))
        .tag(StatusTag::new(field(op, "estado")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::StatusColor;
    use serde_json::json;

    #[test]
    fn test_empty_collections() {
        let sections = render(&json!({"clientes": [], "oportunidades": []}));

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading(), "👥 Clientes (0)");
        assert_eq!(sections[1].heading(), "💼 Oportunidades de Venta (0)");
        assert!(sections.iter().all(Section::is_empty));
        assert_eq!(
            sections[0].empty_message,
            "No hay clientes registrados. Crea el primero para comenzar."
        );
        assert_eq!(sections[1].empty_message, "No hay oportunidades registradas.");
    }

    #[test]
    fn test_absent_collections_are_empty() {
        let sections = render(&json!({}));
        assert_eq!(sections[0].count, 0);
        assert_eq!(sections[1].count, 0);
    }

    #[test]
    fn test_records() {
        let sections = render(&json!({
            "clientes": [{
                "nombre": "Ana", "empresa": "Acme",
                "email": "ana@acme.es", "telefono": null
            }],
            "oportunidades": [{
                "titulo": "Licencias", "valor": 1200.0,
                "probabilidad": 70, "estado": "ganada"
            }]
        }));

        let cliente = &sections[0].records[0];
        assert_eq!(cliente.title, "Ana");
        assert_eq!(cliente.subtitle.as_deref(), Some("Acme"));
        assert_eq!(cliente.lines, vec!["📧 ana@acme.es | 📱 -"]);

        let op = &sections[1].records[0];
        assert_eq!(op.title, "Licencias");
        assert_eq!(op.subtitle.as_deref(), Some("1200€"));
        assert_eq!(op.lines, vec!["Probabilidad: 70%"]);
        let tag = op.tag.as_ref().unwrap();
        assert_eq!(tag.label, "ganada");
        assert_eq!(tag.color, StatusColor::Blue);
    }

    #[test]
    fn test_actions() {
        let sections = render(&json!({}));
        assert_eq!(sections[0].actions, vec![ActionForm::AddCliente]);
        assert_eq!(sections[1].actions, vec![ActionForm::AddOportunidad]);
    }
}
