//! Projects template

use serde_json::Value;

use super::{collection, count_where, field, Record, Section};
use crate::actions::ActionForm;

pub(super) fn render(payload: &Value) -> Vec<Section> {
    let proyectos = collection(payload, "proyectos");
    let tareas = collection(payload, "tareas");

    let records = proyectos
        .iter()
        .map(|p| {
            // A project without an id owns no tasks
            let task_count = p
                .get("id")
                .map(|id| count_where(tareas, "proyecto_id", id))
                .unwrap_or(0);

            Record::new(field(p, "nombre"))
                .line(field(p, "descripcion"))
                .line(format!(
                    "📊 Estado: {} | 📋 Tareas: {}",
                    field(p, "estado"),
                    task_count
                ))
        })
        .collect();

    vec![Section {
        icon: "📋",
        title: "Proyectos",
        count: proyectos.len(),
        actions: vec![ActionForm::AddProyecto],
        records,
        empty_message: "No hay proyectos. Crea el primero para comenzar.",
    }]
}
