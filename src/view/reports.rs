//! Reports template: generated reports, newest first

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use super::{collection, field, pretty_json, Record, Section, MISSING};
use crate::actions::{ActionForm, ReportKind};

const DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

pub(super) fn render(payload: &Value) -> Vec<Section> {
    let informes = collection(payload, "informes_generados");

    let records = informes
        .iter()
        .rev()
        .map(|informe| {
            let contenido = informe.get("contenido").unwrap_or(&Value::Null);
            let fecha = informe
                .get("fecha_generacion")
                .and_then(Value::as_str)
                .map(format_date)
                .unwrap_or_else(|| MISSING.to_string());

            Record::new(field(contenido, "tipo"))
                .line(format!("📅 {}", fecha))
                .detail(pretty_json(contenido))
        })
        .collect();

    vec![Section {
        icon: "📊",
        title: "Informes Generados",
        count: informes.len(),
        actions: ReportKind::ALL
            .iter()
            .map(|&kind| ActionForm::GenerarInforme(kind))
            .collect(),
        records,
        empty_message: "No hay informes generados. Genera el primero con los botones de arriba.",
    }]
}

/// `2024-03-05T14:07:09.123456` → `05/03/2024, 14:07:09`. Unparseable input
/// is returned unchanged.
pub(crate) fn format_date(raw: &str) -> String {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local().format(DATE_FORMAT).to_string();
    }
    raw.to_string()
}
