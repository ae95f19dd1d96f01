//! Reports backend: consolidated reports computed from the other modules' files.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};

use super::{
    now_iso, param_str, read_json, BackendError, CrmData, FormsData, JsonStore, ModuleBackend,
    ModuleContext, ModuleInfo, ProjectsData, CRM_FILE, FORMS_FILE, PROJECTS_FILE,
};
use crate::view::is_truthy;

pub const REPORTS_FILE: &str = "informes.json";

const INFO: ModuleInfo = ModuleInfo {
    id: "informes",
    name: "Informes y Análisis",
    description: "Genera informes y analíticas consolidadas de todos los módulos",
    icon: "📊",
    category: "gestión",
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportsData {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub informes_generados: Vec<Informe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Informe {
    pub id: u64,
    /// general, ventas, proyectos, integracion
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tipo: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha_generacion: String,
    /// Report body; `contenido.tipo` holds the display title
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub contenido: Map<String, Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub generado_por: String,
}

pub struct ReportsBackend {
    store: JsonStore,
}

impl ReportsBackend {
    pub fn new() -> Self {
        Self {
            store: JsonStore::new(REPORTS_FILE),
        }
    }
}

impl Default for ReportsBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the other modules' data used to build a report
struct Sources {
    crm: CrmData,
    projects: ProjectsData,
    forms: FormsData,
}

impl Sources {
    async fn load(ctx: &ModuleContext) -> Result<Self, BackendError> {
        Ok(Self {
            crm: read_json(&ctx.data_dir.join(CRM_FILE)).await?,
            projects: read_json(&ctx.data_dir.join(PROJECTS_FILE)).await?,
            forms: read_json(&ctx.data_dir.join(FORMS_FILE)).await?,
        })
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn build_report(tipo: &str, sources: &Sources) -> Map<String, Value> {
    let oportunidades = &sources.crm.oportunidades;
    let clientes = &sources.crm.clientes;
    let proyectos = &sources.projects.proyectos;
    let tareas = &sources.projects.tareas;
    let formularios = &sources.forms.formularios;

    let mut report = Map::new();
    match tipo {
        "general" => {
            report.insert("tipo".into(), json!("Informe General"));
            report.insert("clientes_totales".into(), json!(clientes.len()));
            report.insert("proyectos_totales".into(), json!(proyectos.len()));
            report.insert(
                "formularios_activos".into(),
                json!(formularios.iter().filter(|f| f.activo).count()),
            );
            report.insert(
                "oportunidades_abiertas".into(),
                json!(oportunidades.iter().filter(|o| o.is_open()).count()),
            );
        }
        "ventas" => {
            let pipeline: f64 = oportunidades.iter().filter(|o| o.is_open()).map(|o| o.valor).sum();
            let ganadas: Vec<_> = oportunidades.iter().filter(|o| o.estado == "ganada").collect();
            let valor_ganado: f64 = ganadas.iter().map(|o| o.valor).sum();

            report.insert("tipo".into(), json!("Informe de Ventas"));
            report.insert("total_oportunidades".into(), json!(oportunidades.len()));
            report.insert("valor_pipeline".into(), json!(pipeline));
            report.insert("oportunidades_ganadas".into(), json!(ganadas.len()));
            report.insert("valor_ganado".into(), json!(valor_ganado));
            report.insert(
                "tasa_conversion".into(),
                json!(percentage(ganadas.len(), oportunidades.len())),
            );
        }
        "proyectos" => {
            let mut estados: BTreeMap<String, u64> = BTreeMap::new();
            for p in proyectos {
                let estado = if p.estado.is_empty() { "sin_estado" } else { p.estado.as_str() };
                *estados.entry(estado.to_string()).or_default() += 1;
            }
            let estimadas: f64 = tareas.iter().map(|t| t.tiempo_estimado).sum();
            let reales: f64 = tareas.iter().map(|t| t.tiempo_real).sum();

            report.insert("tipo".into(), json!("Informe de Proyectos"));
            report.insert("total_proyectos".into(), json!(proyectos.len()));
            report.insert("estados".into(), json!(estados));
            report.insert("total_tareas".into(), json!(tareas.len()));
            report.insert("horas_estimadas".into(), json!(estimadas));
            report.insert("horas_reales".into(), json!(reales));
            report.insert("desviacion_tiempo".into(), json!(reales - estimadas));
        }
        "integracion" => {
            let clientes_con_proyectos: HashSet<String> = proyectos
                .iter()
                .filter_map(|p| p.cliente_id.as_ref())
                .filter(|v| is_truthy(Some(v)))
                .map(Value::to_string)
                .collect();

            report.insert("tipo".into(), json!("Informe de Integración"));
            report.insert("clientes_totales".into(), json!(clientes.len()));
            report.insert("clientes_con_proyectos".into(), json!(clientes_con_proyectos.len()));
            report.insert("proyectos_totales".into(), json!(proyectos.len()));
            report.insert(
                "formularios_vinculados_crm".into(),
                json!(formularios.iter().filter(|f| is_truthy(f.cliente_id.as_ref())).count()),
            );
            report.insert(
                "formularios_vinculados_proyectos".into(),
                json!(formularios.iter().filter(|f| is_truthy(f.proyecto_id.as_ref())).count()),
            );
            report.insert(
                "tasa_integracion_clientes".into(),
                json!(percentage(clientes_con_proyectos.len(), clientes.len())),
            );
        }
        other => {
            tracing::warn!(tipo = %other, "Unknown report type, generating empty report");
        }
    }
    report
}

#[async_trait]
impl ModuleBackend for ReportsBackend {
    fn info(&self) -> &ModuleInfo {
        &INFO
    }

    async fn get_data(&self, ctx: &ModuleContext) -> Result<Value, BackendError> {
        let data: ReportsData = self.store.load(&ctx.data_dir).await?;
        Ok(serde_json::to_value(data)?)
    }

    async fn execute(
        &self,
        ctx: &ModuleContext,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, BackendError> {
        match action {
            "generar_informe" => {
                let tipo = param_str(params, "tipo", "general");
                let sources = Sources::load(ctx).await?;
                let contenido = build_report(&tipo, &sources);
                let user = ctx.user.clone();

                self.store
                    .update(&ctx.data_dir, |data: &mut ReportsData| {
                        let informe = Informe {
                            id: data.informes_generados.len() as u64 + 1,
                            tipo,
                            fecha_generacion: now_iso(),
                            contenido,
                            generado_por: user,
                        };
                        data.informes_generados.push(informe.clone());
                        Ok(json!({"informe": informe, "message": "Informe generado exitosamente"}))
                    })
                    .await
            }
            "get_informes" => {
                let data: ReportsData = self.store.load(&ctx.data_dir).await?;
                Ok(json!({"informes": data.informes_generados}))
            }
            other => Err(BackendError::UnknownAction(other.to_string())),
        }
    }

    async fn get_summary(&self, ctx: &ModuleContext) -> Result<Map<String, Value>, BackendError> {
        let data: ReportsData = self.store.load(&ctx.data_dir).await?;

        // Counts in first-seen order so ties go to the earliest type
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for informe in &data.informes_generados {
            let tipo = if informe.tipo.is_empty() { "general" } else { informe.tipo.as_str() };
            match counts.iter_mut().find(|(t, _)| *t == tipo) {
                Some((_, n)) => *n += 1,
                None => counts.push((tipo, 1)),
            }
        }
        let mut popular = "Ninguno";
        let mut best = 0;
        for &(tipo, n) in &counts {
            if n > best {
                best = n;
                popular = tipo;
            }
        }

        let ultimo = data
            .informes_generados
            .last()
            .map(|i| i.tipo.as_str())
            .unwrap_or("Ninguno");

        let mut summary = Map::new();
        summary.insert("total_informes".into(), json!(data.informes_generados.len()));
        summary.insert("tipo_popular".into(), json!(popular));
        summary.insert("ultimo_informe".into(), json!(ultimo));
        Ok(summary)
    }
}
