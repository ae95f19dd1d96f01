//! Projects backend: projects, tasks and time tracking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{
    id_matches, now_iso, param_f64, param_ref, param_str, BackendError, JsonStore, ModuleBackend,
    ModuleContext, ModuleInfo,
};

pub const PROJECTS_FILE: &str = "proyectos.json";

const INFO: ModuleInfo = ModuleInfo {
    id: "proyectos",
    name: "Gestión de Proyectos",
    description: "Organiza proyectos, tareas y asignaciones de equipo",
    icon: "📋",
    category: "proyectos",
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectsData {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub proyectos: Vec<Proyecto>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tareas: Vec<Tarea>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proyecto {
    pub id: u64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub descripcion: String,
    /// Link to a CRM client
    #[serde(default)]
    pub cliente_id: Option<Value>,
    /// planificacion, en_proceso, completado
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub estado: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha_inicio: String,
    #[serde(default)]
    pub fecha_fin: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub presupuesto: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub responsable: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tarea {
    pub id: u64,
    #[serde(default)]
    pub proyecto_id: Option<Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub titulo: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub descripcion: String,
    /// pendiente, en_proceso, completada
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub estado: String,
    /// baja, media, alta
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub prioridad: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub asignado_a: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha_creacion: String,
    #[serde(default)]
    pub fecha_vencimiento: Option<String>,
    /// Hours
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tiempo_estimado: f64,
    /// Hours
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tiempo_real: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_completada: Option<String>,
}

pub struct ProjectsBackend {
    store: JsonStore,
}

impl ProjectsBackend {
    pub fn new() -> Self {
        Self {
            store: JsonStore::new(PROJECTS_FILE),
        }
    }
}

impl Default for ProjectsBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn optional_str(params: &Map<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}

fn find_task<'a>(data: &'a mut ProjectsData, params: &Map<String, Value>) -> Result<&'a mut Tarea, BackendError> {
    data.tareas
        .iter_mut()
        .find(|t| id_matches(t.id, params.get("id")))
        .ok_or_else(|| BackendError::NotFound("Tarea no encontrada".into()))
}

/// Hours formatted the way they were entered (`3`, not `3.0`)
fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{}", hours)
    }
}

#[async_trait]
impl ModuleBackend for ProjectsBackend {
    fn info(&self) -> &ModuleInfo {
        &INFO
    }

    async fn get_data(&self, ctx: &ModuleContext) -> Result<Value, BackendError> {
        let data: ProjectsData = self.store.load(&ctx.data_dir).await?;
        Ok(serde_json::to_value(data)?)
    }

    async fn execute(
        &self,
        ctx: &ModuleContext,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, BackendError> {
        match action {
            "add_proyecto" => {
                self.store
                    .update(&ctx.data_dir, |data: &mut ProjectsData| {
                        let proyecto = Proyecto {
                            id: data.proyectos.len() as u64 + 1,
                            nombre: param_str(params, "nombre", ""),
                            descripcion: param_str(params, "descripcion", ""),
                            cliente_id: param_ref(params, "cliente_id"),
                            estado: "planificacion".to_string(),
                            fecha_inicio: optional_str(params, "fecha_inicio").unwrap_or_else(now_iso),
                            fecha_fin: optional_str(params, "fecha_fin"),
                            presupuesto: param_f64(params, "presupuesto", 0.0),
                            responsable: param_str(params, "responsable", ""),
                        };
                        data.proyectos.push(proyecto.clone());
                        Ok(json!({"proyecto": proyecto, "message": "Proyecto creado"}))
                    })
                    .await
            }
            "add_tarea" => {
                self.store
                    .update(&ctx.data_dir, |data: &mut ProjectsData| {
                        let tarea = Tarea {
                            id: data.tareas.len() as u64 + 1,
                            proyecto_id: param_ref(params, "proyecto_id"),
                            titulo: param_str(params, "titulo", ""),
                            descripcion: param_str(params, "descripcion", ""),
                            estado: "pendiente".to_string(),
                            prioridad: param_str(params, "prioridad", "media"),
                            asignado_a: param_str(params, "asignado_a", ""),
                            fecha_creacion: now_iso(),
                            fecha_vencimiento: optional_str(params, "fecha_vencimiento"),
                            tiempo_estimado: param_f64(params, "tiempo_estimado", 0.0),
                            tiempo_real: 0.0,
                            fecha_completada: None,
                        };
                        data.tareas.push(tarea.clone());
                        Ok(json!({"tarea": tarea, "message": "Tarea creada"}))
                    })
                    .await
            }
            "update_tarea_estado" => {
                let estado = param_str(params, "estado", "");
                self.store
                    .update(&ctx.data_dir, |data: &mut ProjectsData| {
                        let tarea = find_task(data, params)?;
                        if estado == "completada" {
                            tarea.fecha_completada = Some(now_iso());
                        }
                        tarea.estado = estado;
                        Ok(json!({"tarea": tarea, "message": "Estado actualizado"}))
                    })
                    .await
            }
            "registrar_tiempo" => {
                let horas = param_f64(params, "horas", 0.0);
                self.store
                    .update(&ctx.data_dir, |data: &mut ProjectsData| {
                        let tarea = find_task(data, params)?;
                        tarea.tiempo_real += horas;
                        Ok(json!({
                            "tarea": tarea,
                            "message": format!("Registradas {} horas", format_hours(horas))
                        }))
                    })
                    .await
            }
            other => Err(BackendError::UnknownAction(other.to_string())),
        }
    }

    async fn get_summary(&self, ctx: &ModuleContext) -> Result<Map<String, Value>, BackendError> {
        let data: ProjectsData = self.store.load(&ctx.data_dir).await?;

        let count_tasks = |estado: &str| data.tareas.iter().filter(|t| t.estado == estado).count();

        let proyectos_activos = data
            .proyectos
            .iter()
            .filter(|p| matches!(p.estado.as_str(), "planificacion" | "en_proceso"))
            .count();
        let total_tareas = data.tareas.len();
        let completadas = count_tasks("completada");
        let progreso = if total_tareas > 0 {
            completadas * 100 / total_tareas
        } else {
            0
        };

        let mut summary = Map::new();
        summary.insert("total_proyectos".into(), json!(data.proyectos.len()));
        summary.insert("proyectos_activos".into(), json!(proyectos_activos));
        summary.insert("total_tareas".into(), json!(total_tareas));
        summary.insert("tareas_pendientes".into(), json!(count_tasks("pendiente")));
        summary.insert("tareas_en_proceso".into(), json!(count_tasks("en_proceso")));
        summary.insert("tareas_completadas".into(), json!(completadas));
        summary.insert("progreso_general".into(), json!(progreso));
        Ok(summary)
    }
}
