//! Forms backend: dynamic form definitions and their submitted responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{
    id_matches, now_iso, param_ref, param_str, BackendError, JsonStore, ModuleBackend,
    ModuleContext, ModuleInfo,
};

pub const FORMS_FILE: &str = "formularios.json";

const INFO: ModuleInfo = ModuleInfo {
    id: "formularios",
    name: "Formularios Online",
    description: "Crea y gestiona formularios dinámicos para recopilar información",
    icon: "📝",
    category: "oficina",
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormsData {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub formularios: Vec<Formulario>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub respuestas: Vec<Respuesta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formulario {
    pub id: u64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub titulo: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub descripcion: String,
    /// Field definitions: `{name, label, type, required, options}`
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub campos: Vec<Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub activo: bool,
    /// Optional link to a CRM client
    #[serde(default)]
    pub cliente_id: Option<Value>,
    /// Optional link to a project
    #[serde(default)]
    pub proyecto_id: Option<Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha_creacion: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub respuestas_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Respuesta {
    pub id: u64,
    #[serde(default)]
    pub formulario_id: Option<Value>,
    /// Field name → submitted value
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub respuestas: Map<String, Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub ip: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub usuario: String,
}

pub struct FormsBackend {
    store: JsonStore,
}

impl FormsBackend {
    pub fn new() -> Self {
        Self {
            store: JsonStore::new(FORMS_FILE),
        }
    }
}

impl Default for FormsBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleBackend for FormsBackend {
    fn info(&self) -> &ModuleInfo {
        &INFO
    }

    async fn get_data(&self, ctx: &ModuleContext) -> Result<Value, BackendError> {
        let data: FormsData = self.store.load(&ctx.data_dir).await?;
        Ok(serde_json::to_value(data)?)
    }

    async fn execute(
        &self,
        ctx: &ModuleContext,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, BackendError> {
        match action {
            "create_formulario" => {
                self.store
                    .update(&ctx.data_dir, |data: &mut FormsData| {
                        let campos = params
                            .get("campos")
                            .and_then(Value::as_array)
                            .cloned()
                            .unwrap_or_default();
                        let formulario = Formulario {
                            id: data.formularios.len() as u64 + 1,
                            titulo: param_str(params, "titulo", ""),
                            descripcion: param_str(params, "descripcion", ""),
                            campos,
                            activo: true,
                            cliente_id: param_ref(params, "cliente_id"),
                            proyecto_id: param_ref(params, "proyecto_id"),
                            fecha_creacion: now_iso(),
                            respuestas_count: 0,
                        };
                        data.formularios.push(formulario.clone());
                        Ok(json!({"formulario": formulario, "message": "Formulario creado"}))
                    })
                    .await
            }
            "submit_respuesta" => {
                self.store
                    .update(&ctx.data_dir, |data: &mut FormsData| {
                        let formulario_id = param_ref(params, "formulario_id");
                        let respuesta = Respuesta {
                            id: data.respuestas.len() as u64 + 1,
                            respuestas: params
                                .get("respuestas")
                                .and_then(Value::as_object)
                                .cloned()
                                .unwrap_or_default(),
                            fecha: now_iso(),
                            ip: param_str(params, "ip", ""),
                            usuario: param_str(params, "usuario", "Anónimo"),
                            formulario_id,
                        };

                        if let Some(form) = data
                            .formularios
                            .iter_mut()
                            .find(|f| id_matches(f.id, respuesta.formulario_id.as_ref()))
                        {
                            form.respuestas_count += 1;
                        }

                        data.respuestas.push(respuesta.clone());
                        Ok(json!({"respuesta": respuesta, "message": "Respuesta guardada"}))
                    })
                    .await
            }
            "get_respuestas" => {
                let data: FormsData = self.store.load(&ctx.data_dir).await?;
                let wanted = params.get("formulario_id");
                let respuestas: Vec<&Respuesta> = data
                    .respuestas
                    .iter()
                    .filter(|r| r.formulario_id.as_ref() == wanted)
                    .collect();
                Ok(json!({"respuestas": respuestas}))
            }
            "toggle_formulario" => {
                self.store
                    .update(&ctx.data_dir, |data: &mut FormsData| {
                        let form = data
                            .formularios
                            .iter_mut()
                            .find(|f| id_matches(f.id, params.get("id")))
                            .ok_or_else(|| BackendError::NotFound("Formulario no encontrado".into()))?;
                        form.activo = !form.activo;
                        Ok(json!({"formulario": form, "message": "Estado actualizado"}))
                    })
                    .await
            }
            other => Err(BackendError::UnknownAction(other.to_string())),
        }
    }

    async fn get_summary(&self, ctx: &ModuleContext) -> Result<Map<String, Value>, BackendError> {
        let data: FormsData = self.store.load(&ctx.data_dir).await?;

        let activos = data.formularios.iter().filter(|f| f.activo).count();

        // First form with the strictly highest count wins ties
        let mut popular: Option<&str> = None;
        let mut max_respuestas = 0;
        for form in &data.formularios {
            if form.respuestas_count > max_respuestas {
                max_respuestas = form.respuestas_count;
                popular = Some(form.titulo.as_str());
            }
        }
        let popular = popular.filter(|t| !t.is_empty()).unwrap_or("Ninguno");

        let mut summary = Map::new();
        summary.insert("total_formularios".into(), json!(data.formularios.len()));
        summary.insert("formularios_activos".into(), json!(activos));
        summary.insert("total_respuestas".into(), json!(data.respuestas.len()));
        summary.insert("formulario_popular".into(), json!(popular));
        summary.insert("respuestas_popular".into(), json!(max_respuestas));
        Ok(summary)
    }
}
