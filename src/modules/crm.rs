//! CRM backend: clients, contact log and sales opportunities.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{
    id_matches, now_iso, param_f64, param_i64, param_ref, param_str, BackendError, JsonStore,
    ModuleBackend, ModuleContext, ModuleInfo,
};

pub const CRM_FILE: &str = "crm_clientes.json";

const INFO: ModuleInfo = ModuleInfo {
    id: "crm",
    name: "CRM - Gestión de Clientes",
    description: "Gestiona clientes, contactos y oportunidades de venta",
    icon: "👥",
    category: "marketing",
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmData {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub clientes: Vec<Cliente>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub contactos: Vec<Contacto>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub oportunidades: Vec<Oportunidad>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cliente {
    pub id: u64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub nombre: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub telefono: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub empresa: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha_creacion: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub estado: String,
}

/// A logged interaction with a client (call, email, meeting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contacto {
    pub id: u64,
    #[serde(default)]
    pub cliente_id: Option<Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tipo: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub notas: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub usuario: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oportunidad {
    pub id: u64,
    #[serde(default)]
    pub cliente_id: Option<Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub titulo: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub valor: f64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub probabilidad: i64,
    /// abierta, en_proceso, ganada, perdida
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub estado: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub fecha_creacion: String,
}

impl Oportunidad {
    /// Still part of the sales pipeline
    pub fn is_open(&self) -> bool {
        matches!(self.estado.as_str(), "abierta" | "en_proceso")
    }
}

pub struct CrmBackend {
    store: JsonStore,
}

impl CrmBackend {
    pub fn new() -> Self {
        Self {
            store: JsonStore::new(CRM_FILE),
        }
    }
}

impl Default for CrmBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModuleBackend for CrmBackend {
    fn info(&self) -> &ModuleInfo {
        &INFO
    }

    async fn get_data(&self, ctx: &ModuleContext) -> Result<Value, BackendError> {
        let data: CrmData = self.store.load(&ctx.data_dir).await?;
        Ok(serde_json::to_value(data)?)
    }

    async fn execute(
        &self,
        ctx: &ModuleContext,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, BackendError> {
        match action {
            "add_cliente" => {
                self.store
                    .update(&ctx.data_dir, |data: &mut CrmData| {
                        let cliente = Cliente {
                            id: data.clientes.len() as u64 + 1,
                            nombre: param_str(params, "nombre", ""),
                            email: param_str(params, "email", ""),
                            telefono: param_str(params, "telefono", ""),
                            empresa: param_str(params, "empresa", ""),
                            fecha_creacion: now_iso(),
                            estado: "activo".to_string(),
                        };
                        data.clientes.push(cliente.clone());
                        Ok(json!({"cliente": cliente, "message": "Cliente creado exitosamente"}))
                    })
                    .await
            }
            "add_contacto" => {
                let user = ctx.user.clone();
                self.store
                    .update(&ctx.data_dir, |data: &mut CrmData| {
                        let contacto = Contacto {
                            id: data.contactos.len() as u64 + 1,
                            cliente_id: param_ref(params, "cliente_id"),
                            fecha: now_iso(),
                            tipo: param_str(params, "tipo", "llamada"),
                            notas: param_str(params, "notas", ""),
                            usuario: user,
                        };
                        data.contactos.push(contacto.clone());
                        Ok(json!({"contacto": contacto, "message": "Contacto registrado"}))
                    })
                    .await
            }
            "add_oportunidad" => {
                self.store
                    .update(&ctx.data_dir, |data: &mut CrmData| {
                        let oportunidad = Oportunidad {
                            id: data.oportunidades.len() as u64 + 1,
                            cliente_id: param_ref(params, "cliente_id"),
                            titulo: param_str(params, "titulo", ""),
                            valor: param_f64(params, "valor", 0.0),
                            probabilidad: param_i64(params, "probabilidad", 50),
                            estado: "abierta".to_string(),
                            fecha_creacion: now_iso(),
                        };
                        data.oportunidades.push(oportunidad.clone());
                        Ok(json!({"oportunidad": oportunidad, "message": "Oportunidad creada"}))
                    })
                    .await
            }
            "update_estado_oportunidad" => {
                let estado = param_str(params, "estado", "");
                self.store
                    .update(&ctx.data_dir, |data: &mut CrmData| {
                        let op = data
                            .oportunidades
                            .iter_mut()
                            .find(|o| id_matches(o.id, params.get("id")))
                            .ok_or_else(|| BackendError::NotFound("Oportunidad no encontrada".into()))?;
                        op.estado = estado;
                        Ok(json!({"oportunidad": op, "message": "Estado actualizado"}))
                    })
                    .await
            }
            other => Err(BackendError::UnknownAction(other.to_string())),
        }
    }

    async fn get_summary(&self, ctx: &ModuleContext) -> Result<Map<String, Value>, BackendError> {
        let data: CrmData = self.store.load(&ctx.data_dir).await?;

        let clientes_activos = data.clientes.iter().filter(|c| c.estado == "activo").count();
        let oportunidades_abiertas = data
            .oportunidades
            .iter()
            .filter(|o| o.estado == "abierta")
            .count();
        let valor_pipeline: f64 = data
            .oportunidades
            .iter()
            .filter(|o| o.is_open())
            .map(|o| o.valor)
            .sum();

        let mut summary = Map::new();
        summary.insert("total_clientes".into(), json!(data.clientes.len()));
        summary.insert("clientes_activos".into(), json!(clientes_activos));
        summary.insert("total_oportunidades".into(), json!(data.oportunidades.len()));
        summary.insert("oportunidades_abiertas".into(), json!(oportunidades_abiertas));
        summary.insert("valor_pipeline".into(), json!(valor_pipeline));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_add_cliente_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ModuleContext::new(dir.path());
        let crm = CrmBackend::new();

        let result = crm
            .execute(&ctx, "add_cliente", &params(json!({"nombre": "Ana", "empresa": "ACME", "email": null})))
            .await
            .unwrap();
        assert_eq!(result["message"], "Cliente creado exitosamente");
        assert_eq!(result["cliente"]["id"], 1);
        assert_eq!(result["cliente"]["estado"], "activo");
        assert_eq!(result["cliente"]["email"], "");

        let summary = crm.get_summary(&ctx).await.unwrap();
        assert_eq!(summary["total_clientes"], 1);
        assert_eq!(summary["clientes_activos"], 1);
    }

    #[tokio::test]
    async fn test_file_with_null_fields_loads() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ModuleContext::new(dir.path());
        std::fs::write(
            dir.path().join(CRM_FILE),
            r#"{
                "clientes": [{"id": 1, "nombre": "Ana", "email": null, "telefono": null,
                              "empresa": null, "fecha_creacion": "2024-01-01T10:00:00", "estado": "activo"}],
                "contactos": [],
                "oportunidades": [{"id": 1, "cliente_id": 1, "titulo": "Licencias", "valor": null,
                                   "probabilidad": null, "estado": "abierta", "fecha_creacion": null}]
            }"#,
        )
        .unwrap();
        let crm = CrmBackend::new();

        let data = crm.get_data(&ctx).await.unwrap();
        assert_eq!(data["clientes"][0]["nombre"], "Ana");
        assert_eq!(data["clientes"][0]["email"], "");
        assert_eq!(data["oportunidades"][0]["valor"].as_f64(), Some(0.0));
        assert_eq!(data["oportunidades"][0]["probabilidad"], 0);

        let summary = crm.get_summary(&ctx).await.unwrap();
        assert_eq!(summary["total_clientes"], 1);
        assert_eq!(summary["clientes_activos"], 1);
        assert_eq!(summary["valor_pipeline"].as_f64(), Some(0.0));

        crm.execute(&ctx, "add_cliente", &params(json!({"nombre": "Luis"})))
            .await
            .unwrap();
        let data = crm.get_data(&ctx).await.unwrap();
        assert_eq!(data["clientes"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_opportunity_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ModuleContext::new(dir.path());
        let crm = CrmBackend::new();

        for (titulo, valor) in [("A", 1000.0), ("B", 500.0)] {
            crm.execute(&ctx, "add_oportunidad", &params(json!({"titulo": titulo, "valor": valor})))
                .await
                .unwrap();
        }
        crm.execute(&ctx, "update_estado_oportunidad", &params(json!({"id": 2, "estado": "ganada"})))
            .await
            .unwrap();

        let data = crm.get_data(&ctx).await.unwrap();
        assert_eq!(data["oportunidades"][0]["probabilidad"], 50);
        assert_eq!(data["oportunidades"][1]["estado"], "ganada");

        let summary = crm.get_summary(&ctx).await.unwrap();
        assert_eq!(summary["total_oportunidades"], 2);
        assert_eq!(summary["oportunidades_abiertas"], 1);
        assert_eq!(summary["valor_pipeline"].as_f64(), Some(1000.0));
    }

    #[tokio::test]
    async fn test_summary_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let summary = CrmBackend::new()
            .get_summary(&ModuleContext::new(dir.path()))
            .await
            .unwrap();
        let keys: Vec<_> = summary.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "total_clientes",
                "clientes_activos",
                "total_oportunidades",
                "oportunidades_abiertas",
                "valor_pipeline"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_opportunity() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ModuleContext::new(dir.path());

        let err = CrmBackend::new()
            .execute(&ctx, "update_estado_oportunidad", &params(json!({"id": 7, "estado": "perdida"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Oportunidad no encontrada");
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let dir = tempfile::tempdir().unwrap();
        let err = CrmBackend::new()
            .execute(&ModuleContext::new(dir.path()), "fly", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::UnknownAction(a) if a == "fly"));
    }
}
