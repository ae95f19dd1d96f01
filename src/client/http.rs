//! HTTP transport over reqwest

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use super::{ClientError, SuiteApi};
use crate::actions::ActionResult;
use crate::api::dto::{
    ActionRequest, ActionResponse, DashboardResponse, ModuleDataResponse, ModuleDescriptor,
    ModuleListResponse,
};
use crate::config::ClientConfig;

const MODULE_LOAD_FALLBACK: &str = "Error cargando módulo";

/// Suite server client
pub struct HttpSuiteClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl HttpSuiteClient {
    /// Create a client. No timeout is applied unless `request_timeout_secs` is set.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ClientError::from_reqwest)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn module_url(&self, module: &str) -> String {
        format!("{}/api/module/{}", self.base_url, urlencoding::encode(module))
    }

    /// Read the whole body, returning the status alongside it
    async fn read(response: reqwest::Response) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        Ok((status, bytes.to_vec()))
    }

    fn server_error(status: StatusCode, body: &[u8], fallback: &str) -> ClientError {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| fallback.to_string());
        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }

    fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
        serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// GET a listing endpoint that answers 2xx on success
    async fn get_listing<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let (status, body) = Self::read(response).await?;
        if !status.is_success() {
            return Err(Self::server_error(
                status,
                &body,
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }
        Self::decode(&body)
    }
}

#[async_trait]
impl SuiteApi for HttpSuiteClient {
    async fn fetch_modules(&self) -> Result<Vec<ModuleDescriptor>, ClientError> {
        let list: ModuleListResponse = self.get_listing("/api/modules").await?;
        tracing::debug!(count = list.modules.len(), "Fetched module list");
        Ok(list.modules)
    }

    async fn fetch_dashboard(&self) -> Result<DashboardResponse, ClientError> {
        self.get_listing("/api/dashboard").await
    }

    async fn fetch_module_data(&self, module: &str) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(self.module_url(module))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let (status, body) = Self::read(response).await?;
        let parsed: ModuleDataResponse = match Self::decode(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Self::server_error(status, &body, MODULE_LOAD_FALLBACK))
            }
            Err(e) => return Err(e),
        };

        if parsed.ok {
            Ok(parsed.data.unwrap_or_else(|| Value::Object(Map::new())))
        } else {
            Err(ClientError::Server {
                status: status.as_u16(),
                message: parsed
                    .error
                    .unwrap_or_else(|| MODULE_LOAD_FALLBACK.to_string()),
            })
        }
    }

    async fn execute_action(&self, request: &ActionRequest) -> Result<ActionResult, ClientError> {
        let response = self
            .client
            .post(self.module_url(&request.module))
            .json(&request.body())
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let (status, body) = Self::read(response).await?;
        match Self::decode::<ActionResponse>(&body) {
            Ok(parsed) => Ok(ActionResult::from_response(parsed)),
            Err(_) if !status.is_success() => Err(Self::server_error(
                status,
                &body,
                status.canonical_reason().unwrap_or("request failed"),
            )),
            Err(e) => Err(e),
        }
    }
}
