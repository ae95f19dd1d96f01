//! Client error taxonomy

use thiserror::Error;

/// Errors that can occur when talking to a suite server
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Transport failure: connection refused, reset, timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Well-formed response reporting a failure
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Module identifier not present in the registry; no request was made
    #[error("Unknown module: {0}")]
    UnknownModule(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Network(format!("request timed out: {}", e))
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }

    /// Message shown to the user when a module fails to load
    pub fn module_load_message(&self) -> String {
        match self {
            ClientError::Network(_) => "Error de conexión con el servidor".to_string(),
            ClientError::Decode(_) => "Error cargando módulo".to_string(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::UnknownModule(id) => format!("Módulo desconocido: {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_load_message() {
        assert_eq!(
            ClientError::Network("refused".into()).module_load_message(),
            "Error de conexión con el servidor"
        );
        assert_eq!(
            ClientError::Server {
                status: 404,
                message: "Módulo no encontrado".into()
            }
            .module_load_message(),
            "Módulo no encontrado"
        );
        assert_eq!(
            ClientError::Decode("eof".into()).module_load_message(),
            "Error cargando módulo"
        );
    }

    #[test]
    fn test_display() {
        let err = ClientError::Server {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Server error 500: boom");
    }
}
