//! Text shown in the assistant entry while a question is outstanding and after
//! it settles.

use crate::api::{AskError, AskResponse};

pub const PLACEHOLDER_TEXT: &str = "Consultando al asistente consular...";

pub const NO_ANSWER_TEXT: &str = "No se recibió respuesta del asistente.";

pub const CONNECTION_FAILURE_TEXT: &str = "Lo siento, no pude comunicarme con el asistente. \
     Revisa tu conexión a internet e inténtalo de nuevo.";

pub const GENERIC_FAILURE_DETAIL: &str = "Error desconocido del servidor";

/// Apology for a request the service rejected.
pub fn remote_failure_text(detail: &str) -> String {
    format!("Lo siento, ocurrió un problema: {detail}. Por favor, inténtalo de nuevo en unos momentos.")
}

/// Text the placeholder receives once the call settles.
pub fn final_text(outcome: &Result<AskResponse, AskError>) -> String {
    match outcome {
        Ok(response) => response
            .answer_text()
            .map(str::to_string)
            .unwrap_or_else(|| NO_ANSWER_TEXT.to_string()),
        Err(AskError::Remote { detail, .. }) => {
            remote_failure_text(detail.as_deref().unwrap_or(GENERIC_FAILURE_DETAIL))
        }
        Err(AskError::Transport(_)) => CONNECTION_FAILURE_TEXT.to_string(),
    }
}
