use thiserror::Error;

/// Why an `/ask` call did not produce a success body.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AskError {
    /// The call never completed: connection refused, DNS, timeout or a body
    /// that could not be read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}{}", detail_suffix(.detail))]
    Remote { status: u16, detail: Option<String> },
}

impl AskError {
    pub fn kind(&self) -> &'static str {
        match self {
            AskError::Transport(_) => "transport",
            AskError::Remote { .. } => "remote",
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for AskError {
    fn from(err: reqwest::Error) -> Self {
        AskError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_display_includes_detail_when_present() {
        let with_detail = AskError::Remote {
            status: 503,
            detail: Some("Servicio no disponible".to_string()),
        };
        assert_eq!(
            with_detail.to_string(),
            "service returned 503: Servicio no disponible"
        );

        let without = AskError::Remote {
            status: 500,
            detail: None,
        };
        assert_eq!(without.to_string(), "service returned 500");
        assert_eq!(without.kind(), "remote");
    }
}
