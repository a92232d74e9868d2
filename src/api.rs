mod client;
mod error;
mod models;

pub use client::HttpAskClient;
pub use error::AskError;
pub use models::{AskRequest, AskResponse, HealthResponse};

use async_trait::async_trait;

/// Anything that can answer a question on behalf of the consular assistant.
#[async_trait]
pub trait AskService: Send + Sync {
    async fn ask(&self, question: &str) -> Result<AskResponse, AskError>;
}
