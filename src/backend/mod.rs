use crate::core::error::ShopError;
use crate::models::{HistoryEntry, Product};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod http;

pub use http::HttpBackend;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<Value>>,
}

/// The remote shopping-assistant service.
#[async_trait]
pub trait ShopBackend: Send + Sync {
    async fn fetch_cart(&self) -> Result<Vec<Product>, ShopError>;

    async fn add_item(&self, product_id: &str) -> Result<(), ShopError>;

    async fn remove_item(&self, product_id: &str) -> Result<(), ShopError>;

    /// Clears the remote cart and the remote conversation.
    async fn reset(&self) -> Result<(), ShopError>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ShopError>;
}
