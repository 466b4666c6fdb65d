use super::{ChatReply, ChatRequest, ShopBackend};
use crate::core::error::ShopError;
use crate::models::Product;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct AddItemRequest<'a> {
    product_id: &'a str,
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ShopError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ShopError::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ShopError::Config(format!(
                "API URL cannot be used as a base: {}",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.endpoint(segments))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ShopError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ShopError::Api {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        })
    }
}

#[async_trait]
impl ShopBackend for HttpBackend {
    async fn fetch_cart(&self) -> Result<Vec<Product>, ShopError> {
        let response = self.send(self.request(Method::GET, &["cart"])).await?;
        let body = response.text().await?;
        let items: Vec<Product> = serde_json::from_str(&body)?;
        Ok(items)
    }

    async fn add_item(&self, product_id: &str) -> Result<(), ShopError> {
        let payload = AddItemRequest { product_id };
        self.send(self.request(Method::POST, &["cart", "items"]).json(&payload))
            .await?;
        Ok(())
    }

    async fn remove_item(&self, product_id: &str) -> Result<(), ShopError> {
        self.send(self.request(Method::DELETE, &["cart", "items", product_id]))
            .await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), ShopError> {
        self.send(self.request(Method::POST, &["reset"])).await?;
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ShopError> {
        let response = self
            .send(self.request(Method::POST, &["chat"]).json(request))
            .await?;
        let body = response.text().await?;
        let reply: ChatReply = serde_json::from_str(&body)?;
        Ok(reply)
    }
}
