use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::errors::AppError;

/// What came back from a delivery provider. The body is kept as raw text;
/// the caller decides whether and how to parse it.
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    pub status: u16,
    pub body: String,
}

impl DeliveryResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound JSON delivery to a provider endpoint. The seam the contact use
/// case dispatches through, mockable in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormDelivery: Send + Sync {
    /// Posts `body` as JSON to `url`. `headers` are merged over a JSON
    /// content-type default, caller entries winning.
    async fn post_json(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        body: serde_json::Value,
    ) -> Result<DeliveryResponse, AppError>;
}

/// reqwest-backed delivery. No timeout beyond the client default; the call
/// is awaited to completion within the request lifetime.
#[derive(Clone)]
pub struct HttpDelivery {
    client: reqwest::Client,
}

impl HttpDelivery {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FormDelivery for HttpDelivery {
    async fn post_json(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        body: serde_json::Value,
    ) -> Result<DeliveryResponse, AppError> {
        let mut header_map = HeaderMap::new();
        header_map.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in &headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                AppError::validation(
                    "Invalid header",
                    format!("Header name {name:?} is not valid: {e}"),
                )
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                AppError::validation("Invalid header", format!("Header value is not valid: {e}"))
            })?;
            header_map.insert(name, value);
        }

        let response = self
            .client
            .post(url)
            .headers(header_map)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(DeliveryResponse { status, body })
    }
}
