use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::Value;

use super::{BackendEndpoint, ChatError, OutboundPayload};

/// 與 AI 後端進行一問一答的介面。
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// 將一次發言送到後端，回傳原始的 JSON 回覆。
    async fn send(
        &self,
        endpoint: &BackendEndpoint,
        payload: &OutboundPayload,
    ) -> Result<Value, ChatError>;
}

/// 以單次 JSON POST 與後端溝通的實作。
pub struct HttpBackendClient {
    client: Client,
}

impl HttpBackendClient {
    pub fn new(timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChatError::Network(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn send(
        &self,
        endpoint: &BackendEndpoint,
        payload: &OutboundPayload,
    ) -> Result<Value, ChatError> {
        debug!(
            "POST {} (application={}, context={})",
            endpoint.as_str(),
            payload.application,
            payload.status.is_some()
        );
        let response = self
            .client
            .post(endpoint.url().clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(payload)
            .send()
            .await
            .map_err(|err| ChatError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ChatError::Network(err.to_string()))?;
        if !status.is_success() {
            warn!("backend answered {} for {}", status, endpoint.as_str());
        }
        // 任何 JSON 都是回覆，不論狀態碼。
        serde_json::from_str::<Value>(&body)
            .map_err(|err| ChatError::Network(format!("{status}: reply is not JSON: {err}")))
    }
}
