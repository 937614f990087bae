use anyhow::Context;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::config::PlatformConfig;

use super::{ActionProposal, ChatError};

/// 執行建議請求後取得的回應內容。
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// 回應本文可以解析為 JSON。
    Json(Value),
    /// 回應本文不是 JSON，原樣保留。
    Text(String),
}

impl ActionOutcome {
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => ActionOutcome::Json(value),
            Err(_) => ActionOutcome::Text(body),
        }
    }
}

/// 執行經操作者確認的建議請求。
#[async_trait]
pub trait ActionRunner: Send + Sync {
    async fn execute(&self, proposal: &ActionProposal) -> Result<ActionOutcome, ChatError>;
}

/// 使用 reqwest 對平台 API 或外部 URL 發出請求。
///
/// 平台的標頭（token 與 `extra_headers`）只附加在與平台 origin 相同
/// （scheme、host、port 皆相同）的請求上。
pub struct HttpActionRunner {
    client: Client,
    origin: Option<Url>,
    platform_headers: HeaderMap,
}

impl HttpActionRunner {
    pub fn new(config: &PlatformConfig) -> anyhow::Result<Self> {
        let platform_headers = config.default_headers()?;
        let origin = match Url::parse(config.origin.trim()) {
            Ok(origin) => Some(origin),
            Err(err) => {
                warn!("platform origin `{}` is not a URL: {}", config.origin, err);
                None
            }
        };
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("建立執行用 HTTP 客戶端失敗")?;
        Ok(Self {
            client,
            origin,
            platform_headers,
        })
    }

    fn is_platform_url(&self, url: &Url) -> bool {
        self.origin
            .as_ref()
            .is_some_and(|origin| origin.origin() == url.origin())
    }
}

#[async_trait]
impl ActionRunner for HttpActionRunner {
    async fn execute(&self, proposal: &ActionProposal) -> Result<ActionOutcome, ChatError> {
        debug!("executing suggested request {}", proposal.summary());
        let url = Url::parse(&proposal.url)
            .map_err(|err| ChatError::Execution(format!("invalid URL {}: {err}", proposal.url)))?;
        let mut request = self
            .client
            .request(proposal.method.to_method(), url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.is_platform_url(&url) {
            request = request.headers(self.platform_headers.clone());
        } else {
            debug!("{} is off the platform origin, sending without credentials", url);
        }
        if let Some(body) = &proposal.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ChatError::Execution(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ChatError::Execution(err.to_string()))?;
        if !status.is_success() {
            return Err(ChatError::Execution(format!("{status}: {body}")));
        }
        Ok(ActionOutcome::from_body(body))
    }
}
