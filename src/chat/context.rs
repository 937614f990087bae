//! 取得應用程式列表與 manifest 的外部協作者。

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::PlatformConfig;

use super::ContextBundle;

/// 提供應用程式列表與單一應用程式上下文的介面。
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// 列出所有可選擇的應用程式名稱。
    async fn list_applications(&self) -> Result<Vec<String>>;

    /// 取得指定應用程式目前的 `status`/`spec`。
    async fn fetch_context(&self, name: &str) -> Result<ContextBundle>;
}

#[derive(Deserialize)]
struct ApplicationList {
    #[serde(default)]
    items: Option<Vec<ApplicationItem>>,
}

#[derive(Deserialize)]
struct ApplicationItem {
    metadata: ApplicationMetadata,
}

#[derive(Deserialize)]
struct ApplicationMetadata {
    name: String,
}

/// 透過 Argo CD API server 的 REST 介面取得上下文。
pub struct ArgoContextProvider {
    origin: String,
    client: Client,
}

impl ArgoContextProvider {
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(config.default_headers()?)
            .timeout(config.timeout())
            .build()
            .context("建立平台 HTTP 客戶端失敗")?;
        Ok(Self {
            origin: config.origin.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json(&self, url: String) -> Result<Value> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} 失敗"))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("GET {url} 回應 {status}: {text}"));
        }
        response
            .json::<Value>()
            .await
            .with_context(|| format!("解析 {url} 回應失敗"))
    }
}

#[async_trait]
impl ContextProvider for ArgoContextProvider {
    async fn list_applications(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/v1/applications", self.origin);
        let body = self.get_json(url).await?;
        let list: ApplicationList =
            serde_json::from_value(body).context("應用程式列表格式不正確")?;
        Ok(list
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.metadata.name)
            .collect())
    }

    async fn fetch_context(&self, name: &str) -> Result<ContextBundle> {
        let url = format!("{}/api/v1/applications/{}", self.origin, name);
        let manifest = self.get_json(url).await?;
        if !manifest.is_object() {
            return Err(anyhow!("應用程式 {name} 的 manifest 不是 JSON 物件"));
        }
        Ok(ContextBundle::from_manifest(&manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn application_list_tolerates_null_items() {
        let list: ApplicationList = serde_json::from_value(json!({"items": null})).unwrap();
        assert!(list.items.is_none());

        let list: ApplicationList = serde_json::from_value(json!({
            "items": [
                {"metadata": {"name": "app-a", "namespace": "argocd"}},
                {"metadata": {"name": "app-b"}},
            ]
        }))
        .unwrap();
        let names: Vec<_> = list
            .items
            .unwrap()
            .into_iter()
            .map(|item| item.metadata.name)
            .collect();
        assert_eq!(names, ["app-a", "app-b"]);
    }
}
