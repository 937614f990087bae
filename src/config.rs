use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_ABSENCE_SENTINEL;

/// 設定檔相對於工作目錄的位置。
pub const CONFIG_FILE: &str = "config/chat.toml";

/// 覆寫平台 origin 的環境變數。
pub const ORIGIN_ENV: &str = "ARGOCD_CHAT_ORIGIN";
/// 覆寫 AI 後端 URL 的環境變數。
pub const BACKEND_URL_ENV: &str = "ARGOCD_CHAT_BACKEND_URL";

/// 頂層設定，從 `config/chat.toml` 載入。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

impl ChatSettings {
    /// 從工作目錄讀取設定。檔案不存在時使用預設值。
    /// 讀取後會套用環境變數覆寫。
    pub fn load(workspace_root: &Path) -> Result<Self> {
        Ok(Self::load_file(workspace_root)?.with_env_overrides())
    }

    /// 只讀取檔案內容，不套用環境變數。
    fn load_file(workspace_root: &Path) -> Result<Self> {
        let config_path = workspace_root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&config_path)
            .with_context(|| format!("讀取設定失敗: {}", config_path.display()))?;
        toml::from_str::<ChatSettings>(&raw)
            .with_context(|| format!("解析設定失敗: {}", config_path.display()))
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(origin) = non_empty_env(ORIGIN_ENV) {
            self.platform.origin = origin;
        }
        if let Some(endpoint) = non_empty_env(BACKEND_URL_ENV) {
            self.backend.endpoint = Some(endpoint);
        }
        self
    }

    /// 只把後端端點寫回 `config/chat.toml`，檔案中的其他值保持原樣。
    ///
    /// 環境變數的覆寫只存在於記憶體中，不會被寫進檔案。
    pub fn save_endpoint(workspace_root: &Path, endpoint: &str) -> Result<PathBuf> {
        let mut on_disk = Self::load_file(workspace_root)?;
        on_disk.backend.endpoint = Some(endpoint.to_string());
        on_disk.save_to_file(workspace_root)
    }

    /// 將目前的設定寫回 `config/chat.toml`。
    pub fn save_to_file(&self, workspace_root: &Path) -> Result<PathBuf> {
        let config_dir = workspace_root.join("config");
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("建立設定目錄失敗: {}", config_dir.display()))?;
        }
        let config_path = workspace_root.join(CONFIG_FILE);
        let serialized = toml::to_string_pretty(self).context("序列化設定失敗")?;
        fs::write(&config_path, serialized)
            .with_context(|| format!("寫入設定失敗: {}", config_path.display()))?;
        Ok(config_path)
    }
}

/// 託管平台（Argo CD API server）的連線設定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// 平台的 origin，相對路徑的建議請求也會以此為基準。
    #[serde(default = "default_origin")]
    pub origin: String,
    /// 直接寫在設定中的 bearer token。
    #[serde(default)]
    pub token: Option<String>,
    /// 用於讀取 token 的環境變數名稱。
    #[serde(default)]
    pub token_env: Option<String>,
    /// 附加到平台請求的額外 HTTP 標頭。
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            token: None,
            token_env: None,
            extra_headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PlatformConfig {
    /// 解析最終的 token。優先順序：`token` 欄位 > `token_env` 環境變數。
    pub fn resolved_token(&self) -> Option<String> {
        if let Some(token) = &self.token {
            Some(token.clone())
        } else if let Some(var) = &self.token_env {
            env::var(var).ok().filter(|value| !value.trim().is_empty())
        } else {
            None
        }
    }

    /// 建立平台請求共用的標頭。
    pub fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.resolved_token() {
            let value = format!("Bearer {}", token);
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&value)?);
        }
        for (key, value) in self.extra_headers.iter() {
            let header_name = HeaderName::from_bytes(key.as_bytes())?;
            headers.insert(header_name, HeaderValue::from_str(value)?);
        }
        Ok(headers)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// AI 後端的設定。端點也可以在執行期間由操作者輸入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// 對話協定本身的細節設定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// 後端用來表示「沒有此欄位」的字串。
    #[serde(default = "default_sentinel")]
    pub absence_sentinel: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            absence_sentinel: default_sentinel(),
        }
    }
}

fn default_origin() -> String {
    String::from("http://localhost:8080")
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_sentinel() -> String {
    String::from(DEFAULT_ABSENCE_SENTINEL)
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ChatSettings::load(dir.path()).unwrap();
        assert_eq!(settings.protocol.absence_sentinel, "None");
        assert_eq!(settings.backend.timeout_secs, 60);
    }

    #[test]
    fn parses_a_full_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[platform]
origin = "https://argocd.example.com"
token = "secret"
timeout_secs = 5

[platform.extra_headers]
x-tenant = "blue"

[backend]
endpoint = "https://backend.example.com/api/analyze"

[protocol]
absence_sentinel = "n/a"
"#,
        )
        .unwrap();

        let settings = ChatSettings::load(dir.path()).unwrap();
        assert_eq!(settings.platform.resolved_token().as_deref(), Some("secret"));
        assert_eq!(settings.platform.timeout(), Duration::from_secs(5));
        assert_eq!(settings.protocol.absence_sentinel, "n/a");

        let headers = settings.platform.default_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret");
        assert_eq!(headers.get("x-tenant").unwrap(), "blue");
    }

    #[test]
    fn save_then_load_keeps_the_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = ChatSettings::default();
        settings.platform.origin = String::from("https://argocd.internal");
        settings.backend.endpoint = Some(String::from("http://localhost:9000/chat"));
        let path = settings.save_to_file(dir.path()).unwrap();
        assert!(path.ends_with(CONFIG_FILE));

        let raw = fs::read_to_string(path).unwrap();
        let reloaded: ChatSettings = toml::from_str(&raw).unwrap();
        assert_eq!(
            reloaded.backend.endpoint.as_deref(),
            Some("http://localhost:9000/chat")
        );
        assert_eq!(reloaded.platform.origin, "https://argocd.internal");
    }

    #[test]
    fn saving_the_endpoint_leaves_other_file_values_alone() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[platform]\norigin = \"https://argocd.from-file\"\n",
        )
        .unwrap();

        // An in-memory override, as ARGOCD_CHAT_ORIGIN would produce.
        let mut settings = ChatSettings::load(dir.path()).unwrap();
        settings.platform.origin = String::from("https://argocd.from-env");

        ChatSettings::save_endpoint(dir.path(), "http://localhost:9000/chat").unwrap();

        let raw = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        let reloaded: ChatSettings = toml::from_str(&raw).unwrap();
        assert_eq!(reloaded.platform.origin, "https://argocd.from-file");
        assert_eq!(
            reloaded.backend.endpoint.as_deref(),
            Some("http://localhost:9000/chat")
        );
    }

    #[test]
    fn saving_the_endpoint_creates_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = ChatSettings::save_endpoint(dir.path(), "https://backend/chat").unwrap();

        let reloaded: ChatSettings = toml::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(reloaded.backend.endpoint.as_deref(), Some("https://backend/chat"));
        assert_eq!(reloaded.platform.origin, "http://localhost:8080");
    }

    #[test]
    fn malformed_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[platform\norigin = 1").unwrap();
        let err = ChatSettings::load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("chat.toml"));
    }
}
