use reqwest::Url;

use super::ChatError;

/// 檢查操作者輸入的後端 URL 是否可用：必須能解析，且 scheme 為 http 或 https。
pub fn is_valid_backend_url(raw: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// 操作者設定的 AI 後端 URL。
///
/// 只能透過 [`BackendEndpoint::parse`] 建立，因此持有此型別即代表 URL 已通過驗證。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint(Url);

impl BackendEndpoint {
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let trimmed = raw.trim();
        if !is_valid_backend_url(trimmed) {
            return Err(ChatError::InvalidEndpoint(trimmed.to_string()));
        }
        Url::parse(trimmed)
            .map(Self)
            .map_err(|_| ChatError::InvalidEndpoint(trimmed.to_string()))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(is_valid_backend_url("http://localhost:8000/chat"));
        assert!(is_valid_backend_url("https://backend.example.com/api/analyze"));
        assert!(is_valid_backend_url("  https://padded.example.com  "));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(!is_valid_backend_url("ftp://x"));
        assert!(!is_valid_backend_url("file:///etc/passwd"));
        assert!(!is_valid_backend_url("backend.example.com"));
        assert!(!is_valid_backend_url(""));
    }

    #[test]
    fn parse_reports_the_rejected_input() {
        assert_eq!(
            BackendEndpoint::parse("ftp://x"),
            Err(ChatError::InvalidEndpoint("ftp://x".into()))
        );
        let endpoint = BackendEndpoint::parse("https://backend/api").unwrap();
        assert_eq!(endpoint.url().host_str(), Some("backend"));
    }
}
