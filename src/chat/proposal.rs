//! 從後端回覆中擷取並驗證建議的 HTTP 請求。
//!
//! 後端用一個哨兵字串（預設為 `"None"`）表示「沒有這個欄位」。這個慣例只在
//! 這裡處理：一旦離開此模組，缺少的欄位就一律是 `None`，下游程式碼不需要再比對
//! 字串。

use std::fmt;
use std::str::FromStr;

use reqwest::{Method, Url};
use serde_json::Value;

use super::MalformedProposal;

/// 預設的缺值哨兵。
pub const DEFAULT_ABSENCE_SENTINEL: &str = "None";

/// 允許後端建議的標準 HTTP 動詞。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Head => "HEAD",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Options => "OPTIONS",
        }
    }

    pub fn to_method(self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Head => Method::HEAD,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Patch => Method::PATCH,
            HttpVerb::Delete => Method::DELETE,
            HttpVerb::Options => Method::OPTIONS,
        }
    }
}

impl FromStr for HttpVerb {
    type Err = MalformedProposal;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpVerb::Get,
            "HEAD" => HttpVerb::Head,
            "POST" => HttpVerb::Post,
            "PUT" => HttpVerb::Put,
            "PATCH" => HttpVerb::Patch,
            "DELETE" => HttpVerb::Delete,
            "OPTIONS" => HttpVerb::Options,
            _ => return Err(MalformedProposal::UnsupportedMethod(raw.to_string())),
        })
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 經過驗證的建議請求。`url` 已經解析為絕對 URL。
#[derive(Debug, Clone, PartialEq)]
pub struct ActionProposal {
    pub method: HttpVerb,
    pub url: String,
    pub body: Option<Value>,
}

impl ActionProposal {
    /// 介面上顯示的摘要，例如 `GET https://argocd/api/v1/applications/app-a`。
    pub fn summary(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// 依照平台的 origin 與哨兵設定驗證建議請求。
#[derive(Debug, Clone)]
pub struct ProposalValidator {
    origin: String,
    sentinel: String,
}

impl ProposalValidator {
    pub fn new(origin: impl Into<String>, sentinel: impl Into<String>) -> Self {
        let origin = origin.into().trim().trim_end_matches('/').to_string();
        Self {
            origin,
            sentinel: sentinel.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// 從原始回覆中擷取建議請求。
    ///
    /// 欄位可以放在最上層，也可以包在 `request` 物件裡。
    pub fn extract(&self, reply: &Value) -> Result<ActionProposal, MalformedProposal> {
        let source = proposal_source(reply);

        let method = self.required_str(source, "method")?;
        let url = self.required_str(source, "url")?;
        let method = method.parse::<HttpVerb>()?;

        let body = source
            .get("body")
            .filter(|value| !self.is_absent(value))
            .cloned();

        Ok(ActionProposal {
            method,
            url: self.resolve_url(url),
            body,
        })
    }

    /// 沒有 http/https scheme 的 URL 會被視為平台自身 API 的路徑。
    pub fn resolve_url(&self, raw: &str) -> String {
        let raw = raw.trim();
        if let Ok(url) = Url::parse(raw)
            && matches!(url.scheme(), "http" | "https")
        {
            return raw.to_string();
        }
        if raw.starts_with('/') {
            format!("{}{}", self.origin, raw)
        } else {
            format!("{}/{}", self.origin, raw)
        }
    }

    fn required_str<'a>(
        &self,
        source: &'a Value,
        field: &'static str,
    ) -> Result<&'a str, MalformedProposal> {
        let value = source.get(field).ok_or(MalformedProposal::Missing(field))?;
        if self.is_absent(value) {
            return Err(MalformedProposal::Sentinel(field));
        }
        value.as_str().ok_or(MalformedProposal::NotAString(field))
    }

    fn is_absent(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(text) => {
                let text = text.trim();
                text.is_empty() || text.eq_ignore_ascii_case(&self.sentinel)
            }
            _ => false,
        }
    }
}

fn proposal_source(reply: &Value) -> &Value {
    if reply.get("method").is_some() || reply.get("url").is_some() {
        return reply;
    }
    match reply.get("request") {
        Some(nested) if nested.is_object() => nested,
        _ => reply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> ProposalValidator {
        ProposalValidator::new("https://argocd.example.com/", DEFAULT_ABSENCE_SENTINEL)
    }

    #[test]
    fn top_level_fields_become_a_proposal() {
        let proposal = validator()
            .extract(&json!({
                "reply": "let me look",
                "method": "GET",
                "url": "/api/v1/applications/app-a",
            }))
            .unwrap();
        assert_eq!(proposal.method, HttpVerb::Get);
        assert_eq!(
            proposal.url,
            "https://argocd.example.com/api/v1/applications/app-a"
        );
        assert_eq!(proposal.body, None);
    }

    #[test]
    fn nested_request_object_is_accepted() {
        let proposal = validator()
            .extract(&json!({
                "reply": "sync it",
                "request": {
                    "method": "post",
                    "url": "api/v1/applications/app-a/sync",
                    "body": {"prune": true},
                },
            }))
            .unwrap();
        assert_eq!(proposal.method, HttpVerb::Post);
        assert_eq!(
            proposal.url,
            "https://argocd.example.com/api/v1/applications/app-a/sync"
        );
        assert_eq!(proposal.body, Some(json!({"prune": true})));
    }

    #[test]
    fn sentinel_fields_mean_no_proposal() {
        let v = validator();
        assert_eq!(
            v.extract(&json!({"method": "None", "url": "/api/v1/applications"})),
            Err(MalformedProposal::Sentinel("method"))
        );
        assert_eq!(
            v.extract(&json!({"method": "GET", "url": "none"})),
            Err(MalformedProposal::Sentinel("url"))
        );
        assert_eq!(
            v.extract(&json!({"method": "GET", "url": null})),
            Err(MalformedProposal::Sentinel("url"))
        );
        assert_eq!(
            v.extract(&json!({"reply": "just chatting"})),
            Err(MalformedProposal::Missing("method"))
        );
    }

    #[test]
    fn sentinel_body_is_dropped() {
        let proposal = validator()
            .extract(&json!({
                "method": "DELETE",
                "url": "/api/v1/applications/old",
                "body": "None",
            }))
            .unwrap();
        assert_eq!(proposal.body, None);
    }

    #[test]
    fn unknown_verbs_are_rejected() {
        assert_eq!(
            validator().extract(&json!({"method": "EXPLODE", "url": "/x"})),
            Err(MalformedProposal::UnsupportedMethod("EXPLODE".into()))
        );
        assert_eq!(
            validator().extract(&json!({"method": 7, "url": "/x"})),
            Err(MalformedProposal::NotAString("method"))
        );
    }

    #[test]
    fn absolute_urls_pass_through_unchanged() {
        let v = validator();
        assert_eq!(
            v.resolve_url("http://other-host:8080/hook"),
            "http://other-host:8080/hook"
        );
        assert_eq!(
            v.resolve_url("https://example.org"),
            "https://example.org"
        );
        assert_eq!(
            v.resolve_url("/api/v1/applications"),
            "https://argocd.example.com/api/v1/applications"
        );
    }

    #[test]
    fn custom_sentinel_is_honored() {
        let v = ProposalValidator::new("http://localhost:8080", "n/a");
        assert_eq!(
            v.extract(&json!({"method": "N/A", "url": "/x"})),
            Err(MalformedProposal::Sentinel("method"))
        );
        // 預設哨兵在自訂設定下只是一般字串，會被當成未知的動詞。
        assert_eq!(
            v.extract(&json!({"method": "None", "url": "/x"})),
            Err(MalformedProposal::UnsupportedMethod("None".into()))
        );
    }
}
