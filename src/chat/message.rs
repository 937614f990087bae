use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 應用程式（被管理的資源）的識別字串，同時也是 session 的鍵。
pub type ResourceId = String;

/// 訊息的發言者。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Agent,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::Agent => "Agent",
        }
    }
}

/// 訊息的種類，讓介面可以區分一般對話、轉送的執行結果與錯誤。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    RelayedResult,
    Error,
}

/// 對話紀錄中的單一訊息。插入順序即對話順序。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub speaker: Speaker,
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, MessageKind::Text, text)
    }

    pub fn relayed(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, MessageKind::RelayedResult, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Speaker::Agent, MessageKind::Text, text)
    }

    pub fn agent_error(text: impl Into<String>) -> Self {
        Self::new(Speaker::Agent, MessageKind::Error, text)
    }

    fn new(speaker: Speaker, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            speaker,
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// 應用程式 manifest 在取得當下的 `status` 與 `spec` 快照。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContextBundle {
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub spec: Value,
}

impl ContextBundle {
    /// 從完整的 manifest 中擷取 `status` 與 `spec`，其餘欄位忽略。
    pub fn from_manifest(manifest: &Value) -> Self {
        Self {
            status: manifest.get("status").cloned().unwrap_or(Value::Null),
            spec: manifest.get("spec").cloned().unwrap_or(Value::Null),
        }
    }
}

/// 傳送給 AI 後端的請求內容。
///
/// `status`/`spec` 只會在每個 session 第一次能附上上下文時出現。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPayload {
    pub message: String,
    pub session_id: ResourceId,
    pub application: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
}

/// AI 後端的回覆。
///
/// 後端可以回傳帶有 `reply` 文字欄位的物件，也可以回傳任意 JSON；後者會被
/// 字串化後原樣顯示。
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    /// 要寫入對話紀錄的文字。
    pub text: String,
    /// 原始回覆，供建議請求的驗證使用。
    pub raw: Value,
}

impl BackendReply {
    pub fn from_value(raw: Value) -> Self {
        let text = match raw.get("reply").and_then(Value::as_str) {
            Some(reply) if !reply.is_empty() => reply.to_string(),
            _ => raw.to_string(),
        };
        Self { text, raw }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_omits_absent_context_fields() {
        let payload = OutboundPayload {
            message: "hi".into(),
            session_id: "app-a".into(),
            application: "app-a".into(),
            status: None,
            spec: None,
        };
        let encoded = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            encoded,
            json!({"message": "hi", "sessionId": "app-a", "application": "app-a"})
        );
    }

    #[test]
    fn reply_text_prefers_reply_field() {
        let reply = BackendReply::from_value(json!({"reply": "looks healthy", "method": "GET"}));
        assert_eq!(reply.text, "looks healthy");
    }

    #[test]
    fn reply_without_text_is_shown_verbatim() {
        let raw = json!({"answer": 42});
        let reply = BackendReply::from_value(raw.clone());
        assert_eq!(reply.text, raw.to_string());

        let empty = BackendReply::from_value(json!({"reply": ""}));
        assert_eq!(empty.text, r#"{"reply":""}"#);

        let scalar = BackendReply::from_value(json!("plain"));
        assert_eq!(scalar.text, "\"plain\"");
    }

    #[test]
    fn bundle_keeps_only_status_and_spec() {
        let manifest = json!({
            "metadata": {"name": "app-a"},
            "status": {"sync": {"status": "Synced"}},
            "spec": {"project": "default"},
        });
        let bundle = ContextBundle::from_manifest(&manifest);
        assert_eq!(bundle.status, json!({"sync": {"status": "Synced"}}));
        assert_eq!(bundle.spec, json!({"project": "default"}));
    }
}
