//! 對話協定的錯誤分類。
//!
//! 所有錯誤都不會終止程式：非同步流程中的失敗會被轉成代理發出的錯誤訊息，
//! 輸入端的失敗（端點無效、忙碌中、沒有可執行的請求）則回傳給呼叫端顯示。

/// 對話協定中可能發生的錯誤。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// 後端 URL 缺失或不是 http/https，必須由操作者修正後才能傳送。
    #[error("Please enter a valid backend URL (http:// or https://), got `{0}`")]
    InvalidEndpoint(String),
    /// 取得應用程式 manifest 失敗，對話仍可在沒有上下文的情況下繼續。
    #[error("Failed to fetch application context: {0}")]
    ContextFetch(String),
    /// 後端無法連線、回應狀態錯誤或回應不是 JSON。
    #[error("Chat backend error: {0}")]
    Network(String),
    /// 建議的 API 請求執行失敗或回傳錯誤狀態。
    #[error("API request failed: {0}")]
    Execution(String),
    /// 目前沒有可執行的建議請求。
    #[error("No valid API request to run.")]
    NothingToRun,
    /// 目前沒有可以轉送的執行結果。
    #[error("No API response to send.")]
    NothingToRelay,
    /// 同一個 session 已經有一個尚未完成的請求。
    #[error("A request for this application is still in flight")]
    Busy,
    /// 尚未選擇任何應用程式。
    #[error("Select an application first")]
    NoSession,
}

impl ChatError {
    /// 此錯誤寫入對話紀錄時使用的文字。
    pub fn conversation_text(&self) -> String {
        match self {
            ChatError::ContextFetch(cause) => format!("Error getting app data. ({cause})"),
            ChatError::Network(cause) => format!("Error getting chat response. ({cause})"),
            other => other.to_string(),
        }
    }
}

/// 後端回覆中的建議請求欄位不完整或無效。
///
/// 這不是錯誤訊息，只代表「沒有建議」。後端只是聊天而不提出動作時，不能讓
/// session 崩潰。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedProposal {
    #[error("reply carries no `{0}` field")]
    Missing(&'static str),
    #[error("`{0}` is set to the absence marker")]
    Sentinel(&'static str),
    #[error("unsupported HTTP method `{0}`")]
    UnsupportedMethod(String),
    #[error("`{0}` is not a string")]
    NotAString(&'static str),
}
