use super::ActionOutcome;

/// 將執行結果轉成下一輪要送回後端的文字：結構化結果用縮排 JSON，其餘保留原文。
pub fn relay_text(outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Json(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        ActionOutcome::Text(text) => text.clone(),
    }
}
