//! `app` 模組是終端介面的核心。
//!
//! 它持有 `ChatController` 以及畫面上的輸入狀態，處理鍵盤事件，並在每個 tick
//! 套用背景請求的結果。

/// `actions` 模組：把使用者操作轉成控制器呼叫，並更新狀態列。
mod actions;
/// `init` 模組：負責 `App` 結構的初始化。
mod init;
/// `keyboard` 模組：處理所有的鍵盤輸入事件。
mod keyboard;
/// `state` 模組：定義 `App` 與輸入框狀態。
mod state;
/// `tick` 模組：處理定時更新，套用背景事件。
mod tick;

pub use state::{App, InputComposer};

/// 主迴圈的 tick 間隔，背景事件在每個 tick 套用。
pub const TICK_RATE: std::time::Duration = std::time::Duration::from_millis(250);

/// 目前接收鍵盤輸入的區域。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Endpoint,
    Applications,
    Chat,
}

impl FocusArea {
    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::Endpoint => "Backend URL",
            FocusArea::Applications => "Applications",
            FocusArea::Chat => "Chat",
        }
    }

    /// Tab 的切換順序。
    pub fn next(&self) -> Self {
        match self {
            FocusArea::Endpoint => FocusArea::Applications,
            FocusArea::Applications => FocusArea::Chat,
            FocusArea::Chat => FocusArea::Endpoint,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FocusArea::Endpoint => FocusArea::Chat,
            FocusArea::Applications => FocusArea::Endpoint,
            FocusArea::Chat => FocusArea::Applications,
        }
    }
}
