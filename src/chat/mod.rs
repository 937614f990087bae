//! 針對單一應用程式與 AI 後端對話的協定核心。
//!
//! 此模組描述 session 狀態、送往後端的內容、建議請求的驗證與執行，以及執行結果
//! 如何回饋到對話中。介面層只透過 [`ChatController`] 操作這些元件。

/// `client` 模組：以 JSON POST 與 AI 後端一問一答。
pub mod client;
/// `composer` 模組：決定每一輪是否附上應用程式上下文。
pub mod composer;
/// `context` 模組：取得應用程式列表與 manifest 的外部協作者。
pub mod context;
/// `controller` 模組：session、端點與背景請求的唯一持有者。
pub mod controller;
/// `endpoint` 模組：後端 URL 的驗證。
pub mod endpoint;
/// `error` 模組：錯誤分類。
pub mod error;
/// `executor` 模組：執行建議的 HTTP 請求。
pub mod executor;
/// `message` 模組：對話訊息、上下文與後端的請求/回覆格式。
pub mod message;
/// `proposal` 模組：從回覆中擷取並驗證建議請求。
pub mod proposal;
/// `relay` 模組：把執行結果轉成下一輪發言。
pub mod relay;
/// `session` 模組：每個應用程式的對話狀態。
pub mod session;

pub use client::{BackendClient, HttpBackendClient};
pub use composer::{ComposedTurn, compose};
pub use context::{ArgoContextProvider, ContextProvider};
pub use controller::{ChatController, ChatEvent, EventDisposition};
pub use endpoint::{BackendEndpoint, is_valid_backend_url};
pub use error::{ChatError, MalformedProposal};
pub use executor::{ActionOutcome, ActionRunner, HttpActionRunner};
pub use message::{
    BackendReply, ContextBundle, Message, MessageKind, OutboundPayload, ResourceId, Speaker,
};
pub use proposal::{ActionProposal, DEFAULT_ABSENCE_SENTINEL, HttpVerb, ProposalValidator};
pub use relay::relay_text;
pub use session::{ContextState, Session, SessionPhase, SessionStore, SessionTicket};
