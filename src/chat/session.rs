use super::{ActionOutcome, ActionProposal, ContextBundle, Message, ResourceId};

/// 每次發出非同步請求時附上的標籤。
///
/// 回應抵達時若標籤已不是目前的 session，代表操作者在等待期間切換了應用程式，
/// 這份回應必須丟棄。`epoch` 讓重新選擇同一個應用程式也會讓舊請求失效。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTicket {
    pub resource_id: ResourceId,
    pub epoch: u64,
}

/// 應用程式 manifest 的取得狀態。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContextState {
    #[default]
    NotRequested,
    Pending,
    Loaded(ContextBundle),
    Unavailable,
}

/// session 的狀態機位置，由欄位推導而來。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    ContextPending,
    Ready,
    AwaitingReply,
    ProposalPending,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Empty => "empty",
            SessionPhase::ContextPending => "loading application info",
            SessionPhase::Ready => "ready",
            SessionPhase::AwaitingReply => "waiting for agent",
            SessionPhase::ProposalPending => "suggested request pending",
        }
    }
}

/// 單一應用程式的對話狀態。
#[derive(Debug, Clone)]
pub struct Session {
    ticket: SessionTicket,
    messages: Vec<Message>,
    context_sent: bool,
    pending_proposal: Option<ActionProposal>,
    context: ContextState,
    last_outcome: Option<ActionOutcome>,
    awaiting_reply: bool,
    executing: bool,
}

impl Session {
    fn new(ticket: SessionTicket) -> Self {
        Self {
            ticket,
            messages: Vec::new(),
            context_sent: false,
            pending_proposal: None,
            context: ContextState::NotRequested,
            last_outcome: None,
            awaiting_reply: false,
            executing: false,
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.ticket.resource_id
    }

    pub fn ticket(&self) -> &SessionTicket {
        &self.ticket
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// 將訊息加到對話紀錄的最後。核心不限制長度，顯示層自行截斷。
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn context_sent(&self) -> bool {
        self.context_sent
    }

    /// 標記上下文已送出。重複呼叫沒有影響。
    pub fn mark_context_sent(&mut self) {
        self.context_sent = true;
    }

    pub fn pending_proposal(&self) -> Option<&ActionProposal> {
        self.pending_proposal.as_ref()
    }

    pub fn set_proposal(&mut self, proposal: Option<ActionProposal>) {
        self.pending_proposal = proposal;
    }

    pub fn clear_proposal(&mut self) {
        self.pending_proposal = None;
    }

    /// 取出建議請求，準備執行。取出後 session 不再持有它。
    pub fn take_proposal(&mut self) -> Option<ActionProposal> {
        self.pending_proposal.take()
    }

    pub fn context_state(&self) -> &ContextState {
        &self.context
    }

    /// 已載入的上下文；尚未載入或載入失敗時為 `None`。
    pub fn context(&self) -> Option<&ContextBundle> {
        match &self.context {
            ContextState::Loaded(bundle) => Some(bundle),
            _ => None,
        }
    }

    pub fn set_context_state(&mut self, state: ContextState) {
        self.context = state;
    }

    pub fn last_outcome(&self) -> Option<&ActionOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn set_last_outcome(&mut self, outcome: Option<ActionOutcome>) {
        self.last_outcome = outcome;
    }

    pub fn take_last_outcome(&mut self) -> Option<ActionOutcome> {
        self.last_outcome.take()
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub fn executing(&self) -> bool {
        self.executing
    }

    pub fn set_executing(&mut self, executing: bool) {
        self.executing = executing;
    }

    pub fn phase(&self) -> SessionPhase {
        if self.awaiting_reply {
            SessionPhase::AwaitingReply
        } else if self.pending_proposal.is_some() {
            SessionPhase::ProposalPending
        } else {
            match self.context {
                ContextState::NotRequested => SessionPhase::Empty,
                ContextState::Pending => SessionPhase::ContextPending,
                ContextState::Loaded(_) | ContextState::Unavailable => SessionPhase::Ready,
            }
        }
    }
}

/// 持有目前唯一的 session。
///
/// 切換應用程式會丟棄舊的 session（不合併、不保留紀錄）。
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
    epoch: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 為指定的應用程式建立新的 session，並讓先前所有的 ticket 失效。
    pub fn start(&mut self, resource_id: impl Into<ResourceId>) -> SessionTicket {
        self.epoch += 1;
        let ticket = SessionTicket {
            resource_id: resource_id.into(),
            epoch: self.epoch,
        };
        self.current = Some(Session::new(ticket.clone()));
        ticket
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Session> {
        self.current.as_mut()
    }

    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.current
            .as_ref()
            .is_some_and(|session| session.ticket == *ticket)
    }

    /// 只有在 ticket 仍然有效時才回傳 session。
    pub fn session_for(&mut self, ticket: &SessionTicket) -> Option<&mut Session> {
        self.current
            .as_mut()
            .filter(|session| session.ticket == *ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::HttpVerb;
    use serde_json::json;

    fn proposal() -> ActionProposal {
        ActionProposal {
            method: HttpVerb::Get,
            url: "https://argocd/api/v1/applications/app-a".into(),
            body: None,
        }
    }

    #[test]
    fn start_yields_a_blank_session() {
        let mut store = SessionStore::new();
        store.start("app-a");
        let session = store.current().unwrap();
        assert_eq!(session.resource_id(), "app-a");
        assert!(session.messages().is_empty());
        assert!(!session.context_sent());
        assert!(session.pending_proposal().is_none());
        assert_eq!(session.phase(), SessionPhase::Empty);
    }

    #[test]
    fn switching_resources_discards_previous_state() {
        let mut store = SessionStore::new();
        let first = store.start("app-a");
        {
            let session = store.current_mut().unwrap();
            session.append(Message::user("why is this degraded?"));
            session.mark_context_sent();
            session.set_proposal(Some(proposal()));
            session.set_last_outcome(Some(ActionOutcome::Json(json!({"ok": true}))));
        }

        let second = store.start("app-b");
        let session = store.current().unwrap();
        assert_eq!(session.resource_id(), "app-b");
        assert!(session.messages().is_empty());
        assert!(!session.context_sent());
        assert!(session.pending_proposal().is_none());
        assert!(session.last_outcome().is_none());

        assert!(!store.is_current(&first));
        assert!(store.is_current(&second));
    }

    #[test]
    fn reselecting_the_same_resource_invalidates_old_tickets() {
        let mut store = SessionStore::new();
        let first = store.start("app-a");
        let second = store.start("app-a");
        assert_ne!(first, second);
        assert!(store.session_for(&first).is_none());
        assert!(store.session_for(&second).is_some());
    }

    #[test]
    fn mark_context_sent_is_idempotent() {
        let mut store = SessionStore::new();
        store.start("app-a");
        let session = store.current_mut().unwrap();
        session.mark_context_sent();
        session.mark_context_sent();
        assert!(session.context_sent());
    }

    #[test]
    fn messages_keep_insertion_order() {
        let mut store = SessionStore::new();
        store.start("app-a");
        let session = store.current_mut().unwrap();
        session.append(Message::user("one"));
        session.append(Message::agent("two"));
        session.append(Message::relayed("three"));
        let texts: Vec<_> = session.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn phase_follows_the_session_lifecycle() {
        let mut store = SessionStore::new();
        store.start("app-a");
        let session = store.current_mut().unwrap();

        session.set_context_state(ContextState::Pending);
        assert_eq!(session.phase(), SessionPhase::ContextPending);

        session.set_context_state(ContextState::Loaded(ContextBundle {
            status: json!("Synced"),
            spec: json!({}),
        }));
        assert_eq!(session.phase(), SessionPhase::Ready);

        session.set_awaiting_reply(true);
        assert_eq!(session.phase(), SessionPhase::AwaitingReply);

        session.set_awaiting_reply(false);
        session.set_proposal(Some(proposal()));
        assert_eq!(session.phase(), SessionPhase::ProposalPending);

        assert!(session.take_proposal().is_some());
        assert_eq!(session.phase(), SessionPhase::Ready);
    }
}
