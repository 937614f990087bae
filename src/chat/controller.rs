//! 串起整個對話協定的控制器。
//!
//! `ChatController` 是 session、後端端點與所有非同步請求的唯一持有者。網路請求
//! 以 `tokio::spawn` 在背景執行，完成後透過 channel 回傳帶有 [`SessionTicket`]
//! 的事件；事件套用時若 ticket 已過期就直接丟棄。介面只需要在每個 tick 呼叫
//! [`ChatController::poll_events`]，不需要知道任何協定細節。

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{
    ActionOutcome, ActionRunner, BackendClient, BackendEndpoint, BackendReply, ChatError,
    ContextBundle, ContextProvider, ContextState, Message, ProposalValidator, Session,
    SessionStore, SessionTicket, compose, relay_text,
};

/// 背景任務完成後送回控制器的事件。
#[derive(Debug)]
pub enum ChatEvent {
    ApplicationsLoaded(Result<Vec<String>, String>),
    ContextLoaded {
        ticket: SessionTicket,
        result: Result<ContextBundle, ChatError>,
    },
    ReplyReceived {
        ticket: SessionTicket,
        result: Result<Value, ChatError>,
    },
    ActionFinished {
        ticket: SessionTicket,
        result: Result<ActionOutcome, ChatError>,
    },
}

/// 事件套用的結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Applied,
    /// 事件屬於已被取代的 session，已丟棄。
    Stale,
}

pub struct ChatController {
    sessions: SessionStore,
    endpoint_input: String,
    validator: ProposalValidator,
    applications: Vec<String>,
    notices: Vec<String>,
    context: Arc<dyn ContextProvider>,
    backend: Arc<dyn BackendClient>,
    runner: Arc<dyn ActionRunner>,
    events_tx: UnboundedSender<ChatEvent>,
    events_rx: UnboundedReceiver<ChatEvent>,
}

impl ChatController {
    pub fn new(
        validator: ProposalValidator,
        context: Arc<dyn ContextProvider>,
        backend: Arc<dyn BackendClient>,
        runner: Arc<dyn ActionRunner>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sessions: SessionStore::new(),
            endpoint_input: String::new(),
            validator,
            applications: Vec::new(),
            notices: Vec::new(),
            context,
            backend,
            runner,
            events_tx: tx,
            events_rx: rx,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    pub fn applications(&self) -> &[String] {
        &self.applications
    }

    pub fn endpoint_input(&self) -> &str {
        &self.endpoint_input
    }

    /// 記錄操作者輸入的後端 URL。驗證延後到每次傳送時進行。
    pub fn set_endpoint(&mut self, raw: impl Into<String>) {
        self.endpoint_input = raw.into().trim().to_string();
    }

    /// 目前的端點；不是 http/https 時回傳 `InvalidEndpoint`。
    pub fn endpoint(&self) -> Result<BackendEndpoint, ChatError> {
        BackendEndpoint::parse(&self.endpoint_input)
    }

    /// 取出累積的提示訊息（例如應用程式列表載入失敗），供狀態列顯示。
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// 在背景重新載入應用程式列表。
    pub fn refresh_applications(&self) {
        let provider = Arc::clone(&self.context);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = provider
                .list_applications()
                .await
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send(ChatEvent::ApplicationsLoaded(result));
        });
    }

    /// 選擇應用程式：建立全新的 session，並在背景取得它的上下文。
    pub fn select_application(&mut self, name: &str) -> SessionTicket {
        let ticket = self.sessions.start(name);
        if let Some(session) = self.sessions.current_mut() {
            session.set_context_state(ContextState::Pending);
        }
        info!("selected application {} (epoch {})", name, ticket.epoch);

        let provider = Arc::clone(&self.context);
        let tx = self.events_tx.clone();
        let tagged = ticket.clone();
        tokio::spawn(async move {
            let result = provider
                .fetch_context(&tagged.resource_id)
                .await
                .map_err(|err| ChatError::ContextFetch(format!("{err:#}")));
            let _ = tx.send(ChatEvent::ContextLoaded {
                ticket: tagged,
                result,
            });
        });
        ticket
    }

    /// 送出一則使用者訊息。空白輸入會被忽略。
    pub fn submit(&mut self, input: &str) -> Result<(), ChatError> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.dispatch_turn(Message::user(text))
    }

    /// 執行目前的建議請求。執行會消耗該建議。
    pub fn run_proposal(&mut self) -> Result<(), ChatError> {
        let session = self.sessions.current_mut().ok_or(ChatError::NoSession)?;
        if session.executing() {
            return Err(ChatError::Busy);
        }
        let proposal = session.take_proposal().ok_or(ChatError::NothingToRun)?;
        session.set_executing(true);
        let ticket = session.ticket().clone();
        info!("running suggested request {}", proposal.summary());

        let runner = Arc::clone(&self.runner);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = runner.execute(&proposal).await;
            let _ = tx.send(ChatEvent::ActionFinished { ticket, result });
        });
        Ok(())
    }

    /// 將最近一次的執行結果當成下一輪發言送回後端。
    pub fn relay_result(&mut self) -> Result<(), ChatError> {
        let session = self.sessions.current().ok_or(ChatError::NoSession)?;
        let outcome = session.last_outcome().ok_or(ChatError::NothingToRelay)?;
        let message = Message::relayed(relay_text(outcome));
        self.dispatch_turn(message)?;
        if let Some(session) = self.sessions.current_mut() {
            session.set_last_outcome(None);
        }
        Ok(())
    }

    fn dispatch_turn(&mut self, message: Message) -> Result<(), ChatError> {
        let session = self.sessions.current().ok_or(ChatError::NoSession)?;
        if session.awaiting_reply() {
            return Err(ChatError::Busy);
        }
        let endpoint = self.endpoint()?;

        let session = self.sessions.current_mut().ok_or(ChatError::NoSession)?;
        let turn = compose(session, &message.text);
        session.append(message);
        session.clear_proposal();
        if turn.attached_context {
            session.mark_context_sent();
        }
        session.set_awaiting_reply(true);
        let ticket = session.ticket().clone();
        debug!(
            "dispatching turn for {} (context attached: {})",
            ticket.resource_id, turn.attached_context
        );

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.send(&endpoint, &turn.payload).await;
            let _ = tx.send(ChatEvent::ReplyReceived { ticket, result });
        });
        Ok(())
    }

    /// 套用所有已完成的背景事件，回傳套用的數量（不含被丟棄的過期事件）。
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply_event(event) == EventDisposition::Applied {
                applied += 1;
            }
        }
        applied
    }

    /// 等待下一個背景事件。
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.events_rx.recv().await
    }

    pub fn apply_event(&mut self, event: ChatEvent) -> EventDisposition {
        match event {
            ChatEvent::ApplicationsLoaded(Ok(names)) => {
                info!("loaded {} applications", names.len());
                self.applications = names;
                EventDisposition::Applied
            }
            ChatEvent::ApplicationsLoaded(Err(err)) => {
                warn!("failed to fetch applications: {}", err);
                self.notices
                    .push(format!("Failed to fetch applications: {err}"));
                EventDisposition::Applied
            }
            ChatEvent::ContextLoaded { ticket, result } => {
                let Some(session) = self.sessions.session_for(&ticket) else {
                    debug!("discarding stale context for {}", ticket.resource_id);
                    return EventDisposition::Stale;
                };
                match result {
                    Ok(bundle) => session.set_context_state(ContextState::Loaded(bundle)),
                    Err(err) => {
                        warn!("{}", err);
                        session.set_context_state(ContextState::Unavailable);
                        session.append(Message::agent_error(err.conversation_text()));
                    }
                }
                EventDisposition::Applied
            }
            ChatEvent::ReplyReceived { ticket, result } => {
                let Some(session) = self.sessions.session_for(&ticket) else {
                    debug!("discarding stale reply for {}", ticket.resource_id);
                    return EventDisposition::Stale;
                };
                session.set_awaiting_reply(false);
                match result {
                    Ok(raw) => {
                        let reply = BackendReply::from_value(raw);
                        session.append(Message::agent(reply.text));
                        let proposal = match self.validator.extract(&reply.raw) {
                            Ok(proposal) => Some(proposal),
                            Err(reason) => {
                                debug!("no suggested request: {}", reason);
                                None
                            }
                        };
                        session.set_proposal(proposal);
                    }
                    Err(err) => {
                        warn!("{}", err);
                        session.set_proposal(None);
                        session.append(Message::agent_error(err.conversation_text()));
                    }
                }
                EventDisposition::Applied
            }
            ChatEvent::ActionFinished { ticket, result } => {
                let Some(session) = self.sessions.session_for(&ticket) else {
                    debug!("discarding stale action result for {}", ticket.resource_id);
                    return EventDisposition::Stale;
                };
                session.set_executing(false);
                match result {
                    Ok(outcome) => session.set_last_outcome(Some(outcome)),
                    Err(err) => {
                        warn!("{}", err);
                        session.append(Message::agent_error(err.conversation_text()));
                        // 失敗本身也可以轉送給後端討論。
                        session.set_last_outcome(Some(ActionOutcome::Json(json!({
                            "error": err.to_string(),
                        }))));
                    }
                }
                EventDisposition::Applied
            }
        }
    }
}
