use super::{OutboundPayload, Session};

/// 一次使用者發言組合出的結果。
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedTurn {
    pub payload: OutboundPayload,
    /// 這次是否附上了 `status`/`spec`。為 `true` 時，呼叫端在送出後必須呼叫
    /// [`Session::mark_context_sent`]。
    pub attached_context: bool,
}

/// 為一次使用者發言建立送往後端的內容。
///
/// 只有在此 session 尚未送過上下文、而且上下文已經載入時才會附上
/// `status`/`spec`。上下文還沒到的話，這一輪不附上，旗標也不前進，
/// 等下一輪有上下文時再送。
pub fn compose(session: &Session, input: &str) -> ComposedTurn {
    let resource_id = session.resource_id().to_string();
    let context = if session.context_sent() {
        None
    } else {
        session.context()
    };

    let payload = OutboundPayload {
        message: input.to_string(),
        session_id: resource_id.clone(),
        application: resource_id,
        status: context.map(|bundle| bundle.status.clone()),
        spec: context.map(|bundle| bundle.spec.clone()),
    };

    ComposedTurn {
        payload,
        attached_context: context.is_some(),
    }
}
