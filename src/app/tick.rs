use super::App;
use crate::chat::SessionPhase;

// Implementation block for tick-related logic in the App.
impl App {
    /// Called on every tick of the event loop.
    ///
    /// Applies whatever background requests have completed and refreshes the
    /// status bar accordingly.
    pub fn on_tick(&mut self) {
        let phase_before = self.chat.session().map(|session| session.phase());
        let applied = self.chat.poll_events();

        let len = self.chat.applications().len();
        if self.app_cursor >= len {
            self.app_cursor = len.saturating_sub(1);
        }

        if let Some(notice) = self.chat.take_notices().pop() {
            self.status_message = notice;
            return;
        }
        if applied == 0 {
            return;
        }

        let Some(session) = self.chat.session() else {
            self.status_message = format!("{} applications available", len);
            return;
        };
        let phase = session.phase();
        if phase_before == Some(phase) {
            return;
        }
        self.status_message = match phase {
            SessionPhase::ProposalPending => {
                String::from("Agent suggested a request: Ctrl+R to run it")
            }
            SessionPhase::Ready if session.last_outcome().is_some() => {
                String::from("API response received: Ctrl+T to send it to the agent")
            }
            other => format!("{}: {}", session.resource_id(), other.label()),
        };
    }
}
