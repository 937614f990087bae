use log::{debug, error, info, warn};

use super::{App, FocusArea};
use crate::chat::{ChatError, is_valid_backend_url};
use crate::config::ChatSettings;

// Implementation block for the operator actions exposed by the UI.
impl App {
    /// Commits the endpoint field into the controller.
    pub(crate) fn commit_endpoint(&mut self) {
        let raw = self.endpoint_input.buffer().trim().to_string();
        self.chat.set_endpoint(raw.clone());
        if is_valid_backend_url(&raw) {
            info!("Backend endpoint set to {}", raw);
            self.status_message = format!("Backend URL set: {}", raw);
            self.focus = FocusArea::Applications;
        } else {
            warn!("Rejected backend endpoint `{}`", raw);
            self.status_message = ChatError::InvalidEndpoint(raw).to_string();
        }
    }

    /// Commits the endpoint and writes only that value to `config/chat.toml`.
    pub(crate) fn save_endpoint(&mut self) {
        self.commit_endpoint();
        if self.chat.endpoint().is_err() {
            return;
        }
        let endpoint = self.chat.endpoint_input().to_string();
        self.settings.backend.endpoint = Some(endpoint.clone());
        match ChatSettings::save_endpoint(&self.workspace_root, &endpoint) {
            Ok(path) => {
                info!("Saved backend endpoint to {}", path.display());
                self.status_message = format!("Backend URL saved to {}", path.display());
            }
            Err(err) => {
                error!("Failed to save settings: {:#}", err);
                self.status_message = format!("Failed to save settings: {err:#}");
            }
        }
    }

    /// Starts a new session for the highlighted application.
    pub(crate) fn select_highlighted_application(&mut self) {
        let Some(name) = self.chat.applications().get(self.app_cursor).cloned() else {
            self.status_message = String::from("No applications loaded (Ctrl+L to reload)");
            return;
        };
        self.chat_input.clear();
        self.chat.select_application(&name);
        self.focus = FocusArea::Chat;
        self.status_message = format!("Loading application info for {}...", name);
    }

    pub(crate) fn move_application_cursor(&mut self, delta: isize) {
        let len = self.chat.applications().len();
        if len == 0 {
            self.app_cursor = 0;
            return;
        }
        let next = (self.app_cursor as isize + delta).clamp(0, len as isize - 1);
        self.app_cursor = next as usize;
    }

    pub(crate) fn reload_applications(&mut self) {
        debug!("Reloading application list");
        self.chat.refresh_applications();
        self.status_message = String::from("Reloading applications...");
    }

    /// Submits the chat composer content as the next user turn.
    pub(crate) fn submit_chat_message(&mut self) {
        let message = self.chat_input.take();
        if message.trim().is_empty() {
            self.status_message = String::from("Chat input is empty, not sending.");
            return;
        }
        match self.chat.submit(&message) {
            Ok(()) => {
                info!("Submitting chat message: {}", message.lines().next().unwrap_or(""));
                self.status_message = String::from("Message sent, waiting for agent...");
            }
            Err(err) => {
                self.chat_input.restore(message);
                self.report_refusal(err);
            }
        }
    }

    /// Runs the backend's suggested request.
    pub(crate) fn run_suggested_request(&mut self) {
        let summary = self
            .chat
            .session()
            .and_then(|session| session.pending_proposal())
            .map(|proposal| proposal.summary());
        match self.chat.run_proposal() {
            Ok(()) => {
                self.status_message = format!("Running {}", summary.unwrap_or_default());
            }
            Err(err) => self.report_refusal(err),
        }
    }

    /// Sends the last API response back to the agent.
    pub(crate) fn send_response_to_agent(&mut self) {
        match self.chat.relay_result() {
            Ok(()) => {
                info!("Relayed API response to agent");
                self.status_message = String::from("API response sent to agent");
            }
            Err(err) => self.report_refusal(err),
        }
    }

    fn report_refusal(&mut self, err: ChatError) {
        warn!("Action refused: {}", err);
        if matches!(err, ChatError::InvalidEndpoint(_)) {
            self.focus = FocusArea::Endpoint;
        }
        self.status_message = err.to_string();
    }
}
