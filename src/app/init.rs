use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;

use super::{App, FocusArea, InputComposer};
use crate::chat::{
    ArgoContextProvider, ChatController, HttpActionRunner, HttpBackendClient, ProposalValidator,
};
use crate::config::ChatSettings;

impl App {
    /// Creates a new instance of the `App` state.
    ///
    /// Builds the HTTP collaborators from `settings`, seeds the endpoint field
    /// from the configuration, and starts loading the application list.
    pub fn new(workspace_root: PathBuf, settings: ChatSettings) -> Result<Self> {
        debug!(
            "Initializing App with workspace {} and origin {}",
            workspace_root.display(),
            settings.platform.origin
        );

        let context = ArgoContextProvider::new(&settings.platform)?;
        let runner = HttpActionRunner::new(&settings.platform)?;
        let backend = HttpBackendClient::new(settings.backend.timeout())
            .context("建立後端 HTTP 客戶端失敗")?;
        let validator = ProposalValidator::new(
            settings.platform.origin.clone(),
            settings.protocol.absence_sentinel.clone(),
        );
        let chat = ChatController::new(
            validator,
            Arc::new(context),
            Arc::new(backend),
            Arc::new(runner),
        );
        Ok(Self::with_controller(workspace_root, settings, chat))
    }

    /// Wires an already-built controller into a fresh `App`.
    pub fn with_controller(
        workspace_root: PathBuf,
        settings: ChatSettings,
        mut chat: ChatController,
    ) -> Self {
        let endpoint = settings.backend.endpoint.clone().unwrap_or_default();
        chat.set_endpoint(endpoint.clone());
        chat.refresh_applications();

        // Start on the endpoint field when nothing is configured yet.
        let focus = if endpoint.is_empty() {
            FocusArea::Endpoint
        } else {
            FocusArea::Applications
        };

        Self {
            should_quit: false,
            focus,
            chat,
            endpoint_input: InputComposer::with_text(endpoint),
            chat_input: InputComposer::new(),
            app_cursor: 0,
            status_message: String::from(
                "Tab: panes | Enter: select/send | Ctrl+R: run | Ctrl+T: relay | Ctrl+Q: quit",
            ),
            workspace_root,
            settings,
        }
    }
}
