use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{App, FocusArea, InputComposer};

impl App {
    /// The main entry point for handling keyboard events.
    ///
    /// Global shortcuts win; anything else goes to the focused pane.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_global_shortcuts(key) {
            return;
        }

        match self.focus {
            FocusArea::Endpoint => self.handle_endpoint_key(key),
            FocusArea::Applications => self.handle_applications_key(key),
            FocusArea::Chat => self.handle_chat_key(key),
        }
    }

    /// Handles global keyboard shortcuts.
    /// Returns `true` if a shortcut was handled, `false` otherwise.
    fn handle_global_shortcuts(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            // Ctrl+Q: Quit
            (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            // Ctrl+R: Run the suggested request
            (KeyCode::Char('r'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.run_suggested_request();
            }
            // Ctrl+T: Send the API response to the agent
            (KeyCode::Char('t'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.send_response_to_agent();
            }
            // Ctrl+L: Reload applications
            (KeyCode::Char('l'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.reload_applications();
            }
            // Ctrl+S: Save the backend URL
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.save_endpoint();
            }
            (KeyCode::Tab, _) => self.cycle_focus(false),
            (KeyCode::BackTab, _) => self.cycle_focus(true),
            _ => return false,
        }
        true
    }

    fn cycle_focus(&mut self, backwards: bool) {
        if self.focus == FocusArea::Endpoint {
            // Leaving the field applies whatever was typed.
            self.chat
                .set_endpoint(self.endpoint_input.buffer().trim().to_string());
        }
        self.focus = if backwards {
            self.focus.previous()
        } else {
            self.focus.next()
        };
        self.status_message = format!("Focus: {}", self.focus.label());
    }

    fn handle_endpoint_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.commit_endpoint(),
            KeyCode::Esc => {
                self.endpoint_input = InputComposer::with_text(self.chat.endpoint_input());
                self.status_message = String::from("Backend URL edit reverted");
            }
            _ => edit_single_line(&mut self.endpoint_input, key),
        }
    }

    fn handle_applications_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_application_cursor(-1),
            KeyCode::Down => self.move_application_cursor(1),
            KeyCode::PageUp => self.move_application_cursor(-10),
            KeyCode::PageDown => self.move_application_cursor(10),
            KeyCode::Home => self.app_cursor = 0,
            KeyCode::End => self.move_application_cursor(isize::MAX / 2),
            KeyCode::Enter => self.select_highlighted_application(),
            _ => {}
        }
    }

    /// Handles key events when the chat pane is focused.
    fn handle_chat_key(&mut self, key: KeyEvent) {
        let modifiers = key.modifiers;
        match key.code {
            KeyCode::Enter => {
                if modifiers.contains(KeyModifiers::SHIFT) || modifiers.contains(KeyModifiers::ALT)
                {
                    self.chat_input.insert_newline();
                } else {
                    self.submit_chat_message();
                }
            }
            KeyCode::Esc => {
                self.chat_input.clear();
                self.status_message = String::from("Chat input cleared");
            }
            KeyCode::Up | KeyCode::Down
                if self.chat_input.is_empty() || self.chat_input.is_browsing_history() =>
            {
                let navigated = if key.code == KeyCode::Up {
                    self.chat_input.history_previous()
                } else {
                    self.chat_input.history_next()
                };
                if navigated {
                    self.status_message = String::from("Loaded message from history");
                }
            }
            _ => edit_single_line(&mut self.chat_input, key),
        }
    }
}

/// Shared cursor and character editing for both inputs.
fn edit_single_line(input: &mut InputComposer, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_to_start(),
        KeyCode::End => input.move_to_end(),
        KeyCode::Char(ch) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                input.insert_char(ch);
            }
        }
        _ => {}
    }
}
