//! Defines the core state structures for the application.
//!
//! `App` owns the chat controller plus the purely visual state around it:
//! which pane is focused, the two text inputs, the highlighted application and
//! the status bar message. Everything protocol-related lives in the controller.

use std::path::PathBuf;

use crate::chat::ChatController;
use crate::config::ChatSettings;

use super::FocusArea;

/// The main application state.
pub struct App {
    // --- Core State ---
    /// Flag to indicate if the application should quit.
    pub should_quit: bool,
    /// The currently focused UI area.
    pub focus: FocusArea,
    /// The session/action protocol driver.
    pub chat: ChatController,

    // --- Inputs ---
    /// Editable backend URL field.
    pub endpoint_input: InputComposer,
    /// The chat message composer.
    pub chat_input: InputComposer,
    /// Index of the highlighted entry in the application list.
    pub app_cursor: usize,

    // --- UI & Settings ---
    /// The message currently displayed in the status bar.
    pub status_message: String,
    /// The directory `config/` and `logs/` are resolved against.
    pub workspace_root: PathBuf,
    /// Settings loaded at startup; the endpoint is written back on save.
    pub settings: ChatSettings,
}

/// State for a text input, used for both the endpoint field and the chat box.
///
/// Manages the text buffer, cursor position, and submission history.
#[derive(Clone, Default)]
pub struct InputComposer {
    buffer: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
}

impl InputComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a composer pre-filled with `text`, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let buffer = text.into();
        let cursor = buffer.len();
        Self {
            buffer,
            cursor,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Inserts a character at the current cursor position.
    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        self.reset_history_navigation();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.buffer.drain(idx..self.cursor);
            self.cursor = idx;
            self.reset_history_navigation();
        }
    }

    /// Deletes the character at the cursor (delete).
    pub fn delete(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            let end = self.cursor + ch.len_utf8();
            self.buffer.drain(self.cursor..end);
            self.reset_history_navigation();
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.reset_history_navigation();
    }

    /// Takes the content of the buffer, adds it to history, and clears the buffer.
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.buffer);
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.cursor = 0;
        self.reset_history_navigation();
        content
    }

    /// Puts text back after a submission was refused, so nothing typed is lost.
    pub fn restore(&mut self, text: String) {
        if self.history.last() == Some(&text) {
            self.history.pop();
        }
        self.buffer = text;
        self.cursor = self.buffer.len();
    }

    /// Navigates to the previous entry in the submission history.
    pub fn history_previous(&mut self) -> bool {
        if self.history.is_empty() {
            return false;
        }
        let target = match self.history_index {
            Some(idx) => idx.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.load_history(target)
    }

    /// Navigates to the next entry, or back to an empty buffer past the newest.
    pub fn history_next(&mut self) -> bool {
        match self.history_index {
            Some(idx) if idx + 1 < self.history.len() => self.load_history(idx + 1),
            Some(_) => {
                self.history_index = None;
                self.buffer.clear();
                self.cursor = 0;
                true
            }
            None => false,
        }
    }

    /// True while the buffer shows a history entry rather than fresh input.
    pub fn is_browsing_history(&self) -> bool {
        self.history_index.is_some()
    }

    fn load_history(&mut self, index: usize) -> bool {
        if let Some(entry) = self.history.get(index).cloned() {
            self.buffer = entry;
            self.cursor = self.buffer.len();
            self.history_index = Some(index);
            true
        } else {
            false
        }
    }

    fn reset_history_navigation(&mut self) {
        self.history_index = None;
    }

    /// Calculates the (col, row) position of the cursor for rendering.
    pub fn cursor_display_position(&self, width: usize) -> (u16, u16) {
        if width == 0 {
            return (0, 0);
        }
        let mut col = 0usize;
        let mut row = 0usize;
        for ch in self.buffer[..self.cursor].chars() {
            if ch == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            let char_width = unicode_width::UnicodeWidthChar::width(ch)
                .unwrap_or(1)
                .max(1);
            if col + char_width > width {
                row += 1;
                col = 0;
            }
            col += char_width;
        }
        (col as u16, row as u16)
    }
}
