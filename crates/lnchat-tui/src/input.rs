//! Input line editing for the TUI.
//!
//! Owns the text buffer and cursor. Character-level keys edit the buffer;
//! Enter hands the finished line to the session as-is, since command
//! parsing belongs to the session controller.

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Escape key.
    Esc,
    /// Ctrl+C.
    Interrupt,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// What the front-end should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Nothing visible changed.
    None,
    /// Buffer or cursor changed.
    Redraw,
    /// A line was entered.
    Submit(String),
    /// User asked to quit.
    Quit,
}

/// Editable input line.
///
/// The cursor is a character index, so multi-byte input edits correctly.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.buffer.char_indices().nth(cursor).map_or(self.buffer.len(), |(i, _)| i)
    }

    /// Handle a key input event.
    pub fn handle_key(&mut self, key: KeyInput) -> InputAction {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor = self.cursor.saturating_add(1);
                InputAction::Redraw
            },
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return InputAction::None;
                }
                self.cursor = self.cursor.saturating_sub(1);
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                InputAction::Redraw
            },
            KeyInput::Delete => {
                if self.cursor >= self.char_count() {
                    return InputAction::None;
                }
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                InputAction::Redraw
            },
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputAction::Redraw
            },
            KeyInput::Right => {
                self.cursor = self.cursor.saturating_add(1).min(self.char_count());
                InputAction::Redraw
            },
            KeyInput::Home => {
                self.cursor = 0;
                InputAction::Redraw
            },
            KeyInput::End => {
                self.cursor = self.char_count();
                InputAction::Redraw
            },
            KeyInput::Enter => {
                self.cursor = 0;
                let line = std::mem::take(&mut self.buffer);
                if line.trim().is_empty() { InputAction::Redraw } else { InputAction::Submit(line) }
            },
            KeyInput::Esc | KeyInput::Interrupt => InputAction::Quit,
        }
    }
}
