//! Terminal front-end for the TUI.
//!
//! Implements the [`Frontend`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The input line lives here;
//! submitted lines go to the session untouched.

use std::io::{self, Stdout, stdout};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use lnchat_app::{Frontend, FrontendEvent, SessionSnapshot};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::{InputAction, InputState, KeyInput, ui};

/// Terminal front-end errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal front-end implementing the [`Frontend`] trait.
///
/// Switches the terminal to raw mode on the alternate screen for its
/// lifetime and restores it on drop.
pub struct TerminalFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    input_state: InputState,
    last_snapshot: Option<SessionSnapshot>,
}

impl TerminalFrontend {
    /// Take over the terminal.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            input_state: InputState::new(),
            last_snapshot: None,
        })
    }

    /// Convert a crossterm key event to `KeyInput`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyInput::Interrupt)
            },
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn draw(&mut self) -> Result<(), TerminalError> {
        let Some(snapshot) = &self.last_snapshot else {
            return Ok(());
        };
        let input = &self.input_state;
        self.terminal.draw(|frame| ui::render(frame, snapshot, input))?;
        Ok(())
    }
}

impl Frontend for TerminalFrontend {
    type Error = TerminalError;

    async fn next_event(&mut self) -> Result<FrontendEvent, Self::Error> {
        loop {
            let Some(event) = self.event_stream.next().await else {
                return Ok(FrontendEvent::Quit);
            };

            match event? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let Some(input) = Self::convert_key(key) else {
                        continue;
                    };
                    match self.input_state.handle_key(input) {
                        InputAction::None => {},
                        InputAction::Redraw => return Ok(FrontendEvent::Redraw),
                        InputAction::Submit(line) => {
                            // Show the cleared input right away
                            self.draw()?;
                            return Ok(FrontendEvent::Submit(line));
                        },
                        InputAction::Quit => return Ok(FrontendEvent::Quit),
                    }
                },
                Event::Resize(..) => return Ok(FrontendEvent::Redraw),
                _ => {},
            }
        }
    }

    fn render(&mut self, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        self.last_snapshot = Some(snapshot.clone());
        self.draw()
    }

    fn stop(&mut self) {
        if let Err(e) = self.terminal.show_cursor() {
            tracing::debug!(error = %e, "failed to show cursor");
        }
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
