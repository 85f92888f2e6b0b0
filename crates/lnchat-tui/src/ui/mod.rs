//! UI rendering
//!
//! Rendering functions that convert a session snapshot and the input line
//! into terminal output using ratatui widgets. All functions are pure (no
//! I/O), taking state and drawing into the frame.

pub mod chat;
pub mod input;
pub mod status;

use lnchat_app::SessionSnapshot;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::InputState;

/// Render the entire UI.
pub fn render(frame: &mut Frame, snapshot: &SessionSnapshot, input: &InputState) {
    const MESSAGES_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MESSAGES_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [messages_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    chat::render(frame, snapshot, *messages_area);
    input::render(frame, snapshot, input, *input_area);
    status::render(frame, snapshot, *status_area);
}
