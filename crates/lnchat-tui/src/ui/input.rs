//! Input line
//!
//! Displays the input buffer with cursor. The border title names the
//! destination, or tells the user how to pick one.

use lnchat_app::{DESTINATION_PREFIX, SessionSnapshot};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::InputState;

const PROMPT_WIDTH: u16 = 2; // "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const BORDER_WIDTH: u16 = 1;

/// Title of the input box.
pub fn title(snapshot: &SessionSnapshot) -> String {
    match &snapshot.destination {
        Some(dest) => format!(" Send to {} ", dest.short()),
        None => format!(" Set a destination by typing {DESTINATION_PREFIX}pubkey "),
    }
}

/// Render the input line.
pub fn render(frame: &mut Frame, snapshot: &SessionSnapshot, input: &InputState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(title(snapshot));

    let input_text = format!("> {}", input.buffer());
    let paragraph =
        Paragraph::new(input_text).style(Style::default().fg(Color::White)).block(block);

    frame.render_widget(paragraph, area);

    let cursor_x = area
        .x
        .saturating_add(BORDER_WIDTH + PROMPT_WIDTH)
        .saturating_add(input.cursor() as u16);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(BORDER_WIDTH + 1);

    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
