//! Chat area
//!
//! Displays the most recent lines of the conversation with their delivery
//! state.

use lnchat_app::SessionSnapshot;
use lnchat_core::{ChatLine, Delivery, Sender};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;
const SENDER_WIDTH: usize = 8;

/// Short label for who wrote a line.
pub fn sender_label(sender: &Sender) -> String {
    match sender {
        Sender::Me => "me".to_owned(),
        Sender::Peer(peer) => peer.short(),
    }
}

/// One chat line as styled spans: right-aligned sender, text, delivery mark.
pub fn chat_line(line: &ChatLine) -> Line<'static> {
    let sender_style = match line.sender() {
        Sender::Me => Style::default().fg(Color::Cyan),
        Sender::Peer(_) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    };

    let mut spans = vec![
        Span::styled(format!("{:>SENDER_WIDTH$}", sender_label(line.sender())), sender_style),
        Span::raw(": "),
        Span::raw(line.text().to_owned()),
    ];

    match line.delivery() {
        Delivery::Pending => {},
        Delivery::Delivered { fee_paid: 0 } => {
            spans.push(Span::styled("  ✓", Style::default().fg(Color::Green)));
        },
        Delivery::Delivered { fee_paid } => {
            spans.push(Span::styled("  ✓", Style::default().fg(Color::Green)));
            spans.push(Span::styled(
                format!(" (fee {fee_paid})"),
                Style::default().fg(Color::DarkGray),
            ));
        },
        Delivery::Failed { reason } => {
            spans.push(Span::styled(format!("  ✗ {reason}"), Style::default().fg(Color::Red)));
        },
    }

    Line::from(spans)
}

/// Plain text of [`chat_line`].
pub fn format_line(line: &ChatLine) -> String {
    chat_line(line).to_string()
}

/// Render the chat area.
pub fn render(frame: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Messages ");

    let items: Vec<ListItem> = if snapshot.lines.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        snapshot.lines.iter().map(|line| ListItem::new(chat_line(line))).collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
