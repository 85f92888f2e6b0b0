//! Status bar
//!
//! Displays the ledger balance with the destination, pending sends and the
//! health of the inbound path.

use lnchat_app::{InboundHealth, SessionSnapshot};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Status bar contents.
pub fn status_line(snapshot: &SessionSnapshot) -> Line<'static> {
    let inbound = match &snapshot.inbound {
        InboundHealth::Listening => Span::styled("listening", Style::default().fg(Color::Green)),
        InboundHealth::Starting => Span::styled("starting", Style::default().fg(Color::Yellow)),
        InboundHealth::Closed => Span::styled("inbound closed", Style::default().fg(Color::Yellow)),
        InboundHealth::Failed(reason) => Span::styled(
            reason.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };

    let balance = snapshot.balance.map_or_else(String::new, |b| format!(" | balance {b}"));
    let pending = if snapshot.pending > 0 {
        format!(" | {} pending", snapshot.pending)
    } else {
        String::new()
    };
    let closed = if snapshot.closed { " | closed" } else { "" };

    Line::from(vec![
        Span::raw(" "),
        inbound,
        Span::raw(format!("{balance}{pending}{closed}")),
    ])
}

/// Render the status bar.
pub fn render(frame: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let paragraph = Paragraph::new(status_line(snapshot))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
