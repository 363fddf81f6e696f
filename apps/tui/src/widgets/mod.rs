//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use shipquote_core::NoticeKind;

/// Bottom status bar. Notices are colored by outcome.
pub(crate) fn status_bar(msg: &str, kind: Option<NoticeKind>) -> Paragraph<'_> {
    let bg = match kind {
        Some(NoticeKind::Success) => Color::Green,
        Some(NoticeKind::Failure) => Color::Red,
        None => Color::DarkGray,
    };
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(bg).fg(Color::White))
}

/// Step title with a progress bar and badge ("Step 2 of 7").
pub(crate) fn progress_gauge<'a>(title: &'a str, percent: f64, badge: &'a str) -> Gauge<'a> {
    Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} ")),
        )
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(badge)
}
