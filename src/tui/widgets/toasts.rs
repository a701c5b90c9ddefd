use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::notify::{Notification, NotificationLevel};

use super::truncate;

const TOAST_WIDTH: u16 = 48;

// Stacked in the top-right corner, newest last
pub fn draw(f: &mut Frame, toasts: &[Notification], area: Rect) {
    let width = TOAST_WIDTH.min(area.width);
    let max_message = usize::from(width.saturating_sub(4));

    for (i, toast) in toasts.iter().enumerate() {
        let y = area.y + 1 + (i as u16) * 3;
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: 3,
        };

        let color = match toast.level {
            NotificationLevel::Info => Color::Cyan,
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Warning => Color::Yellow,
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(format!(" {} ", toast.level.label()));
        let text = Line::from(Span::styled(
            truncate(&toast.message, max_message),
            Style::default().fg(Color::White),
        ));

        f.render_widget(Clear, rect);
        f.render_widget(Paragraph::new(text).block(block), rect);
    }
}
