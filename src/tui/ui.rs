use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::widgets::{assessment, header, timeline, toasts};
use super::{App, Mode};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Path tabs
            Constraint::Length(3), // Progress bar
            Constraint::Min(0),    // Timeline
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    let summary = app.tracker().progress_summary();
    header::draw_tabs(f, &summary, chunks[0]);
    header::draw_progress(f, &summary, chunks[1]);
    timeline::draw(f, app, chunks[2]);
    draw_help_bar(f, app, chunks[3]);

    match app.mode {
        Mode::Timeline => {}
        Mode::Assessment => assessment::draw_quiz(f, app, chunks[2]),
        Mode::Results => assessment::draw_results(f, app, chunks[2]),
        Mode::ConfirmReset => assessment::draw_confirm_reset(f, chunks[2]),
    }

    if !app.toasts.is_empty() {
        toasts::draw(f, app.toasts.visible(), f.area());
    }
}

fn key(k: &'static str) -> Span<'static> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.mode {
        Mode::Timeline => vec![
            key("h/l"),
            Span::raw(" Paths  "),
            key("j/k"),
            Span::raw(" Nav  "),
            key("<Space>"),
            Span::raw(" Toggle  "),
            key("c"),
            Span::raw(" Current  "),
            key("a"),
            Span::raw(" Assess  "),
            key("^s"),
            Span::raw(" Save  "),
            key("e"),
            Span::raw(" Export  "),
            key("r"),
            Span::raw(" Reset  "),
            key("q"),
            Span::raw(" Quit"),
        ],
        Mode::Assessment => vec![
            key("j/k"),
            Span::raw(" Option  "),
            key("<Space>"),
            Span::raw(" Choose  "),
            key("h/l"),
            Span::raw(" Prev/Next  "),
            key("<CR>"),
            Span::raw(" Answer  "),
            key("<Esc>"),
            Span::raw(" Cancel"),
        ],
        Mode::Results => vec![
            key("y"),
            Span::raw(" Apply  "),
            key("n/<Esc>"),
            Span::raw(" Keep current"),
        ],
        Mode::ConfirmReset => vec![
            key("y"),
            Span::raw(" Confirm  "),
            key("<any>"),
            Span::raw(" Cancel"),
        ],
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
