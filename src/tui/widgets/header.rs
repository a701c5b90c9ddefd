use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Tabs},
    Frame,
};

use crate::progress::{ProgressStatus, ProgressSummary};

pub fn draw_tabs(f: &mut Frame, summary: &ProgressSummary, area: Rect) {
    let titles: Vec<Line> = summary
        .badges
        .iter()
        .map(|badge| {
            let badge_color = if badge.percentage == 100 {
                Color::Green
            } else if badge.percentage > 0 {
                Color::Yellow
            } else {
                Color::DarkGray
            };
            Line::from(vec![
                Span::raw(format!("{} ", badge.name)),
                Span::styled(
                    format!("{}%", badge.percentage),
                    Style::default().fg(badge_color),
                ),
            ])
        })
        .collect();
    let selected = summary.badges.iter().position(|b| b.active).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Waypath "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

pub fn draw_progress(f: &mut Frame, summary: &ProgressSummary, area: Rect) {
    let color = match summary.status {
        ProgressStatus::NotStarted => Color::DarkGray,
        ProgressStatus::InProgress { .. } => Color::Cyan,
        ProgressStatus::Complete { .. } => Color::Green,
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", summary.message))
                .title_style(Style::default().fg(color)),
        )
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(u16::from(summary.bar_width()))
        .label(summary.label.clone());

    f.render_widget(gauge, area);
}
