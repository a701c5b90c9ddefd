use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::timeline::{Marker, StepAction, Timeline, TimelineEntry};
use crate::tui::App;

use super::truncate;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(timeline) = app.tracker().timeline() else {
        let block = Block::default().borders(Borders::ALL).title(" Timeline ");
        let paragraph = Paragraph::new("No path selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_steps(f, &timeline, app.selected_step, chunks[0]);
    draw_detail(f, timeline.entries.get(app.selected_step), chunks[1]);
}

fn marker_style(marker: Marker) -> Style {
    match marker {
        Marker::Completed => Style::default().fg(Color::Green),
        Marker::Locked => Style::default().fg(Color::DarkGray),
        Marker::Open => Style::default().fg(Color::White),
    }
}

fn draw_steps(f: &mut Frame, timeline: &Timeline, selected: usize, area: Rect) {
    let title_width = usize::from(area.width.saturating_sub(24)).max(10);

    let items: Vec<ListItem> = timeline
        .entries
        .iter()
        .map(|entry| {
            let mut spans = vec![
                Span::styled(
                    format!("{} ", entry.marker.icon()),
                    marker_style(entry.marker),
                ),
                Span::styled(
                    format!("{:<width$}", truncate(&entry.title, title_width), width = title_width),
                    if entry.is_current {
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        marker_style(entry.marker)
                    },
                ),
                Span::styled(
                    format!(" {:<8}", entry.duration),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if let Some(difficulty) = &entry.difficulty {
                spans.push(Span::styled(
                    format!("[{}]", difficulty),
                    Style::default().fg(Color::Magenta),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", timeline.path_name))
        .title_style(Style::default().fg(Color::Cyan));

    if items.is_empty() {
        let paragraph = Paragraph::new("This path has no steps yet").block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(f: &mut Frame, entry: Option<&TimelineEntry>, area: Rect) {
    let Some(entry) = entry else {
        let block = Block::default().borders(Borders::ALL).title(" Step ");
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let (action_text, action_color) = match entry.action {
        StepAction::Toggle { completed: true } => (entry.action.label(), Color::Yellow),
        StepAction::Toggle { completed: false } => (entry.action.label(), Color::Green),
        StepAction::Locked => (entry.action.label(), Color::DarkGray),
    };

    let mut text = vec![
        Line::from(vec![
            Span::styled("Duration: ", Style::default().fg(Color::Gray)),
            Span::styled(entry.duration.clone(), Style::default().fg(Color::White)),
        ]),
        Line::from(""),
    ];

    if let Some(description) = &entry.description {
        text.push(Line::from(Span::styled(
            description.clone(),
            Style::default().fg(Color::White),
        )));
        text.push(Line::from(""));
    }

    text.push(Line::from(vec![
        Span::styled("<space> ", Style::default().fg(Color::Cyan)),
        Span::styled(action_text, Style::default().fg(action_color)),
    ]));

    if !entry.resources.is_empty() {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "Resources:",
            Style::default().fg(Color::Gray),
        )));
        for resource in &entry.resources {
            text.push(Line::from(vec![
                Span::raw("  • "),
                Span::styled(resource.title.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {}", resource.url),
                    Style::default().fg(Color::Blue),
                ),
            ]));
        }
    }

    if let Some(line) = entry.prerequisites_line() {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            line,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", entry.title))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
