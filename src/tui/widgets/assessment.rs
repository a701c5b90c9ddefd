use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::App;

use super::centered_rect;

pub fn draw_quiz(f: &mut Frame, app: &App, area: Rect) {
    let Some(quiz) = &app.assessment else {
        return;
    };
    let Some(question) = quiz.current_question() else {
        return;
    };
    let index = quiz.current_index();
    let answered = quiz.answers()[index];

    let mut text = vec![
        Line::from(Span::styled(
            question.prompt,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, option) in question.options.iter().enumerate() {
        let radio = if answered == Some(i) { "(•)" } else { "( )" };
        let style = if i == app.option_cursor {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        text.push(Line::from(Span::styled(
            format!("{} {}", radio, option.label),
            style,
        )));
    }

    let answered_count = quiz.answers().iter().filter(|a| a.is_some()).count();
    text.push(Line::from(""));
    let progress_line = if quiz.is_complete() {
        Span::styled(
            "All answered - <CR> on the last question to see results",
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled(
            format!("{}/{} answered", answered_count, quiz.questions().len()),
            Style::default().fg(Color::DarkGray),
        )
    };
    text.push(Line::from(progress_line));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " Level assessment - question {}/{} ",
            index + 1,
            quiz.questions().len()
        ))
        .title_style(Style::default().fg(Color::Cyan));

    let popup = centered_rect(70, 60, area);
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), popup);
}

pub fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let Some(result) = &app.results else {
        return;
    };

    let text = vec![
        Line::from(vec![
            Span::styled("Average score: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.2}", result.average_score),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Recommended path: ", Style::default().fg(Color::Gray)),
            Span::styled(
                result.recommendation.label(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Cyan)),
            Span::raw(" Switch to this path  "),
            Span::styled("n", Style::default().fg(Color::Cyan)),
            Span::raw(" Keep current path"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Assessment results ")
        .title_style(Style::default().fg(Color::Green));

    let popup = centered_rect(60, 40, area);
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(text).block(block), popup);
}

pub fn draw_confirm_reset(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from("This clears every completed step on every path."),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red)),
            Span::raw(" Reset  "),
            Span::styled("any other key", Style::default().fg(Color::Cyan)),
            Span::raw(" Cancel"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Reset progress? ")
        .title_style(Style::default().fg(Color::Red));

    let popup = centered_rect(50, 30, area);
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(text).block(block), popup);
}
