use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::section::{Section, Zone};

use super::detail;

/// List on the left, detail page on the right, 1:2.
pub fn render(frame: &mut Frame, section: &Section, focused: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(area);

    render_list(frame, section, focused && section.zone() == Zone::List, chunks[0]);
    detail::render(
        frame,
        section,
        focused && section.zone() == Zone::Detail,
        chunks[1],
    );
}

fn render_list(frame: &mut Frame, section: &Section, is_active: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" MRs ({}) ", section.entries().len()))
        .border_style(if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    if section.entries().is_empty() {
        let message = if section.is_loading() {
            "Loading..."
        } else {
            "No merge requests"
        };
        let empty = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = section
        .entries()
        .iter()
        .map(|entry| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    entry.title.as_str(),
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(Span::styled(
                    format!("  {}", entry.secondary),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let highlight = if is_active {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let list = List::new(items).block(block).highlight_style(highlight);

    let mut state = ListState::default();
    state.select(section.selected());

    frame.render_stateful_widget(list, area, &mut state);
}
