use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::section::{MrPage, Section, Severity};

const INFO_HEIGHT: u16 = 7;

/// Render the section's active page. Used for both the inline pane and the
/// fullscreen view.
pub fn render(frame: &mut Frame, section: &Section, is_active: bool, area: Rect) {
    let border_style = if is_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    if section.is_loading() {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Loading... ")
            .border_style(border_style);
        frame.render_widget(block, area);
        return;
    }

    if let Some(error) = section.error() {
        let failed = Paragraph::new(format!("Could not load merge requests:\n\n{}", error))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false });
        frame.render_widget(failed, area);
        return;
    }

    let Some(page) = section.active_page() else {
        let empty = Paragraph::new("Nothing selected")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INFO_HEIGHT)])
        .split(area);

    frame.render_widget(Clear, area);
    render_description(frame, page, section.scroll(), border_style, chunks[0]);
    render_info(frame, page, chunks[1]);
}

fn render_description(frame: &mut Frame, page: &MrPage, scroll: u16, border: Style, area: Rect) {
    let lines: Vec<Line> = page
        .description()
        .lines()
        .map(|l| Line::from(l.replace('\t', "    ")))
        .collect();

    // Keep the last screenful in view however far the offset went
    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let offset = (scroll as usize).min(max_scroll);

    let visible: Vec<Line> = lines.into_iter().skip(offset).take(inner_height).collect();

    let body = Paragraph::new(Text::from(visible)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", page.title()))
            .border_style(border),
    );

    frame.render_widget(body, area);
}

fn render_info(frame: &mut Frame, page: &MrPage, area: Rect) {
    let info = page.info();
    let conflict_color = match info.severity() {
        Severity::Conflict => Color::Red,
        Severity::Clean => Color::Green,
    };

    let lines = vec![
        Line::from(format!("URL: {}", info.url)),
        Line::from(vec![
            Span::raw("Author: "),
            Span::styled(info.author, Style::default().fg(Color::Green)),
        ]),
        Line::from(format!("Reference: {}", info.reference)),
        Line::from(vec![
            Span::raw("Branch: "),
            Span::styled(info.source_branch, Style::default().fg(Color::Cyan)),
            Span::raw(" → "),
            Span::styled(info.target_branch, Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(
            format!("Has conflicts: {}", info.has_conflicts),
            Style::default().fg(conflict_color),
        )),
    ];

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}
