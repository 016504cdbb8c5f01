mod detail;
mod section;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, Focus};
use crate::section::Zone;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    match app.active_section() {
        Some(active) if active.is_fullscreen() => detail::render(frame, active, true, chunks[0]),
        Some(active) => {
            section::render(frame, active, app.focus() == Focus::Section, chunks[0])
        }
        None => {
            let empty = Paragraph::new("No section selected")
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(empty, chunks[0]);
        }
    }

    render_menu(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let menu_focused = app.focus() == Focus::Menu;

    let mut spans = Vec::new();
    for item in app.menu() {
        let style = if app.highlighted() == Some(item.id.as_str()) {
            let fg = if menu_focused {
                Color::Yellow
            } else {
                Color::Cyan
            };
            Style::default()
                .fg(Color::Black)
                .bg(fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(format!(" {} ", item.title), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let section_error = app.active_section().and_then(|s| s.error());

    let status = if let Some(error) = app.error.as_deref().or(section_error) {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )])
    } else if app.active_section().is_some_and(|s| s.is_loading()) {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        Line::from(vec![Span::styled(
            help_text(app),
            Style::default().fg(Color::Gray),
        )])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

fn help_text(app: &App) -> &'static str {
    match (app.focus(), app.active_section()) {
        (Focus::Menu, _) => "h/l: sections | j/k/Enter: open section | q: quit",
        (Focus::Section, Some(s)) if s.is_fullscreen() => {
            "j/k: scroll | o: browser | y: copy URL | Esc: back"
        }
        (Focus::Section, Some(s)) if s.zone() == Zone::Detail => {
            "j/k: scroll | Tab: list | o: browser | y: copy URL | Esc: menu"
        }
        (Focus::Section, _) => {
            "j/k/g/G: nav | Enter: fullscreen | Tab: detail | r: reload | o: browser | y: copy URL | Esc: menu"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::section::Section;
    use crate::types::{MergeRequest, References, User};
    use chrono::Utc;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn loaded_app() -> App {
        let mut app = App::new();
        app.add_section("Author", Section::new());
        app.add_section("Approver", Section::new());
        app.start();
        app.update(Action::MergeRequestsLoaded {
            section: "0".to_string(),
            load_id: 1,
            result: Ok(vec![MergeRequest {
                title: "Add retry budget".to_string(),
                description: Some("Retries now back off.".to_string()),
                updated_at: Utc::now(),
                web_url: "https://gitlab.com/g/p/-/merge_requests/3".to_string(),
                author: Some(User {
                    name: "Ada".to_string(),
                    ..Default::default()
                }),
                references: Some(References {
                    full: "g/p!3".to_string(),
                    ..Default::default()
                }),
                has_conflicts: true,
                ..Default::default()
            }]),
        });
        app
    }

    #[test]
    fn renders_menu_list_and_detail() {
        let app = loaded_app();
        let text = screen(&app);
        assert!(text.contains("Author"));
        assert!(text.contains("Approver"));
        assert!(text.contains("Add retry budget"));
        assert!(text.contains("updated today"));
        assert!(text.contains("Retries now back off."));
        assert!(text.contains("Reference: g/p!3"));
        assert!(text.contains("Has conflicts: true"));
    }

    #[test]
    fn fullscreen_hides_the_list() {
        let mut app = loaded_app();
        app.update(Action::EnterSection);
        app.update(Action::ShowFullscreen);
        let text = screen(&app);
        assert!(!text.contains("MRs"));
        assert!(text.contains("Retries now back off."));
    }

    #[test]
    fn long_description_scroll_stops_at_the_end() {
        let mut app = App::new();
        app.add_section("Author", Section::new());
        app.start();
        let description = (1..=40)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        app.update(Action::MergeRequestsLoaded {
            section: "0".to_string(),
            load_id: 1,
            result: Ok(vec![MergeRequest {
                title: "Long one".to_string(),
                description: Some(description),
                updated_at: Utc::now(),
                ..Default::default()
            }]),
        });
        app.update(Action::EnterSection);
        app.update(Action::ShowFullscreen);
        for _ in 0..100 {
            app.update(Action::ScrollDown);
        }
        let text = screen(&app);
        assert!(text.contains("line 40"));
        assert!(text.contains("line 22"));
        assert!(!text.contains("line 21"));

        app.update(Action::ScrollUp);
        assert_eq!(app.active_section().unwrap().scroll(), 38);
    }

    #[test]
    fn section_error_is_visible() {
        let mut app = App::new();
        app.add_section("Author", Section::new());
        app.start();
        app.update(Action::MergeRequestsLoaded {
            section: "0".to_string(),
            load_id: 1,
            result: Err("authentication failed: 401".to_string()),
        });
        let text = screen(&app);
        assert!(text.contains("authentication failed: 401"));
    }
}
