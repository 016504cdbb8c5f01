use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, warn};

use crate::action::Action;
use crate::event::Event;
use crate::pages::Pages;
use crate::section::Section;

/// Where key presses go when no global binding claims them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Menu,
    Section,
}

/// Menu label, highlighted by the id of its section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
}

pub struct App {
    sections: Pages<Section>,
    menu: Vec<MenuItem>,
    highlighted: Option<String>,
    focus: Focus,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub should_quit: bool,
    clipboard: Option<arboard::Clipboard>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            sections: Pages::new(),
            menu: Vec::new(),
            highlighted: None,
            focus: Focus::default(),
            notice: None,
            error: None,
            should_quit: false,
            clipboard: None,
        }
    }

    /// Register `section` under the next sequential id and add its menu label.
    pub fn add_section(&mut self, title: &str, mut section: Section) -> String {
        let id = self.section_count().to_string();
        section.set_id(&id);
        self.sections.add_page(&id, section);
        self.menu.push(MenuItem {
            id: id.clone(),
            title: title.to_string(),
        });
        id
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Activate section `id`, refreshing it the first time it is shown.
    pub fn switch_to_section(&mut self, id: &str) -> Option<&mut Section> {
        if !self.sections.exists(id) {
            return None;
        }
        self.highlighted = Some(id.to_string());
        let section = self.sections.switch_to_page(id)?;
        if !section.is_initialized() {
            debug!(section = section.id(), "first visit, loading");
            section.refresh();
        }
        Some(section)
    }

    /// Show the first section. Called once before the input loop starts.
    pub fn start(&mut self) {
        if self.sections.is_empty() {
            warn!("no sections registered");
            return;
        }
        self.switch_to_section("0");
    }

    fn cycle_section(&mut self, step: isize) {
        let count = self.section_count();
        if count < 2 {
            return;
        }
        let Some(current) = self.sections.active_name() else {
            self.switch_to_section("0");
            return;
        };
        let Ok(current) = current.parse::<isize>() else {
            warn!(id = current, "section id is not numeric");
            return;
        };
        let count = count as isize;
        let next = ((current + step + count) % count).to_string();
        self.switch_to_section(&next);
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.sections.active()
    }

    fn active_section_mut(&mut self) -> Option<&mut Section> {
        self.sections.active_mut()
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_fullscreen(&self) -> bool {
        self.active_section().is_some_and(Section::is_fullscreen)
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => {
                if self.focus == Focus::Section && self.is_fullscreen() {
                    Action::HideFullscreen
                } else {
                    Action::FocusMenu
                }
            }
            // Tab never reaches the focused widget
            KeyCode::Tab => match self.focus {
                Focus::Section => Action::ToggleFocus,
                Focus::Menu => Action::None,
            },
            _ => match self.focus {
                Focus::Menu => handle_menu_key(key),
                Focus::Section => self
                    .active_section()
                    .map_or(Action::None, |section| section.handle_key(key)),
            },
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(
            action,
            Action::None | Action::MergeRequestsLoaded { .. }
        ) {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::NextSection => self.cycle_section(1),
            Action::PrevSection => self.cycle_section(-1),
            Action::EnterSection => {
                if self.sections.active().is_some() {
                    self.focus = Focus::Section;
                }
            }
            Action::FocusMenu => {
                self.focus = Focus::Menu;
            }
            Action::SelectNext => {
                if let Some(section) = self.active_section_mut() {
                    section.select_next();
                }
            }
            Action::SelectPrev => {
                if let Some(section) = self.active_section_mut() {
                    section.select_prev();
                }
            }
            Action::SelectFirst => {
                if let Some(section) = self.active_section_mut() {
                    section.select_first();
                }
            }
            Action::SelectLast => {
                if let Some(section) = self.active_section_mut() {
                    section.select_last();
                }
            }
            Action::ScrollUp => {
                if let Some(section) = self.active_section_mut() {
                    section.scroll_up();
                }
            }
            Action::ScrollDown => {
                if let Some(section) = self.active_section_mut() {
                    section.scroll_down();
                }
            }
            Action::ToggleFocus => {
                if let Some(section) = self.active_section_mut() {
                    if !section.is_fullscreen() {
                        section.toggle_focus();
                    }
                }
            }
            Action::Reload => {
                if let Some(section) = self.active_section_mut() {
                    section.refresh();
                }
            }
            Action::ShowFullscreen => {
                if let Some(section) = self.active_section_mut() {
                    section.show_fullscreen();
                }
            }
            Action::HideFullscreen => {
                if let Some(section) = self.active_section_mut() {
                    section.hide_fullscreen();
                }
            }
            Action::OpenInBrowser => {
                if let Some(url) = self.selected_url() {
                    if let Err(e) = open::that(&url) {
                        self.error = Some(format!("Could not open {}: {}", url, e));
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_url() {
                    match self.copy_to_clipboard(&url) {
                        Ok(()) => self.notice = Some(format!("Copied {}", url)),
                        Err(e) => self.error = Some(format!("Could not copy URL: {}", e)),
                    }
                }
            }
            Action::MergeRequestsLoaded {
                section,
                load_id,
                result,
            } => match self.sections.get_mut(&section) {
                Some(target) => {
                    target.finish_refresh(load_id, result);
                }
                None => warn!(section = %section, "refresh result for unknown section"),
            },
            Action::None => {}
        }
    }

    fn selected_url(&self) -> Option<String> {
        let page = self.active_section()?.active_page()?;
        let url = &page.request().web_url;
        (!url.is_empty()).then(|| url.clone())
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), arboard::Error> {
        // Kept alive: on X11 the clipboard contents vanish with their owner
        if self.clipboard.is_none() {
            self.clipboard = Some(arboard::Clipboard::new()?);
        }
        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text.to_string()),
            None => Ok(()),
        }
    }
}

fn handle_menu_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Right | KeyCode::Char('l') => Action::NextSection,
        KeyCode::Left | KeyCode::Char('h') => Action::PrevSection,
        KeyCode::Up
        | KeyCode::Down
        | KeyCode::Char('j')
        | KeyCode::Char('k')
        | KeyCode::Enter => Action::EnterSection,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}
