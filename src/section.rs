use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, warn};

use crate::action::Action;
use crate::pages::Pages;
use crate::types::MergeRequest;

/// Identifies one refresh of one section. Results carrying an older
/// `load_id` than the section's current one are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub section: String,
    pub load_id: u64,
}

pub type RefreshFn = Box<dyn FnMut(RefreshTicket)>;

/// Which half of the inline layout holds input focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    #[default]
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    #[default]
    Inline,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Clean,
    Conflict,
}

/// Summary shown under the description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo<'a> {
    pub url: &'a str,
    pub author: &'a str,
    pub reference: &'a str,
    pub source_branch: &'a str,
    pub target_branch: &'a str,
    pub has_conflicts: bool,
}

impl PageInfo<'_> {
    pub fn severity(&self) -> Severity {
        if self.has_conflicts {
            Severity::Conflict
        } else {
            Severity::Clean
        }
    }
}

/// Detail page for one merge request. The inline and fullscreen
/// presentations render the same page.
#[derive(Debug, Clone)]
pub struct MrPage {
    request: Arc<MergeRequest>,
}

impl MrPage {
    pub fn new(request: Arc<MergeRequest>) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &MergeRequest {
        &self.request
    }

    pub fn title(&self) -> &str {
        &self.request.title
    }

    pub fn description(&self) -> &str {
        self.request.description.as_deref().unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.description().lines().count()
    }

    pub fn info(&self) -> PageInfo<'_> {
        PageInfo {
            url: &self.request.web_url,
            author: self.request.author_name(),
            reference: self.request.full_reference(),
            source_branch: &self.request.source_branch,
            target_branch: &self.request.target_branch,
            has_conflicts: self.request.has_conflicts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub title: String,
    pub secondary: String,
}

/// "updated today", "updated 1 day ago", "updated N days ago". Whole days,
/// truncated.
pub fn age_phrase(now: DateTime<Utc>, updated_at: DateTime<Utc>) -> String {
    let days = now.signed_duration_since(updated_at).num_days();
    if days <= 0 {
        "updated today".to_string()
    } else if days == 1 {
        "updated 1 day ago".to_string()
    } else {
        format!("updated {} days ago", days)
    }
}

/// One perspective on merge requests: a selectable list paired 1:1 with a
/// registry of detail pages named "0", "1", ...
pub struct Section {
    id: String,
    pages: Pages<MrPage>,
    entries: Vec<ListEntry>,
    selected: Option<usize>,
    zone: Zone,
    presentation: Presentation,
    scroll: u16,
    initialized: bool,
    loading: bool,
    load_id: u64,
    error: Option<String>,
    refresh: Option<RefreshFn>,
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("entries", &self.entries.len())
            .field("selected", &self.selected)
            .field("zone", &self.zone)
            .field("presentation", &self.presentation)
            .field("initialized", &self.initialized)
            .field("loading", &self.loading)
            .field("load_id", &self.load_id)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

impl Section {
    pub fn new() -> Self {
        Self {
            id: String::new(),
            pages: Pages::new(),
            entries: Vec::new(),
            selected: None,
            zone: Zone::default(),
            presentation: Presentation::default(),
            scroll: 0,
            initialized: false,
            loading: false,
            load_id: 0,
            error: None,
            refresh: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    pub fn add_request(&mut self, request: MergeRequest) {
        let name = self.pages.len().to_string();
        let entry = ListEntry {
            title: request.title.clone(),
            secondary: age_phrase(Utc::now(), request.updated_at),
        };
        self.pages.add_page(&name, MrPage::new(Arc::new(request)));
        self.entries.push(entry);

        // The first entry is selected as soon as it exists
        if self.selected.is_none() {
            self.select(0);
        }
    }

    /// Empty the list and the page registry together.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.entries.clear();
        self.selected = None;
        self.scroll = 0;
        self.presentation = Presentation::Inline;
    }

    /// Clear and ask the bound refresh function to repopulate. Without a
    /// bound function this is just a clear.
    pub fn refresh(&mut self) {
        self.initialized = true;
        self.clear();
        self.error = None;
        self.load_id += 1;

        let ticket = RefreshTicket {
            section: self.id.clone(),
            load_id: self.load_id,
        };
        match self.refresh.as_mut() {
            Some(refresh) => {
                debug!(section = %ticket.section, load_id = ticket.load_id, "refresh dispatched");
                self.loading = true;
                refresh(ticket);
            }
            None => {
                self.loading = false;
            }
        }
    }

    /// Apply the outcome of the refresh identified by `load_id`. Returns
    /// false when a newer refresh has superseded it.
    pub fn finish_refresh(
        &mut self,
        load_id: u64,
        result: Result<Vec<MergeRequest>, String>,
    ) -> bool {
        if load_id != self.load_id {
            warn!(
                section = %self.id,
                load_id,
                current = self.load_id,
                "dropping stale refresh result"
            );
            return false;
        }

        self.clear();
        self.loading = false;
        match result {
            Ok(requests) => {
                for request in requests {
                    self.add_request(request);
                }
                self.error = None;
            }
            Err(err) => {
                warn!(section = %self.id, error = %err, "refresh failed");
                self.error = Some(err);
            }
        }
        true
    }

    /// Bind the function `refresh` invokes, replacing any earlier one.
    pub fn set_refresh(&mut self, refresh: impl FnMut(RefreshTicket) + 'static) {
        self.refresh = Some(Box::new(refresh));
    }

    pub fn toggle_focus(&mut self) {
        self.zone = match self.zone {
            Zone::List => Zone::Detail,
            Zone::Detail => Zone::List,
        };
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.selected = Some(index);
        self.pages.switch_to_page(&index.to_string());
        self.scroll = 0;
        true
    }

    pub fn select_next(&mut self) {
        let next = match self.selected {
            Some(i) => (i + 1).min(self.entries.len().saturating_sub(1)),
            None => 0,
        };
        self.select(next);
    }

    pub fn select_prev(&mut self) {
        let prev = self.selected.map_or(0, |i| i.saturating_sub(1));
        self.select(prev);
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        if !self.entries.is_empty() {
            self.select(self.entries.len() - 1);
        }
    }

    /// Stops once the last description line reaches the top.
    pub fn scroll_down(&mut self) {
        let Some(page) = self.pages.active() else {
            return;
        };
        let max = u16::try_from(page.line_count().saturating_sub(1)).unwrap_or(u16::MAX);
        self.scroll = self.scroll.saturating_add(1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Show the selected page fullscreen. No-op without a selected page.
    pub fn show_fullscreen(&mut self) -> bool {
        if self.pages.active().is_none() {
            return false;
        }
        self.presentation = Presentation::Fullscreen;
        true
    }

    /// Back to the inline layout; the zone focused before is kept.
    pub fn hide_fullscreen(&mut self) {
        self.presentation = Presentation::Inline;
    }

    pub fn handle_key(&self, key: KeyEvent) -> Action {
        if self.is_fullscreen() || self.zone == Zone::Detail {
            return match key.code {
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::Char('o') => Action::OpenInBrowser,
                KeyCode::Char('y') => Action::YankUrl,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Action::SelectNext,
            KeyCode::Char('k') | KeyCode::Up => Action::SelectPrev,
            KeyCode::Char('g') => Action::SelectFirst,
            KeyCode::Char('G') => Action::SelectLast,
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Enter => Action::ShowFullscreen,
            KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            _ => Action::None,
        }
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn active_page(&self) -> Option<&MrPage> {
        self.pages.active()
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn is_fullscreen(&self) -> bool {
        self.presentation == Presentation::Fullscreen
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crossterm::event::KeyModifiers;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mr_with_lines(title: &str, lines: usize) -> MergeRequest {
        let description = (1..=lines)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        MergeRequest {
            description: Some(description),
            ..mr(title, Utc::now())
        }
    }

    fn mr(title: &str, updated_at: DateTime<Utc>) -> MergeRequest {
        MergeRequest {
            title: title.to_string(),
            updated_at,
            web_url: format!("https://gitlab.com/g/p/-/merge_requests/{}", title),
            ..Default::default()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn recording_section() -> (Section, Rc<RefCell<Vec<RefreshTicket>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut section = Section::new();
        section.set_id("0");
        section.set_refresh(move |ticket| sink.borrow_mut().push(ticket));
        (section, calls)
    }

    #[test]
    fn age_phrase_today() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(age_phrase(now, now), "updated today");
        assert_eq!(age_phrase(now, now - Duration::hours(23)), "updated today");
    }

    #[test]
    fn age_phrase_one_day() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(age_phrase(now, now - Duration::hours(24)), "updated 1 day ago");
        assert_eq!(
            age_phrase(now, now - Duration::hours(47) - Duration::minutes(59)),
            "updated 1 day ago"
        );
    }

    #[test]
    fn age_phrase_many_days() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(age_phrase(now, now - Duration::hours(48)), "updated 2 days ago");
        assert_eq!(age_phrase(now, now - Duration::days(30)), "updated 30 days ago");
    }

    #[test]
    fn future_timestamp_reads_today() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(age_phrase(now, now + Duration::hours(5)), "updated today");
    }

    #[test]
    fn add_request_keeps_list_and_pages_paired() {
        let mut section = Section::new();
        let now = Utc::now();
        section.add_request(mr("a", now));
        section.add_request(mr("b", now - Duration::days(3)));
        assert_eq!(section.entries().len(), 2);
        assert_eq!(section.pages.len(), 2);
        assert_eq!(section.entries()[1].title, "b");
        assert_eq!(section.entries()[1].secondary, "updated 3 days ago");
    }

    #[test]
    fn first_entry_is_selected_on_insert() {
        let mut section = Section::new();
        section.add_request(mr("a", Utc::now()));
        assert_eq!(section.selected(), Some(0));
        assert_eq!(section.active_page().map(MrPage::title), Some("a"));
    }

    #[test]
    fn selection_switches_detail_page() {
        let mut section = Section::new();
        for title in ["a", "b", "c"] {
            section.add_request(mr(title, Utc::now()));
        }
        section.select_next();
        assert_eq!(section.active_page().map(MrPage::title), Some("b"));
        section.select_last();
        assert_eq!(section.active_page().map(MrPage::title), Some("c"));
        section.select_next();
        assert_eq!(section.selected(), Some(2));
        section.select_first();
        section.select_prev();
        assert_eq!(section.active_page().map(MrPage::title), Some("a"));
        assert!(!section.select(3));
    }

    #[test]
    fn selection_resets_scroll() {
        let mut section = Section::new();
        section.add_request(mr_with_lines("a", 5));
        section.add_request(mr_with_lines("b", 5));
        section.scroll_down();
        section.scroll_down();
        assert_eq!(section.scroll(), 2);
        section.select_next();
        assert_eq!(section.scroll(), 0);
    }

    #[test]
    fn scrolling_stops_at_last_description_line() {
        let mut section = Section::new();
        section.add_request(mr_with_lines("a", 3));
        for _ in 0..10 {
            section.scroll_down();
        }
        assert_eq!(section.scroll(), 2);
        section.scroll_up();
        assert_eq!(section.scroll(), 1);
    }

    #[test]
    fn empty_description_does_not_scroll() {
        let mut section = Section::new();
        section.add_request(mr("a", Utc::now()));
        section.scroll_down();
        assert_eq!(section.scroll(), 0);

        let mut empty = Section::new();
        empty.scroll_down();
        assert_eq!(empty.scroll(), 0);
    }

    #[test]
    fn clear_empties_both_sides() {
        let mut section = Section::new();
        section.add_request(mr("a", Utc::now()));
        section.clear();
        assert!(section.entries().is_empty());
        assert_eq!(section.pages.len(), 0);
        assert!(section.active_page().is_none());
        assert_eq!(section.selected(), None);
    }

    #[test]
    fn refresh_without_function_only_clears() {
        let mut section = Section::new();
        section.add_request(mr("a", Utc::now()));
        section.refresh();
        assert!(section.is_initialized());
        assert!(!section.is_loading());
        assert!(section.entries().is_empty());
        assert!(section.error().is_none());
    }

    #[test]
    fn refresh_invokes_bound_function_once() {
        let (mut section, calls) = recording_section();
        section.refresh();
        assert!(section.is_loading());
        assert_eq!(
            *calls.borrow(),
            vec![RefreshTicket {
                section: "0".to_string(),
                load_id: 1
            }]
        );
    }

    #[test]
    fn later_set_refresh_replaces_earlier() {
        let (mut section, first) = recording_section();
        let second = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&second);
        section.set_refresh(move |_| *counter.borrow_mut() += 1);
        section.refresh();
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn finish_refresh_populates_exactly_the_fetched_records() {
        let (mut section, _) = recording_section();
        section.refresh();
        let now = Utc::now();
        assert!(section.finish_refresh(1, Ok(vec![mr("a", now), mr("b", now), mr("c", now)])));
        assert_eq!(section.entries().len(), 3);

        section.refresh();
        assert!(section.finish_refresh(2, Ok(vec![mr("d", now)])));
        assert_eq!(section.entries().len(), 1);
        assert_eq!(section.pages.len(), 1);
        assert_eq!(section.entries()[0].title, "d");
        assert!(!section.is_loading());
    }

    #[test]
    fn stale_result_is_dropped() {
        let (mut section, calls) = recording_section();
        section.refresh();
        section.refresh();
        assert_eq!(calls.borrow().len(), 2);
        assert!(!section.finish_refresh(1, Ok(vec![mr("old", Utc::now())])));
        assert!(section.entries().is_empty());
        assert!(section.is_loading());
        assert!(section.finish_refresh(2, Ok(vec![mr("new", Utc::now())])));
        assert_eq!(section.entries()[0].title, "new");
    }

    #[test]
    fn failed_fetch_leaves_section_empty_with_error() {
        let (mut section, _) = recording_section();
        section.refresh();
        section.finish_refresh(1, Ok(vec![mr("a", Utc::now())]));
        section.refresh();
        assert!(section.finish_refresh(2, Err("GET merge_requests: 500".to_string())));
        assert!(section.entries().is_empty());
        assert_eq!(section.error(), Some("GET merge_requests: 500"));

        section.refresh();
        assert!(section.error().is_none());
        section.finish_refresh(3, Ok(vec![]));
        assert!(section.error().is_none());
    }

    #[test]
    fn toggle_focus_swaps_zones() {
        let mut section = Section::new();
        assert_eq!(section.zone(), Zone::List);
        section.toggle_focus();
        assert_eq!(section.zone(), Zone::Detail);
        section.toggle_focus();
        assert_eq!(section.zone(), Zone::List);
    }

    #[test]
    fn fullscreen_needs_a_selected_page() {
        let mut section = Section::new();
        assert!(!section.show_fullscreen());
        assert_eq!(section.presentation, Presentation::Inline);

        section.add_request(mr("a", Utc::now()));
        assert!(section.show_fullscreen());
        assert!(section.is_fullscreen());
    }

    #[test]
    fn hide_fullscreen_restores_previous_zone() {
        let mut section = Section::new();
        section.add_request(mr("a", Utc::now()));
        section.toggle_focus();
        section.show_fullscreen();
        section.hide_fullscreen();
        assert_eq!(section.presentation, Presentation::Inline);
        assert_eq!(section.zone(), Zone::Detail);
    }

    #[test]
    fn list_keys() {
        let section = Section::new();
        assert!(matches!(section.handle_key(key(KeyCode::Char('j'))), Action::SelectNext));
        assert!(matches!(section.handle_key(key(KeyCode::Down)), Action::SelectNext));
        assert!(matches!(section.handle_key(key(KeyCode::Char('k'))), Action::SelectPrev));
        assert!(matches!(section.handle_key(key(KeyCode::Up)), Action::SelectPrev));
        assert!(matches!(section.handle_key(key(KeyCode::Char('g'))), Action::SelectFirst));
        assert!(matches!(section.handle_key(key(KeyCode::Char('G'))), Action::SelectLast));
        assert!(matches!(section.handle_key(key(KeyCode::Char('r'))), Action::Reload));
        assert!(matches!(section.handle_key(key(KeyCode::Enter)), Action::ShowFullscreen));
        assert!(matches!(section.handle_key(key(KeyCode::Char('o'))), Action::OpenInBrowser));
        assert!(matches!(section.handle_key(key(KeyCode::Char('y'))), Action::YankUrl));
        assert!(matches!(section.handle_key(key(KeyCode::Char('x'))), Action::None));
    }

    #[test]
    fn detail_keys_scroll() {
        let mut section = Section::new();
        section.toggle_focus();
        assert!(matches!(section.handle_key(key(KeyCode::Char('j'))), Action::ScrollDown));
        assert!(matches!(section.handle_key(key(KeyCode::Up)), Action::ScrollUp));
        assert!(matches!(section.handle_key(key(KeyCode::Char('r'))), Action::None));
        assert!(matches!(section.handle_key(key(KeyCode::Char('o'))), Action::OpenInBrowser));
    }

    #[test]
    fn page_info_reports_conflicts() {
        let request = MergeRequest {
            has_conflicts: true,
            web_url: "https://gitlab.com/g/p/-/merge_requests/1".to_string(),
            ..Default::default()
        };
        let page = MrPage::new(Arc::new(request));
        let info = page.info();
        assert_eq!(info.severity(), Severity::Conflict);
        assert_eq!(info.author, "unknown");
        assert_eq!(page.description(), "");
    }
}
