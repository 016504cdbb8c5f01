use crate::types::MergeRequest;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,

    // Menu
    NextSection,
    PrevSection,
    EnterSection,
    FocusMenu,

    // Active section
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    ScrollUp,
    ScrollDown,
    ToggleFocus,
    Reload,
    ShowFullscreen,
    HideFullscreen,
    OpenInBrowser,
    YankUrl,

    // Refresh results, tagged with the section and the refresh they answer
    MergeRequestsLoaded {
        section: String,
        load_id: u64,
        result: Result<Vec<MergeRequest>, String>,
    },

    None,
}
