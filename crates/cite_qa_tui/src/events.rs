use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Submit,
    InsertChar(char),
    DeleteChar,
    ToggleFocus,
    FocusInput,
    PrevCitation,
    NextCitation,
    ScrollUp,
    ScrollDown,
    None,
}

/// Map a key press to an action. Release and repeat events map to `None`.
pub fn key_to_action(key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Tab, _) | (KeyCode::BackTab, _) => Action::ToggleFocus,
        (KeyCode::Esc, _) => Action::FocusInput,

        // Citation markers
        (KeyCode::Left, _) => Action::PrevCitation,
        (KeyCode::Right, _) => Action::NextCitation,

        // Transcript scrolling
        (KeyCode::PageUp, _) => Action::ScrollUp,
        (KeyCode::PageDown, _) => Action::ScrollDown,

        // Query input
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::InsertChar(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}
