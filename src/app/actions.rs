use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which keymap applies. Text entry (search box, form) is handled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Grid,
    Sidebar,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveSelection(isize),
    MoveRow(isize),
    OpenDetail,
    CreateRecipe,
    EditRecipe,
    NextPage,
    PreviousPage,
    ClearFilters,
    ClearTag,
    Retry,
    FocusSearch,
    FocusSidebar,
    FocusGrid,
    PickTag,
    ScrollDetail(i32),
    CloseModal,
    DismissToast,
}

fn plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

pub fn map_key(context: KeyContext, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    if !plain(&key) {
        return None;
    }
    match context {
        KeyContext::Grid => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::MoveSelection(1)),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::MoveSelection(-1)),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveRow(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveRow(-1)),
            KeyCode::Enter => Some(Action::OpenDetail),
            KeyCode::Char('a') => Some(Action::CreateRecipe),
            KeyCode::Char('n') | KeyCode::PageDown => Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::PageUp => Some(Action::PreviousPage),
            KeyCode::Char('c') => Some(Action::ClearFilters),
            KeyCode::Char('x') => Some(Action::ClearTag),
            KeyCode::Char('r') => Some(Action::Retry),
            KeyCode::Char('/') => Some(Action::FocusSearch),
            KeyCode::Char('f') | KeyCode::Tab => Some(Action::FocusSidebar),
            KeyCode::Esc => Some(Action::DismissToast),
            _ => None,
        },
        KeyContext::Sidebar => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelection(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelection(-1)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::PickTag),
            KeyCode::Char('x') => Some(Action::ClearTag),
            KeyCode::Char('/') => Some(Action::FocusSearch),
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('f') => Some(Action::FocusGrid),
            _ => None,
        },
        KeyContext::Detail => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Char('e') => Some(Action::EditRecipe),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDetail(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollDetail(-1)),
            KeyCode::PageDown => Some(Action::ScrollDetail(10)),
            KeyCode::PageUp => Some(Action::ScrollDetail(-10)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn same_letter_means_different_things_per_context() {
        assert_eq!(
            map_key(KeyContext::Grid, key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        assert_eq!(
            map_key(KeyContext::Detail, key(KeyCode::Char('q'))),
            Some(Action::CloseModal)
        );
        assert_eq!(
            map_key(KeyContext::Grid, key(KeyCode::Char('e'))),
            None
        );
        assert_eq!(
            map_key(KeyContext::Detail, key(KeyCode::Char('e'))),
            Some(Action::EditRecipe)
        );
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for context in [KeyContext::Grid, KeyContext::Sidebar, KeyContext::Detail] {
            assert_eq!(map_key(context, ctrl_c), Some(Action::Quit));
        }
    }

    #[test]
    fn modified_letters_are_ignored() {
        let alt_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::ALT);
        assert_eq!(map_key(KeyContext::Grid, alt_n), None);
    }

    #[test]
    fn sidebar_picks_with_enter_and_space() {
        assert_eq!(
            map_key(KeyContext::Sidebar, key(KeyCode::Enter)),
            Some(Action::PickTag)
        );
        assert_eq!(
            map_key(KeyContext::Sidebar, key(KeyCode::Char(' '))),
            Some(Action::PickTag)
        );
    }

    #[test]
    fn escape_on_grid_dismisses_notifications() {
        assert_eq!(
            map_key(KeyContext::Grid, key(KeyCode::Esc)),
            Some(Action::DismissToast)
        );
        assert_eq!(
            map_key(KeyContext::Sidebar, key(KeyCode::Esc)),
            Some(Action::FocusGrid)
        );
    }
}
