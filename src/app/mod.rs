use crate::model::ResourceNode;
use crate::nav::cursor::NavCommand;
use crate::nav::flatten::TreeIndex;
use crate::nav::keys::{action_for, Action};
use crate::nav::pane::{Pane, PaneTransition};
use crate::ui::AppState;
use crate::widgets::status_bar::Flash;
use crate::widgets::Widget;
use chrono::Local;
use crossterm::event::KeyEvent;
use tracing::debug;

pub enum AppMsg {
    /// A freshly fetched forest replaces the current one wholesale.
    TreeLoaded(Vec<ResourceNode>),
    /// A periodic fetch failed; the previous tree stays on screen.
    FetchFailed(String),
    Resize {
        width: u16,
        height: u16,
    },
    Key(KeyEvent),
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Yank(String),
    Quit,
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        TreeLoaded(forest) => {
            rebuild(state, forest);
            state.status.refresh_ok(Local::now());
        }
        FetchFailed(err) => {
            state.status.refresh_failed(err);
        }
        Resize { width, height } => {
            state.width = width;
            state.height = height;
            state.tree.resize(height);
            state.detail.resize(width, height);
            state.status.resize(width, height);
        }
        Key(key) => {
            state.status.clear_flash();
            if let Some(action) = action_for(&key) {
                effects.extend(on_action(state, action));
            }
        }
        Tick => {
            state.tick = state.tick.wrapping_add(1);
        }
    }
    state.tree.follow(state.cursor.pos(), state.index.len());
    effects
}

/// Swap in a new tree and re-seat the cursor on it.
fn rebuild(state: &mut AppState, forest: Vec<ResourceNode>) {
    let previous = state.cursor.selection(&state.index).map(|s| s.path);
    state.index = TreeIndex::build(forest);
    let matched = state.cursor.rebase(&state.index, previous.as_deref());
    let selection = state.cursor.selection(&state.index);
    state.status.on_selection(selection.as_ref());
    debug!(
        rows = state.index.len(),
        cursor = state.cursor.pos(),
        matched,
        "tree rebuilt"
    );
    if state.pane == Pane::Detail {
        if matched {
            let detail = state
                .index
                .row(state.cursor.pos())
                .and_then(|r| r.node.detail.clone());
            state.detail.set_content(detail);
        } else {
            state.detail.mark_stale();
        }
    }
}

fn nav_command(state: &AppState, action: Action) -> Option<NavCommand> {
    let page = state.tree.page_size();
    Some(match action {
        Action::Up => NavCommand::Up,
        Action::Down => NavCommand::Down,
        Action::Top => NavCommand::Top,
        Action::Bottom => NavCommand::Bottom,
        Action::PageUp => NavCommand::PageUp(page),
        Action::PageDown => NavCommand::PageDown(page),
        _ => return None,
    })
}

fn on_action(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::Interrupt => return vec![Effect::Quit],
        Action::ToggleHelp => {
            state.show_full_help = !state.show_full_help;
            return Vec::new();
        }
        Action::Back => {
            return match state.pane.back() {
                PaneTransition::Quit => vec![Effect::Quit],
                _ => Vec::new(),
            };
        }
        Action::Yank => return yank(state),
        _ => {}
    }
    match state.pane {
        Pane::Tree => {
            if action == Action::Activate {
                let selected = state.index.row(state.cursor.pos());
                let detail = selected.and_then(|r| r.node.detail.clone());
                if state.pane.activate(selected.is_some()) == PaneTransition::ToDetail {
                    state.detail.set_content(detail);
                }
                return Vec::new();
            }
            if let Some(cmd) = nav_command(state, action) {
                if state.cursor.apply(cmd) {
                    let selection = state.cursor.selection(&state.index);
                    state.status.on_selection(selection.as_ref());
                }
            }
            Vec::new()
        }
        Pane::Detail => state.detail.on_action(action),
    }
}

fn yank(state: &mut AppState) -> Vec<Effect> {
    match state.index.row(state.cursor.pos()) {
        Some(row) => {
            state.status.flash(Flash::Yanked);
            vec![Effect::Yank(row.node.value.clone())]
        }
        None => Vec::new(),
    }
}
