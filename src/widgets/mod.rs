pub mod chrome;
pub mod detail_viewer;
pub mod highlight;
pub mod status_bar;
pub mod tree_table;

use crate::app::Effect;
use crate::nav::keys::Action;
use crate::theme::Theme;
use ratatui::prelude::*;

/// A self-contained pane component. Rendering may update scroll bookkeeping
/// (viewport height) but never application state.
pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, theme: &Theme);
    fn on_action(&mut self, action: Action) -> Vec<Effect> {
        let _ = action;
        Vec::new()
    }
    /// Propagated terminal size.
    fn resize(&mut self, width: u16, height: u16) {
        let _ = (width, height);
    }
}
