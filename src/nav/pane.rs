/// Which sub-view owns focus and rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Tree,
    Detail,
}

/// Outcome of asking the pane controller to go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneTransition {
    Stay,
    ToTree,
    ToDetail,
    Quit,
}

impl Pane {
    /// `Tree --activate--> Detail`. Activating with nothing selected stays put.
    pub fn activate(&mut self, has_selection: bool) -> PaneTransition {
        match self {
            Pane::Tree if has_selection => {
                *self = Pane::Detail;
                PaneTransition::ToDetail
            }
            _ => PaneTransition::Stay,
        }
    }

    /// `Detail --back--> Tree`, `Tree --back--> quit`.
    pub fn back(&mut self) -> PaneTransition {
        match self {
            Pane::Detail => {
                *self = Pane::Tree;
                PaneTransition::ToTree
            }
            Pane::Tree => PaneTransition::Quit,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pane::Tree => "tree",
            Pane::Detail => "detail",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_then_back_returns_to_tree() {
        let mut p = Pane::default();
        assert_eq!(p, Pane::Tree);
        assert_eq!(p.activate(true), PaneTransition::ToDetail);
        assert_eq!(p, Pane::Detail);
        assert_eq!(p.back(), PaneTransition::ToTree);
        assert_eq!(p, Pane::Tree);
        assert_eq!(p.back(), PaneTransition::Quit);
        assert_eq!(p, Pane::Tree);
    }

    #[test]
    fn activate_without_selection_is_noop() {
        let mut p = Pane::Tree;
        assert_eq!(p.activate(false), PaneTransition::Stay);
        assert_eq!(p, Pane::Tree);
    }

    #[test]
    fn activate_in_detail_stays() {
        let mut p = Pane::Detail;
        assert_eq!(p.activate(true), PaneTransition::Stay);
        assert_eq!(p, Pane::Detail);
    }
}
