use crate::nav::flatten::TreeIndex;

/// Clamped selection over a flattened row list.
///
/// Invariant: `pos < len` whenever `len > 0`, and `pos == 0` when empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
    len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Up,
    Down,
    Top,
    Bottom,
    PageUp(usize),
    PageDown(usize),
}

/// Emitted whenever the selected row changes. Consumed by the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub pos: usize,
    pub path: Vec<String>,
}

impl Cursor {
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn last(&self) -> usize {
        self.len.saturating_sub(1)
    }

    /// Apply a movement. Returns true when the position actually changed.
    pub fn apply(&mut self, cmd: NavCommand) -> bool {
        if self.len == 0 {
            return false;
        }
        let before = self.pos;
        self.pos = match cmd {
            NavCommand::Up => self.pos.saturating_sub(1),
            NavCommand::Down => (self.pos + 1).min(self.last()),
            NavCommand::Top => 0,
            NavCommand::Bottom => self.last(),
            NavCommand::PageUp(n) => self.pos.saturating_sub(n.max(1)),
            NavCommand::PageDown(n) => self.pos.saturating_add(n.max(1)).min(self.last()),
        };
        self.pos != before
    }

    /// Resize to a new row count, clamping the position.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.set_pos(self.pos);
    }

    /// Jump to `pos`, clamped into range.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.last());
    }

    /// Re-seat the cursor on a freshly built index.
    ///
    /// Prefers the first row whose breadcrumb equals `previous`; otherwise
    /// keeps the old position clamped into the new range.
    pub fn rebase(&mut self, index: &TreeIndex, previous: Option<&[String]>) -> bool {
        self.set_len(index.len());
        match previous.and_then(|p| index.position_of(p)) {
            Some(pos) => {
                self.set_pos(pos);
                true
            }
            None => false,
        }
    }

    pub fn selection(&self, index: &TreeIndex) -> Option<SelectionChanged> {
        index.row(self.pos).map(|row| SelectionChanged {
            pos: self.pos,
            path: row.path.clone(),
        })
    }
}

#[cfg(test)]
impl Cursor {
    pub fn new(len: usize) -> Self {
        Self { pos: 0, len }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceNode;

    fn index(keys: &[&str]) -> TreeIndex {
        TreeIndex::build(keys.iter().map(|k| ResourceNode::new(*k)).collect())
    }

    #[test]
    fn scenario_moves_clamp_at_bottom() {
        let idx = TreeIndex::build(vec![
            ResourceNode::new("A")
                .with_children(vec![ResourceNode::new("B"), ResourceNode::new("C")]),
            ResourceNode::new("D"),
        ]);
        let mut c = Cursor::new(idx.len());
        assert_eq!(c.pos(), 0);
        assert!(c.apply(NavCommand::Down));
        assert!(c.apply(NavCommand::Down));
        assert!(c.apply(NavCommand::Down));
        assert_eq!(c.pos(), 3);
        assert_eq!(c.selection(&idx).unwrap().path, vec!["D".to_string()]);
        assert!(!c.apply(NavCommand::Down));
        assert_eq!(c.pos(), 3);
    }

    #[test]
    fn up_clamps_at_zero() {
        let mut c = Cursor::new(3);
        assert!(!c.apply(NavCommand::Up));
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn moves_on_empty_are_noops() {
        let mut c = Cursor::new(0);
        for cmd in [
            NavCommand::Up,
            NavCommand::Down,
            NavCommand::Top,
            NavCommand::Bottom,
            NavCommand::PageUp(5),
            NavCommand::PageDown(5),
        ] {
            assert!(!c.apply(cmd));
            assert_eq!(c.pos(), 0);
        }
        assert!(c.selection(&TreeIndex::default()).is_none());
    }

    #[test]
    fn any_command_sequence_keeps_cursor_in_range() {
        let cmds = [
            NavCommand::Down,
            NavCommand::PageDown(7),
            NavCommand::Down,
            NavCommand::Up,
            NavCommand::Bottom,
            NavCommand::Down,
            NavCommand::PageUp(2),
            NavCommand::Top,
            NavCommand::Up,
            NavCommand::PageDown(0),
        ];
        for len in 1..12 {
            let mut c = Cursor::new(len);
            for (i, cmd) in cmds.iter().cycle().take(60).enumerate() {
                c.apply(*cmd);
                assert!(c.pos() < len, "len={len} step={i} pos={}", c.pos());
            }
        }
    }

    #[test]
    fn rebase_prefers_matching_path_then_clamps() {
        let old = index(&["a", "b", "c", "d"]);
        let mut c = Cursor::new(old.len());
        c.set_pos(3);
        let prev = c.selection(&old).unwrap().path;

        let moved = index(&["d", "a"]);
        assert!(c.rebase(&moved, Some(&prev)));
        assert_eq!(c.pos(), 0);

        let gone = index(&["x", "y"]);
        c.set_pos(1);
        let prev = vec!["zzz".to_string()];
        assert!(!c.rebase(&gone, Some(&prev)));
        assert_eq!(c.pos(), 1);

        let shrunk = index(&["x"]);
        assert!(!c.rebase(&shrunk, None));
        assert_eq!(c.pos(), 0);

        assert!(!c.rebase(&TreeIndex::default(), None));
        assert_eq!(c.pos(), 0);
        assert!(c.is_empty());
    }
}
