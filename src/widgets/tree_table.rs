use crate::model::{TABLE_HEADERS, HEADER_OBJECT, HEADER_STATUS};
use crate::nav::cursor::Cursor;
use crate::nav::flatten::TreeIndex;
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table};

const COLUMN_SPACING: u16 = 2;
const OBJECT_MAX_WIDTH: u16 = 80;

/// Sticky scroll window over the flattened rows. The first visible row only
/// moves when the cursor would leave the window.
pub(crate) fn compute_scroll_window(
    total: usize,
    selected: usize,
    offset: usize,
    height: usize,
) -> (usize, usize) {
    if height == 0 || total == 0 {
        return (0, 0);
    }
    let sel = selected.min(total - 1);
    let mut start = offset.min(total.saturating_sub(height));
    if sel < start {
        start = sel;
    } else if sel >= start + height {
        start = sel + 1 - height;
    }
    (start, (start + height).min(total))
}

/// Tabular tree view. Holds only scroll bookkeeping, updated from `update`;
/// rows come from the `TreeIndex` and the cursor owned by the app state.
#[derive(Debug, Clone, Default)]
pub struct TreeTable {
    offset: usize,
    viewport: usize,
}

impl TreeTable {
    /// Visible row count, used as the page size.
    pub fn page_size(&self) -> usize {
        self.viewport.max(1)
    }

    pub fn resize(&mut self, height: u16) {
        // borders, header, status bar, help
        self.viewport = height.saturating_sub(5) as usize;
    }

    /// Slide the window so the cursor row stays visible.
    pub fn follow(&mut self, selected: usize, total: usize) {
        let (start, _) = compute_scroll_window(total, selected, self.offset, self.viewport);
        self.offset = start;
    }

    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        index: &TreeIndex,
        cursor: &Cursor,
        focused: bool,
        theme: &Theme,
    ) {
        let block = panel_block(" Trace ", focused, theme);
        if index.is_empty() {
            let p = Paragraph::new("No data")
                .alignment(Alignment::Center)
                .style(theme.text_muted())
                .block(block);
            f.render_widget(p, area);
            return;
        }

        // inner height minus the header row; may be shorter than the viewport
        // while the full help is open
        let visible = area.height.saturating_sub(3) as usize;
        let (start, end) = compute_scroll_window(index.len(), cursor.pos(), self.offset, visible);

        let object_cells: Vec<(String, String)> = (start..end)
            .map(|pos| {
                let row = &index.rows()[pos];
                (index.connector(pos), row.node.key.clone())
            })
            .collect();
        let object_w = object_cells
            .iter()
            .map(|(c, k)| (c.chars().count() + k.chars().count()) as u16)
            .max()
            .unwrap_or(0)
            .max(HEADER_OBJECT.len() as u16)
            .min(OBJECT_MAX_WIDTH);

        let mut widths = vec![Constraint::Length(object_w)];
        for col in &TABLE_HEADERS[1..] {
            if *col == HEADER_STATUS {
                widths.push(Constraint::Fill(1));
                continue;
            }
            let w = index.rows()[start..end]
                .iter()
                .map(|r| r.node.detail(col).chars().count())
                .max()
                .unwrap_or(0)
                .max(col.len()) as u16;
            widths.push(Constraint::Length(w));
        }

        let rows: Vec<Row> = (start..end)
            .zip(object_cells)
            .map(|(pos, (connector, key))| {
                let row = &index.rows()[pos];
                let selected = pos == cursor.pos();
                let node_style = if selected {
                    theme.cursor()
                } else {
                    theme.node(row.node.color)
                };
                let object = Line::from(vec![
                    Span::styled(connector, theme.connector()),
                    Span::styled(key, node_style),
                ]);
                let mut cells = vec![Cell::from(object)];
                cells.extend(
                    TABLE_HEADERS[1..]
                        .iter()
                        .map(|col| Cell::from(row.node.detail(col).to_string())),
                );
                let r = Row::new(cells);
                if selected {
                    r.style(theme.cursor())
                } else {
                    r.style(theme.node(row.node.color))
                }
            })
            .collect();

        let header = Row::new(TABLE_HEADERS.iter().map(|h| Cell::from(*h))).style(theme.header());
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .block(block);
        f.render_widget(table, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorHint, ResourceNode, HEADER_READY};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect())
            .collect()
    }

    fn sample() -> TreeIndex {
        let mut b = ResourceNode::new("XDb/demo-db");
        b.details.insert(HEADER_READY.into(), "False".into());
        b.color = Some(ColorHint::Degraded);
        TreeIndex::build(vec![
            ResourceNode::new("XApp/demo").with_children(vec![b, ResourceNode::new("XNet/demo")]),
            ResourceNode::new("Other/x"),
        ])
    }

    #[test]
    fn scroll_window_is_sticky() {
        assert_eq!(compute_scroll_window(0, 0, 0, 5), (0, 0));
        assert_eq!(compute_scroll_window(10, 0, 0, 0), (0, 0));
        assert_eq!(compute_scroll_window(10, 3, 0, 5), (0, 5));
        assert_eq!(compute_scroll_window(10, 7, 0, 5), (3, 8));
        assert_eq!(compute_scroll_window(10, 5, 3, 5), (3, 8));
        assert_eq!(compute_scroll_window(10, 2, 3, 5), (2, 7));
        // shrunk tree pulls the window back
        assert_eq!(compute_scroll_window(4, 3, 8, 5), (0, 4));
    }

    #[test]
    fn renders_headers_connectors_and_details() {
        let index = sample();
        let cursor = Cursor::new(index.len());
        let table = TreeTable::default();
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        terminal
            .draw(|f| table.render(f, f.area(), &index, &cursor, true, &Theme::default()))
            .unwrap();
        let lines = screen(&terminal);
        assert!(lines[1].contains("OBJECT"));
        assert!(lines[1].contains("SYNCED LAST"));
        assert!(lines[2].contains("XApp/demo"));
        assert!(lines[3].contains("├── XDb/demo-db"));
        assert!(lines[3].contains("False"));
        assert!(lines[4].contains("└── XNet/demo"));
        assert!(lines[5].contains("Other/x"));
    }

    #[test]
    fn empty_tree_shows_placeholder() {
        let index = TreeIndex::build(Vec::new());
        let cursor = Cursor::new(0);
        let table = TreeTable::default();
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|f| table.render(f, f.area(), &index, &cursor, true, &Theme::default()))
            .unwrap();
        assert!(screen(&terminal).iter().any(|l| l.contains("No data")));
    }

    #[test]
    fn window_follows_cursor() {
        let forest = (0..20).map(|i| ResourceNode::new(format!("R/{i}"))).collect();
        let index = TreeIndex::build(forest);
        let mut cursor = Cursor::new(index.len());
        cursor.set_pos(15);
        let mut table = TreeTable::default();
        table.resize(10);
        assert_eq!(table.page_size(), 5);
        table.follow(cursor.pos(), index.len());
        assert_eq!(table.offset, 11);

        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal
            .draw(|f| table.render(f, f.area(), &index, &cursor, true, &Theme::default()))
            .unwrap();
        assert_eq!(table.offset, 11);
        let lines = screen(&terminal);
        assert!(lines[2].contains("R/11"));
        assert!(lines[6].contains("R/15"));
    }

    #[test]
    fn window_stays_put_while_cursor_is_visible() {
        let mut table = TreeTable::default();
        table.resize(10);
        table.follow(9, 20);
        assert_eq!(table.offset, 5);
        table.follow(6, 20);
        assert_eq!(table.offset, 5);
        table.follow(2, 20);
        assert_eq!(table.offset, 2);
        table.follow(0, 0);
        assert_eq!(table.offset, 0);
    }
}
