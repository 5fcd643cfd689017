use crate::model::ResourceNode;

/// One visited node in pre-order, addressed by its position in `TreeIndex`.
///
/// The node's own children have been moved into the rows that follow it, so
/// `node.children` is always empty here.
#[derive(Debug, Clone)]
pub struct FlatRow {
    pub depth: usize,
    /// Ancestor keys from the root down to and including this node.
    pub path: Vec<String>,
    /// True when no later sibling shares this row's parent.
    pub last_sibling: bool,
    pub node: ResourceNode,
}

/// Flat, position-addressed view of a forest.
///
/// Rows are stored in depth-first pre-order; a row's position is the cursor
/// value that selects it.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    rows: Vec<FlatRow>,
}

impl TreeIndex {
    /// Consume a forest and flatten it in a single pass.
    pub fn build(forest: Vec<ResourceNode>) -> Self {
        struct Pending {
            node: ResourceNode,
            depth: usize,
            parent: Option<usize>,
            last_sibling: bool,
        }

        let mut rows: Vec<FlatRow> = Vec::new();
        // Explicit stack keeps deep traces off the call stack. Siblings are
        // pushed in reverse so they pop in source order.
        let mut stack: Vec<Pending> = Vec::with_capacity(forest.len());
        let roots = forest.len();
        for (i, node) in forest.into_iter().enumerate().rev() {
            stack.push(Pending {
                node,
                depth: 0,
                parent: None,
                last_sibling: i + 1 == roots,
            });
        }

        while let Some(Pending {
            mut node,
            depth,
            parent,
            last_sibling,
        }) = stack.pop()
        {
            let children = std::mem::take(&mut node.children);
            let mut path = match parent {
                Some(p) => {
                    let mut v = Vec::with_capacity(depth + 1);
                    v.extend(rows[p].path.iter().cloned());
                    v
                }
                None => Vec::with_capacity(1),
            };
            path.push(node.key.clone());
            let idx = rows.len();
            let child_count = children.len();
            rows.push(FlatRow {
                depth,
                path,
                last_sibling,
                node,
            });
            for (ci, child) in children.into_iter().enumerate().rev() {
                stack.push(Pending {
                    node: child,
                    depth: depth + 1,
                    parent: Some(idx),
                    last_sibling: ci + 1 == child_count,
                });
            }
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn row(&self, pos: usize) -> Option<&FlatRow> {
        self.rows.get(pos)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first row whose breadcrumb equals `path`.
    pub fn position_of(&self, path: &[String]) -> Option<usize> {
        self.rows.iter().position(|r| r.path == path)
    }

    /// Tree connector prefix for a row, e.g. `"  └── "` at depth 2.
    pub fn connector(&self, pos: usize) -> String {
        let Some(row) = self.rows.get(pos) else {
            return String::new();
        };
        if row.depth == 0 {
            return String::new();
        }
        let branch = if row.last_sibling { "└── " } else { "├── " };
        format!("{}{}", " ".repeat(row.depth - 1), branch)
    }
}
