//! Read-only projections over a flat page snapshot: parent/child adjacency,
//! the sidebar's expanded tree, breadcrumbs and recency order.
//!
//! Parent links come straight from the backend and are not trusted to be
//! acyclic. Every walk uses an explicit stack and a visited set, so a bad
//! `parent_id` chain costs at most one visit per page.

use std::collections::{HashMap, HashSet};

use pages_shared::{Page, PageTreeNode};
use uuid::Uuid;

/// One line of a flattened tree: the page and how deep it sits below the
/// walk's starting parent.
#[derive(Debug, Clone, Copy)]
pub struct TreeRow<'a> {
    pub page: &'a Page,
    pub depth: usize,
}

pub struct PageTree<'a> {
    pages: &'a [Page],
    index: HashMap<Uuid, usize>,
    children: HashMap<Option<Uuid>, Vec<usize>>,
}

impl<'a> PageTree<'a> {
    pub fn new(pages: &'a [Page]) -> Self {
        let mut index = HashMap::with_capacity(pages.len());
        let mut children: HashMap<Option<Uuid>, Vec<usize>> = HashMap::new();

        for (i, page) in pages.iter().enumerate() {
            index.entry(page.id).or_insert(i);
            children.entry(page.parent_id).or_default().push(i);
        }

        Self {
            pages,
            index,
            children,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&'a Page> {
        let pages = self.pages;
        self.index.get(&id).map(|&i| &pages[i])
    }

    /// Pages whose parent is `parent_id`, in snapshot order.
    /// `None` selects the root level.
    pub fn children_of(&self, parent_id: Option<Uuid>) -> Vec<&'a Page> {
        let pages = self.pages;
        self.child_indices(parent_id)
            .iter()
            .map(|&i| &pages[i])
            .collect()
    }

    pub fn roots(&self) -> Vec<&'a Page> {
        self.children_of(None)
    }

    pub fn has_children(&self, page_id: Uuid) -> bool {
        !self.child_indices(Some(page_id)).is_empty()
    }

    fn child_indices(&self, parent_id: Option<Uuid>) -> &[usize] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Depth-first pre-order listing below `root_parent_id`, descending into
    /// a page only when its id is in `expanded`.
    pub fn expanded_tree(
        &self,
        expanded: &HashSet<Uuid>,
        root_parent_id: Option<Uuid>,
    ) -> Vec<TreeRow<'a>> {
        self.walk(root_parent_id, |page| expanded.contains(&page.id))
    }

    /// Every page reachable below `root_parent_id`, as a nested forest.
    pub fn nested(&self, root_parent_id: Option<Uuid>) -> Vec<PageTreeNode> {
        let rows = self.walk(root_parent_id, |_| true);

        let mut forest = Vec::new();
        let mut open: Vec<PageTreeNode> = Vec::new();

        for row in rows {
            while open.len() > row.depth {
                close_node(&mut open, &mut forest);
            }
            open.push(PageTreeNode {
                page: row.page.clone(),
                children: Vec::new(),
            });
        }
        while !open.is_empty() {
            close_node(&mut open, &mut forest);
        }

        forest
    }

    /// Breadcrumb for `page_id`, nearest parent first. Stops at a dangling
    /// parent reference or when the chain loops back on itself.
    pub fn ancestors(&self, page_id: Uuid) -> Vec<&'a Page> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([page_id]);
        let mut next = self.get(page_id).and_then(|page| page.parent_id);

        while let Some(id) = next {
            if !seen.insert(id) {
                break;
            }
            let Some(parent) = self.get(id) else { break };
            chain.push(parent);
            next = parent.parent_id;
        }

        chain
    }

    /// Up to `limit` pages, most recently modified first. Ties keep snapshot
    /// order.
    pub fn recent(&self, limit: usize) -> Vec<&'a Page> {
        let mut pages: Vec<&'a Page> = self.pages.iter().collect();
        pages.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));
        pages.truncate(limit);
        pages
    }

    fn walk(
        &self,
        root_parent_id: Option<Uuid>,
        descend: impl Fn(&Page) -> bool,
    ) -> Vec<TreeRow<'a>> {
        let pages = self.pages;
        let mut rows = Vec::new();
        let mut visited = vec![false; pages.len()];
        let mut stack: Vec<(usize, usize)> = self
            .child_indices(root_parent_id)
            .iter()
            .rev()
            .map(|&i| (i, 0))
            .collect();

        while let Some((i, depth)) = stack.pop() {
            if visited[i] {
                continue;
            }
            visited[i] = true;

            let page = &pages[i];
            rows.push(TreeRow { page, depth });

            if descend(page) {
                stack.extend(
                    self.child_indices(Some(page.id))
                        .iter()
                        .rev()
                        .filter(|&&child| !visited[child])
                        .map(|&child| (child, depth + 1)),
                );
            }
        }

        rows
    }
}

fn close_node(open: &mut Vec<PageTreeNode>, forest: &mut Vec<PageTreeNode>) {
    if let Some(node) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => forest.push(node),
        }
    }
}
