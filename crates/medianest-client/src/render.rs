//! View models derived from a snapshot plus local UI state.

use std::collections::HashSet;

use serde::Serialize;

use medianest_core::types::{FolderFilter, FolderId};
use medianest_entity::folder::{FolderNode, FolderSnapshot};

use crate::dnd::DropTarget;

/// Label of the unfiltered row.
pub const ALL_FILES_LABEL: &str = "All Files";

/// Transient drag state. Only affects row classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragVisual {
    /// Folder row being dragged.
    pub dragging: Option<FolderId>,
    /// Target under the pointer.
    pub hover: Option<DropTarget>,
}

/// One visible row of the folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRow {
    /// What selecting this row selects.
    pub target: FolderFilter,
    /// Display name.
    pub name: String,
    /// Indentation level.
    pub depth: usize,
    /// Count badge.
    pub count: u64,
    /// Whether a toggle is shown.
    pub has_children: bool,
    /// Whether the toggle is open.
    pub expanded: bool,
    /// CSS classes.
    pub classes: Vec<&'static str>,
}

impl TreeRow {
    /// Space-separated class attribute.
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }

    /// Whether the row carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }
}

/// Rows in display order, All Files first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedTree {
    /// Generation of the snapshot the rows came from.
    pub generation: u64,
    /// Visible rows.
    pub rows: Vec<TreeRow>,
}

impl RenderedTree {
    /// Render `snapshot`. Children appear only below expanded parents.
    pub fn build(
        snapshot: &FolderSnapshot,
        generation: u64,
        selected: FolderFilter,
        expanded: &HashSet<FolderId>,
        drag: DragVisual,
    ) -> Self {
        let mut all_files = vec!["media-nest-folder-item", "is-all-files"];
        if selected == FolderFilter::Unfiltered {
            all_files.push("selected");
        }
        let mut rows = vec![TreeRow {
            target: FolderFilter::Unfiltered,
            name: ALL_FILES_LABEL.to_string(),
            depth: 0,
            count: snapshot.total_count,
            has_children: false,
            expanded: false,
            classes: all_files,
        }];

        let ctx = RowContext {
            selected,
            expanded,
            drag,
        };
        for node in &snapshot.tree {
            push_rows(node, 0, &ctx, &mut rows);
        }
        Self { generation, rows }
    }

    /// Row for a folder, when visible.
    pub fn row(&self, id: FolderId) -> Option<&TreeRow> {
        self.rows.iter().find(|r| r.target == FolderFilter::Folder(id))
    }
}

struct RowContext<'a> {
    selected: FolderFilter,
    expanded: &'a HashSet<FolderId>,
    drag: DragVisual,
}

fn push_rows(node: &FolderNode, depth: usize, ctx: &RowContext<'_>, rows: &mut Vec<TreeRow>) {
    let is_expanded = node.has_children() && ctx.expanded.contains(&node.id);

    let mut classes = vec!["media-nest-folder-item"];
    if ctx.selected == FolderFilter::Folder(node.id) {
        classes.push("selected");
    }
    if node.is_system {
        classes.push("is-system");
    }
    if node.has_children() {
        classes.push("has-children");
    }
    if is_expanded {
        classes.push("is-expanded");
    }
    if ctx.drag.dragging == Some(node.id) {
        classes.push("is-dragging");
    }
    if ctx.drag.hover == Some(DropTarget::Folder(node.id)) {
        classes.push("drop-hover");
    }

    rows.push(TreeRow {
        target: FolderFilter::Folder(node.id),
        name: node.name.clone(),
        depth,
        count: node.count,
        has_children: node.has_children(),
        expanded: is_expanded,
        classes,
    });

    if is_expanded {
        for child in &node.children {
            push_rows(child, depth + 1, ctx, rows);
        }
    }
}

/// One entry of the folder dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Selected value.
    pub value: FolderFilter,
    /// Indented label, `name (count)`.
    pub label: String,
}

/// Dropdown entries: All Files, then every folder depth-first.
pub fn dropdown_options(snapshot: &FolderSnapshot) -> Vec<SelectOption> {
    let mut options = Vec::with_capacity(snapshot.flat.len() + 1);
    options.push(SelectOption {
        value: FolderFilter::Unfiltered,
        label: format!("{ALL_FILES_LABEL} ({})", snapshot.total_count),
    });
    options.extend(snapshot.flat.iter().map(|f| SelectOption {
        value: FolderFilter::Folder(f.id),
        label: format!("{}{} ({})", "\u{a0}\u{a0}".repeat(f.depth), f.name, f.count),
    }));
    options
}

/// Context menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenuAction {
    /// Rename the folder.
    Rename,
    /// Delete the folder.
    Delete,
    /// Create a folder below it.
    NewSubfolder,
}

/// Menu for a row. The system folder and All Files have none.
pub fn context_menu(snapshot: &FolderSnapshot, target: FolderFilter) -> Vec<MenuAction> {
    match target.folder().and_then(|id| snapshot.find(id)) {
        Some(folder) if !folder.is_system => {
            vec![MenuAction::Rename, MenuAction::Delete, MenuAction::NewSubfolder]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medianest_entity::folder::FlatFolder;

    fn node(id: i64, parent: i64, name: &str, count: u64, children: Vec<FolderNode>) -> FolderNode {
        FolderNode {
            id: FolderId(id),
            name: name.into(),
            slug: name.to_lowercase(),
            parent: FolderId(parent),
            count,
            is_system: id == 1,
            children,
        }
    }

    fn flat(n: &FolderNode, depth: usize) -> FlatFolder {
        FlatFolder {
            id: n.id,
            name: n.name.clone(),
            slug: n.slug.clone(),
            parent: n.parent,
            count: n.count,
            depth,
            is_system: n.is_system,
        }
    }

    fn snapshot() -> FolderSnapshot {
        let year = node(3, 2, "2024", 1, Vec::new());
        let logos = node(2, 0, "Logos", 2, vec![year.clone()]);
        let system = node(1, 0, "Uncategorized", 4, Vec::new());
        FolderSnapshot {
            flat: vec![flat(&logos, 0), flat(&year, 1), flat(&system, 0)],
            tree: vec![logos, system],
            total_count: 7,
        }
    }

    #[test]
    fn test_collapsed_tree_hides_children() {
        let tree = RenderedTree::build(
            &snapshot(),
            1,
            FolderFilter::Unfiltered,
            &HashSet::new(),
            DragVisual::default(),
        );
        let names: Vec<&str> = tree.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![ALL_FILES_LABEL, "Logos", "Uncategorized"]);
        assert_eq!(tree.rows[0].count, 7);
        assert!(tree.rows[0].has_class("selected"));
        assert!(tree.rows[0].has_class("is-all-files"));
        assert!(tree.row(FolderId(2)).unwrap().has_class("has-children"));
        assert!(tree.row(FolderId(1)).unwrap().has_class("is-system"));
    }

    #[test]
    fn test_expanded_tree_and_drag_classes() {
        let expanded = HashSet::from([FolderId(2)]);
        let drag = DragVisual {
            dragging: Some(FolderId(3)),
            hover: Some(DropTarget::Folder(FolderId(1))),
        };
        let tree = RenderedTree::build(&snapshot(), 1, FolderFilter::Folder(FolderId(3)), &expanded, drag);
        let year = tree.row(FolderId(3)).unwrap();
        assert_eq!(year.depth, 1);
        assert_eq!(year.class_attr(), "media-nest-folder-item selected is-dragging");
        assert!(tree.row(FolderId(2)).unwrap().has_class("is-expanded"));
        assert!(tree.row(FolderId(1)).unwrap().has_class("drop-hover"));
        assert!(!tree.rows[0].has_class("selected"));
    }

    #[test]
    fn test_dropdown_labels() {
        let options = dropdown_options(&snapshot());
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "All Files (7)",
                "Logos (2)",
                "\u{a0}\u{a0}2024 (1)",
                "Uncategorized (4)"
            ]
        );
        assert_eq!(options[2].value, FolderFilter::Folder(FolderId(3)));
    }

    #[test]
    fn test_context_menu() {
        let s = snapshot();
        assert_eq!(context_menu(&s, FolderFilter::Folder(FolderId(2))).len(), 3);
        assert!(context_menu(&s, FolderFilter::Folder(FolderId(1))).is_empty());
        assert!(context_menu(&s, FolderFilter::Unfiltered).is_empty());
    }
}
