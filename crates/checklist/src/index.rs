//! Id → position index over a checklist tree.
//!
//! Built once per operation, so callers hold node ids and never positional
//! paths that go stale after an insert or reorder.

use std::collections::{HashMap, HashSet};

use firecheck_core::{DomainError, DomainResult, NodeId};

use crate::tree::{ChecklistTree, Section};

/// Position of a node inside the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeLocation {
    /// Index path of the section: main-section index, then sub-section indices.
    Section { path: Vec<usize> },
    /// Index path of the owning section plus the item's position in it.
    Item { section: Vec<usize>, index: usize },
}

impl NodeLocation {
    /// Index path of the node's parent section (empty for main sections).
    pub fn parent_path(&self) -> &[usize] {
        match self {
            NodeLocation::Section { path } => &path[..path.len().saturating_sub(1)],
            NodeLocation::Item { section, .. } => section,
        }
    }

    /// Position among its siblings.
    pub fn position(&self) -> usize {
        match self {
            NodeLocation::Section { path } => path.last().copied().unwrap_or_default(),
            NodeLocation::Item { index, .. } => *index,
        }
    }
}

/// How a caller names a node: its id alone, or the ids from a main section
/// down to the node when the id alone repeats under different parents.
pub trait NodeAddress {
    fn segments(&self) -> &[NodeId];
}

impl NodeAddress for NodeId {
    fn segments(&self) -> &[NodeId] {
        std::slice::from_ref(self)
    }
}

impl NodeAddress for [NodeId] {
    fn segments(&self) -> &[NodeId] {
        self
    }
}

impl<const N: usize> NodeAddress for [NodeId; N] {
    fn segments(&self) -> &[NodeId] {
        self
    }
}

impl NodeAddress for Vec<NodeId> {
    fn segments(&self) -> &[NodeId] {
        self
    }
}

/// Resolve an id path (`[main section, .., node]`) by walking the tree.
pub fn resolve_path(tree: &ChecklistTree, path: &[NodeId]) -> DomainResult<NodeLocation> {
    let not_found = || {
        let joined: Vec<&str> = path.iter().map(NodeId::as_str).collect();
        DomainError::not_found(format!("node '{}'", joined.join("/")))
    };
    let (last, ancestors) = path.split_last().ok_or_else(not_found)?;

    let mut index_path = Vec::with_capacity(path.len());
    let mut siblings = &tree.sections;
    let mut parent: Option<&Section> = None;
    for id in ancestors {
        let position = siblings.iter().position(|s| &s.id == id).ok_or_else(not_found)?;
        index_path.push(position);
        parent = Some(&siblings[position]);
        siblings = &siblings[position].subsections;
    }

    if let Some(position) = siblings.iter().position(|s| &s.id == last) {
        index_path.push(position);
        return Ok(NodeLocation::Section { path: index_path });
    }
    parent
        .and_then(|p| p.items.iter().position(|i| &i.id == last))
        .map(|index| NodeLocation::Item {
            section: index_path,
            index,
        })
        .ok_or_else(not_found)
}

#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    nodes: HashMap<NodeId, NodeLocation>,
    ambiguous: HashSet<NodeId>,
}

impl TreeIndex {
    pub fn build(tree: &ChecklistTree) -> Self {
        let mut index = Self::default();
        let mut path = Vec::new();
        for (i, section) in tree.sections.iter().enumerate() {
            path.push(i);
            index.add_section(section, &mut path);
            path.pop();
        }
        index
    }

    fn add_section(&mut self, section: &Section, path: &mut Vec<usize>) {
        self.insert(section.id.clone(), NodeLocation::Section { path: path.clone() });
        for (index, item) in section.items.iter().enumerate() {
            self.insert(
                item.id.clone(),
                NodeLocation::Item {
                    section: path.clone(),
                    index,
                },
            );
        }
        for (i, sub) in section.subsections.iter().enumerate() {
            path.push(i);
            self.add_section(sub, path);
            path.pop();
        }
    }

    fn insert(&mut self, id: NodeId, location: NodeLocation) {
        if id.is_empty() {
            return;
        }
        if self.nodes.insert(id.clone(), location).is_some() {
            self.ambiguous.insert(id);
        }
    }

    /// Resolve an id. Ids reused under different parents must be addressed
    /// by path instead, see [`resolve_path`].
    pub fn locate(&self, id: &NodeId) -> DomainResult<&NodeLocation> {
        if self.ambiguous.contains(id) {
            return Err(DomainError::conflict(format!(
                "node id '{id}' is used more than once in the tree; address it by its section path"
            )));
        }
        self.nodes
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("node '{id}'")))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemKind};

    fn tree() -> ChecklistTree {
        ChecklistTree::new(vec![
            Section::new("a", "A"),
            Section::new("b", "B").with_subsections([Section::new("b1", "B1")
                .with_items([
                    Item::new("x", "X", ItemKind::Presence),
                    Item::new("y", "Y", ItemKind::Presence),
                ])]),
        ])
    }

    #[test]
    fn locates_nested_items_and_sections() {
        let index = TreeIndex::build(&tree());
        assert_eq!(
            index.locate(&"y".into()).unwrap(),
            &NodeLocation::Item { section: vec![1, 0], index: 1 }
        );
        let b1 = index.locate(&"b1".into()).unwrap();
        assert_eq!(b1.parent_path(), &[1]);
        assert_eq!(b1.position(), 0);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn reused_ids_are_ambiguous() {
        let mut t = tree();
        t.sections[0].items.push(Item::new("x", "Other X", ItemKind::Presence));
        let index = TreeIndex::build(&t);
        assert!(matches!(index.locate(&"x".into()), Err(DomainError::Conflict(_))));
        assert!(matches!(index.locate(&"nope".into()), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn paths_resolve_reused_ids() {
        let mut t = tree();
        t.sections[0].items.push(Item::new("x", "Other X", ItemKind::Presence));
        let id = |s: &str| NodeId::from(s);

        assert_eq!(
            resolve_path(&t, &[id("a"), id("x")]).unwrap(),
            NodeLocation::Item { section: vec![0], index: 0 }
        );
        assert_eq!(
            resolve_path(&t, &[id("b"), id("b1"), id("x")]).unwrap(),
            NodeLocation::Item { section: vec![1, 0], index: 0 }
        );
        assert_eq!(
            resolve_path(&t, &[id("b"), id("b1")]).unwrap(),
            NodeLocation::Section { path: vec![1, 0] }
        );
        assert!(matches!(resolve_path(&t, &[id("x")]), Err(DomainError::NotFound(_))));
        assert!(matches!(resolve_path(&t, &[id("b"), id("y")]), Err(DomainError::NotFound(_))));
        assert!(matches!(resolve_path(&t, &[]), Err(DomainError::NotFound(_))));
    }
}
