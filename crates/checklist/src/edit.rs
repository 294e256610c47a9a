//! Structural edits on a checklist tree.
//!
//! Nodes are addressed by id, or by id path (`[main section, .., node]`) when
//! the id repeats under different parents.

use firecheck_core::{DomainError, DomainResult, NodeId};

use crate::index::{NodeAddress, NodeLocation, TreeIndex, resolve_path};
use crate::item::{Item, ItemKind};
use crate::tree::{ChecklistTree, Section};

/// A node taken out of the tree by [`ChecklistTree::remove_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovedNode {
    Section(Section),
    Item(Item),
}

fn missing(path: &[usize]) -> DomainError {
    DomainError::invariant(format!("index path {path:?} does not resolve"))
}

fn describe<A: NodeAddress + ?Sized>(address: &A) -> String {
    let segments: Vec<&str> = address.segments().iter().map(NodeId::as_str).collect();
    segments.join("/")
}

impl ChecklistTree {
    fn locate<A: NodeAddress + ?Sized>(&self, address: &A) -> DomainResult<NodeLocation> {
        match address.segments() {
            [id] => TreeIndex::build(self).locate(id).cloned(),
            path => resolve_path(self, path),
        }
    }

    fn section_siblings_mut(&mut self, parent: &[usize]) -> DomainResult<&mut Vec<Section>> {
        if parent.is_empty() {
            return Ok(&mut self.sections);
        }
        self.section_at_mut(parent)
            .map(|s| &mut s.subsections)
            .ok_or_else(|| missing(parent))
    }

    pub fn section<A: NodeAddress + ?Sized>(&self, address: &A) -> DomainResult<&Section> {
        match self.locate(address)? {
            NodeLocation::Section { path } => self.section_at(&path).ok_or_else(|| missing(&path)),
            NodeLocation::Item { .. } => Err(DomainError::validation(format!(
                "'{}' is an item",
                describe(address)
            ))),
        }
    }

    pub fn section_mut<A: NodeAddress + ?Sized>(
        &mut self,
        address: &A,
    ) -> DomainResult<&mut Section> {
        match self.locate(address)? {
            NodeLocation::Section { path } => {
                self.section_at_mut(&path).ok_or_else(|| missing(&path))
            }
            NodeLocation::Item { .. } => Err(DomainError::validation(format!(
                "'{}' is an item",
                describe(address)
            ))),
        }
    }

    pub fn item<A: NodeAddress + ?Sized>(&self, address: &A) -> DomainResult<&Item> {
        match self.locate(address)? {
            NodeLocation::Item { section, index } => self
                .section_at(&section)
                .and_then(|s| s.items.get(index))
                .ok_or_else(|| missing(&section)),
            NodeLocation::Section { .. } => Err(DomainError::validation(format!(
                "'{}' is a section",
                describe(address)
            ))),
        }
    }

    pub fn item_mut<A: NodeAddress + ?Sized>(&mut self, address: &A) -> DomainResult<&mut Item> {
        match self.locate(address)? {
            NodeLocation::Item { section, index } => self
                .section_at_mut(&section)
                .and_then(|s| s.items.get_mut(index))
                .ok_or_else(|| missing(&section)),
            NodeLocation::Section { .. } => Err(DomainError::validation(format!(
                "'{}' is a section",
                describe(address)
            ))),
        }
    }

    /// Append a section under `parent` (or as a main section).
    ///
    /// A section without an id gets a generated one.
    pub fn add_section(
        &mut self,
        parent: Option<&dyn NodeAddress>,
        mut section: Section,
    ) -> DomainResult<()> {
        if section.id.is_empty() {
            section.id = NodeId::generate();
        }
        let siblings = match parent {
            None => &mut self.sections,
            Some(address) => &mut self.section_mut(address.segments())?.subsections,
        };
        if siblings.iter().any(|s| s.id == section.id) {
            return Err(DomainError::conflict(format!(
                "a sibling section already uses id '{}'",
                section.id
            )));
        }
        siblings.push(section);
        Ok(())
    }

    /// Append an item to a section. An item without an id gets a generated one.
    pub fn add_item<A: NodeAddress + ?Sized>(
        &mut self,
        section: &A,
        mut item: Item,
    ) -> DomainResult<()> {
        item.check_shape()?;
        if item.id.is_empty() {
            item.id = NodeId::generate();
        }
        let target = self.section_mut(section)?;
        if target.items.iter().any(|i| i.id == item.id) {
            return Err(DomainError::conflict(format!(
                "section '{}' already has an item '{}'",
                target.id, item.id
            )));
        }
        target.items.push(item);
        Ok(())
    }

    pub fn remove_node<A: NodeAddress + ?Sized>(
        &mut self,
        address: &A,
    ) -> DomainResult<RemovedNode> {
        match self.locate(address)? {
            NodeLocation::Section { path } => {
                let position = path.last().copied().ok_or_else(|| missing(&path))?;
                let siblings = self.section_siblings_mut(&path[..path.len() - 1])?;
                Ok(RemovedNode::Section(siblings.remove(position)))
            }
            NodeLocation::Item { section, index } => {
                let owner = self.section_at_mut(&section).ok_or_else(|| missing(&section))?;
                Ok(RemovedNode::Item(owner.items.remove(index)))
            }
        }
    }

    /// Move a node to position `to` among its siblings.
    pub fn move_node<A: NodeAddress + ?Sized>(
        &mut self,
        address: &A,
        to: usize,
    ) -> DomainResult<()> {
        let location = self.locate(address)?;
        let from = location.position();
        match location {
            NodeLocation::Section { path } => {
                let siblings = self.section_siblings_mut(&path[..path.len() - 1])?;
                reorder(siblings, from, to)
            }
            NodeLocation::Item { section, .. } => {
                let owner = self.section_at_mut(&section).ok_or_else(|| missing(&section))?;
                reorder(&mut owner.items, from, to)
            }
        }
    }

    pub fn rename_node<A: NodeAddress + ?Sized>(
        &mut self,
        address: &A,
        name: impl Into<String>,
    ) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        match self.locate(address)? {
            NodeLocation::Section { .. } => self.section_mut(address)?.name = name,
            NodeLocation::Item { .. } => self.item_mut(address)?.name = name,
        }
        Ok(())
    }

    /// Change an item's type, applying the full field reset for the new type.
    pub fn change_item_kind<A: NodeAddress + ?Sized>(
        &mut self,
        address: &A,
        kind: ItemKind,
    ) -> DomainResult<()> {
        self.item_mut(address)?.change_kind(kind);
        Ok(())
    }
}

fn reorder<T>(items: &mut Vec<T>, from: usize, to: usize) -> DomainResult<()> {
    if to >= items.len() {
        return Err(DomainError::validation(format!(
            "target position {to} out of range ({} siblings)",
            items.len()
        )));
    }
    let node = items.remove(from);
    items.insert(to, node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::FieldValue;

    fn tree() -> ChecklistTree {
        ChecklistTree::new(vec![
            Section::new("cab", "Cab").with_items([
                Item::new("axe", "Axe", ItemKind::Presence),
                Item::new("radio", "Radio", ItemKind::FunctionOnly),
            ]),
            Section::new("rear", "Rear")
                .with_subsections([Section::new("left", "Left locker")
                    .with_items([Item::quantity("hose", "Hose", 2)])]),
        ])
    }

    #[test]
    fn ids_stay_valid_across_reorders_and_inserts() {
        let mut t = tree();
        let hose = NodeId::from("hose");

        t.move_node(&NodeId::from("rear"), 0).unwrap();
        t.add_section(None, Section::new("roof", "Roof")).unwrap();
        t.move_node(&NodeId::from("roof"), 0).unwrap();

        t.item_mut(&hose).unwrap().quantity_found = Some(2);
        assert_eq!(t.section_at(&[1, 0]).unwrap().items[0].quantity_found, Some(2));
        assert_eq!(t.sections[0].name, "Roof");
    }

    #[test]
    fn add_item_rejects_duplicate_sibling_and_bad_shape() {
        let mut t = tree();
        let cab = NodeId::from("cab");
        assert!(matches!(
            t.add_item(&cab, Item::new("axe", "Axe 2", ItemKind::Presence)),
            Err(DomainError::Conflict(_))
        ));

        let mut stale = Item::new("torch", "Torch", ItemKind::Presence);
        stale.value = Some(FieldValue::Text("x".into()));
        assert!(matches!(t.add_item(&cab, stale), Err(DomainError::InvariantViolation(_))));

        t.add_item(&cab, Item::new("torch", "Torch", ItemKind::Presence)).unwrap();
        t.add_item(&cab, Item::new("", "Spare torch", ItemKind::Presence)).unwrap();
        let items = &t.section(&cab).unwrap().items;
        assert_eq!(items.len(), 4);
        assert!(!items[3].id.is_empty());
    }

    #[test]
    fn remove_returns_the_node() {
        let mut t = tree();
        let removed = t.remove_node(&NodeId::from("left")).unwrap();
        assert!(matches!(removed, RemovedNode::Section(s) if s.items.len() == 1));
        assert!(matches!(t.item(&NodeId::from("hose")), Err(DomainError::NotFound(_))));

        let removed = t.remove_node(&NodeId::from("axe")).unwrap();
        assert!(matches!(removed, RemovedNode::Item(i) if i.name == "Axe"));
        assert_eq!(t.sections[0].items.len(), 1);
    }

    #[test]
    fn change_kind_resets_fields() {
        let mut t = tree();
        let radio = NodeId::from("radio");
        t.item_mut(&radio).unwrap().works = Some(false);

        t.change_item_kind(&radio, ItemKind::Quantity).unwrap();

        let item = t.item(&radio).unwrap();
        assert_eq!(item.works, None);
        assert_eq!(item.quantity_expected, Some(1));
        t.validate().unwrap();
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let mut t = tree();
        assert!(t.move_node(&NodeId::from("axe"), 5).is_err());
        t.rename_node(&NodeId::from("axe"), "Hache").unwrap();
        assert!(t.rename_node(&NodeId::from("axe"), " ").is_err());
        assert_eq!(t.item(&NodeId::from("axe")).unwrap().name, "Hache");
    }

    #[test]
    fn reused_ids_are_edited_by_section_path() {
        let mut t = ChecklistTree::new(vec![
            Section::new("left", "Left side")
                .with_items([Item::new("door", "Door", ItemKind::Photo)])
                .with_subsections([Section::new("locker", "Locker")]),
            Section::new("right", "Right side")
                .with_items([Item::new("door", "Door", ItemKind::Photo)])
                .with_subsections([Section::new("locker", "Locker")]),
        ]);
        t.validate().unwrap();
        let id = |s: &str| NodeId::from(s);

        assert!(matches!(t.item_mut(&id("door")), Err(DomainError::Conflict(_))));

        t.rename_node(&[id("right"), id("door")], "Right door").unwrap();
        t.change_item_kind(&[id("left"), id("door")], ItemKind::Presence).unwrap();
        t.add_item(&[id("right"), id("locker")], Item::new("axe", "Axe", ItemKind::Presence))
            .unwrap();
        t.add_section(Some(&[id("left"), id("locker")]), Section::new("shelf", "Shelf"))
            .unwrap();

        assert_eq!(t.sections[0].items[0].kind(), ItemKind::Presence);
        assert_eq!(t.sections[0].items[0].name, "Door");
        assert_eq!(t.sections[1].items[0].name, "Right door");
        assert_eq!(t.sections[1].items[0].kind(), ItemKind::Photo);
        assert_eq!(t.sections[1].subsections[0].items.len(), 1);
        assert_eq!(t.sections[0].subsections[0].subsections.len(), 1);

        let removed = t.remove_node(&[id("left"), id("locker")]).unwrap();
        assert!(matches!(removed, RemovedNode::Section(s) if s.subsections.len() == 1));
        assert!(t.section(&[id("right"), id("locker")]).is_ok());
        t.validate().unwrap();
    }
}
