use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use firecheck_core::{DomainError, DomainResult, NodeId};

use crate::item::Item;

/// A named grouping of items and/or nested sub-sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items: Vec::new(),
            subsections: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn with_subsections(mut self, subsections: impl IntoIterator<Item = Section>) -> Self {
        self.subsections.extend(subsections);
        self
    }

    /// Number of items in this section and all sub-sections.
    pub fn item_count(&self) -> usize {
        self.items.len() + self.subsections.iter().map(Section::item_count).sum::<usize>()
    }

    /// Depth-first visit of every item with the breadcrumb of section names.
    pub fn visit_items<'a>(
        &'a self,
        path: &mut Vec<&'a str>,
        f: &mut impl FnMut(&[&'a str], &'a Item),
    ) {
        path.push(&self.name);
        for item in &self.items {
            f(path.as_slice(), item);
        }
        for sub in &self.subsections {
            sub.visit_items(path, f);
        }
        path.pop();
    }

    fn visit_items_mut(&mut self, f: &mut impl FnMut(&mut Item)) {
        for item in &mut self.items {
            f(item);
        }
        for sub in &mut self.subsections {
            sub.visit_items_mut(f);
        }
    }

    fn validate(&self) -> DomainResult<()> {
        ensure_unique_ids("section", &self.id, self.items.iter().map(|i| &i.id))?;
        ensure_unique_ids("section", &self.id, self.subsections.iter().map(|s| &s.id))?;
        for item in &self.items {
            item.check_shape()?;
        }
        self.subsections.iter().try_for_each(Section::validate)
    }
}

fn ensure_unique_ids<'a>(
    owner_kind: &str,
    owner: &NodeId,
    ids: impl Iterator<Item = &'a NodeId>,
) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !id.is_empty() && !seen.insert(id) {
            return Err(DomainError::conflict(format!(
                "duplicate id '{id}' under {owner_kind} '{owner}'"
            )));
        }
    }
    Ok(())
}

/// A vehicle checklist: the ordered list of main sections.
///
/// Serialized as a bare JSON array of sections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistTree {
    pub sections: Vec<Section>,
}

impl ChecklistTree {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(Section::item_count).sum()
    }

    /// Section at an index path: main-section index, then sub-section indices.
    pub fn section_at(&self, path: &[usize]) -> Option<&Section> {
        let (first, rest) = path.split_first()?;
        let mut section = self.sections.get(*first)?;
        for &i in rest {
            section = section.subsections.get(i)?;
        }
        Some(section)
    }

    pub fn section_at_mut(&mut self, path: &[usize]) -> Option<&mut Section> {
        let (first, rest) = path.split_first()?;
        let mut section = self.sections.get_mut(*first)?;
        for &i in rest {
            section = section.subsections.get_mut(i)?;
        }
        Some(section)
    }

    /// Depth-first visit of every item with its section-name breadcrumb.
    pub fn visit_items<'a>(&'a self, mut f: impl FnMut(&[&'a str], &'a Item)) {
        let mut path = Vec::new();
        for section in &self.sections {
            section.visit_items(&mut path, &mut f);
        }
    }

    pub fn visit_items_mut(&mut self, mut f: impl FnMut(&mut Item)) {
        for section in &mut self.sections {
            section.visit_items_mut(&mut f);
        }
    }

    /// Check sibling id uniqueness and per-item field shapes.
    pub fn validate(&self) -> DomainResult<()> {
        ensure_unique_ids("tree", &NodeId::from("root"), self.sections.iter().map(|s| &s.id))?;
        self.sections.iter().try_for_each(Section::validate)
    }
}
