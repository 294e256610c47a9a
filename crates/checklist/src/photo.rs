//! Photo-evidence lifecycle.
//!
//! A photo item moves from [`PhotoState::Unverified`] to exactly one of four
//! outcomes. Previous photos are owned by history: only a repair can mark them
//! as addressed, and nothing in a session deletes them.

use serde::{Deserialize, Serialize};

use firecheck_core::{DomainError, DomainResult};

use crate::item::{Item, ItemKind};

/// A photograph attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Photo {
    /// Uploaded to the blob store.
    Stored { url: String },
    /// Captured on the device and not uploaded yet (or upload failed); `data` is a `data:` URL.
    Local { data: String },
}

impl Photo {
    pub fn stored(url: impl Into<String>) -> Self {
        Photo::Stored { url: url.into() }
    }

    pub fn local(data: impl Into<String>) -> Self {
        Photo::Local { data: data.into() }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Photo::Local { .. })
    }
}

/// Where a photo item stands in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoState {
    Unverified,
    GoodCondition,
    ProblemDocumented,
    Repaired,
    PersistentDefect,
}

impl Item {
    fn ensure_photo_item(&self) -> DomainResult<()> {
        if self.kind() != ItemKind::Photo {
            return Err(DomainError::invariant(format!(
                "item '{}' is not a photo item",
                self.id
            )));
        }
        Ok(())
    }

    pub fn photo_state(&self) -> PhotoState {
        if self.good_condition {
            PhotoState::GoodCondition
        } else if self.repaired {
            PhotoState::Repaired
        } else if self.no_change {
            PhotoState::PersistentDefect
        } else if !self.photos_current.is_empty() {
            PhotoState::ProblemDocumented
        } else {
            PhotoState::Unverified
        }
    }

    /// Declare the item in good condition.
    ///
    /// Rejected while any photo evidence (current or previous) exists.
    pub fn mark_good_condition(&mut self) -> DomainResult<()> {
        self.ensure_photo_item()?;
        if !self.photos_current.is_empty() || !self.photos_previous.is_empty() {
            return Err(DomainError::invariant(format!(
                "item '{}' has photo evidence and cannot be declared in good condition",
                self.id
            )));
        }
        self.good_condition = true;
        self.repaired = false;
        self.no_change = false;
        self.repaired_photo_indices.clear();
        self.photos_current.clear();
        Ok(())
    }

    /// Document a problem with newly captured photos.
    pub fn document_problem(&mut self, photos: Vec<Photo>) -> DomainResult<()> {
        self.ensure_photo_item()?;
        if photos.is_empty() {
            return Err(DomainError::validation(format!(
                "documenting a problem on '{}' requires at least one photo",
                self.id
            )));
        }
        self.good_condition = false;
        self.repaired = false;
        self.no_change = false;
        self.repaired_photo_indices.clear();
        self.photos_current.extend(photos);
        Ok(())
    }

    /// Declare a repair.
    ///
    /// When previous photos exist, `addressed` must select at least one of them.
    /// Current photos are kept as the trail of the problem.
    pub fn mark_repaired(&mut self, addressed: &[usize]) -> DomainResult<()> {
        self.ensure_photo_item()?;
        let available = self.photos_previous.len();
        if available > 0 && addressed.is_empty() {
            return Err(DomainError::validation(format!(
                "select which previous photos of '{}' the repair addresses",
                self.id
            )));
        }
        if let Some(bad) = addressed.iter().find(|&&i| i >= available) {
            return Err(DomainError::validation(format!(
                "photo index {bad} out of range for '{}' ({available} previous photos)",
                self.id
            )));
        }

        let mut indices = addressed.to_vec();
        indices.sort_unstable();
        indices.dedup();

        self.repaired = true;
        self.good_condition = false;
        self.no_change = false;
        self.repaired_photo_indices = indices;
        Ok(())
    }

    /// Declare that the previously photographed defect is unchanged.
    pub fn mark_no_change(&mut self) -> DomainResult<()> {
        self.ensure_photo_item()?;
        if self.photos_previous.is_empty() {
            return Err(DomainError::invariant(format!(
                "item '{}' has no previous defect to carry forward",
                self.id
            )));
        }
        self.no_change = true;
        self.good_condition = false;
        self.repaired = false;
        self.repaired_photo_indices.clear();
        self.photos_current.clear();
        Ok(())
    }

    /// Back to unverified. Previous photos are untouched.
    pub fn clear_photo_check(&mut self) -> DomainResult<()> {
        self.ensure_photo_item()?;
        self.good_condition = false;
        self.repaired = false;
        self.no_change = false;
        self.repaired_photo_indices.clear();
        self.photos_current.clear();
        Ok(())
    }

    /// Previous photos not addressed by a repair, with their indices.
    pub fn outstanding_previous_photos(&self) -> Vec<(usize, &Photo)> {
        self.photos_previous
            .iter()
            .enumerate()
            .filter(|(i, _)| !(self.repaired && self.repaired_photo_indices.contains(i)))
            .collect()
    }

    /// Evidence that the next inventory inherits as its previous photos.
    pub fn carried_evidence(&self) -> Vec<Photo> {
        match self.photo_state() {
            PhotoState::GoodCondition => Vec::new(),
            PhotoState::Repaired => self
                .outstanding_previous_photos()
                .into_iter()
                .map(|(_, p)| p.clone())
                .collect(),
            PhotoState::PersistentDefect | PhotoState::Unverified => self.photos_previous.clone(),
            PhotoState::ProblemDocumented => self
                .photos_previous
                .iter()
                .chain(self.photos_current.iter())
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_item() -> Item {
        Item::new("p", "Bodywork", ItemKind::Photo)
    }

    fn with_history(n: usize) -> Item {
        let mut item = photo_item();
        item.photos_previous = (0..n)
            .map(|i| Photo::stored(format!("https://blobs/prev-{i}.jpg")))
            .collect();
        item
    }

    #[test]
    fn good_condition_only_without_evidence() {
        let mut clean = photo_item();
        clean.mark_good_condition().unwrap();
        assert_eq!(clean.photo_state(), PhotoState::GoodCondition);

        let mut with_prev = with_history(1);
        assert!(matches!(
            with_prev.mark_good_condition(),
            Err(DomainError::InvariantViolation(_))
        ));

        let mut with_current = photo_item();
        with_current.document_problem(vec![Photo::local("data:image/jpeg;base64,AA==")]).unwrap();
        assert!(with_current.mark_good_condition().is_err());
        assert_eq!(with_current.photo_state(), PhotoState::ProblemDocumented);
    }

    #[test]
    fn documenting_a_problem_clears_outcome_flags() {
        let mut item = with_history(1);
        item.mark_no_change().unwrap();

        item.document_problem(vec![Photo::local("data:image/png;base64,AA==")]).unwrap();

        assert!(!item.no_change);
        assert!(!item.repaired);
        assert_eq!(item.photos_current.len(), 1);
        assert_eq!(item.photo_state(), PhotoState::ProblemDocumented);
    }

    #[test]
    fn repair_keeps_unselected_previous_photos_outstanding() {
        let mut item = with_history(2);

        item.mark_repaired(&[0]).unwrap();

        let outstanding = item.outstanding_previous_photos();
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding[0].0, 1);
        assert_eq!(item.photos_previous.len(), 2);
        assert_eq!(item.carried_evidence(), vec![item.photos_previous[1].clone()]);
    }

    #[test]
    fn repair_requires_selection_when_history_exists() {
        let mut item = with_history(2);
        assert!(matches!(item.mark_repaired(&[]), Err(DomainError::Validation(_))));
        assert!(matches!(item.mark_repaired(&[2]), Err(DomainError::Validation(_))));
        assert!(!item.repaired);
    }

    #[test]
    fn repair_retains_current_photos() {
        let mut item = with_history(1);
        item.document_problem(vec![Photo::local("data:image/jpeg;base64,AA==")]).unwrap();

        item.mark_repaired(&[0, 0]).unwrap();

        assert_eq!(item.photos_current.len(), 1);
        assert_eq!(item.repaired_photo_indices, vec![0]);
        assert_eq!(item.photo_state(), PhotoState::Repaired);
    }

    #[test]
    fn no_change_clears_current_photos() {
        let mut item = with_history(1);
        item.photos_current.push(Photo::local("data:image/jpeg;base64,AA=="));

        item.mark_no_change().unwrap();

        assert!(item.photos_current.is_empty());
        assert_eq!(item.photo_state(), PhotoState::PersistentDefect);
        assert_eq!(item.carried_evidence().len(), 1);
    }

    #[test]
    fn transitions_reject_other_item_kinds() {
        let mut item = Item::new("x", "Axe", ItemKind::Presence);
        assert!(item.mark_good_condition().is_err());
        assert!(item.mark_repaired(&[]).is_err());
    }
}
