//! Three-way merge of template, previous submission and session edits.
//!
//! The output always has the template's structure. For each template section:
//!
//! - with a previous submission and an **unmodified** session section, operator
//!   state is carried forward from the previous submission (skipped sections keep
//!   their last known state and photo evidence);
//! - otherwise the session state is taken, and `photos_previous` is backfilled
//!   from the previous submission when the session left it empty.
//!
//! "Modified" is decided against the template, never against the previous
//! submission: a section is modified when any item in it (recursively) differs
//! from its template default.

use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::tree::{ChecklistTree, Section};

/// How counterparts are matched across template, previous and session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKey {
    /// Match siblings by node id; nodes without an id fall back to position.
    #[default]
    Id,
    /// Match siblings by array position only (older stored inventories).
    Position,
}

/// Something with a sibling-unique id.
pub(crate) trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Item {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Keyed for Section {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

pub(crate) fn counterpart<'a, T: Keyed>(
    siblings: &'a [T],
    position: usize,
    node: &T,
    key: MergeKey,
) -> Option<&'a T> {
    match key {
        MergeKey::Id if !node.key().trim().is_empty() => {
            siblings.iter().find(|s| s.key() == node.key())
        }
        _ => siblings.get(position),
    }
}

/// Does the session item differ from its template default?
pub fn item_modified(session: &Item, template: &Item) -> bool {
    session.is_present != template.is_present
        || session.works != template.works
        || session.value != template.value
        || session.quantity_found != template.quantity_found
        || session.good_condition != template.good_condition
        || session.repaired != template.repaired
        || session.no_change != template.no_change
        || session.photos_current.is_empty() != template.photos_current.is_empty()
        || session.note != template.note
}

/// Does any item of the session section (recursively) differ from the template?
pub fn section_modified(session: &Section, template: &Section, key: MergeKey) -> bool {
    let items = template.items.iter().enumerate().any(|(i, t)| {
        counterpart(&session.items, i, t, key).is_some_and(|s| item_modified(s, t))
    });
    items
        || template.subsections.iter().enumerate().any(|(i, t)| {
            counterpart(&session.subsections, i, t, key)
                .is_some_and(|s| section_modified(s, t, key))
        })
}

/// Has the operator changed anything at all in this session?
pub fn tree_modified(session: &ChecklistTree, template: &ChecklistTree, key: MergeKey) -> bool {
    template.sections.iter().enumerate().any(|(i, t)| {
        counterpart(&session.sections, i, t, key).is_some_and(|s| section_modified(s, t, key))
    })
}

/// Merge the session into a complete tree, shaped like `template`.
///
/// With no previous submission every section counts as modified and the result
/// is the session tree.
pub fn merge(
    template: &ChecklistTree,
    previous: Option<&ChecklistTree>,
    session: &ChecklistTree,
    key: MergeKey,
) -> ChecklistTree {
    let sections = template
        .sections
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let s = counterpart(&session.sections, i, t, key);
            let p = previous.and_then(|p| counterpart(&p.sections, i, t, key));
            merge_section(t, p, s, previous.is_some(), key)
        })
        .collect();
    ChecklistTree::new(sections)
}

fn merge_section(
    template: &Section,
    previous: Option<&Section>,
    session: Option<&Section>,
    has_history: bool,
    key: MergeKey,
) -> Section {
    let modified = session.is_some_and(|s| section_modified(s, template, key));
    let carry_forward = has_history && previous.is_some() && !modified;

    tracing::debug!(
        section = %template.name,
        modified,
        carry_forward,
        "merging section"
    );

    let items = template
        .items
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let s = session.and_then(|s| counterpart(&s.items, i, t, key));
            let p = previous.and_then(|p| counterpart(&p.items, i, t, key));
            merge_item(t, p, s, carry_forward)
        })
        .collect();

    let subsections = template
        .subsections
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let s = session.and_then(|s| counterpart(&s.subsections, i, t, key));
            let p = previous.and_then(|p| counterpart(&p.subsections, i, t, key));
            merge_section(t, p, s, has_history, key)
        })
        .collect();

    Section {
        id: template.id.clone(),
        name: template.name.clone(),
        items,
        subsections,
    }
}

fn merge_item(
    template: &Item,
    previous: Option<&Item>,
    session: Option<&Item>,
    carry_forward: bool,
) -> Item {
    // State of another shape (the type changed since) is never copied.
    let previous = previous.filter(|p| template.same_shape(p));
    let session = session.filter(|s| template.same_shape(s));

    let mut merged = template.clone();
    match (carry_forward, previous, session) {
        (true, Some(p), _) => merged.copy_state_from(p),
        (_, _, Some(s)) => {
            merged.copy_state_from(s);
            if merged.photos_previous.is_empty() {
                if let Some(p) = previous {
                    merged.photos_previous = p.photos_previous.clone();
                }
            }
        }
        (_, Some(p), None) => merged.photos_previous = p.photos_previous.clone(),
        (_, None, None) => {}
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{FieldValue, ItemKind};
    use crate::photo::Photo;

    fn template() -> ChecklistTree {
        ChecklistTree::new(vec![
            Section::new("cab", "Cab").with_items([
                Item::new("axe", "Axe", ItemKind::Presence),
                Item::new("dash", "Dashboard", ItemKind::ExclusiveChoice),
            ]),
            Section::new("body", "Bodywork").with_items([
                Item::new("front", "Front", ItemKind::Photo),
                Item::new("side", "Side", ItemKind::Photo),
            ]),
        ])
    }

    fn previous() -> ChecklistTree {
        let mut prev = template();
        prev.sections[0].items[0].is_present = Some(true);
        let body = &mut prev.sections[1];
        body.items[0].photos_current = vec![Photo::stored("https://blobs/front-1.jpg")];
        body.items[0].photos_previous = vec![Photo::stored("https://blobs/front-0.jpg")];
        body.items[1].no_change = true;
        body.items[1].photos_previous = vec![Photo::stored("https://blobs/side-0.jpg")];
        body.items[1].note = Some("scratch".into());
        prev
    }

    #[test]
    fn first_inventory_equals_session() {
        let mut session = template();
        session.sections[0].items[0].is_present = Some(false);

        let merged = merge(&template(), None, &session, MergeKey::Id);
        assert_eq!(merged, session);
    }

    #[test]
    fn untouched_section_keeps_previous_evidence() {
        let prev = previous();
        let merged = merge(&template(), Some(&prev), &template(), MergeKey::Id);

        assert_eq!(merged.sections[1], prev.sections[1]);
        assert_eq!(merged.sections[0], prev.sections[0]);
    }

    #[test]
    fn touched_section_takes_session_and_backfills_history() {
        let prev = previous();
        let mut session = template();
        session.sections[1].items[0].good_condition = true;

        let merged = merge(&template(), Some(&prev), &session, MergeKey::Id);
        let body = &merged.sections[1];

        assert!(body.items[0].good_condition);
        assert!(body.items[0].photos_current.is_empty());
        assert_eq!(body.items[0].photos_previous, prev.sections[1].items[0].photos_previous);
        // Sibling in the same visited section: history survives, state is the session's.
        assert_eq!(body.items[1].photos_previous, prev.sections[1].items[1].photos_previous);
        assert!(!body.items[1].no_change);
        // Other section untouched.
        assert_eq!(merged.sections[0], prev.sections[0]);
    }

    #[test]
    fn session_set_history_is_not_overwritten() {
        let prev = previous();
        let mut session = template();
        let side = &mut session.sections[1].items[1];
        side.photos_previous = vec![Photo::stored("https://blobs/seeded.jpg")];
        side.mark_no_change().unwrap();

        let merged = merge(&template(), Some(&prev), &session, MergeKey::Id);
        assert_eq!(
            merged.sections[1].items[1].photos_previous,
            vec![Photo::stored("https://blobs/seeded.jpg")]
        );
    }

    #[test]
    fn merge_is_idempotent_on_its_output() {
        let prev = previous();
        let mut session = template();
        session.sections[0].items[1].value = Some(FieldValue::Flag(true));
        let complete = merge(&template(), Some(&prev), &session, MergeKey::Id);

        let again = merge(&template(), Some(&complete), &complete, MergeKey::Id);
        assert_eq!(again, complete);
    }

    #[test]
    fn new_template_items_take_session_or_defaults() {
        let prev = previous();
        let mut tpl = template();
        tpl.sections[0].items.push(Item::quantity("gloves", "Gloves", 4));
        tpl.sections.push(Section::new("roof", "Roof").with_items([Item::new(
            "ladder",
            "Ladder",
            ItemKind::Presence,
        )]));
        let mut session = tpl.clone();
        session.sections[2].items[0].is_present = Some(true);

        let merged = merge(&tpl, Some(&prev), &session, MergeKey::Id);

        assert_eq!(merged.sections[0].items[2], tpl.sections[0].items[2]);
        assert_eq!(merged.sections[2].items[0].is_present, Some(true));
    }

    #[test]
    fn id_keying_survives_reordered_sections() {
        let prev = previous();
        let mut tpl = template();
        tpl.sections.reverse();
        let session = tpl.clone();

        let by_id = merge(&tpl, Some(&prev), &session, MergeKey::Id);
        assert_eq!(by_id.sections[0].items[1].note.as_deref(), Some("scratch"));

        let by_position = merge(&tpl, Some(&prev), &session, MergeKey::Position);
        assert_eq!(by_position.sections[0].items[1].note, None);
    }

    #[test]
    fn state_of_a_changed_type_is_dropped() {
        let prev = previous();
        let mut tpl = template();
        tpl.sections[0].items[0].change_kind(ItemKind::Quantity);

        let merged = merge(&tpl, Some(&prev), &tpl.clone(), MergeKey::Id);
        assert_eq!(merged.sections[0].items[0], tpl.sections[0].items[0]);
        merged.validate().unwrap();
    }

    #[test]
    fn nested_modification_marks_the_parent() {
        let tpl = ChecklistTree::new(vec![Section::new("rear", "Rear").with_subsections([
            Section::new("l", "Left").with_items([Item::new("x", "X", ItemKind::Presence)]),
        ])]);
        let mut session = tpl.clone();
        assert!(!tree_modified(&session, &tpl, MergeKey::Id));

        session.sections[0].subsections[0].items[0].note = Some("loose".into());
        assert!(section_modified(&session.sections[0], &tpl.sections[0], MergeKey::Id));
        assert!(tree_modified(&session, &tpl, MergeKey::Position));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn presence_state() -> impl Strategy<Value = Option<bool>> {
            prop_oneof![Just(None), Just(Some(true)), Just(Some(false))]
        }

        type ItemState = (Option<bool>, bool, Option<String>);

        fn item_states() -> impl Strategy<Value = Vec<ItemState>> {
            let state = (presence_state(), any::<bool>(), proptest::option::of("[a-z]{1,8}"));
            proptest::collection::vec(state, 0..4)
        }

        fn tree_with(states: &[ItemState]) -> ChecklistTree {
            let mut tree = template();
            for (i, (present, good, note)) in states.iter().enumerate() {
                let section = &mut tree.sections[i % 2];
                if i % 2 == 0 {
                    section.items[0].is_present = *present;
                    section.items[0].note = note.clone();
                } else {
                    section.items[1].good_condition = *good;
                }
            }
            tree
        }

        proptest! {
            /// Property: merging a complete tree with itself changes nothing.
            #[test]
            fn merge_with_itself_is_identity(
                prev_states in item_states(),
                session_states in item_states(),
            ) {
                let tpl = template();
                let prev = tree_with(&prev_states);
                let session = tree_with(&session_states);

                let complete = merge(&tpl, Some(&prev), &session, MergeKey::Id);
                let again = merge(&tpl, Some(&complete), &complete, MergeKey::Id);
                prop_assert_eq!(again, complete);
            }

            /// Property: an untouched session reproduces the previous submission.
            #[test]
            fn untouched_session_reproduces_previous(
                prev_states in item_states(),
            ) {
                let tpl = template();
                let prev = tree_with(&prev_states);
                prop_assert_eq!(merge(&tpl, Some(&prev), &tpl, MergeKey::Id), prev);
            }
        }
    }
}
