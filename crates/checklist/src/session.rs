use crate::item::ItemKind;
use crate::merge::{MergeKey, counterpart};
use crate::tree::{ChecklistTree, Section};

/// Snapshot tree for a new inventory visit.
///
/// A deep copy of the template where photo items inherit the outstanding
/// evidence of the previous submission as `photos_previous`. All other
/// operator state stays at template defaults, so the session only counts as
/// modified once the operator actually decides something.
pub fn start_session(
    template: &ChecklistTree,
    previous: Option<&ChecklistTree>,
    key: MergeKey,
) -> ChecklistTree {
    let mut session = template.clone();
    if let Some(previous) = previous {
        for (i, section) in session.sections.iter_mut().enumerate() {
            if let Some(p) = counterpart(&previous.sections, i, &*section, key) {
                seed_section(section, p, key);
            }
        }
    }
    session
}

fn seed_section(section: &mut Section, previous: &Section, key: MergeKey) {
    for (i, item) in section.items.iter_mut().enumerate() {
        if item.kind() != ItemKind::Photo {
            continue;
        }
        if let Some(p) = counterpart(&previous.items, i, &*item, key) {
            if item.same_shape(p) {
                item.photos_previous = p.carried_evidence();
            }
        }
    }
    for (i, sub) in section.subsections.iter_mut().enumerate() {
        if let Some(p) = counterpart(&previous.subsections, i, &*sub, key) {
            seed_section(sub, p, key);
        }
    }
}
