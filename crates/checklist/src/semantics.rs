//! Per-type rules: touched, complete, defective.
//!
//! "Complete" means the operator made a decision, not that the item passed:
//! a verified quantity below expectation is complete and defective.

use crate::item::{FieldValue, Item, ItemKind};

fn flag(item: &Item) -> Option<bool> {
    item.value.as_ref().and_then(FieldValue::as_flag)
}

fn text(item: &Item) -> Option<&str> {
    item.value.as_ref().and_then(FieldValue::as_text)
}

fn found(item: &Item) -> u32 {
    item.quantity_found.unwrap_or(0)
}

fn expected(item: &Item) -> u32 {
    item.quantity_expected.unwrap_or(1)
}

fn photo_outcome(item: &Item) -> bool {
    item.good_condition || item.repaired || item.no_change || !item.photos_current.is_empty()
}

/// Negative label of a tri-state scale (its last option).
fn negative_state(item: &Item) -> Option<&str> {
    item.options.last().map(String::as_str)
}

/// Did the operator make an explicit decision on this item?
pub fn is_touched(item: &Item) -> bool {
    match item.kind().effective() {
        ItemKind::Presence | ItemKind::SimpleCheck | ItemKind::Quantity => {
            item.is_present == Some(true)
        }
        ItemKind::PresenceAndFunction | ItemKind::Legacy => {
            item.is_present.is_some() && item.works.is_some()
        }
        ItemKind::FunctionOnly => item.works == Some(true),
        ItemKind::ExclusiveChoice => flag(item).is_some(),
        ItemKind::SingleSelect
        | ItemKind::Level
        | ItemKind::Condition
        | ItemKind::Compliance
        | ItemKind::Date
        | ItemKind::FreeText => text(item).is_some(),
        ItemKind::Photo => photo_outcome(item),
    }
}

/// Is the item checked off for progress purposes?
pub fn is_complete(item: &Item) -> bool {
    match item.kind().effective() {
        ItemKind::Presence | ItemKind::SimpleCheck | ItemKind::Quantity => {
            item.is_present == Some(true)
        }
        ItemKind::PresenceAndFunction | ItemKind::Legacy => {
            item.is_present == Some(true) && item.works == Some(true)
        }
        ItemKind::FunctionOnly => item.works == Some(true),
        ItemKind::ExclusiveChoice => flag(item).is_some(),
        ItemKind::SingleSelect
        | ItemKind::Level
        | ItemKind::Condition
        | ItemKind::Compliance
        | ItemKind::Date
        | ItemKind::FreeText => text(item).is_some(),
        ItemKind::Photo => photo_outcome(item),
    }
}

/// Does the item represent a problem to report?
pub fn is_defective(item: &Item) -> bool {
    match item.kind().effective() {
        ItemKind::Presence => item.is_present == Some(false),
        ItemKind::PresenceAndFunction | ItemKind::Legacy => {
            item.is_present == Some(false) || item.works == Some(false)
        }
        ItemKind::FunctionOnly => item.works == Some(false),
        ItemKind::Quantity => item.is_present != Some(true) || found(item) < expected(item),
        ItemKind::SingleSelect => text(item).is_none(),
        ItemKind::ExclusiveChoice => flag(item) == Some(true),
        ItemKind::Photo => !photo_outcome(item),
        ItemKind::Level | ItemKind::Condition | ItemKind::Compliance => {
            matches!((text(item), negative_state(item)), (Some(v), Some(neg)) if v == neg)
        }
        ItemKind::SimpleCheck | ItemKind::Date | ItemKind::FreeText => false,
    }
}

/// Human-readable context for a defective item.
pub fn defect_detail(item: &Item) -> Option<String> {
    if !is_defective(item) {
        return None;
    }
    let detail = match item.kind().effective() {
        ItemKind::Presence => "missing".to_string(),
        ItemKind::PresenceAndFunction if item.is_present == Some(false) => "missing".to_string(),
        ItemKind::PresenceAndFunction | ItemKind::FunctionOnly => "not working".to_string(),
        ItemKind::Quantity if item.is_present != Some(true) => "not verified".to_string(),
        ItemKind::Quantity => format!("found {}/{}", found(item), expected(item)),
        ItemKind::SingleSelect => "no selection".to_string(),
        ItemKind::ExclusiveChoice => item
            .options
            .first()
            .cloned()
            .unwrap_or_else(|| "anomaly".to_string()),
        ItemKind::Photo => "not verified".to_string(),
        ItemKind::Level | ItemKind::Condition | ItemKind::Compliance => {
            text(item).unwrap_or_default().to_string()
        }
        ItemKind::SimpleCheck | ItemKind::Date | ItemKind::FreeText | ItemKind::Legacy => {
            return None;
        }
    };
    Some(detail)
}

/// Whether the finding should show the item as physically present.
pub(crate) fn reported_present(item: &Item) -> bool {
    match item.kind().effective() {
        ItemKind::Presence | ItemKind::PresenceAndFunction => item.is_present == Some(true),
        ItemKind::Quantity => item.is_present == Some(true) && found(item) > 0,
        _ => true,
    }
}

/// Function state carried on a finding, for kinds that track it.
pub(crate) fn reported_works(item: &Item) -> Option<bool> {
    match item.kind().effective() {
        ItemKind::PresenceAndFunction | ItemKind::FunctionOnly => item.works,
        _ => None,
    }
}
