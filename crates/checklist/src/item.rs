use serde::{Deserialize, Serialize};

use firecheck_core::{DomainError, DomainResult, NodeId};

use crate::photo::Photo;

/// Type of control an item ("materiel") presents to the operator.
///
/// Stored documents without a `type` field deserialize as [`ItemKind::Legacy`],
/// which behaves like [`ItemKind::PresenceAndFunction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Present / missing.
    Presence,
    /// Present / missing plus works / broken.
    PresenceAndFunction,
    /// Works / broken only.
    FunctionOnly,
    /// Plain acknowledgement checkbox; never reported as a defect.
    SimpleCheck,
    /// Two labeled options; `true` selects the first (anomaly) label.
    ExclusiveChoice,
    /// Expected count vs. count found.
    Quantity,
    /// One value out of `options`.
    SingleSelect,
    /// Tri-state level scale (e.g. full / partial / empty).
    Level,
    /// Tri-state condition scale (e.g. good / worn / damaged).
    Condition,
    /// Tri-state compliance scale (e.g. compliant / partial / non compliant).
    Compliance,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Free text.
    FreeText,
    /// Photographic evidence with its own lifecycle, see [`crate::photo`].
    Photo,
    /// Untyped item from older templates.
    #[default]
    Legacy,
}

impl ItemKind {
    /// The kind whose rules actually apply to this item.
    pub fn effective(self) -> ItemKind {
        match self {
            ItemKind::Legacy => ItemKind::PresenceAndFunction,
            other => other,
        }
    }

    pub fn is_tri_state(self) -> bool {
        matches!(self, ItemKind::Level | ItemKind::Condition | ItemKind::Compliance)
    }

    /// Default option labels installed on a type change.
    ///
    /// For tri-state scales the last label is the negative state.
    pub fn default_options(self) -> Vec<String> {
        let labels: &[&str] = match self {
            ItemKind::ExclusiveChoice => &["anomaly", "clear"],
            ItemKind::Level => &["full", "partial", "empty"],
            ItemKind::Condition => &["good", "worn", "damaged"],
            ItemKind::Compliance => &["compliant", "partial", "non_compliant"],
            _ => &[],
        };
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn uses_presence(self) -> bool {
        matches!(
            self.effective(),
            ItemKind::Presence
                | ItemKind::PresenceAndFunction
                | ItemKind::SimpleCheck
                | ItemKind::Quantity
        )
    }

    fn uses_function(self) -> bool {
        matches!(
            self.effective(),
            ItemKind::PresenceAndFunction | ItemKind::FunctionOnly
        )
    }

    fn uses_text_value(self) -> bool {
        matches!(
            self,
            ItemKind::SingleSelect
                | ItemKind::Level
                | ItemKind::Condition
                | ItemKind::Compliance
                | ItemKind::Date
                | ItemKind::FreeText
        )
    }
}

/// Value of the `value` field: a flag for exclusive choices, text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }

    /// Non-blank text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A checklist leaf ("materiel").
///
/// The structural fields (`id`, `name`, type, `options`, `quantity_expected`)
/// are owned by the template; everything else is operator state. The type is
/// private so that every change goes through [`Item::change_kind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type", default)]
    kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub works: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_expected: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_found: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub good_condition: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub repaired: bool,
    #[serde(rename = "noChangeFlag", default, skip_serializing_if = "is_false")]
    pub no_change: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos_current: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos_previous: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repaired_photo_indices: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Item {
    /// New item of `kind`, with that kind's default fields.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: ItemKind) -> Self {
        let mut item = Self {
            id: id.into(),
            name: name.into(),
            kind,
            value: None,
            is_present: None,
            works: None,
            options: Vec::new(),
            quantity_expected: None,
            quantity_found: None,
            good_condition: false,
            repaired: false,
            no_change: false,
            photos_current: Vec::new(),
            photos_previous: Vec::new(),
            repaired_photo_indices: Vec::new(),
            note: None,
        };
        item.reset_fields();
        item
    }

    /// Quantity item expecting `expected` units.
    pub fn quantity(id: impl Into<NodeId>, name: impl Into<String>, expected: u32) -> Self {
        let mut item = Self::new(id, name, ItemKind::Quantity);
        item.quantity_expected = Some(expected);
        item
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Switch the item to `kind`, clearing every field of the previous shape.
    ///
    /// Changing to the current kind still resets operator state.
    pub fn change_kind(&mut self, kind: ItemKind) {
        self.kind = kind;
        self.reset_fields();
    }

    fn reset_fields(&mut self) {
        self.value = None;
        self.is_present = None;
        self.works = None;
        self.options = self.kind.default_options();
        self.quantity_expected = None;
        self.quantity_found = None;
        self.good_condition = false;
        self.repaired = false;
        self.no_change = false;
        self.photos_current.clear();
        self.photos_previous.clear();
        self.repaired_photo_indices.clear();
        self.note = None;

        match self.kind {
            ItemKind::Quantity => self.quantity_expected = Some(1),
            ItemKind::ExclusiveChoice => self.value = Some(FieldValue::Flag(false)),
            _ => {}
        }
    }

    /// Copy operator state (never structure) from `source`.
    pub fn copy_state_from(&mut self, source: &Item) {
        self.value = source.value.clone();
        self.is_present = source.is_present;
        self.works = source.works;
        self.quantity_found = source.quantity_found;
        self.good_condition = source.good_condition;
        self.repaired = source.repaired;
        self.no_change = source.no_change;
        self.photos_current = source.photos_current.clone();
        self.photos_previous = source.photos_previous.clone();
        self.repaired_photo_indices = source.repaired_photo_indices.clone();
        self.note = source.note.clone();
    }

    /// Whether `other` follows the same field shape (so its state can be copied here).
    pub fn same_shape(&self, other: &Item) -> bool {
        self.kind.effective() == other.kind.effective()
    }

    /// Check that only the fields of this item's kind are populated.
    pub fn check_shape(&self) -> DomainResult<()> {
        let kind = self.kind;
        let fail = |field: &str| {
            Err(DomainError::invariant(format!(
                "item '{}' of type {:?} carries stale field `{field}`",
                self.id, kind
            )))
        };

        if self.is_present.is_some() && !kind.uses_presence() {
            return fail("isPresent");
        }
        if self.works.is_some() && !kind.uses_function() {
            return fail("works");
        }
        if kind != ItemKind::Quantity
            && (self.quantity_expected.is_some() || self.quantity_found.is_some())
        {
            return fail("quantity");
        }
        if kind != ItemKind::Photo
            && (self.good_condition
                || self.repaired
                || self.no_change
                || !self.photos_current.is_empty()
                || !self.photos_previous.is_empty()
                || !self.repaired_photo_indices.is_empty())
        {
            return fail("photo state");
        }
        match (&self.value, kind) {
            (None, _) => {}
            (Some(FieldValue::Flag(_)), ItemKind::ExclusiveChoice) => {}
            (Some(FieldValue::Text(_)), k) if k.uses_text_value() => {}
            (Some(_), _) => return fail("value"),
        }
        if kind == ItemKind::Quantity && self.quantity_expected.is_none() {
            return Err(DomainError::invariant(format!(
                "quantity item '{}' has no expected quantity",
                self.id
            )));
        }
        if kind == ItemKind::ExclusiveChoice && self.options.len() != 2 {
            return Err(DomainError::invariant(format!(
                "exclusive choice '{}' needs exactly two labels",
                self.id
            )));
        }
        if kind.is_tri_state() && self.options.len() != 3 {
            return Err(DomainError::invariant(format!(
                "tri-state item '{}' needs exactly three labels",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_to_quantity_sets_expected_and_clears_options() {
        let mut item = Item::new("a", "Hoses", ItemKind::SingleSelect);
        item.options = vec!["45mm".into(), "70mm".into()];
        item.value = Some(FieldValue::Text("45mm".into()));

        item.change_kind(ItemKind::Quantity);

        assert_eq!(item.quantity_expected, Some(1));
        assert!(item.options.is_empty());
        assert_eq!(item.value, None);
        item.check_shape().unwrap();
    }

    #[test]
    fn switching_to_exclusive_choice_installs_labels_and_clear_value() {
        let mut item = Item::new("a", "Dashboard", ItemKind::Presence);
        item.is_present = Some(true);

        item.change_kind(ItemKind::ExclusiveChoice);

        assert_eq!(item.options, vec!["anomaly".to_string(), "clear".to_string()]);
        assert_eq!(item.value, Some(FieldValue::Flag(false)));
        assert_eq!(item.is_present, None);
        item.check_shape().unwrap();
    }

    #[test]
    fn switching_to_photo_clears_boolean_and_select_state() {
        let mut item = Item::new("a", "Bodywork", ItemKind::PresenceAndFunction);
        item.is_present = Some(false);
        item.works = Some(true);
        item.note = Some("dent".into());

        item.change_kind(ItemKind::Photo);

        assert_eq!(item.is_present, None);
        assert_eq!(item.works, None);
        assert_eq!(item.value, None);
        assert_eq!(item.note, None);
        item.check_shape().unwrap();
    }

    #[test]
    fn missing_type_is_legacy_presence_and_function() {
        let item: Item = serde_json::from_str(r#"{"id":"x","name":"Axe"}"#).unwrap();
        assert_eq!(item.kind(), ItemKind::Legacy);
        assert_eq!(item.kind().effective(), ItemKind::PresenceAndFunction);
    }

    #[test]
    fn check_shape_flags_stale_fields() {
        let mut item = Item::new("a", "Axe", ItemKind::Presence);
        item.quantity_found = Some(2);
        assert!(matches!(
            item.check_shape(),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn serializes_camel_case_fields() {
        let mut item = Item::new("q", "Gloves", ItemKind::Quantity);
        item.is_present = Some(true);
        item.quantity_found = Some(3);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["type"], "quantity");
        assert_eq!(json["isPresent"], true);
        assert_eq!(json["quantityExpected"], 1);
        assert_eq!(json["quantityFound"], 3);
        assert!(json.get("noChangeFlag").is_none());
    }
}
