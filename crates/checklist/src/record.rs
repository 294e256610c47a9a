use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firecheck_core::{AgentId, DomainError, DomainResult, VehicleId};

use crate::extract::{Defect, extract};
use crate::merge::{MergeKey, merge, tree_modified};
use crate::tree::ChecklistTree;
use crate::vehicle::Vehicle;

/// Operator identity as returned by authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: AgentId,
    pub name: String,
    pub role: String,
}

impl Identity {
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.is_empty() {
            return Err(DomainError::validation("agent identity has no id"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("agent identity has no name"));
        }
        Ok(())
    }
}

/// The unit persisted per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub vehicle_id: VehicleId,
    pub vehicle_name: String,
    pub agent: Identity,
    pub timestamp: DateTime<Utc>,
    pub defects: Vec<Defect>,
    pub merged_tree: ChecklistTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub total_items: usize,
    pub completed_items: usize,
    pub percent_complete: u8,
}

/// Validate, merge and summarize a session into the record to persist.
///
/// Fails when the identity is incomplete or when no item differs from the
/// template (the operator verified nothing).
pub fn prepare_record(
    vehicle: &Vehicle,
    previous: Option<&ChecklistTree>,
    session: &ChecklistTree,
    agent: Identity,
    note: Option<String>,
    timestamp: DateTime<Utc>,
    key: MergeKey,
) -> DomainResult<InventoryRecord> {
    agent.validate()?;

    let template = vehicle.template();
    if !tree_modified(session, template, key) {
        return Err(DomainError::validation(
            "no verification made: check at least one item before submitting",
        ));
    }

    let merged = merge(template, previous, session, key);
    merged.validate()?;

    let findings = extract(&merged);
    let note = note.filter(|n| !n.trim().is_empty());

    Ok(InventoryRecord {
        vehicle_id: vehicle.id_typed(),
        vehicle_name: vehicle.name().to_string(),
        agent,
        timestamp,
        defects: findings.defects,
        merged_tree: merged,
        note,
        total_items: findings.progress.total_items,
        completed_items: findings.progress.completed_items,
        percent_complete: findings.progress.percent_complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{FieldValue, Item, ItemKind};
    use crate::tree::Section;

    fn vehicle() -> Vehicle {
        let template = ChecklistTree::new(vec![Section::new("cab", "Cab").with_items([
            Item::new("axe", "Axe", ItemKind::Presence),
            Item::quantity("gloves", "Gloves", 4),
        ])]);
        Vehicle::new(VehicleId::new(), "VSAV 2", template).unwrap()
    }

    fn agent() -> Identity {
        Identity {
            id: AgentId::from("agent-7"),
            name: "Sam".into(),
            role: "crew".into(),
        }
    }

    #[test]
    fn untouched_session_is_blocked() {
        let v = vehicle();
        let err = prepare_record(
            &v,
            None,
            &v.template().clone(),
            agent(),
            None,
            Utc::now(),
            MergeKey::Id,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("no verification")));
    }

    #[test]
    fn incomplete_identity_is_rejected() {
        let v = vehicle();
        let mut session = v.template().clone();
        session.sections[0].items[0].is_present = Some(true);
        let mut who = agent();
        who.name = String::new();

        let err = prepare_record(&v, None, &session, who, None, Utc::now(), MergeKey::Id)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn record_carries_findings_and_totals() {
        let v = vehicle();
        let mut session = v.template().clone();
        session.sections[0].items[0].is_present = Some(true);

        let record = prepare_record(
            &v,
            None,
            &session,
            agent(),
            Some("  ".into()),
            Utc::now(),
            MergeKey::Id,
        )
        .unwrap();

        assert_eq!(record.total_items, 2);
        assert_eq!(record.completed_items, 1);
        assert_eq!(record.percent_complete, 50);
        assert_eq!(record.defects.len(), 1);
        assert_eq!(record.defects[0].detail.as_deref(), Some("not verified"));
        assert_eq!(record.note, None);
        assert_eq!(record.vehicle_name, "VSAV 2");

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("mergedTree").is_some());
        assert_eq!(json["percentComplete"], 50);
    }

    #[test]
    fn stale_session_fields_are_rejected() {
        let v = vehicle();
        let mut session = v.template().clone();
        session.sections[0].items[0].value = Some(FieldValue::Text("x".into()));

        let err = prepare_record(&v, None, &session, agent(), None, Utc::now(), MergeKey::Id)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
