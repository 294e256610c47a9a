use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firecheck_core::{DomainError, DomainResult, Entity, VehicleId};

use crate::events::TemplateUpdated;
use crate::tree::ChecklistTree;

/// A vehicle and its checklist template.
///
/// Sessions only ever read the template; it changes through
/// [`Vehicle::edit_template`], which bumps `revision`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    id: VehicleId,
    name: String,
    template: ChecklistTree,
    #[serde(default)]
    revision: u64,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        name: impl Into<String>,
        template: ChecklistTree,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("vehicle name cannot be empty"));
        }
        template.validate()?;
        Ok(Self {
            id,
            name,
            template,
            revision: 0,
        })
    }

    pub fn id_typed(&self) -> VehicleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &ChecklistTree {
        &self.template
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply administrative edits to the template.
    ///
    /// Edits run on a copy; the template is only replaced when every edit
    /// succeeded and the result validates.
    pub fn edit_template(
        &mut self,
        occurred_at: DateTime<Utc>,
        edit: impl FnOnce(&mut ChecklistTree) -> DomainResult<()>,
    ) -> DomainResult<TemplateUpdated> {
        let mut draft = self.template.clone();
        edit(&mut draft)?;
        draft.validate()?;

        self.template = draft;
        self.revision += 1;
        Ok(TemplateUpdated {
            vehicle_id: self.id,
            revision: self.revision,
            occurred_at,
        })
    }
}

impl Entity for Vehicle {
    type Id = VehicleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
