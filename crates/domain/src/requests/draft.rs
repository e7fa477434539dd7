use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::errors::Error;
use crate::inventory::InventoryItem;

use super::request::{AssignedEmployee, EppRequestItem, RequestParts, RequestReason};

/// One resolved equipment assignment inside a draft.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemAssignment {
    pub assignment_id: String,
    pub item_id: String,
    pub item_description: String,
}

/// A collaborator accumulated in a draft with their assignments.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub employee_id: String,
    pub employee_name: String,
    pub items: Vec<ItemAssignment>,
}

/// Multi-collaborator request form state.
///
/// Accumulates collaborators and, per collaborator, equipment lines.
/// Item codes are resolved against the inventory snapshot before they
/// reach `add_item`; `build` checks structural completeness, so nothing
/// incomplete ever leaves the process.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub requester_name: String,
    pub requester_id: String,
    pub reason: RequestReason,
    pub collaborators: Vec<Collaborator>,
}

impl RequestDraft {
    pub fn new(
        requester_name: impl Into<String>,
        requester_id: impl Into<String>,
        reason: RequestReason,
    ) -> Self {
        Self {
            requester_name: requester_name.into(),
            requester_id: requester_id.into(),
            reason,
            collaborators: Vec::new(),
        }
    }

    /// Add a collaborator to the draft. Both fields are required and an
    /// employee may appear only once per request.
    pub fn add_collaborator(&mut self, employee_id: &str, employee_name: &str) -> Result<(), Error> {
        if employee_id.trim().is_empty() || employee_name.trim().is_empty() {
            return Err(Error::validation(
                "Collaborator code and name are both required",
            ));
        }
        if self.collaborators.iter().any(|c| c.employee_id == employee_id) {
            return Err(Error::Duplicate {
                field: "employeeId".to_string(),
            });
        }

        self.collaborators.push(Collaborator {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            items: Vec::new(),
        });
        Ok(())
    }

    /// Drop a collaborator and all their assignments. Unknown ids are a
    /// no-op.
    pub fn remove_collaborator(&mut self, employee_id: &str) {
        self.collaborators.retain(|c| c.employee_id != employee_id);
    }

    /// Assign a resolved inventory item to a collaborator. Returns the
    /// assignment id used for later removal.
    pub fn add_item(&mut self, employee_id: &str, item: &InventoryItem) -> Result<String, Error> {
        let collaborator = self
            .collaborators
            .iter_mut()
            .find(|c| c.employee_id == employee_id)
            .ok_or_else(|| Error::NotFound {
                entity: format!("collaborator {employee_id}"),
            })?;

        let assignment_id = Ulid::new().to_string();
        collaborator.items.push(ItemAssignment {
            assignment_id: assignment_id.clone(),
            item_id: item.id.clone(),
            item_description: item.description.clone(),
        });
        Ok(assignment_id)
    }

    /// Remove exactly one assignment from one collaborator; everyone
    /// else's lines are untouched.
    pub fn remove_item(&mut self, employee_id: &str, assignment_id: &str) {
        if let Some(collaborator) = self
            .collaborators
            .iter_mut()
            .find(|c| c.employee_id == employee_id)
        {
            collaborator
                .items
                .retain(|item| item.assignment_id != assignment_id);
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.requester_name.trim().is_empty() || self.requester_id.trim().is_empty() {
            return Err(Error::validation("Requester name and code are both required"));
        }
        if self.collaborators.is_empty() {
            return Err(Error::validation(
                "At least one collaborator is required on the request",
            ));
        }
        if self.collaborators.iter().any(|c| c.items.is_empty()) {
            return Err(Error::validation(
                "Every collaborator needs at least one assigned item",
            ));
        }
        Ok(())
    }

    /// Flatten the draft into one line item per (collaborator, assignment)
    /// pair, each for a single unit to a single employee, and reset the
    /// draft to empty.
    pub fn build(&mut self) -> Result<RequestParts, Error> {
        self.validate()?;

        let items = self
            .collaborators
            .iter()
            .flat_map(|collaborator| {
                collaborator.items.iter().map(|assignment| {
                    EppRequestItem::single(
                        assignment.item_id.clone(),
                        AssignedEmployee::new(
                            collaborator.employee_id.clone(),
                            collaborator.employee_name.clone(),
                        ),
                    )
                })
            })
            .collect();

        let parts = RequestParts {
            requester_name: self.requester_name.clone(),
            requester_id: self.requester_id.clone(),
            reason: self.reason,
            items,
        };

        *self = Self::default();
        Ok(parts)
    }
}
