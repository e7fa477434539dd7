use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Why gear is being requested.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum RequestReason {
    #[serde(rename = "New Delivery")]
    NewDelivery,
    #[serde(rename = "Damage Replacement")]
    DamageReplacement,
}

impl Default for RequestReason {
    fn default() -> Self {
        Self::NewDelivery
    }
}

/// The employee receiving one unit of equipment.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
#[serde(rename_all = "camelCase")]
pub struct AssignedEmployee {
    pub employee_id: String,
    pub employee_name: String,
}

/// One unit of one item issued to one employee.
///
/// Invariant: `quantity` stays at 1 and `employees` holds exactly one
/// entry, matching the sheet script's row shape. Multi-unit or
/// multi-employee requests are expressed as multiple line items.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EppRequestItem {
    pub item_id: String,
    pub quantity: u32,
    pub employees: Vec<AssignedEmployee>,
}

impl EppRequestItem {
    pub fn single(item_id: impl Into<String>, employee: AssignedEmployee) -> Self {
        Self {
            item_id: item_id.into(),
            quantity: 1,
            employees: vec![employee],
        }
    }
}

/// A pending equipment request awaiting approval.
///
/// Requests are provisional: they exist only in process state until an
/// approver commits them to the sheet, and are never mutated in between.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EppRequest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub requester_name: String,
    pub requester_id: String,
    pub reason: RequestReason,
    pub items: Vec<EppRequestItem>,
}

/// Requester fields and flattened line items produced by a draft build.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestParts {
    pub requester_name: String,
    pub requester_id: String,
    pub reason: RequestReason,
    pub items: Vec<EppRequestItem>,
}
