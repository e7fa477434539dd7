use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything the sheet has recorded as issued to one employee.
///
/// A read-only projection fetched per consultation query, never cached.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDotation {
    pub employee_id: String,
    pub employee_name: String,
    /// Equipment description -> issuance date as recorded in the sheet.
    pub items: BTreeMap<String, String>,
}
