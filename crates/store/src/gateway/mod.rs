use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use domain::approvers::AuthorizedApprover;
use domain::dotation::EmployeeDotation;
use domain::inventory::InventoryItem;
use domain::requests::EppRequest;
use domain::Error;

/// Canned fixture backend
pub mod fixture;

/// Spreadsheet bridge backend
pub mod remote;

pub use fixture::FixtureGateway;
pub use remote::RemoteGateway;

/// Snapshot returned by the sheet on startup.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitialState {
    pub inventory: Vec<InventoryItem>,
    #[serde(rename = "authorizedApprovers")]
    pub approvers: Vec<AuthorizedApprover>,
    pub epp_columns: Vec<String>,
}

/// Outcome of a dotation query. A miss is data, not an error: the
/// consultation screen renders it as an explanatory empty state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DotationLookup {
    Found(EmployeeDotation),
    Missing { message: String },
}

/// The single async contract over the spreadsheet store of record.
///
/// Operations are independent and may fail independently; callers must
/// not assume any ordering between concurrent calls. One implementation
/// is selected from configuration at process start, never per call.
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// Fetch inventory, approver roster, and sheet columns.
    async fn initial_state(&self) -> Result<InitialState, Error>;

    /// Record an approved delivery against the sheet.
    async fn process_delivery(
        &self,
        request: &EppRequest,
        approver: &AuthorizedApprover,
    ) -> Result<(), Error>;

    /// Fetch the issuance history for one employee.
    async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error>;
}
