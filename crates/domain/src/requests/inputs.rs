use serde::{Deserialize, Serialize};

use super::request::RequestReason;

/// Body of a request submission: the form state the UI accumulated,
/// replayed through the draft builder on the server side.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestInput {
    pub requester_name: String,
    pub requester_id: String,
    #[serde(default)]
    pub reason: RequestReason,
    pub collaborators: Vec<CollaboratorInput>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorInput {
    pub employee_id: String,
    pub employee_name: String,
    pub item_codes: Vec<String>,
}

/// Passcode submitted against a guarded destination.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateInput {
    pub passcode: String,
}

/// Free-text question for the inventory assistant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantInput {
    pub query: String,
}
