use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use domain::approvers::AuthorizedApprover;
use domain::dotation::EmployeeDotation;
use domain::inventory::InventoryItem;
use domain::requests::EppRequest;
use domain::Error;

use super::{DotationLookup, InitialState, SheetGateway};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway that POSTs to the spreadsheet script's web bridge.
///
/// Each operation is one `{ function, arguments }` envelope; the bridge
/// runs the named script function and answers with its JSON payload.
/// Payload-level errors map to `Error::Remote`, as do transport
/// failures.
pub struct RemoteGateway {
    http: reqwest::Client,
    bridge_url: String,
}

#[derive(Serialize)]
struct BridgeCall<'a> {
    function: &'a str,
    arguments: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialPayload {
    #[serde(default)]
    inventory: Vec<InventoryItem>,
    #[serde(default)]
    authorized_approvers: Vec<AuthorizedApprover>,
    #[serde(default)]
    epp_columns: Vec<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ProcessPayload {
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

#[derive(Deserialize)]
struct DotationPayload {
    #[serde(default)]
    found: bool,
    data: Option<EmployeeDotation>,
    message: Option<String>,
    error: Option<String>,
}

impl RemoteGateway {
    pub fn new(bridge_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bridge_url,
        }
    }

    async fn call<T: DeserializeOwned>(&self, function: &str, arguments: Value) -> Result<T, Error> {
        let response = self
            .http
            .post(&self.bridge_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&BridgeCall { function, arguments })
            .send()
            .await
            .map_err(Error::remote)?
            .error_for_status()
            .map_err(Error::remote)?;

        response.json::<T>().await.map_err(Error::remote)
    }
}

#[async_trait]
impl SheetGateway for RemoteGateway {
    async fn initial_state(&self) -> Result<InitialState, Error> {
        let payload: InitialPayload = self.call("getInitialData", Value::Null).await?;
        if let Some(message) = payload.error {
            return Err(Error::Remote { message });
        }

        Ok(InitialState {
            inventory: payload.inventory,
            approvers: payload.authorized_approvers,
            epp_columns: payload.epp_columns,
        })
    }

    async fn process_delivery(
        &self,
        request: &EppRequest,
        approver: &AuthorizedApprover,
    ) -> Result<(), Error> {
        let arguments = json!({ "request": request, "approver": approver });
        let payload: ProcessPayload = self.call("processDelivery", arguments).await?;

        if payload.success {
            Ok(())
        } else {
            Err(Error::Remote {
                message: payload
                    .error
                    .unwrap_or_else(|| "Delivery was rejected by the sheet".to_string()),
            })
        }
    }

    async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error> {
        let arguments = json!({ "employeeId": employee_id });
        let payload: DotationPayload = self.call("getEmployeeDotation", arguments).await?;

        if let Some(message) = payload.error {
            return Err(Error::Remote { message });
        }

        match (payload.found, payload.data) {
            (true, Some(data)) => Ok(DotationLookup::Found(data)),
            _ => Ok(DotationLookup::Missing {
                message: payload.message.unwrap_or_else(|| {
                    format!("No recorded deliveries for code {employee_id}")
                }),
            }),
        }
    }
}
