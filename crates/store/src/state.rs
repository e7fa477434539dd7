use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use ulid::Ulid;

use domain::approvers::AuthorizedApprover;
use domain::inventory::InventoryItem;
use domain::requests::{EppRequest, RequestParts};
use domain::Error;

use crate::gateway::{DotationLookup, SheetGateway};

/// Where the startup fetch currently stands.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum LoadPhase {
    #[default]
    Loading,
    Ready,
    /// Terminal until a reload; the UI shows a full-screen error.
    Failed(String),
}

#[derive(Default)]
struct Shared {
    inventory: Vec<InventoryItem>,
    requests: Vec<EppRequest>,
    approvers: Vec<AuthorizedApprover>,
    epp_columns: Vec<String>,
    current_approver: Option<AuthorizedApprover>,
    phase: LoadPhase,
    in_flight: HashSet<String>,
}

/// One pending request with its lines resolved for display.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingDelivery {
    pub request: EppRequest,
    /// Item description per line, `"unknown"` when the snapshot is stale.
    pub descriptions: Vec<String>,
}

/// Single source of truth for inventory, pending requests, the approver
/// roster, and the session approver.
///
/// All writes to the shared collections go through these operations;
/// screens only read snapshots and hold transient form drafts. Remote
/// calls run outside the state lock, so operations on different
/// requests can be in flight together.
pub struct AppStore {
    gateway: Arc<dyn SheetGateway>,
    shared: RwLock<Shared>,
}

impl AppStore {
    pub fn new(gateway: Arc<dyn SheetGateway>) -> Self {
        Self {
            gateway,
            shared: RwLock::new(Shared::default()),
        }
    }

    /// Fetch the sheet snapshot, replacing inventory, roster, and
    /// columns. A failure is terminal for the whole UI; calling again
    /// retries from scratch.
    pub async fn load_initial_state(&self) -> Result<(), Error> {
        self.shared.write().await.phase = LoadPhase::Loading;

        match self.gateway.initial_state().await {
            Ok(initial) => {
                let mut shared = self.shared.write().await;
                shared.inventory = initial.inventory;
                shared.approvers = initial.approvers;
                shared.epp_columns = initial.epp_columns;
                shared.phase = LoadPhase::Ready;
                tracing::info!(
                    "sheet snapshot loaded: {} items, {} approvers",
                    shared.inventory.len(),
                    shared.approvers.len()
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!("failed to load the sheet snapshot: {}", err);
                self.shared.write().await.phase = LoadPhase::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Append a provisional request to the pending list and return its
    /// id. No remote call; requests only reach the sheet on approval.
    pub async fn add_request(&self, parts: RequestParts) -> String {
        let request = EppRequest {
            id: format!("REQ-{}", Ulid::new()),
            created_at: Utc::now(),
            requester_name: parts.requester_name,
            requester_id: parts.requester_id,
            reason: parts.reason,
            items: parts.items,
        };
        let id = request.id.clone();

        let mut shared = self.shared.write().await;
        shared.requests.push(request);
        tracing::info!("request {} queued, {} pending", id, shared.requests.len());
        id
    }

    /// Approve one pending request and record it against the sheet.
    ///
    /// Requires a session approver; the gateway is never contacted
    /// without one. The submit runs outside the state lock, so distinct
    /// ids can be approved concurrently; the in-flight marker refuses a
    /// second submit of the same id while the first is outstanding. On
    /// success the request leaves the pending list and inventory is
    /// re-fetched silently; on failure local state is left untouched.
    pub async fn approve_and_process(&self, request_id: &str) -> Result<(), Error> {
        let (request, approver) = {
            let mut shared = self.shared.write().await;
            let approver = shared.current_approver.clone().ok_or(Error::NoActiveApprover)?;
            let request = shared
                .requests
                .iter()
                .find(|r| r.id == request_id)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    entity: format!("request {request_id}"),
                })?;
            if !shared.in_flight.insert(request_id.to_string()) {
                return Err(Error::DeliveryInFlight {
                    request_id: request_id.to_string(),
                });
            }
            (request, approver)
        };

        let submitted = self.gateway.process_delivery(&request, &approver).await;

        match submitted {
            Ok(()) => {
                {
                    let mut shared = self.shared.write().await;
                    shared.requests.retain(|r| r.id != request_id);
                }
                // Silent refresh; a failure here keeps the last snapshot.
                match self.gateway.initial_state().await {
                    Ok(initial) => self.shared.write().await.inventory = initial.inventory,
                    Err(err) => {
                        tracing::warn!("inventory refresh after delivery failed: {}", err)
                    }
                }
                self.shared.write().await.in_flight.remove(request_id);
                tracing::info!("delivery processed for {} by {}", request_id, approver.name);
                Ok(())
            }
            Err(err) => {
                self.shared.write().await.in_flight.remove(request_id);
                tracing::warn!("delivery rejected for {}: {}", request_id, err);
                Err(err)
            }
        }
    }

    /// Case-insensitive inventory lookup; a miss is an empty result.
    pub async fn find_item_by_id(&self, code: &str) -> Option<InventoryItem> {
        self.shared
            .read()
            .await
            .inventory
            .iter()
            .find(|item| item.id.eq_ignore_ascii_case(code))
            .cloned()
    }

    /// Resolve an item code typed into the request form.
    pub async fn resolve_item(&self, code: &str) -> Result<InventoryItem, Error> {
        if code.trim().is_empty() {
            return Err(Error::validation("An item code is required"));
        }
        self.find_item_by_id(code).await.ok_or_else(|| Error::NotFound {
            entity: format!("item {code}"),
        })
    }

    /// Roster lookup. Ids are compared as exact strings; numeric sheet
    /// ids were already coerced at deserialization.
    pub async fn find_approver_by_id(&self, id: &str) -> Option<AuthorizedApprover> {
        self.shared
            .read()
            .await
            .approvers
            .iter()
            .find(|approver| approver.id == id)
            .cloned()
    }

    pub async fn find_request_by_id(&self, id: &str) -> Option<EppRequest> {
        self.shared
            .read()
            .await
            .requests
            .iter()
            .find(|request| request.id == id)
            .cloned()
    }

    pub async fn login_approver(&self, approver: AuthorizedApprover) {
        tracing::info!("approver {} logged in", approver.name);
        self.shared.write().await.current_approver = Some(approver);
    }

    /// Clear the session approver; fired when leaving the delivery
    /// screen, forcing re-authentication on the next entry.
    pub async fn logout_approver(&self) {
        self.shared.write().await.current_approver = None;
    }

    pub async fn current_approver(&self) -> Option<AuthorizedApprover> {
        self.shared.read().await.current_approver.clone()
    }

    pub async fn load_phase(&self) -> LoadPhase {
        self.shared.read().await.phase.clone()
    }

    pub async fn inventory(&self) -> Vec<InventoryItem> {
        self.shared.read().await.inventory.clone()
    }

    pub async fn epp_columns(&self) -> Vec<String> {
        self.shared.read().await.epp_columns.clone()
    }

    pub async fn pending_requests(&self) -> Vec<EppRequest> {
        self.shared.read().await.requests.clone()
    }

    /// Pending requests with each line resolved to its description for
    /// the delivery screen.
    pub async fn pending_deliveries(&self) -> Vec<PendingDelivery> {
        let shared = self.shared.read().await;
        shared
            .requests
            .iter()
            .map(|request| {
                let descriptions = request
                    .items
                    .iter()
                    .map(|line| {
                        shared
                            .inventory
                            .iter()
                            .find(|item| item.id.eq_ignore_ascii_case(&line.item_id))
                            .map(|item| item.description.clone())
                            .unwrap_or_else(|| "unknown".to_string())
                    })
                    .collect();
                PendingDelivery {
                    request: request.clone(),
                    descriptions,
                }
            })
            .collect()
    }

    /// Issuance history for one employee, fetched fresh per query.
    pub async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error> {
        self.gateway.employee_dotation(employee_id).await
    }
}
