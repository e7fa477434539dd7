use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::sleep;

use domain::approvers::AuthorizedApprover;
use domain::dotation::EmployeeDotation;
use domain::inventory::InventoryItem;
use domain::requests::EppRequest;
use domain::Error;

use super::{DotationLookup, InitialState, SheetGateway};

const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// In-memory stand-in for the spreadsheet, used when no bridge URL is
/// configured. Keeps its own inventory copy and decrements it as
/// deliveries are processed, so stock behaves like the real ledger.
pub struct FixtureGateway {
    inventory: Mutex<Vec<InventoryItem>>,
    approvers: Vec<AuthorizedApprover>,
    epp_columns: Vec<String>,
    dotations: BTreeMap<String, EmployeeDotation>,
    latency: Duration,
}

impl FixtureGateway {
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_LATENCY)
    }

    /// Fixture with an explicit simulated latency; tests pass zero.
    pub fn with_latency(latency: Duration) -> Self {
        let inventory = vec![
            InventoryItem::new("CAS-001".into(), "White Safety Helmet".into(), 50),
            InventoryItem::new("LEN-002".into(), "Clear Safety Glasses".into(), 120),
            InventoryItem::new("GUA-003".into(), "Nitrile Gloves".into(), 300),
            InventoryItem::new("PRO-004".into(), "Earmuff Hearing Protector".into(), 75),
            InventoryItem::new("ZAP-005".into(), "Safety Boots".into(), 40),
            InventoryItem::new("MAS-006".into(), "Disposable Face Mask".into(), 1000),
        ];
        let epp_columns = inventory.iter().map(|item| item.description.clone()).collect();

        let approvers = vec![
            AuthorizedApprover::new("5658".into(), "William Alfaro Delgado".into()),
            AuthorizedApprover::new("9876".into(), "Ana Solís".into()),
        ];

        let mut dotations = BTreeMap::new();
        dotations.insert(
            "5658".to_string(),
            EmployeeDotation {
                employee_id: "5658".to_string(),
                employee_name: "William Alfaro Delgado".to_string(),
                items: BTreeMap::from([
                    ("White Safety Helmet".to_string(), "20/07/2024".to_string()),
                    ("Safety Boots".to_string(), "15/06/2024".to_string()),
                ]),
            },
        );
        dotations.insert(
            "1234".to_string(),
            EmployeeDotation {
                employee_id: "1234".to_string(),
                employee_name: "Carlos Ramirez".to_string(),
                items: BTreeMap::from([
                    ("Clear Safety Glasses".to_string(), "18/07/2024".to_string()),
                    ("Nitrile Gloves".to_string(), "18/07/2024".to_string()),
                ]),
            },
        );

        Self {
            inventory: Mutex::new(inventory),
            approvers,
            epp_columns,
            dotations,
            latency,
        }
    }
}

impl Default for FixtureGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetGateway for FixtureGateway {
    async fn initial_state(&self) -> Result<InitialState, Error> {
        sleep(self.latency).await;
        Ok(InitialState {
            inventory: self.inventory.lock().await.clone(),
            approvers: self.approvers.clone(),
            epp_columns: self.epp_columns.clone(),
        })
    }

    async fn process_delivery(
        &self,
        request: &EppRequest,
        _approver: &AuthorizedApprover,
    ) -> Result<(), Error> {
        sleep(self.latency).await;

        let mut inventory = self.inventory.lock().await;
        for line in &request.items {
            if let Some(stock) = inventory.iter_mut().find(|item| item.id == line.item_id) {
                if stock.quantity > 0 {
                    stock.quantity -= 1;
                }
            }
        }
        Ok(())
    }

    async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error> {
        sleep(self.latency).await;

        Ok(match self.dotations.get(employee_id) {
            Some(dotation) => DotationLookup::Found(dotation.clone()),
            None => DotationLookup::Missing {
                message: format!("No recorded deliveries for code {employee_id}"),
            },
        })
    }
}
