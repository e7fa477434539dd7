use derive_new::new;
use serde::{Deserialize, Serialize};

/// One stock row of the equipment ledger.
///
/// Rows are loaded from the sheet and only ever replaced wholesale by a
/// fresh snapshot; the sheet itself decrements quantities as deliveries
/// are recorded.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct InventoryItem {
    pub id: String,
    pub description: String,
    pub quantity: u32,
}
