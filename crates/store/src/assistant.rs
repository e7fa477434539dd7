use serde_json::{json, Value};

use domain::inventory::InventoryItem;
use domain::Error;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.5-flash";

/// Fixed replies; assistant failures are terminal and never retried.
const UNAVAILABLE: &str =
    "The inventory assistant is not available: no API key is configured.";
const CONTACT_ERROR: &str =
    "There was an error contacting the inventory assistant. Please try again later.";

/// Natural-language assistant over the current inventory snapshot.
///
/// Answers are constrained to the supplied data: the full snapshot is
/// serialized into the system instruction and the model is told not to
/// go beyond it.
pub struct InsightsClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl InsightsClient {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, inventory assistant disabled");
        }
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Answer a free-text question about the supplied inventory.
    pub async fn inventory_insights(&self, inventory: &[InventoryItem], query: &str) -> String {
        let Some(api_key) = &self.api_key else {
            return UNAVAILABLE.to_string();
        };

        match self.generate(api_key, inventory, query).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!("assistant call failed: {}", err);
                CONTACT_ERROR.to_string()
            }
        }
    }

    async fn generate(
        &self,
        api_key: &str,
        inventory: &[InventoryItem],
        query: &str,
    ) -> Result<String, Error> {
        let snapshot = serde_json::to_string_pretty(inventory).map_err(Error::remote)?;
        let system_instruction = format!(
            "You are an expert inventory assistant for a safety equipment warehouse. \
             Analyze the following inventory data, provided in JSON format, and answer \
             the user's question. Be concise, friendly, and helpful. Respond only with \
             information derivable from the data; do not make up information. If the \
             question cannot be answered from the data, say so clearly.\n\n\
             Inventory Data:\n{snapshot}"
        );

        let body = json!({
            "system_instruction": { "parts": [{ "text": system_instruction }] },
            "contents": [{ "parts": [{ "text": query }] }],
        });

        let response = self
            .http
            .post(format!("{GEMINI_ENDPOINT}/{MODEL}:generateContent"))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(Error::remote)?
            .error_for_status()
            .map_err(Error::remote)?;

        let payload: Value = response.json().await.map_err(Error::remote)?;
        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::remote("the assistant returned an empty reply"))
    }
}
