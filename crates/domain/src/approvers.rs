use derive_new::new;
use serde::{Deserialize, Deserializer, Serialize};

/// An employee allowed to process deliveries.
///
/// The roster is read-only and doubles as the dynamic passcode source:
/// an approver's id is the passcode for the guarded screens.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct AuthorizedApprover {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

/// Sheet payloads sometimes carry numeric ids; coerce them to strings so
/// roster lookups stay exact string comparisons.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
