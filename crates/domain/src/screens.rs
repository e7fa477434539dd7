use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Navigation destinations arbitrated by the access gate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Home,
    Request,
    Delivery,
    Consultation,
    Inventory,
}

impl Screen {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Request => "request",
            Self::Delivery => "delivery",
            Self::Consultation => "consultation",
            Self::Inventory => "inventory",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "home" => Ok(Self::Home),
            "request" => Ok(Self::Request),
            "delivery" => Ok(Self::Delivery),
            "consultation" => Ok(Self::Consultation),
            "inventory" => Ok(Self::Inventory),
            other => Err(Error::NotFound {
                entity: format!("screen {other}"),
            }),
        }
    }
}
