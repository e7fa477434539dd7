use std::env;
use std::sync::Arc;

use crate::gateway::{FixtureGateway, RemoteGateway, SheetGateway};

/// Which sheet backend the process talks to, decided once at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GatewayMode {
    /// POST to the spreadsheet script bridge.
    Remote { bridge_url: String },
    /// Canned in-memory data with simulated latency.
    Fixture,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub gateway: GatewayMode,
    pub gemini_api_key: Option<String>,
}

impl Config {
    /// Read configuration from the environment. `EPP_BRIDGE_URL` selects
    /// the remote bridge; without it the process runs on fixture data.
    pub fn from_env() -> Self {
        let gateway = match env::var("EPP_BRIDGE_URL") {
            Ok(url) if !url.trim().is_empty() => GatewayMode::Remote { bridge_url: url },
            _ => {
                tracing::info!("EPP_BRIDGE_URL not set, running on fixture data");
                GatewayMode::Fixture
            }
        };

        Self {
            port: env::var("EPP_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(8080),
            gateway,
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|key| !key.is_empty()),
        }
    }

    /// Build the gateway strategy for this configuration.
    pub fn build_gateway(&self) -> Arc<dyn SheetGateway> {
        match &self.gateway {
            GatewayMode::Remote { bridge_url } => {
                tracing::info!("using the sheet bridge at {}", bridge_url);
                Arc::new(RemoteGateway::new(bridge_url.clone()))
            }
            GatewayMode::Fixture => Arc::new(FixtureGateway::new()),
        }
    }
}
