use log::*;
use wpg_common::Secret;

const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com";
const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";
const PRODUCTION_API_URL: &str = "https://api.midtrans.com";

#[derive(Debug, Clone, Default)]
pub struct MidtransConfig {
    pub is_production: bool,
    pub server_key: Secret<String>,
    pub client_key: String,
}

impl MidtransConfig {
    pub fn new_from_env_or_default() -> Self {
        let is_production = std::env::var("WPG_MIDTRANS_PRODUCTION")
            .map(|s| &s == "1" || &s == "true")
            .unwrap_or(false);
        let server_key = Secret::new(std::env::var("WPG_MIDTRANS_SERVER_KEY").unwrap_or_else(|_| {
            warn!("WPG_MIDTRANS_SERVER_KEY not set, using (probably useless) default");
            "Mid-server-00000000000000".to_string()
        }));
        let client_key = std::env::var("WPG_MIDTRANS_CLIENT_KEY").unwrap_or_else(|_| {
            warn!("WPG_MIDTRANS_CLIENT_KEY not set, using (probably useless) default");
            "Mid-client-00000000000000".to_string()
        });
        Self { is_production, server_key, client_key }
    }

    /// Base URL for the Snap (hosted checkout) API.
    pub fn snap_url(&self) -> &'static str {
        if self.is_production {
            PRODUCTION_SNAP_URL
        } else {
            SANDBOX_SNAP_URL
        }
    }

    /// Base URL for the Core (transaction status) API.
    pub fn api_url(&self) -> &'static str {
        if self.is_production {
            PRODUCTION_API_URL
        } else {
            SANDBOX_API_URL
        }
    }
}
