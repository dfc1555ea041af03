use std::env;

use chrono::Duration;
use log::*;
use midtrans_tools::MidtransConfig;
use rand::{distributions::Alphanumeric, Rng};
use wpg_common::Secret;

const DEFAULT_WPG_HOST: &str = "127.0.0.1";
const DEFAULT_WPG_PORT: u16 = 8460;
const DEFAULT_BASE_URL: &str = "http://localhost:8460";
const DEFAULT_TOKEN_EXPIRY: Duration = Duration::hours(12);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Public base URL of this deployment. Used to build the payment page callback URLs handed to
    /// the gateway.
    pub base_url: String,
    pub auth: AuthConfig,
    /// Midtrans gateway credentials and environment selection.
    pub midtrans: MidtransConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WPG_HOST.to_string(),
            port: DEFAULT_WPG_PORT,
            database_url: String::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: AuthConfig::default(),
            midtrans: MidtransConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("WPG_HOST").ok().unwrap_or_else(|| DEFAULT_WPG_HOST.into());
        let port = env::var("WPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for WPG_PORT. {e} Using the default, {DEFAULT_WPG_PORT}, instead."
                    );
                    DEFAULT_WPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_WPG_PORT);
        let database_url = env::var("WPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ WPG_DATABASE_URL is not set. Please set it to the URL for the WPG database.");
            String::default()
        });
        let base_url = env::var("WPG_BASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ WPG_BASE_URL is not set. Payment callbacks will point at {DEFAULT_BASE_URL}.");
            DEFAULT_BASE_URL.into()
        });
        let auth = AuthConfig::from_env_or_default();
        let midtrans = MidtransConfig::new_from_env_or_default();
        Self { host, port, database_url, base_url, auth, midtrans }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 signing secret for the access tokens this server issues.
    pub jwt_secret: Secret<String>,
    /// The shared key an administrator presents to `POST /auth` to obtain an access token.
    pub admin_api_key: Secret<String>,
    pub token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Secret::new(random_key()),
            admin_api_key: Secret::new(random_key()),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        }
    }
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let jwt_secret = env::var("WPG_JWT_SECRET").map(Secret::new).unwrap_or_else(|_| {
            warn!(
                "🪛️ WPG_JWT_SECRET is not set. A random signing secret will be used; issued tokens will not survive \
                 a restart."
            );
            Secret::new(random_key())
        });
        let admin_api_key = env::var("WPG_ADMIN_API_KEY").map(Secret::new).unwrap_or_else(|_| {
            warn!("🪛️ WPG_ADMIN_API_KEY is not set. A random key will be used; admin endpoints will be unreachable.");
            Secret::new(random_key())
        });
        let token_expiry = env::var("WPG_TOKEN_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::hours)
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);
        Self { jwt_secret, admin_api_key, token_expiry }
    }
}

fn random_key() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect()
}
