use log::*;
use serde_json::Value;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite, SqlitePool};
use warung_payment_engine::{
    db_types::OrderId,
    traits::{GatewayStatus, PaymentSession, PaymentSessionError, PaymentSessionGateway, PaymentSessionRequest},
    SqliteDatabase,
};
use wpg_common::Rupiah;

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/warung_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

pub async fn seed_product(pool: &SqlitePool, name: &str, price: Rupiah, stock: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO products (name, price, stock) VALUES ($1, $2, $3) RETURNING id")
        .bind(name)
        .bind(price)
        .bind(stock)
        .fetch_one(pool)
        .await
        .expect("Error seeding product");
    id
}

pub async fn product_stock(pool: &SqlitePool, id: i64) -> i64 {
    let (stock,): (i64,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Error reading stock");
    stock
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}")).fetch_one(pool).await.expect("Error counting rows");
    count
}

/// A scriptable in-memory stand-in for the Midtrans client.
#[derive(Debug, Clone, Default)]
pub struct TestGateway {
    pub fail_sessions: bool,
    pub fail_verification: bool,
}

impl PaymentSessionGateway for TestGateway {
    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentSessionError> {
        if self.fail_sessions {
            return Err(PaymentSessionError::SessionCreation("gateway unreachable".to_string()));
        }
        Ok(PaymentSession {
            token: format!("token-{}", request.order_id),
            redirect_url: format!("https://pay.example.com/{}", request.order_id),
        })
    }

    async fn verify_notification(&self, payload: &Value) -> Result<GatewayStatus, PaymentSessionError> {
        if self.fail_verification {
            return Err(PaymentSessionError::Verification("signature mismatch".to_string()));
        }
        GatewayStatus::from_raw(payload)
            .ok_or_else(|| PaymentSessionError::Verification("unreadable payload".to_string()))
    }

    async fn query_status(&self, order_id: &OrderId) -> Result<GatewayStatus, PaymentSessionError> {
        let payload = serde_json::json!({
            "order_id": order_id.as_str(),
            "transaction_status": "pending",
        });
        GatewayStatus::from_raw(&payload).ok_or_else(|| PaymentSessionError::StatusQuery("unreachable".to_string()))
    }
}

/// A gateway whose status poll always fails, for exercising the degraded status-query path.
#[derive(Debug, Clone, Default)]
pub struct OfflineGateway;

impl PaymentSessionGateway for OfflineGateway {
    async fn create_payment_session(
        &self,
        _request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentSessionError> {
        Err(PaymentSessionError::SessionCreation("gateway unreachable".to_string()))
    }

    async fn verify_notification(&self, _payload: &Value) -> Result<GatewayStatus, PaymentSessionError> {
        Err(PaymentSessionError::Verification("gateway unreachable".to_string()))
    }

    async fn query_status(&self, _order_id: &OrderId) -> Result<GatewayStatus, PaymentSessionError> {
        Err(PaymentSessionError::StatusQuery("gateway unreachable".to_string()))
    }
}
