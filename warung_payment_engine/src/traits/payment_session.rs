use std::fmt::Display;

use serde_json::Value;
use thiserror::Error;
use wpg_common::Rupiah;

use crate::db_types::{NewOrderItem, OrderId};

/// The external payment provider seam.
///
/// Implementations wrap an actual gateway client (Midtrans in production) and are deliberately
/// stateless: no mutable state is shared across requests.
#[allow(async_fn_in_trait)]
pub trait PaymentSessionGateway {
    /// Creates a hosted-checkout session for the given order. The returned token and redirect URL
    /// are handed to the customer to complete payment.
    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentSessionError>;

    /// Verifies an asynchronous status notification and returns its interpreted content.
    /// Fails if the payload cannot be authenticated as coming from the gateway.
    async fn verify_notification(&self, payload: &Value) -> Result<GatewayStatus, PaymentSessionError>;

    /// Polls the gateway for the current transaction status of an order.
    async fn query_status(&self, order_id: &OrderId) -> Result<GatewayStatus, PaymentSessionError>;
}

#[derive(Debug, Clone)]
pub struct PaymentSessionRequest {
    pub order_id: OrderId,
    pub amount: Rupiah,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Error)]
pub enum PaymentSessionError {
    #[error("Could not create a payment session. {0}")]
    SessionCreation(String),
    #[error("Could not verify the notification. {0}")]
    Verification(String),
    #[error("Could not query the transaction status. {0}")]
    StatusQuery(String),
}

//--------------------------------------  Gateway status   -----------------------------------------------------------

/// The raw transaction status vocabulary reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Expire,
    Cancel,
    /// Anything this engine does not recognise. Mapped to "leave the order untouched".
    Other(String),
}

impl From<&str> for TransactionStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "capture" => Self::Capture,
            "settlement" => Self::Settlement,
            "pending" => Self::Pending,
            "deny" => Self::Deny,
            "expire" => Self::Expire,
            "cancel" => Self::Cancel,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Capture => write!(f, "capture"),
            TransactionStatus::Settlement => write!(f, "settlement"),
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Deny => write!(f, "deny"),
            TransactionStatus::Expire => write!(f, "expire"),
            TransactionStatus::Cancel => write!(f, "cancel"),
            TransactionStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Supplementary risk signal accompanying a `capture` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudStatus {
    Accept,
    Challenge,
    Other(String),
}

impl From<&str> for FraudStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "accept" => Self::Accept,
            "challenge" => Self::Challenge,
            _ => Self::Other(s.to_string()),
        }
    }
}

/// An interpreted gateway status report, from a notification or a status poll.
#[derive(Debug, Clone)]
pub struct GatewayStatus {
    pub order_id: OrderId,
    pub transaction_status: TransactionStatus,
    pub fraud_status: Option<FraudStatus>,
    pub transaction_id: Option<String>,
    pub payment_type: Option<String>,
    pub amount: Option<Rupiah>,
}

impl GatewayStatus {
    /// Best-effort interpretation of a raw notification payload, used as the degraded path when
    /// verification fails. Returns `None` if even the bare minimum (order id and transaction
    /// status) is missing.
    pub fn from_raw(payload: &Value) -> Option<Self> {
        let order_id = payload.get("order_id")?.as_str()?;
        let transaction_status = payload.get("transaction_status")?.as_str()?;
        let fraud_status = payload.get("fraud_status").and_then(|v| v.as_str()).map(FraudStatus::from);
        let transaction_id = payload.get("transaction_id").and_then(|v| v.as_str()).map(String::from);
        let payment_type = payload.get("payment_type").and_then(|v| v.as_str()).map(String::from);
        let amount = payload
            .get("gross_amount")
            .and_then(|v| v.as_str())
            .and_then(|s| s.split('.').next())
            .and_then(|s| s.parse::<i64>().ok())
            .map(Rupiah::from);
        Some(Self {
            order_id: OrderId(order_id.to_string()),
            transaction_status: TransactionStatus::from(transaction_status),
            fraud_status,
            transaction_id,
            payment_type,
            amount,
        })
    }
}
