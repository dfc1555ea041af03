use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use wpg_common::Rupiah;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// The externally visible order number. Distinct from the internal database id, and shared with the
/// payment gateway as its transaction identifier, so it must never collide.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
/// Fulfilment lifecycle state of an order. Orthogonal to [`PaymentStatusType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// Newly created; nothing has been confirmed or paid yet.
    Pending,
    /// Confirmed by an administrator.
    Confirmed,
    /// Being prepared for delivery.
    Processing,
    /// Fulfilled (and, for gateway orders, paid).
    Completed,
    /// Cancelled by the customer, an admin, or the payment gateway.
    Cancelled,
    /// The gateway flagged the payment for fraud review.
    Challenge,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Pending => "pending",
            OrderStatusType::Confirmed => "confirmed",
            OrderStatusType::Processing => "processing",
            OrderStatusType::Completed => "completed",
            OrderStatusType::Cancelled => "cancelled",
            OrderStatusType::Challenge => "challenge",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "challenge" => Ok(Self::Challenge),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------  PaymentStatusType    -------------------------------------------------------
/// Payment lifecycle state, independent of fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatusType {
    Pending,
    Paid,
    Denied,
    Expired,
    Cancelled,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatusType::Pending => "pending",
            PaymentStatusType::Paid => "paid",
            PaymentStatusType::Denied => "denied",
            PaymentStatusType::Expired => "expired",
            PaymentStatusType::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "denied" => Ok(Self::Denied),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
/// How the customer pays. `Cod` is the offline/manual method and the fallback target when the
/// gateway is unreachable; `Midtrans` covers all gateway-mediated methods (card, wallet, QR, bank
/// transfer) since the hosted checkout page lets the customer pick among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[sqlx(rename = "COD")]
    #[serde(rename = "COD", alias = "cod", alias = "offline")]
    Cod,
    #[sqlx(rename = "midtrans")]
    #[serde(rename = "midtrans", alias = "online")]
    Midtrans,
}

impl PaymentMethod {
    /// True for methods that require a gateway payment session.
    pub fn is_online(&self) -> bool {
        matches!(self, PaymentMethod::Midtrans)
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "COD"),
            PaymentMethod::Midtrans => write!(f, "midtrans"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cod" | "offline" => Ok(Self::Cod),
            "midtrans" | "online" => Ok(Self::Midtrans),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub payment_method: PaymentMethod,
    pub total: Rupiah,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatusType,
    /// Hosted-checkout token returned by the gateway, if a session was created.
    pub payment_token: Option<String>,
    /// Transaction id echoed back by the gateway in status notifications.
    pub gateway_txid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// A fully validated order, ready to be persisted. Items are carried along so that the whole order
/// can be written in one transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub payment_method: PaymentMethod,
    pub total: Rupiah,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    /// Product name snapshot at order time. Deliberately denormalized; later catalog renames must
    /// not rewrite history.
    pub name: String,
    pub quantity: i64,
    /// Unit price at order time. Must not follow live product price changes.
    pub price: Rupiah,
}

//--------------------------------------      OrderItem        -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    /// Internal id of the owning order.
    pub order_id: i64,
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: Rupiah,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Product         -------------------------------------------------------
/// Catalog entry. The engine only reads name/price and decrements stock; full product lifecycle is
/// managed elsewhere.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Rupiah,
    pub stock: i64,
}

//--------------------------------   Payment notification log   ------------------------------------------------------
/// One received gateway notification, stored verbatim before any interpretation happens.
#[derive(Debug, Clone)]
pub struct NewPaymentNotification {
    pub order_id: OrderId,
    pub payment_type: String,
    pub amount: Rupiah,
    pub status: String,
    pub txid: String,
    /// The raw notification payload, kept for audit and replay.
    pub payload: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentNotificationRecord {
    pub id: i64,
    pub order_id: OrderId,
    pub payment_type: String,
    pub amount: Rupiah,
    pub status: String,
    pub txid: String,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    Audit events       -------------------------------------------------------
/// Structured order audit trail. One row per event, replacing free-text note concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventType {
    /// The gateway refused or failed to create a payment session; the order fell back to COD.
    GatewayFallback,
    /// A best-effort stock decrement had no effect (insufficient stock).
    StockDecrementFailed,
    /// A notification that could not be verified was applied from its raw payload.
    UnverifiedNotification,
    /// An administrator overrode the order status.
    AdminOverride,
}

impl Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditEventType::GatewayFallback => "gateway-fallback",
            AuditEventType::StockDecrementFailed => "stock-decrement-failed",
            AuditEventType::UnverifiedNotification => "unverified-notification",
            AuditEventType::AdminOverride => "admin-override",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    /// Internal id of the order the event belongs to.
    pub order_id: i64,
    pub event: AuditEventType,
    pub note: String,
}

impl NewAuditEvent {
    pub fn new<S: Into<String>>(order_id: i64, event: AuditEventType, note: S) -> Self {
        Self { order_id, event, note: note.into() }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEvent {
    pub id: i64,
    pub order_id: i64,
    pub event: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in ["pending", "confirmed", "processing", "completed", "cancelled", "challenge"] {
            assert_eq!(s.parse::<OrderStatusType>().unwrap().to_string(), s);
        }
        assert!("paid".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn payment_method_aliases() {
        assert_eq!("online".parse::<PaymentMethod>().unwrap(), PaymentMethod::Midtrans);
        assert_eq!("COD".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cod);
        assert_eq!("offline".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cod);
        assert!("dana".parse::<PaymentMethod>().is_err());
    }
}
