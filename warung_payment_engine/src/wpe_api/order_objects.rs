use serde::{Deserialize, Serialize};
use wpg_common::Rupiah;

use crate::{
    db_types::{Order, OrderId, OrderItem, PaymentMethod},
    traits::{GatewayStatus, TransactionStatus},
};

//--------------------------------------    Order request      -------------------------------------------------------

/// An incoming order, before validation. Everything in here is caller-supplied and untrusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<ItemRequest>,
    /// Declared total. Must equal the sum of `price * quantity` over the items.
    pub total: Rupiah,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product_id: i64,
    pub name: String,
    pub price: Rupiah,
    pub quantity: i64,
}

//--------------------------------------    Placement result   -------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Present when a gateway payment session was created.
    pub payment_token: Option<String>,
    pub redirect_url: Option<String>,
}

impl PlacedOrder {
    pub fn without_session(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items, payment_token: None, redirect_url: None }
    }
}

//--------------------------------------     Status report     -------------------------------------------------------

/// The persisted order state, optionally enriched with a live gateway status.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub order: Order,
    pub live_status: Option<GatewayStatus>,
    /// True when a live gateway check was attempted but failed; persisted state is all we have.
    pub live_status_unavailable: bool,
}

//--------------------------------------  Notification outcome -------------------------------------------------------

/// What handling a payment notification did. All variants are acknowledged to the gateway with a
/// 2xx; the distinction is for logging and for tests.
#[derive(Debug, Clone)]
pub enum NotificationOutcome {
    /// The order was updated. `verified` is false when the update was applied from an unverifiable
    /// payload (degraded mode, flagged in the audit log).
    Applied { order: Order, verified: bool },
    /// The notification referenced an order this system has never seen.
    UnknownOrder { order_id: OrderId },
    /// The gateway reported a status outside the mapping table; the order was left untouched.
    UnrecognizedStatus { order_id: OrderId, status: TransactionStatus },
}
