use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warung_payment_engine::{
    db_types::{Order, OrderItem, OrderStatusType, PaymentMethod, PaymentStatusType},
    order_objects::{ItemRequest, OrderRequest, PlacedOrder, StatusReport},
};
use wpg_common::Rupiah;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//--------------------------------------   Order placement    --------------------------------------------------------

/// The storefront's order payload. Field names match what the checkout page has always sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub payment: PaymentMethod,
    pub items: Vec<ItemPayload>,
    pub total: Rupiah,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPayload {
    pub product_id: i64,
    pub name: String,
    pub price: Rupiah,
    pub quantity: i64,
}

impl From<OrderPayload> for OrderRequest {
    fn from(p: OrderPayload) -> Self {
        OrderRequest {
            customer_name: p.name,
            customer_phone: p.phone,
            customer_address: p.address,
            payment_method: p.payment,
            items: p
                .items
                .into_iter()
                .map(|i| ItemRequest { product_id: i.product_id, name: i.name, price: i.price, quantity: i.quantity })
                .collect(),
            total: p.total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub message: String,
    pub order_id: String,
    pub order_db_id: i64,
    pub customer_name: String,
    pub total_amount: Rupiah,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl From<PlacedOrder> for OrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        let message = if placed.payment_token.is_some() {
            "Order created; complete the payment to finish checkout".to_string()
        } else {
            "COD order created".to_string()
        };
        Self {
            success: true,
            message,
            order_id: placed.order.order_id.to_string(),
            order_db_id: placed.order.id,
            customer_name: placed.order.customer_name.clone(),
            total_amount: placed.order.total,
            payment_method: placed.order.payment_method,
            status: placed.order.status,
            created_at: placed.order.created_at,
            snap_token: placed.payment_token,
            redirect_url: placed.redirect_url,
        }
    }
}

//--------------------------------------    Status queries    --------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub order_id: String,
    pub customer_name: String,
    pub total_amount: Rupiah,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatusType,
    pub created_at: DateTime<Utc>,
    /// The gateway's live transaction status, when it could be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_transaction_status: Option<String>,
    /// Set when a live gateway check was attempted but failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub live_status_unavailable: bool,
}

impl From<StatusReport> for StatusResponse {
    fn from(report: StatusReport) -> Self {
        Self {
            success: true,
            order_id: report.order.order_id.to_string(),
            customer_name: report.order.customer_name,
            total_amount: report.order.total,
            payment_method: report.order.payment_method,
            status: report.order.status,
            payment_status: report.order.payment_status,
            created_at: report.order.created_at,
            live_transaction_status: report.live_status.map(|s| s.transaction_status.to_string()),
            live_status_unavailable: report.live_status_unavailable,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetailsResponse {
    pub success: bool,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

//--------------------------------------   Admin override     --------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
}
