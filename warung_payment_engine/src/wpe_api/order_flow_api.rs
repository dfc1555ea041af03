use std::fmt::Debug;

use log::*;
use serde_json::Value;
use wpg_common::Rupiah;

use crate::{
    db_types::{
        AuditEventType,
        NewAuditEvent,
        NewOrder,
        NewOrderItem,
        NewPaymentNotification,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        PaymentStatusType,
    },
    helpers::{is_valid_phone, new_order_number},
    traits::{
        FraudStatus,
        GatewayStatus,
        PaymentGatewayDatabase,
        PaymentSessionGateway,
        PaymentSessionRequest,
        TransactionStatus,
    },
    wpe_api::{
        errors::{OrderFlowError, ValidationError},
        order_objects::{NotificationOutcome, OrderRequest, PlacedOrder, StatusReport},
    },
};

/// `OrderFlowApi` is the primary API for placing orders, reconciling asynchronous payment
/// notifications, and answering status queries. It is generic over the persistence backend `B` and
/// the payment gateway client `G`, so both seams can be swapped or mocked.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }
}

/// Maps a gateway transaction status (plus the fraud signal accompanying `capture`) to the internal
/// order and payment statuses. Returns `None` for unrecognized statuses, which must leave the order
/// untouched.
///
/// | Gateway status | fraud status    | order status | payment status |
/// |----------------|-----------------|--------------|----------------|
/// | capture        | accept          | completed    | paid           |
/// | capture        | challenge/other | challenge    | pending        |
/// | settlement     | –               | completed    | paid           |
/// | pending        | –               | pending      | pending        |
/// | deny           | –               | cancelled    | denied         |
/// | expire         | –               | cancelled    | expired        |
/// | cancel         | –               | cancelled    | cancelled      |
pub fn map_transaction_status(
    status: &TransactionStatus,
    fraud: Option<&FraudStatus>,
) -> Option<(OrderStatusType, PaymentStatusType)> {
    use OrderStatusType as O;
    use PaymentStatusType as P;
    let mapped = match status {
        // A missing fraud status on capture is treated as accept, matching the gateway's docs.
        TransactionStatus::Capture => match fraud {
            Some(FraudStatus::Accept) | None => (O::Completed, P::Paid),
            Some(_) => (O::Challenge, P::Pending),
        },
        TransactionStatus::Settlement => (O::Completed, P::Paid),
        TransactionStatus::Pending => (O::Pending, P::Pending),
        TransactionStatus::Deny => (O::Cancelled, P::Denied),
        TransactionStatus::Expire => (O::Cancelled, P::Expired),
        TransactionStatus::Cancel => (O::Cancelled, P::Cancelled),
        TransactionStatus::Other(_) => return None,
    };
    Some(mapped)
}

fn validate_order_request(req: &OrderRequest) -> Result<(), ValidationError> {
    if req.customer_name.trim().is_empty() {
        return Err(ValidationError::new("customer_name", "must not be empty"));
    }
    if req.customer_address.trim().is_empty() {
        return Err(ValidationError::new("customer_address", "must not be empty"));
    }
    if !is_valid_phone(req.customer_phone.trim()) {
        return Err(ValidationError::new("customer_phone", "must be a local mobile number (08 followed by 8-13 digits)"));
    }
    if req.items.is_empty() {
        return Err(ValidationError::new("items", "must contain at least one item"));
    }
    for item in &req.items {
        if item.quantity <= 0 {
            return Err(ValidationError::new("items", format!("quantity for '{}' must be positive", item.name)));
        }
        if !item.price.is_positive() {
            return Err(ValidationError::new("items", format!("price for '{}' must be positive", item.name)));
        }
    }
    if !req.total.is_positive() {
        return Err(ValidationError::new("total", "must be positive"));
    }
    let item_sum: Rupiah = req.items.iter().map(|i| i.price * i.quantity).sum();
    if item_sum != req.total {
        let message = format!("declared total {} does not match the item sum {item_sum}", req.total);
        return Err(ValidationError::new("total", message));
    }
    Ok(())
}

impl<B, G> OrderFlowApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentSessionGateway,
{
    /// Places a new order.
    ///
    /// The request is validated up front (no side effects on rejection), then the order, its line
    /// items and the stock decrements are committed in one transaction. For gateway-mediated
    /// payment methods a hosted-checkout session is requested afterwards; if the gateway refuses or
    /// is unreachable, the order is demoted to COD and survives. A committed order is never lost to
    /// a gateway outage.
    pub async fn place_order(&self, req: OrderRequest) -> Result<PlacedOrder, OrderFlowError> {
        validate_order_request(&req)?;
        let order_id = OrderId::from(new_order_number());
        let items = req
            .items
            .iter()
            .map(|i| NewOrderItem {
                product_id: i.product_id,
                name: i.name.clone(),
                quantity: i.quantity,
                price: i.price,
            })
            .collect::<Vec<_>>();
        let new_order = NewOrder {
            order_id: order_id.clone(),
            customer_name: req.customer_name.trim().to_string(),
            customer_phone: req.customer_phone.trim().to_string(),
            customer_address: req.customer_address.trim().to_string(),
            payment_method: req.payment_method,
            total: req.total,
            items,
        };
        let (order, items) = self.db.place_order(new_order).await?;
        debug!("🔄️📦️ Order [{order_id}] placed with id {} ({} items)", order.id, items.len());
        if !order.payment_method.is_online() {
            return Ok(PlacedOrder::without_session(order, items));
        }
        let request = PaymentSessionRequest {
            order_id: order.order_id.clone(),
            amount: order.total,
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            customer_address: order.customer_address.clone(),
            items: items
                .iter()
                .map(|i| NewOrderItem {
                    product_id: i.product_id,
                    name: i.name.clone(),
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        };
        match self.gateway.create_payment_session(&request).await {
            Ok(session) => {
                let order = self.db.attach_payment_session(&order.order_id, &session.token).await?;
                info!("🔄️💳️ Payment session created for order [{order_id}]");
                Ok(PlacedOrder {
                    order,
                    items,
                    payment_token: Some(session.token),
                    redirect_url: Some(session.redirect_url),
                })
            },
            Err(e) => {
                warn!("🔄️💳️ Could not create a payment session for order [{order_id}]. Falling back to COD. {e}");
                let order = self.db.fallback_to_cod(&order.order_id, &e.to_string()).await?;
                Ok(PlacedOrder::without_session(order, items))
            },
        }
    }

    /// Handles an asynchronous payment notification from the gateway.
    ///
    /// The raw payload is appended to the notification log *before* any interpretation, so even a
    /// malformed notification can be replayed later. Verification failure degrades to interpreting
    /// the raw payload, with the resulting update flagged in the audit log for manual review. The
    /// whole operation is idempotent: replaying a notification converges to the same order state.
    pub async fn handle_notification(&self, payload: &Value) -> Result<NotificationOutcome, OrderFlowError> {
        let order_id = payload
            .get("order_id")
            .and_then(|v| v.as_str())
            .map(|s| OrderId(s.to_string()))
            .ok_or_else(|| OrderFlowError::InvalidNotification("order_id is missing".to_string()))?;
        self.log_raw_notification(&order_id, payload).await?;

        let (status, verified) = match self.gateway.verify_notification(payload).await {
            Ok(status) => (status, true),
            Err(e) => {
                warn!("🔔️ Could not verify notification for order [{order_id}]. Proceeding with the raw payload. {e}");
                let status = GatewayStatus::from_raw(payload).ok_or_else(|| {
                    OrderFlowError::InvalidNotification(format!("unverifiable payload could not be interpreted: {e}"))
                })?;
                (status, false)
            },
        };

        let Some((order_status, payment_status)) =
            map_transaction_status(&status.transaction_status, status.fraud_status.as_ref())
        else {
            warn!(
                "🔔️ Unrecognized transaction status '{}' for order [{order_id}]. Order left untouched.",
                status.transaction_status
            );
            return Ok(NotificationOutcome::UnrecognizedStatus { order_id, status: status.transaction_status });
        };

        match self
            .db
            .apply_notification_statuses(&order_id, order_status, payment_status, status.transaction_id.as_deref())
            .await?
        {
            Some(order) => {
                if !verified {
                    let note = format!("applied {order_status}/{payment_status} from an unverified payload");
                    self.db
                        .insert_audit_event(NewAuditEvent::new(order.id, AuditEventType::UnverifiedNotification, note))
                        .await?;
                }
                info!("🔔️ Order [{order_id}] updated to {order_status}/{payment_status}");
                Ok(NotificationOutcome::Applied { order, verified })
            },
            None => {
                warn!("🔔️ Received a notification for unknown order [{order_id}]. Acknowledging anyway.");
                Ok(NotificationOutcome::UnknownOrder { order_id })
            },
        }
    }

    /// Returns the persisted order state for an internal id or order number. For gateway-mediated
    /// orders the gateway is polled live as well; a failed poll degrades to the persisted state
    /// with `live_status_unavailable` set.
    pub async fn order_status(&self, id_or_number: &str) -> Result<StatusReport, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_id_or_order_id(id_or_number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(id_or_number.to_string()))?;
        if !order.payment_method.is_online() {
            return Ok(StatusReport { order, live_status: None, live_status_unavailable: false });
        }
        match self.gateway.query_status(&order.order_id).await {
            Ok(live) => Ok(StatusReport { order, live_status: Some(live), live_status_unavailable: false }),
            Err(e) => {
                warn!("🔎️ Live status for order [{}] is unavailable. {e}", order.order_id);
                Ok(StatusReport { order, live_status: None, live_status_unavailable: true })
            },
        }
    }

    /// Fetches an order and its line items by internal id or order number.
    pub async fn full_order(&self, id_or_number: &str) -> Result<(Order, Vec<OrderItem>), OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_id_or_order_id(id_or_number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(id_or_number.to_string()))?;
        let items = self.db.fetch_order_items(&order).await?;
        Ok((order, items))
    }

    /// Administrative fulfilment-status override. `challenge` is reserved for the gateway's fraud
    /// signal and cannot be set by hand.
    pub async fn set_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderFlowError> {
        if status == OrderStatusType::Challenge {
            return Err(ValidationError::new("status", "challenge can only be set by payment reconciliation").into());
        }
        let order = self.db.update_order_status(id, status).await?;
        Ok(order)
    }

    async fn log_raw_notification(&self, order_id: &OrderId, payload: &Value) -> Result<(), OrderFlowError> {
        let str_field = |key: &str, default: &str| {
            payload.get(key).and_then(|v| v.as_str()).unwrap_or(default).to_string()
        };
        let amount = payload
            .get("gross_amount")
            .and_then(|v| v.as_str())
            .and_then(|s| s.split('.').next())
            .and_then(|s| s.parse::<i64>().ok())
            .map(Rupiah::from)
            .unwrap_or_default();
        let record = NewPaymentNotification {
            order_id: order_id.clone(),
            payment_type: str_field("payment_type", "unknown"),
            amount,
            status: str_field("transaction_status", "unknown"),
            txid: str_field("transaction_id", "unknown"),
            payload: payload.to_string(),
        };
        self.db.log_notification(record).await?;
        Ok(())
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}
