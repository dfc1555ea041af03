use thiserror::Error;

use crate::db_types::{
    AuditEvent,
    NewAuditEvent,
    NewOrder,
    NewPaymentNotification,
    Order,
    OrderId,
    OrderItem,
    OrderStatusType,
    PaymentStatusType,
};

/// This trait defines the persistence behaviour for backends supporting the Warung Payment Engine.
///
/// This behaviour includes:
/// * Atomic order placement (order + line items + best-effort stock decrements).
/// * Attaching gateway payment sessions to orders, and demoting orders to COD when the gateway
///   fails.
/// * The append-only payment notification log and the per-order audit trail.
/// * Status updates driven by payment reconciliation and by administrators.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Persists a new order and its line items in a single atomic transaction.
    ///
    /// For each line item, stock for the referenced product is decremented conditionally
    /// (`stock >= quantity`); an ineffective decrement is recorded in the audit log but does not
    /// abort the order. Any other error rolls the entire placement back: no partial order is ever
    /// visible.
    async fn place_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError>;

    /// Fetches an order by its external order number.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches an order by internal id (if `id` is numeric) or by order number otherwise.
    async fn fetch_order_by_id_or_order_id(&self, id: &str) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches the line items belonging to `order`.
    async fn fetch_order_items(&self, order: &Order) -> Result<Vec<OrderItem>, PaymentGatewayError>;

    /// Stores the hosted-checkout token the gateway returned for this order.
    async fn attach_payment_session(&self, order_id: &OrderId, token: &str) -> Result<Order, PaymentGatewayError>;

    /// Demotes the order's payment method to COD after a gateway failure, and records the reason in
    /// the audit log. The order itself survives; a gateway outage must never lose an order.
    async fn fallback_to_cod(&self, order_id: &OrderId, reason: &str) -> Result<Order, PaymentGatewayError>;

    /// Appends a received notification to the payment notification log.
    ///
    /// The log carries a uniqueness key over (order number, gateway transaction id, status), so
    /// replays of the same notification are absorbed. Returns `true` if the row was inserted and
    /// `false` if it was a duplicate.
    async fn log_notification(&self, notification: NewPaymentNotification) -> Result<bool, PaymentGatewayError>;

    /// Applies reconciled statuses to the order identified by `order_id`, storing the gateway
    /// transaction id alongside. Returns `None` if no such order exists.
    ///
    /// The update is idempotent: applying the same statuses twice converges to the same row.
    async fn apply_notification_statuses(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
        payment_status: PaymentStatusType,
        gateway_txid: Option<&str>,
    ) -> Result<Option<Order>, PaymentGatewayError>;

    /// Administrative fulfilment-status override, recorded in the audit log.
    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError>;

    /// Appends an event to the order audit trail.
    async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<(), PaymentGatewayError>;

    /// Fetches the audit trail for an order (by internal id), oldest first.
    async fn fetch_audit_events(&self, order_id: i64) -> Result<Vec<AuditEvent>, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert order {0}, since it already exists")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
