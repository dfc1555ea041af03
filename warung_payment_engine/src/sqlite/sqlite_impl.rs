//! `SqliteDatabase` is a concrete implementation of a Warung Payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`PaymentGatewayDatabase`]
//! trait. Every mutating operation runs inside its own transaction, scoped to a single order's
//! rows; concurrent placements only contend on the product rows they both touch.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{audit, notifications, orders, products};
use crate::{
    db_types::{
        AuditEvent,
        AuditEventType,
        NewAuditEvent,
        NewOrder,
        NewPaymentNotification,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        PaymentStatusType,
    },
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool for the given database URL.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentGatewayError> {
        let pool = super::db::new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Persists the order, its line items and the stock decrements in a single transaction.
    ///
    /// An ineffective stock decrement (insufficient stock) is recorded in the audit log and the
    /// placement carries on: inventory is advisory, not authoritative. Every other error rolls the
    /// whole placement back.
    async fn place_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        if let Some(id) = orders::order_exists(&order.order_id, &mut tx).await? {
            warn!("🗃️ Order number [{}] already exists with id {id}. Refusing to place it twice.", order.order_id);
            return Err(PaymentGatewayError::OrderAlreadyExists(order.order_id));
        }
        let saved = orders::insert_order(&order, &mut tx).await?;
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let saved_item = orders::insert_order_item(saved.id, item, &mut tx).await?;
            let decremented = products::decrement_stock(item.product_id, item.quantity, &mut tx).await?;
            if !decremented {
                warn!(
                    "🗃️ Stock decrement for product {} (qty {}) on order [{}] had no effect",
                    item.product_id, item.quantity, saved.order_id
                );
                let note = format!("product {} qty {} not decremented", item.product_id, item.quantity);
                audit::insert_event(
                    &NewAuditEvent::new(saved.id, AuditEventType::StockDecrementFailed, note),
                    &mut tx,
                )
                .await?;
            }
            items.push(saved_item);
        }
        tx.commit().await?;
        debug!("🗃️ Order [{}] has been saved in the DB with {} items", saved.order_id, items.len());
        Ok((saved, items))
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_id_or_order_id(&self, id: &str) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id_or_order_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order: &Order) -> Result<Vec<OrderItem>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_items_for_order(order.id, &mut conn).await?;
        Ok(items)
    }

    async fn attach_payment_session(&self, order_id: &OrderId, token: &str) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_payment_token(order_id, token, &mut conn).await?;
        debug!("🗃️ Payment session attached to order [{order_id}]");
        Ok(order)
    }

    /// Demotes the order to COD and records why, in one transaction.
    async fn fallback_to_cod(&self, order_id: &OrderId, reason: &str) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::demote_to_cod(order_id, &mut tx).await?;
        audit::insert_event(&NewAuditEvent::new(order.id, AuditEventType::GatewayFallback, reason), &mut tx).await?;
        tx.commit().await?;
        info!("🗃️ Order [{order_id}] demoted to COD after a gateway failure");
        Ok(order)
    }

    async fn log_notification(&self, notification: NewPaymentNotification) -> Result<bool, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let inserted = notifications::insert_notification(&notification, &mut conn).await?;
        Ok(inserted)
    }

    async fn apply_notification_statuses(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
        payment_status: PaymentStatusType,
        gateway_txid: Option<&str>,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order =
            orders::apply_notification_statuses(order_id, status, payment_status, gateway_txid, &mut conn).await?;
        Ok(order)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(id, status, &mut tx).await?;
        let note = format!("status set to {status}");
        audit::insert_event(&NewAuditEvent::new(order.id, AuditEventType::AdminOverride, note), &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{id} status set to {status} by admin");
        Ok(order)
    }

    async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<(), PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        audit::insert_event(&event, &mut conn).await?;
        Ok(())
    }

    async fn fetch_audit_events(&self, order_id: i64) -> Result<Vec<AuditEvent>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let events = audit::fetch_events_for_order(order_id, &mut conn).await?;
        Ok(events)
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}
