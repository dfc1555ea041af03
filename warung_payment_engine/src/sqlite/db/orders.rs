use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType, PaymentStatusType},
    traits::PaymentGatewayError,
};

/// Inserts a new order row with `pending`/`pending` statuses, using the given connection. This is
/// not atomic on its own. Embed this call inside a transaction and pass `&mut *tx` as the
/// connection argument; line items and stock decrements belong in the same transaction.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_name,
                customer_phone,
                customer_address,
                payment_method,
                total
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(&order.order_id)
    .bind(order.customer_name.trim())
    .bind(order.customer_phone.trim())
    .bind(order.customer_address.trim())
    .bind(order.payment_method)
    .bind(order.total)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn insert_order_item(
    order_db_id: i64,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, PaymentGatewayError> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, name, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_db_id)
    .bind(item.product_id)
    .bind(item.name.trim())
    .bind(item.quantity)
    .bind(item.price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

/// Returns the orders row for the corresponding `order_id`
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the orders row for the given internal id.
pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Resolves an order by internal id when `id` is numeric, and by order number otherwise.
/// Order numbers always carry a non-numeric prefix, so the two namespaces cannot collide.
pub async fn fetch_order_by_id_or_order_id(
    id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    match id.parse::<i64>() {
        Ok(n) => fetch_order_by_id(n, conn).await,
        Err(_) => fetch_order_by_order_id(&OrderId(id.to_string()), conn).await,
    }
}

/// Checks whether the order with the given `OrderId` already exists. If it does, the internal `id`
/// of the order is returned.
pub async fn order_exists(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<i64>, PaymentGatewayError> {
    let order = fetch_order_by_order_id(order_id, conn).await?;
    Ok(order.map(|o| o.id))
}

pub async fn fetch_items_for_order(
    order_db_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_db_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Stores the gateway's hosted-checkout token against the order.
pub async fn update_payment_token(
    order_id: &OrderId,
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_token = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(token)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))
}

/// Demotes the order to cash-on-delivery. Any previously stored token is cleared; it belongs to a
/// session that will never be completed.
pub async fn demote_to_cod(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_method = 'COD', payment_token = NULL, updated_at = CURRENT_TIMESTAMP \
         WHERE order_id = $1 RETURNING *",
    )
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))
}

/// Applies reconciled statuses from a payment notification. Returns `None` when the order number is
/// unknown; the caller decides how loudly to complain.
pub async fn apply_notification_statuses(
    order_id: &OrderId,
    status: OrderStatusType,
    payment_status: PaymentStatusType,
    gateway_txid: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, PaymentGatewayError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET
                status = $1,
                payment_status = $2,
                gateway_txid = COALESCE($3, gateway_txid),
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $4
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(payment_status)
    .bind(gateway_txid)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    trace!("📝️ Result of apply_notification_statuses for [{order_id}]: {:?}", result.as_ref().map(|o| o.id));
    Ok(result)
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(PaymentGatewayError::OrderIdNotFound(id))
}
