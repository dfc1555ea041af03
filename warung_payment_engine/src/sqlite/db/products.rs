use sqlx::SqliteConnection;

use crate::traits::PaymentGatewayError;

/// Conditionally decrements stock for a product: the update only takes effect when at least
/// `quantity` units are available. Returns `true` if a row was updated.
///
/// Inventory here is advisory, not authoritative; callers treat an ineffective decrement as a
/// loggable event, not an error.
pub async fn decrement_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, PaymentGatewayError> {
    let result = sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1")
        .bind(quantity)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
