use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::NewPaymentNotification, traits::PaymentGatewayError};

/// Appends a notification to the log. The `(order_id, txid, status)` uniqueness key silently
/// absorbs replays; `false` means the row already existed.
pub async fn insert_notification(
    notification: &NewPaymentNotification,
    conn: &mut SqliteConnection,
) -> Result<bool, PaymentGatewayError> {
    let result = sqlx::query(
        r#"
            INSERT OR IGNORE INTO payment_notifications (order_id, payment_type, amount, status, txid, payload)
            VALUES ($1, $2, $3, $4, $5, $6);
        "#,
    )
    .bind(notification.order_id.as_str())
    .bind(&notification.payment_type)
    .bind(notification.amount)
    .bind(&notification.status)
    .bind(&notification.txid)
    .bind(&notification.payload)
    .execute(conn)
    .await?;
    let inserted = result.rows_affected() > 0;
    if !inserted {
        debug!("📝️ Duplicate notification for order [{}] ({}) absorbed", notification.order_id, notification.status);
    }
    Ok(inserted)
}
