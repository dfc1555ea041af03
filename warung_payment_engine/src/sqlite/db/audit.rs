use sqlx::SqliteConnection;

use crate::{
    db_types::{AuditEvent, NewAuditEvent},
    traits::PaymentGatewayError,
};

pub async fn insert_event(event: &NewAuditEvent, conn: &mut SqliteConnection) -> Result<(), PaymentGatewayError> {
    sqlx::query("INSERT INTO order_audit_log (order_id, event, note) VALUES ($1, $2, $3)")
        .bind(event.order_id)
        .bind(event.event.to_string())
        .bind(&event.note)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_events_for_order(
    order_db_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<AuditEvent>, sqlx::Error> {
    let events = sqlx::query_as("SELECT * FROM order_audit_log WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_db_id)
        .fetch_all(conn)
        .await?;
    Ok(events)
}
