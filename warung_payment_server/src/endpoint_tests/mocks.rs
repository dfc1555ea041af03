use mockall::mock;
use serde_json::Value;
use warung_payment_engine::{
    db_types::{
        AuditEvent,
        NewAuditEvent,
        NewOrder,
        NewPaymentNotification,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        PaymentStatusType,
    },
    traits::{
        GatewayStatus,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        PaymentSession,
        PaymentSessionError,
        PaymentSessionGateway,
        PaymentSessionRequest,
    },
};

mock! {
    pub PaymentDb {}
    impl PaymentGatewayDatabase for PaymentDb {
        fn url(&self) -> &str;
        async fn place_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), PaymentGatewayError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_by_id_or_order_id(&self, id: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_items(&self, order: &Order) -> Result<Vec<OrderItem>, PaymentGatewayError>;
        async fn attach_payment_session(&self, order_id: &OrderId, token: &str) -> Result<Order, PaymentGatewayError>;
        async fn fallback_to_cod(&self, order_id: &OrderId, reason: &str) -> Result<Order, PaymentGatewayError>;
        async fn log_notification(&self, notification: NewPaymentNotification) -> Result<bool, PaymentGatewayError>;
        async fn apply_notification_statuses<'a>(
            &self,
            order_id: &OrderId,
            status: OrderStatusType,
            payment_status: PaymentStatusType,
            gateway_txid: Option<&'a str>,
        ) -> Result<Option<Order>, PaymentGatewayError>;
        async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError>;
        async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<(), PaymentGatewayError>;
        async fn fetch_audit_events(&self, order_id: i64) -> Result<Vec<AuditEvent>, PaymentGatewayError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentSessionGateway for Gateway {
        async fn create_payment_session(
            &self,
            request: &PaymentSessionRequest,
        ) -> Result<PaymentSession, PaymentSessionError>;
        async fn verify_notification(&self, payload: &Value) -> Result<GatewayStatus, PaymentSessionError>;
        async fn query_status(&self, order_id: &OrderId) -> Result<GatewayStatus, PaymentSessionError>;
    }
}
