//! The behaviour contracts that back the payment engine.
//!
//! [`PaymentGatewayDatabase`] is the persistence seam; SQLite implements it today and a Postgres
//! backend could slot in behind the same trait. [`PaymentSessionGateway`] is the external payment
//! provider seam, implemented in the server crate against the Midtrans client and mocked in tests.
mod payment_gateway_database;
mod payment_session;

pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
pub use payment_session::{
    FraudStatus,
    GatewayStatus,
    PaymentSession,
    PaymentSessionError,
    PaymentSessionGateway,
    PaymentSessionRequest,
    TransactionStatus,
};
