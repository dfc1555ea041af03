//! Warung Payment Engine
//!
//! Core order and payment logic for the Warung back office. The engine owns three flows:
//! 1. **Order placement**: validate an incoming order, persist it atomically together with its line
//!    items, decrement inventory on a best-effort basis, and request a hosted-checkout session from
//!    the payment gateway, falling back to cash-on-delivery if the gateway is unavailable.
//! 2. **Payment reconciliation**: interpret asynchronous status notifications from the gateway and
//!    update the order's fulfilment and payment status idempotently.
//! 3. **Status queries**: report the persisted order state, optionally cross-checked live against
//!    the gateway.
//!
//! The library is divided into two main sections:
//! 1. Database management ([`mod@sqlite`] behind the `sqlite` feature). You should never need to
//!    access the database directly; use [`OrderFlowApi`] instead. The exception is the data types
//!    used in the database, which live in [`db_types`] and are public.
//! 2. The public API ([`OrderFlowApi`]), generic over a [`traits::PaymentGatewayDatabase`] backend
//!    and a [`traits::PaymentSessionGateway`] client, so both can be swapped out (or mocked) at the
//!    seams.
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod helpers;
pub mod traits;
mod wpe_api;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use wpe_api::{
    errors::{OrderFlowError, ValidationError},
    order_flow_api::{map_transaction_status, OrderFlowApi},
    order_objects,
};
