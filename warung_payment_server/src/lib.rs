//! # Warung payment server
//! This crate hosts the HTTP surface of the Warung back office. It is responsible for:
//! * Accepting new orders and handing them to the payment engine.
//! * Listening for asynchronous payment notifications from Midtrans and acknowledging them.
//! * Answering order status queries, optionally cross-checked live against the gateway.
//! * Administrative status overrides, guarded by a bearer-token principal.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /auth`: Exchanges the configured admin key for a short-lived JWT.
//! * `POST /orders`: Place a new order.
//! * `POST /orders/payment-notification`: The Midtrans webhook. Always acknowledged with a 200.
//! * `GET /orders/{id}/status`: Status query by internal id or order number.
//! * `GET /orders/{id}`: Full order with line items.
//! * `PUT /orders/{id}/status`: Admin-only fulfilment status override.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
