use thiserror::Error;

use crate::traits::PaymentGatewayError;

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("Order validation failed. {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] PaymentGatewayError),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(String),
    #[error("The notification payload could not be interpreted. {0}")]
    InvalidNotification(String),
}

/// A caller-correctable input problem, with enough field detail to fix it.
#[derive(Debug, Clone, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new<S: Into<String>>(field: &'static str, message: S) -> Self {
        Self { field, message: message.into() }
    }
}
