use actix_http::StatusCode;
use actix_web::{error::ResponseError, http::header::ContentType, HttpResponse};
use log::error;
use thiserror::Error;
use warung_payment_engine::{traits::PaymentGatewayError, OrderFlowError, ValidationError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Order validation failed. {0}")]
    OrderValidation(ValidationError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::OrderValidation(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidApiKey => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Server-side failures are logged in full but reported generically; callers never see
    /// persistence internals. Validation errors carry their field so the caller can fix the input.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = if status.is_server_error() {
            error!("💻️ Internal error: {self}");
            serde_json::json!({ "error": "Something went wrong on our side. Please try again later." })
        } else if let Self::OrderValidation(v) = self {
            serde_json::json!({ "error": v.to_string(), "field": v.field })
        } else {
            serde_json::json!({ "error": self.to_string() })
        };
        HttpResponse::build(status).insert_header(ContentType::json()).body(body.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("The provided admin key is not valid.")]
    InvalidApiKey,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::Validation(v) => Self::OrderValidation(v),
            OrderFlowError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id} not found")),
            OrderFlowError::InvalidNotification(s) => Self::InvalidRequestBody(s),
            OrderFlowError::Database(PaymentGatewayError::OrderIdNotFound(id)) => {
                Self::NoRecordFound(format!("Order #{id} not found"))
            },
            OrderFlowError::Database(PaymentGatewayError::OrderNotFound(id)) => {
                Self::NoRecordFound(format!("Order {id} not found"))
            },
            OrderFlowError::Database(e) => Self::BackendError(e.to_string()),
        }
    }
}
