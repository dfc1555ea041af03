use thiserror::Error;

#[derive(Debug, Error)]
pub enum MidtransApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Notification is missing the required field '{0}'")]
    MissingField(String),
    #[error("Notification signature does not match the payload")]
    SignatureMismatch,
    #[error("Invalid currency amount: {0}")]
    InvalidCurrencyAmount(String),
}
