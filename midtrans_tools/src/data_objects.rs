use serde::{Deserialize, Serialize};

//--------------------------------------   Snap request   ------------------------------------------------------------

/// Request body for `POST /snap/v1/transactions`.
///
/// `transaction_details.order_id` doubles as the gateway-side transaction identifier, so it must be
/// unique for the lifetime of the merchant account.
#[derive(Debug, Clone, Serialize)]
pub struct SnapTransactionRequest {
    pub transaction_details: TransactionDetails,
    pub credit_card: CreditCard,
    pub customer_details: CustomerDetails,
    pub item_details: Vec<ItemDetail>,
    pub enabled_payments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Callbacks>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditCard {
    pub secure: bool,
}

impl Default for CreditCard {
    fn default() -> Self {
        Self { secure: true }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub price: i64,
    pub quantity: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Callbacks {
    pub finish: String,
    pub error: String,
    pub pending: String,
}

//--------------------------------------   Snap response   -----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SnapTransactionResponse {
    pub token: String,
    pub redirect_url: String,
}

//--------------------------------------   Status payload   ----------------------------------------------------------

/// The transaction status payload, as delivered by webhook notifications and by
/// `GET /v2/{order_id}/status`. Everything except `order_id` and `transaction_status` is optional
/// on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub order_id: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub signature_key: Option<String>,
}
