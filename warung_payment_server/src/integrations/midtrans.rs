//! Glue between the engine's [`PaymentSessionGateway`] seam and the Midtrans client.
//!
//! Everything quirky in here mirrors what the storefront has always sent to the gateway: the
//! first/last name split, the synthesised customer e-mail (the storefront does not collect one),
//! the fixed billing city, and the enabled payment channel list.
use log::*;
use midtrans_tools::{
    BillingAddress,
    Callbacks,
    CreditCard,
    CustomerDetails,
    ItemDetail,
    MidtransApi,
    SnapTransactionRequest,
    TransactionDetails,
    TransactionStatus as WireTransactionStatus,
};
use serde_json::Value;
use warung_payment_engine::{
    db_types::OrderId,
    traits::{
        FraudStatus,
        GatewayStatus,
        PaymentSession,
        PaymentSessionError,
        PaymentSessionGateway,
        PaymentSessionRequest,
        TransactionStatus,
    },
};
use wpg_common::Rupiah;

const ENABLED_PAYMENTS: [&str; 6] = ["credit_card", "gopay", "shopeepay", "qris", "bank_transfer", "cstore"];
const ITEM_NAME_LIMIT: usize = 50;

#[derive(Clone)]
pub struct MidtransGateway {
    api: MidtransApi,
    base_url: String,
}

impl MidtransGateway {
    pub fn new(api: MidtransApi, base_url: &str) -> Self {
        Self { api, base_url: base_url.to_string() }
    }
}

impl PaymentSessionGateway for MidtransGateway {
    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentSessionError> {
        let snap_request = build_snap_request(request, &self.base_url);
        trace!("💳️ Requesting Snap session for order [{}]", request.order_id);
        let response = self
            .api
            .create_transaction(&snap_request)
            .await
            .map_err(|e| PaymentSessionError::SessionCreation(e.to_string()))?;
        Ok(PaymentSession { token: response.token, redirect_url: response.redirect_url })
    }

    async fn verify_notification(&self, payload: &Value) -> Result<GatewayStatus, PaymentSessionError> {
        let status =
            self.api.verify_notification(payload).map_err(|e| PaymentSessionError::Verification(e.to_string()))?;
        Ok(to_gateway_status(status))
    }

    async fn query_status(&self, order_id: &OrderId) -> Result<GatewayStatus, PaymentSessionError> {
        let status = self
            .api
            .get_status(order_id.as_str())
            .await
            .map_err(|e| PaymentSessionError::StatusQuery(e.to_string()))?;
        Ok(to_gateway_status(status))
    }
}

fn build_snap_request(request: &PaymentSessionRequest, base_url: &str) -> SnapTransactionRequest {
    let name = request.customer_name.trim();
    let (first_name, last_name) = match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (name.to_string(), String::new()),
    };
    let order_id = request.order_id.as_str();
    SnapTransactionRequest {
        transaction_details: TransactionDetails { order_id: order_id.to_string(), gross_amount: request.amount.value() },
        credit_card: CreditCard::default(),
        customer_details: CustomerDetails {
            first_name,
            last_name,
            // The storefront does not collect e-mail addresses, and the gateway insists on one.
            email: format!("{}@customer.com", request.customer_phone),
            phone: request.customer_phone.clone(),
            billing_address: Some(BillingAddress {
                address: request.customer_address.clone(),
                city: "Karawang".to_string(),
                postal_code: "41361".to_string(),
                country_code: "IDN".to_string(),
            }),
        },
        item_details: request
            .items
            .iter()
            .map(|item| ItemDetail {
                id: item.product_id.to_string(),
                price: item.price.value(),
                quantity: item.quantity as u32,
                name: item.name.chars().take(ITEM_NAME_LIMIT).collect(),
            })
            .collect(),
        enabled_payments: ENABLED_PAYMENTS.iter().map(|s| s.to_string()).collect(),
        callbacks: Some(Callbacks {
            finish: format!("{base_url}/order-success?order_id={order_id}"),
            error: format!("{base_url}/order-error?order_id={order_id}"),
            pending: format!("{base_url}/order-pending?order_id={order_id}"),
        }),
    }
}

fn to_gateway_status(status: WireTransactionStatus) -> GatewayStatus {
    let amount = status
        .gross_amount
        .as_deref()
        .and_then(|s| midtrans_tools::helpers::parse_gross_amount(s).ok())
        .map(Rupiah::from);
    GatewayStatus {
        order_id: OrderId(status.order_id),
        transaction_status: TransactionStatus::from(status.transaction_status.as_str()),
        fraud_status: status.fraud_status.as_deref().map(FraudStatus::from),
        transaction_id: status.transaction_id,
        payment_type: status.payment_type,
        amount,
    }
}
