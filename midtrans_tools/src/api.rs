use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::MidtransConfig,
    data_objects::{SnapTransactionRequest, SnapTransactionResponse, TransactionStatus},
    helpers::notification_signature,
    MidtransApiError,
};

#[derive(Clone)]
pub struct MidtransApi {
    config: MidtransConfig,
    client: Arc<Client>,
}

impl MidtransApi {
    pub fn new(config: MidtransConfig) -> Result<Self, MidtransApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let credentials = base64::encode(format!("{}:", config.server_key.reveal()));
        let val = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: String,
        body: Option<B>,
    ) -> Result<T, MidtransApiError> {
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| MidtransApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| MidtransApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MidtransApiError::RestResponseError(e.to_string()))?;
            Err(MidtransApiError::QueryError { status, message })
        }
    }

    /// Creates a Snap checkout session. The returned token drives the hosted payment page and the
    /// redirect URL points the customer at it.
    pub async fn create_transaction(
        &self,
        request: &SnapTransactionRequest,
    ) -> Result<SnapTransactionResponse, MidtransApiError> {
        let order_id = request.transaction_details.order_id.clone();
        debug!("Creating Snap transaction for order {order_id}");
        let url = format!("{}/snap/v1/transactions", self.config.snap_url());
        let result =
            self.rest_query::<SnapTransactionResponse, _>(Method::POST, url, Some(request)).await?;
        info!("Snap transaction created for order {order_id}");
        Ok(result)
    }

    /// Polls the Core API for the current transaction status of an order.
    pub async fn get_status(&self, order_id: &str) -> Result<TransactionStatus, MidtransApiError> {
        debug!("Fetching transaction status for order {order_id}");
        let url = format!("{}/v2/{order_id}/status", self.config.api_url());
        let result = self.rest_query::<TransactionStatus, ()>(Method::GET, url, None).await?;
        Ok(result)
    }

    /// Parses a raw notification payload and checks its signature against this client's server key.
    ///
    /// No network round-trip is involved; the signature alone proves the payload came from the
    /// gateway.
    pub fn verify_notification(&self, payload: &Value) -> Result<TransactionStatus, MidtransApiError> {
        let status: TransactionStatus =
            serde_json::from_value(payload.clone()).map_err(|e| MidtransApiError::JsonError(e.to_string()))?;
        let signature =
            status.signature_key.as_deref().ok_or_else(|| MidtransApiError::MissingField("signature_key".into()))?;
        let status_code =
            status.status_code.as_deref().ok_or_else(|| MidtransApiError::MissingField("status_code".into()))?;
        let gross_amount =
            status.gross_amount.as_deref().ok_or_else(|| MidtransApiError::MissingField("gross_amount".into()))?;
        let expected =
            notification_signature(&status.order_id, status_code, gross_amount, self.config.server_key.reveal());
        if signature != expected {
            warn!("Signature mismatch on notification for order {}", status.order_id);
            return Err(MidtransApiError::SignatureMismatch);
        }
        Ok(status)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use wpg_common::Secret;

    use super::*;

    fn api() -> MidtransApi {
        let config = MidtransConfig {
            is_production: false,
            server_key: Secret::new("sk-test".to_string()),
            client_key: "ck-test".to_string(),
        };
        MidtransApi::new(config).unwrap()
    }

    #[test]
    fn verify_accepts_valid_signature() {
        let api = api();
        let sig = notification_signature("ORD123", "200", "20000.00", "sk-test");
        let payload = json!({
            "order_id": "ORD123",
            "transaction_status": "settlement",
            "status_code": "200",
            "gross_amount": "20000.00",
            "transaction_id": "tx-1",
            "signature_key": sig,
        });
        let status = api.verify_notification(&payload).unwrap();
        assert_eq!(status.transaction_status, "settlement");
        assert_eq!(status.order_id, "ORD123");
    }

    #[test]
    fn verify_rejects_bad_signature() {
        let api = api();
        let payload = json!({
            "order_id": "ORD123",
            "transaction_status": "settlement",
            "status_code": "200",
            "gross_amount": "20000.00",
            "signature_key": "deadbeef",
        });
        assert!(matches!(api.verify_notification(&payload), Err(MidtransApiError::SignatureMismatch)));
    }

    #[test]
    fn verify_rejects_missing_signature() {
        let api = api();
        let payload = json!({
            "order_id": "ORD123",
            "transaction_status": "settlement",
            "status_code": "200",
            "gross_amount": "20000.00",
        });
        assert!(matches!(api.verify_notification(&payload), Err(MidtransApiError::MissingField(_))));
    }
}
