use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use warung_payment_engine::db_types::{Order, OrderId, OrderStatusType, PaymentMethod, PaymentStatusType};
use wpg_common::{Rupiah, Secret};

use crate::{
    auth::{Role, TokenIssuer},
    config::AuthConfig,
};

// Creates a test `AuthConfig` with fixed keys. DO NOT re-use these keys anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Secret::new("endpoint-test-signing-secret-0000000000000000".to_string()),
        admin_api_key: Secret::new("endpoint-test-admin-key".to_string()),
        token_expiry: chrono::Duration::hours(1),
    }
}

pub fn issue_token() -> String {
    let issuer = TokenIssuer::new(&get_auth_config());
    issuer.issue_token("admin", Role::Admin).expect("Failed to sign token")
}

/// Builds an app from the given route/data configuration and sends one request through it. The
/// token issuer for the test auth config is always registered.
pub async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let config = get_auth_config();
    let app = App::new()
        .app_data(web::Data::new(TokenIssuer::new(&config)))
        .app_data(web::Data::new(config))
        .configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

/// A persisted order as the mocks hand it back.
pub fn sample_order(payment_method: PaymentMethod) -> Order {
    Order {
        id: 1,
        order_id: OrderId("ORD20250105120000AB12CD34EF".to_string()),
        customer_name: "Ani".to_string(),
        customer_phone: "081234567890".to_string(),
        customer_address: "Jl. Mawar 10".to_string(),
        payment_method,
        total: Rupiah::from(20_000),
        status: OrderStatusType::Pending,
        payment_status: PaymentStatusType::Pending,
        payment_token: None,
        gateway_txid: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap(),
    }
}
