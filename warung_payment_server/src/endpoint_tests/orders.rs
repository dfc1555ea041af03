use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::json;
use warung_payment_engine::{
    db_types::{OrderItem, PaymentMethod},
    traits::{GatewayStatus, PaymentSession},
    OrderFlowApi,
};
use wpg_common::Rupiah;

use super::{
    helpers::{issue_token, sample_order, send_request},
    mocks::{MockGateway, MockPaymentDb},
};
use crate::routes::{
    OrderDetailsRoute,
    OrderStatusRoute,
    PaymentNotificationRoute,
    PlaceOrderRoute,
    UpdateOrderStatusRoute,
};

type MockApi = OrderFlowApi<MockPaymentDb, MockGateway>;

fn register(cfg: &mut ServiceConfig, api: MockApi) {
    cfg.service(PlaceOrderRoute::<MockPaymentDb, MockGateway>::new())
        .service(PaymentNotificationRoute::<MockPaymentDb, MockGateway>::new())
        .service(OrderStatusRoute::<MockPaymentDb, MockGateway>::new())
        .service(UpdateOrderStatusRoute::<MockPaymentDb, MockGateway>::new())
        .service(OrderDetailsRoute::<MockPaymentDb, MockGateway>::new())
        .app_data(web::Data::new(api));
}

fn order_body() -> serde_json::Value {
    json!({
        "name": "Ani",
        "phone": "081234567890",
        "address": "Jl. Mawar 10",
        "payment": "midtrans",
        "items": [{"product_id": 1, "name": "Keripik", "price": 10000, "quantity": 2}],
        "total": 20000,
    })
}

fn sample_item() -> OrderItem {
    OrderItem {
        id: 1,
        order_id: 1,
        product_id: 1,
        name: "Keripik".to_string(),
        quantity: 2,
        price: Rupiah::from(10_000),
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn place_order_returns_token_and_order_number() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/orders").set_json(order_body());
    let (status, body) = send_request(req, |cfg| {
        let mut db = MockPaymentDb::new();
        db.expect_place_order().returning(|order| {
            let mut saved = sample_order(PaymentMethod::Midtrans);
            saved.order_id = order.order_id;
            Ok((saved, vec![sample_item()]))
        });
        db.expect_attach_payment_session().returning(|order_id, token| {
            let mut saved = sample_order(PaymentMethod::Midtrans);
            saved.order_id = order_id.clone();
            saved.payment_token = Some(token.to_string());
            Ok(saved)
        });
        let mut gateway = MockGateway::new();
        gateway.expect_create_payment_session().returning(|req| {
            Ok(PaymentSession {
                token: "snap-token-123".to_string(),
                redirect_url: format!("https://app.sandbox.midtrans.com/snap/v3/redirection/{}", req.order_id),
            })
        });
        register(cfg, OrderFlowApi::new(db, gateway));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "{body}");
    assert!(body.contains("snap-token-123"), "{body}");
    assert!(body.contains(r#""order_id":"ORD"#), "{body}");
    assert!(body.contains(r#""status":"pending""#), "{body}");
}

#[actix_web::test]
async fn invalid_phone_is_a_field_level_400() {
    let _ = env_logger::try_init().ok();
    let mut payload = order_body();
    payload["phone"] = json!("1234567890");
    let req = TestRequest::post().uri("/orders").set_json(payload);
    // No mock expectations: validation must fail before any backend call.
    let (status, body) = send_request(req, |cfg| {
        register(cfg, OrderFlowApi::new(MockPaymentDb::new(), MockGateway::new()));
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("customer_phone"), "{body}");
}

#[actix_web::test]
async fn webhook_acknowledges_processed_notifications() {
    let _ = env_logger::try_init().ok();
    let payload = json!({
        "order_id": "ORD20250105120000AB12CD34EF",
        "transaction_status": "settlement",
        "transaction_id": "tx-1",
        "payment_type": "qris",
        "gross_amount": "20000.00",
    });
    let req = TestRequest::post().uri("/orders/payment-notification").set_json(payload);
    let (status, body) = send_request(req, |cfg| {
        let mut db = MockPaymentDb::new();
        db.expect_log_notification().returning(|_| Ok(true));
        db.expect_apply_notification_statuses().returning(|order_id, status, payment_status, txid| {
            let mut saved = sample_order(PaymentMethod::Midtrans);
            saved.order_id = order_id.clone();
            saved.status = status;
            saved.payment_status = payment_status;
            saved.gateway_txid = txid.map(String::from);
            Ok(Some(saved))
        });
        let mut gateway = MockGateway::new();
        gateway
            .expect_verify_notification()
            .returning(|payload| Ok(GatewayStatus::from_raw(payload).expect("payload should parse")));
        register(cfg, OrderFlowApi::new(db, gateway));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "{body}");
}

#[actix_web::test]
async fn webhook_acknowledges_unknown_orders() {
    let _ = env_logger::try_init().ok();
    let payload = json!({
        "order_id": "ORDNOSUCHORDER",
        "transaction_status": "settlement",
        "gross_amount": "20000.00",
    });
    let req = TestRequest::post().uri("/orders/payment-notification").set_json(payload);
    let (status, body) = send_request(req, |cfg| {
        let mut db = MockPaymentDb::new();
        db.expect_log_notification().returning(|_| Ok(true));
        db.expect_apply_notification_statuses().returning(|_, _, _, _| Ok(None));
        let mut gateway = MockGateway::new();
        gateway
            .expect_verify_notification()
            .returning(|payload| Ok(GatewayStatus::from_raw(payload).expect("payload should parse")));
        register(cfg, OrderFlowApi::new(db, gateway));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "{body}");
}

#[actix_web::test]
async fn status_query_returns_persisted_state() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/orders/ORD20250105120000AB12CD34EF/status");
    let (status, body) = send_request(req, |cfg| {
        let mut db = MockPaymentDb::new();
        // A COD order skips the live gateway poll entirely.
        db.expect_fetch_order_by_id_or_order_id().returning(|_| Ok(Some(sample_order(PaymentMethod::Cod))));
        register(cfg, OrderFlowApi::new(db, MockGateway::new()));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"pending""#), "{body}");
    assert!(body.contains(r#""payment_status":"pending""#), "{body}");
}

#[actix_web::test]
async fn status_query_for_unknown_orders_is_404() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/orders/ORDNOSUCHORDER/status");
    let (status, body) = send_request(req, |cfg| {
        let mut db = MockPaymentDb::new();
        db.expect_fetch_order_by_id_or_order_id().returning(|_| Ok(None));
        register(cfg, OrderFlowApi::new(db, MockGateway::new()));
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("not found"), "{body}");
}

#[actix_web::test]
async fn order_details_include_line_items() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/orders/1");
    let (status, body) = send_request(req, |cfg| {
        let mut db = MockPaymentDb::new();
        db.expect_fetch_order_by_id_or_order_id().returning(|_| Ok(Some(sample_order(PaymentMethod::Cod))));
        db.expect_fetch_order_items().returning(|_| Ok(vec![sample_item()]));
        register(cfg, OrderFlowApi::new(db, MockGateway::new()));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Keripik"), "{body}");
    assert!(body.contains(r#""quantity":2"#), "{body}");
}

#[actix_web::test]
async fn status_override_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::put().uri("/orders/1/status").set_json(json!({"status": "confirmed"}));
    let (status, _body) = send_request(req, |cfg| {
        register(cfg, OrderFlowApi::new(MockPaymentDb::new(), MockGateway::new()));
    })
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn status_override_updates_the_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token();
    let req = TestRequest::put()
        .uri("/orders/1/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({"status": "confirmed"}));
    let (status, body) = send_request(req, |cfg| {
        let mut db = MockPaymentDb::new();
        db.expect_update_order_status().returning(|id, status| {
            let mut saved = sample_order(PaymentMethod::Cod);
            saved.id = id;
            saved.status = status;
            Ok(saved)
        });
        register(cfg, OrderFlowApi::new(db, MockGateway::new()));
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "{body}");
}

#[actix_web::test]
async fn status_override_rejects_unknown_statuses() {
    let _ = env_logger::try_init().ok();
    let token = issue_token();
    let req = TestRequest::put()
        .uri("/orders/1/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({"status": "paid"}));
    let (status, body) = send_request(req, |cfg| {
        register(cfg, OrderFlowApi::new(MockPaymentDb::new(), MockGateway::new()));
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid order status"), "{body}");
}
