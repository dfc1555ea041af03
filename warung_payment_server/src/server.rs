use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use midtrans_tools::MidtransApi;
use warung_payment_engine::{OrderFlowApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    integrations::midtrans::MidtransGateway,
    routes::{
        auth,
        health,
        OrderDetailsRoute,
        OrderStatusRoute,
        PaymentNotificationRoute,
        PlaceOrderRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let api = MidtransApi::new(config.midtrans.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = MidtransGateway::new(api, &config.base_url);
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: MidtransGateway,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("wps::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(config.auth.clone()))
            .service(health)
            .service(auth)
            .service(PlaceOrderRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(PaymentNotificationRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(OrderStatusRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase, MidtransGateway>::new())
            .service(OrderDetailsRoute::<SqliteDatabase, MidtransGateway>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
