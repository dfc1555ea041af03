//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat
//! and tidy 🙏
//!
//! Since each worker thread processes its requests sequentially, any long, non-cpu-bound operation
//! (database calls, gateway calls) must be expressed as a future so that the worker can interleave
//! other requests while it waits.
use std::str::FromStr;

use actix_web::{get, post, web, HttpResponse, Responder};
use log::*;
use serde_json::Value;
use warung_payment_engine::{
    db_types::OrderStatusType,
    order_objects::NotificationOutcome,
    traits::{PaymentGatewayDatabase, PaymentSessionGateway},
    OrderFlowApi,
};

use crate::{
    auth::{JwtClaims, Role, TokenIssuer},
    config::AuthConfig,
    data_objects::{JsonResponse, OrderDetailsResponse, OrderPayload, OrderResponse, StatusResponse, UpdateStatusPayload},
    errors::{AuthError, ServerError},
};

// Actix cannot handle generics in handlers, so the registration is implemented manually using the
// `route!` macro: one zero-sized route struct per handler, carrying the backend type parameters.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
/// Exchanges the configured admin key (in the `wpg_admin_key` header) for a short-lived JWT. The
/// token is presented as `Authorization: Bearer <token>` on protected routes.
#[post("/auth")]
pub async fn auth(
    req: actix_web::HttpRequest,
    config: web::Data<AuthConfig>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received auth request");
    let provided = req
        .headers()
        .get("wpg_admin_key")
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::InvalidApiKey)?;
    if provided != config.admin_api_key.reveal() {
        debug!("💻️ Rejected auth request with an invalid admin key");
        return Err(AuthError::InvalidApiKey.into());
    }
    let access_token = signer.issue_token("admin", Role::Admin)?;
    debug!("💻️ Issued access token for admin");
    Ok(HttpResponse::Ok().content_type("application/json").body(access_token))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl PaymentGatewayDatabase, PaymentSessionGateway);
/// Places a new order. Malformed input earns a 400 with field detail; gateway trouble is absorbed
/// into the COD fallback and still reported as success.
pub async fn place_order<TPaymentGatewayDatabase, TPaymentSessionGateway>(
    body: web::Json<OrderPayload>,
    api: web::Data<OrderFlowApi<TPaymentGatewayDatabase, TPaymentSessionGateway>>,
) -> Result<HttpResponse, ServerError>
where
    TPaymentGatewayDatabase: PaymentGatewayDatabase,
    TPaymentSessionGateway: PaymentSessionGateway,
{
    let payload = body.into_inner();
    debug!("💻️ POST order for {} ({} items)", payload.name, payload.items.len());
    let placed = api.place_order(payload.into()).await?;
    info!("💻️ Order [{}] placed successfully", placed.order.order_id);
    Ok(HttpResponse::Ok().json(OrderResponse::from(placed)))
}

route!(payment_notification => Post "/orders/payment-notification" impl PaymentGatewayDatabase, PaymentSessionGateway);
/// The gateway webhook. Responses must always be in the 200 range once the notification has been
/// durably logged, otherwise the gateway will retry and storm us.
pub async fn payment_notification<TPaymentGatewayDatabase, TPaymentSessionGateway>(
    body: web::Json<Value>,
    api: web::Data<OrderFlowApi<TPaymentGatewayDatabase, TPaymentSessionGateway>>,
) -> HttpResponse
where
    TPaymentGatewayDatabase: PaymentGatewayDatabase,
    TPaymentSessionGateway: PaymentSessionGateway,
{
    trace!("🔔️ Received payment notification");
    let payload = body.into_inner();
    let result = match api.handle_notification(&payload).await {
        Ok(NotificationOutcome::Applied { order, .. }) => {
            info!("🔔️ Notification for order [{}] processed successfully.", order.order_id);
            JsonResponse::success("Notification processed")
        },
        Ok(NotificationOutcome::UnknownOrder { order_id }) => {
            warn!("🔔️ Notification for unknown order [{order_id}] recorded.");
            JsonResponse::success("Notification recorded")
        },
        Ok(NotificationOutcome::UnrecognizedStatus { order_id, status }) => {
            warn!("🔔️ Unrecognized status '{status}' for order [{order_id}]. No changes applied.");
            JsonResponse::success("Notification recorded")
        },
        Err(e) => {
            warn!("🔔️ Could not process notification. {e}");
            JsonResponse::failure("Could not process notification")
        },
    };
    HttpResponse::Ok().json(result)
}

route!(order_status => Get "/orders/{id}/status" impl PaymentGatewayDatabase, PaymentSessionGateway);
pub async fn order_status<TPaymentGatewayDatabase, TPaymentSessionGateway>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<TPaymentGatewayDatabase, TPaymentSessionGateway>>,
) -> Result<HttpResponse, ServerError>
where
    TPaymentGatewayDatabase: PaymentGatewayDatabase,
    TPaymentSessionGateway: PaymentSessionGateway,
{
    let id = path.into_inner();
    debug!("💻️ GET status for order {id}");
    let report = api.order_status(&id).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::from(report)))
}

route!(order_details => Get "/orders/{id}" impl PaymentGatewayDatabase, PaymentSessionGateway);
pub async fn order_details<TPaymentGatewayDatabase, TPaymentSessionGateway>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<TPaymentGatewayDatabase, TPaymentSessionGateway>>,
) -> Result<HttpResponse, ServerError>
where
    TPaymentGatewayDatabase: PaymentGatewayDatabase,
    TPaymentSessionGateway: PaymentSessionGateway,
{
    let id = path.into_inner();
    debug!("💻️ GET details for order {id}");
    let (order, items) = api.full_order(&id).await?;
    Ok(HttpResponse::Ok().json(OrderDetailsResponse { success: true, order, items }))
}

route!(update_order_status => Put "/orders/{id}/status" impl PaymentGatewayDatabase, PaymentSessionGateway);
/// Administrative status override. Requires an authenticated admin principal.
pub async fn update_order_status<TPaymentGatewayDatabase, TPaymentSessionGateway>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusPayload>,
    api: web::Data<OrderFlowApi<TPaymentGatewayDatabase, TPaymentSessionGateway>>,
) -> Result<HttpResponse, ServerError>
where
    TPaymentGatewayDatabase: PaymentGatewayDatabase,
    TPaymentSessionGateway: PaymentSessionGateway,
{
    claims.require_role(Role::Admin)?;
    let id = path.into_inner();
    let status = OrderStatusType::from_str(&body.status)
        .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    debug!("💻️ PUT status {status} for order #{id} by {}", claims.sub);
    let order = api.set_order_status(id, status).await?;
    info!("💻️ Order #{id} status set to {} by {}", order.status, claims.sub);
    Ok(HttpResponse::Ok().json(JsonResponse::success("Status updated")))
}
