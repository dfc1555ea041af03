//! The authentication boundary.
//!
//! `POST /auth` exchanges the configured admin key for a short-lived HS256 JWT. Protected handlers
//! receive a [`JwtClaims`] value through its actix `FromRequest` implementation. That value is the
//! single authenticated principal consumed by everything downstream; there is no other session
//! state anywhere in the process.
use std::future::{ready, Ready};

use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

impl JwtClaims {
    pub fn require_role(&self, role: Role) -> Result<(), ServerError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions(format!("{role:?} role is required")).into())
        }
    }
}

/// Issues and verifies the server's access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry: config.token_expiry,
        }
    }

    pub fn issue_token(&self, sub: &str, role: Role) -> Result<String, ServerError> {
        let claims = JwtClaims { sub: sub.to_string(), role, exp: (Utc::now() + self.expiry).timestamp() };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(e.to_string()).into())
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(data.claims)
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::ConfigurationError("TokenIssuer is not registered".to_string()))?;
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::ValidationError("Expected a Bearer token".to_string()))?;
    let claims = issuer.verify_token(token)?;
    debug!("💻️ Authenticated principal {} ({:?})", claims.sub, claims.role);
    Ok(claims)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}
