use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated operator context extracted from a validated JWT.
#[derive(Clone, Debug)]
pub struct Operator {
    pub id: Uuid,
    pub name: String,
    pub access: String,
}

impl From<Claims> for Operator {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.operator_id,
            name: claims.operator,
            access: claims.access,
        }
    }
}

/// JWT authentication middleware that validates bearer tokens and injects
/// the operator context.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_jwt_from_headers(&headers)
        .map_err(|msg| ApiError::unauthorized(msg).into_response())?;

    let claims =
        validate_jwt(&token).map_err(|msg| ApiError::unauthorized(msg).into_response())?;

    let operator = Operator::from(claims);
    request.extensions_mut().insert(operator);

    Ok(next.run(request).await)
}

/// Capability gate for the destructive reset surface. The check happens
/// once here, at the boundary; downstream code only ever sees an
/// authorized operator id.
pub async fn require_root_middleware(request: Request, next: Next) -> Result<Response, Response> {
    let authorized = request
        .extensions()
        .get::<Operator>()
        .map(|op| op.access == crate::auth::ACCESS_ROOT)
        .unwrap_or(false);

    if !authorized {
        return Err(
            ApiError::forbidden("root access is required for this operation").into_response(),
        );
    }

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}
