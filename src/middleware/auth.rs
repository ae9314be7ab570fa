// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{common::error::AppError, config::AppState, models::summary::AccessScope};

/// Claims of the bearer token issued by the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User id of the person acting.
    pub sub: i64,
    /// Owner every row is scoped to.
    pub owner: i64,
    /// Whether the user may see every shipment of the owner.
    #[serde(default)]
    pub all_shipments: bool,
    pub exp: usize,
    pub iat: usize,
}

/// The authenticated caller, as seen by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub owner_id: i64,
    pub can_access_all_shipments: bool,
}

impl Caller {
    pub fn scope(&self) -> AccessScope {
        AccessScope {
            user_id: self.user_id,
            can_access_all_shipments: self.can_access_all_shipments,
        }
    }
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            owner_id: claims.owner,
            can_access_all_shipments: claims.all_shipments,
        }
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    secret: String,
}

impl TokenVerifier {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn verify(&self, token: &str) -> Result<Caller, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.into())
    }
}

// Middleware: validates the bearer token and stores the Caller in the request extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let caller = app_state.token_verifier.verify(token)?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

// Extractor for handlers behind `auth_guard`.
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 42,
            owner: 1,
            all_shipments: false,
            exp: (now + exp_offset_secs) as usize,
            iat: now as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn valid_token_yields_caller() {
        let verifier = TokenVerifier::new("test-secret".into());
        let caller = verifier.verify(&token("test-secret", 600)).unwrap();
        assert_eq!(
            caller,
            Caller { user_id: 42, owner_id: 1, can_access_all_shipments: false }
        );
        assert_eq!(caller.scope(), AccessScope::restricted(42));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = TokenVerifier::new("test-secret".into());
        assert!(matches!(
            verifier.verify(&token("other-secret", 600)),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = TokenVerifier::new("test-secret".into());
        assert!(matches!(
            verifier.verify(&token("test-secret", -3600)),
            Err(AppError::InvalidToken)
        ));
    }
}
