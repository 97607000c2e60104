use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::authz::{Principal, Role};
use crate::errors::AppError;

/// Shared-secret verification config for tokens issued by the external auth
/// service. Verification happens locally; no round trip per request.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Arc<Vec<u8>>,
    pub algorithm: Algorithm,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::configuration("JWT_SECRET not set"))?;

        let algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(value) => value
                .parse::<Algorithm>()
                .map_err(|_| AppError::configuration("JWT_ALGORITHM is not a known algorithm"))?,
            Err(_) => Algorithm::HS256,
        };

        // The issuing service signs with the same shared secret, so only the
        // HMAC family makes sense here.
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AppError::configuration(
                "JWT_ALGORITHM must be one of HS256, HS384, HS512",
            ));
        }

        Ok(Self {
            secret: Arc::new(secret.into_bytes()),
            algorithm,
        })
    }

    /// Verify signature and expiry, returning the raw claim set. Bad
    /// signature and expired token are deliberately indistinguishable to the
    /// caller.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;

        jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| AppError::invalid_token(err.to_string()))
    }
}

/// Claim set minted by the auth service. `user_id` is kept as raw JSON so a
/// missing claim and a malformed one can be told apart.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub user_id: Option<Value>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl TokenClaims {
    pub fn into_principal(self) -> Result<Principal, AppError> {
        let raw = self.user_id.ok_or(AppError::MissingUserId)?;

        let id = match raw {
            Value::Number(n) => n.as_i64().ok_or(AppError::InvalidUserId)?,
            Value::String(s) => s.trim().parse::<i64>().map_err(|_| AppError::InvalidUserId)?,
            _ => return Err(AppError::InvalidUserId),
        };

        Ok(Principal {
            id,
            email: self.email,
            username: self.username,
            role: Role::from_claim(self.role.as_deref()),
        })
    }
}

/// Extractor over the `Authorization` header. A missing header or a
/// non-bearer scheme yields `None` rather than an error, so other auth
/// schemes pass through unauthenticated; the gate downstream rejects them
/// wherever a capability is required.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(axum::http::header::AUTHORIZATION) {
            None => return Ok(MaybeAuthUser(None)),
            Some(value) => value.to_str().map_err(|_| AppError::MalformedHeader)?,
        };

        let mut pieces = header.split_whitespace();
        let (scheme, credential) = match (pieces.next(), pieces.next(), pieces.next()) {
            (Some(scheme), Some(credential), None) => (scheme, credential),
            _ => return Err(AppError::MalformedHeader),
        };

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Ok(MaybeAuthUser(None));
        }

        let claims = state.jwt.verify(credential)?;
        Ok(MaybeAuthUser(Some(claims.into_principal()?)))
    }
}
