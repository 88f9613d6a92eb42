use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared_types::{CallerContext, UserRole};
use uuid::Uuid;

/// Token type discriminator. Only access tokens authenticate API calls.
const TOKEN_TYPE_ACCESS: &str = "access";

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    /// Company the user belongs to. Absent for platform operators and
    /// accounts that have not finished onboarding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default)]
    pub typ: String,
}

impl Claims {
    pub fn caller(&self) -> CallerContext {
        CallerContext::new(
            self.sub,
            self.company_id,
            UserRole::from_str_or_default(&self.role),
        )
    }
}

fn jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ => {
            tracing::error!("JWT_SECRET is not set");
            Err(ErrorKind::InvalidKeyFormat.into())
        }
    }
}

pub fn access_token_expiry_minutes() -> i64 {
    std::env::var("JWT_ACCESS_TOKEN_EXPIRY_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(15)
}

/// Issue an access token. Used by local tooling and tests; production tokens
/// come from the identity provider sharing `JWT_SECRET`.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    company_id: Option<Uuid>,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role: role.as_str().to_string(),
        company_id,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(access_token_expiry_minutes())).timestamp(),
        jti: Some(Uuid::new_v4().to_string()),
        typ: TOKEN_TYPE_ACCESS.to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret()?.as_bytes()),
    )
}

/// Validate an access token. Tokens typed as anything other than `access`
/// are rejected; an empty `typ` is accepted for older tokens.
pub fn validate_access_token(token: &str) -> Result<Claims, JwtError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret()?.as_bytes()),
        &Validation::default(),
    )?;
    let typ = token_data.claims.typ.as_str();
    if !typ.is_empty() && typ != TOKEN_TYPE_ACCESS {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(token_data.claims)
}
