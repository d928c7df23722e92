use jsonwebtoken::{EncodingKey, Header};

use crate::models::{error::Error, jwt::Claims};

pub const ACCESS_TOKEN_TTL_SECS: usize = 15 * 60;

/// Mints an HS256 access token the auth middleware accepts. Tokens are
/// normally issued by the identity service; this is for tooling and tests.
pub fn jwt_encode(sub: &str, roles: &[&str], secret: &str) -> Result<String, Error> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: sub.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        iat: now,
        exp: now + ACCESS_TOKEN_TTL_SECS,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))
}
