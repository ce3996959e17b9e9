use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// Outcome of a successful credential check.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is invalid")]
    InvalidToken,
    #[error("token has expired")]
    ExpiredToken,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::ExpiredToken => "EXPIRED_TOKEN",
        }
    }
}

/// Credential check for operator connections and the query surface. Behind a
/// trait so relay loops can be exercised with a stub verifier.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// HS256 verifier over a shared secret. Expiry is validated from the `exp`
/// claim by `jsonwebtoken` itself.
pub struct JwtVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(|error| {
                match error.kind() {
                    ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => AuthError::InvalidToken,
                }
            })?;
        Ok(VerifiedIdentity {
            uid: data.claims.sub,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        email: Option<String>,
        exp: i64,
    }

    fn mint(secret: &str, exp_offset_secs: i64) -> String {
        let claims = TestClaims {
            sub: "operator-1".into(),
            email: Some("op@example.com".into()),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token")
    }

    #[tokio::test]
    async fn accepts_token_signed_with_shared_secret() {
        let verifier = JwtVerifier::new(SECRET);
        let identity = verifier.verify(&mint(SECRET, 3600)).await.expect("verify");
        assert_eq!(identity.uid, "operator-1");
        assert_eq!(identity.email.as_deref(), Some("op@example.com"));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let verifier = JwtVerifier::new(SECRET);
        let error = verifier
            .verify(&mint(SECRET, -3600))
            .await
            .expect_err("should fail");
        assert!(matches!(error, AuthError::ExpiredToken));
        assert_eq!(error.error_code(), "EXPIRED_TOKEN");
    }

    #[tokio::test]
    async fn rejects_token_signed_with_other_secret() {
        let verifier = JwtVerifier::new(SECRET);
        let error = verifier
            .verify(&mint("other-secret", 3600))
            .await
            .expect_err("should fail");
        assert!(matches!(error, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let verifier = JwtVerifier::new(SECRET);
        let error = verifier
            .verify("not-a-token")
            .await
            .expect_err("should fail");
        assert_eq!(error.error_code(), "INVALID_TOKEN");
    }
}
