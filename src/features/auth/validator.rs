use super::model::TokenClaims;
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::jwks::JwksClient;

/// Where signature keys come from
pub enum SigningKeys {
    /// Asymmetric keys published by the auth service (RS256 / ES256)
    Jwks(Arc<JwksClient>),
    /// Project-wide HS256 secret
    SharedSecret(DecodingKey),
}

pub struct JwtValidator {
    keys: SigningKeys,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    /// Postgres role the token grants (`authenticated` for signed-in users, `anon` for the public key)
    #[serde(default)]
    role: Option<String>,
}

impl JwtValidator {
    pub fn new(keys: SigningKeys, issuer: String, audience: String, leeway: Duration) -> Self {
        Self {
            keys,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    /// Shared secret when configured, otherwise the JWKS endpoint
    pub fn from_config(config: &AuthConfig) -> Self {
        let keys = match &config.jwt_secret {
            Some(secret) => SigningKeys::SharedSecret(DecodingKey::from_secret(secret.as_bytes())),
            None => SigningKeys::Jwks(Arc::new(JwksClient::new(
                &config.url,
                config.jwks_cache_ttl,
            ))),
        };

        Self::new(
            keys,
            config.issuer(),
            config.audience.clone(),
            config.jwt_leeway,
        )
    }

    pub async fn validate_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        let (algorithm, decoding_key) = match &self.keys {
            SigningKeys::Jwks(client) => {
                if !matches!(header.alg, Algorithm::RS256 | Algorithm::ES256) {
                    return Err(AppError::Auth(format!(
                        "Unsupported algorithm: {:?}. Only RS256 and ES256 are allowed",
                        header.alg
                    )));
                }
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;
                let key = client
                    .get_key(kid)
                    .await
                    .map_err(|e| AppError::Auth(e.to_string()))?;
                (header.alg, key)
            }
            SigningKeys::SharedSecret(key) => {
                if header.alg != Algorithm::HS256 {
                    return Err(AppError::Auth(format!(
                        "Unsupported algorithm: {:?}. Only HS256 is allowed",
                        header.alg
                    )));
                }
                (Algorithm::HS256, key.clone())
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        if claims.role.as_deref() == Some("anon") {
            return Err(AppError::Auth(
                "Anonymous tokens cannot access this resource".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Auth("Token subject is not a user id".to_string()))?;

        Ok(TokenClaims {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    pub const SECRET: &str = "test-secret-with-enough-entropy-0123456789";
    pub const ISSUER: &str = "http://auth.test/auth/v1";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: String,
        email: &'a str,
        aud: &'a str,
        iss: &'a str,
        exp: i64,
        iat: i64,
        role: &'a str,
    }

    pub fn validator() -> JwtValidator {
        JwtValidator::new(
            SigningKeys::SharedSecret(DecodingKey::from_secret(SECRET.as_bytes())),
            ISSUER.to_string(),
            "authenticated".to_string(),
            Duration::from_secs(0),
        )
    }

    pub fn sign(sub: &str, aud: &str, role: &str, expires_in_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = TestClaims {
            sub: sub.to_string(),
            email: "someone@example.com",
            aud,
            iss: ISSUER,
            exp: now + expires_in_secs,
            iat: now,
            role,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_yields_user_id() {
        let user_id = Uuid::new_v4();
        let token = sign(&user_id.to_string(), "authenticated", "authenticated", 3600);

        let claims = validator().validate_token(&token).await.unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email.as_deref(), Some("someone@example.com"));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let token = sign(&Uuid::new_v4().to_string(), "authenticated", "authenticated", -600);
        let err = validator().validate_token(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn test_wrong_audience_is_rejected() {
        let token = sign(&Uuid::new_v4().to_string(), "other", "authenticated", 3600);
        assert!(validator().validate_token(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_anon_and_non_uuid_subjects_are_rejected() {
        let anon = sign(&Uuid::new_v4().to_string(), "authenticated", "anon", 3600);
        assert!(validator().validate_token(&anon).await.is_err());

        let service = sign("service-account", "authenticated", "authenticated", 3600);
        assert!(validator().validate_token(&service).await.is_err());
    }
}
