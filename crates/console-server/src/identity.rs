use console_core::{Error, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;

/// The authenticated caller, as carried by the access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    preferred_username: Option<String>,
}

/// Verifies bearer access tokens issued by the auth service.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// RS256 with the configured public key, or HS256 with the shared secret
    /// when no key is configured (development setups).
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match &config.jwt_public_key {
            Some(pem) => Ok(Self::new(
                DecodingKey::from_rsa_pem(pem.as_bytes())?,
                Algorithm::RS256,
            )),
            None => {
                tracing::warn!("no JWT public key configured, falling back to HS256 shared secret");
                Ok(Self::new(
                    DecodingKey::from_secret(config.jwt_secret.as_bytes()),
                    Algorithm::HS256,
                ))
            }
        }
    }

    fn new(key: DecodingKey, alg: Algorithm) -> Self {
        let mut validation = Validation::new(alg);
        // Tokens are minted for several audiences; the signature and expiry are what matter here.
        validation.validate_aud = false;
        Self { key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<Identity> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(err = %e, "error while parsing the user's token");
            Error::Unauthorized("invalid authorization token (unable to parse)".to_string())
        })?;
        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
            Error::Unauthorized("invalid authorization token (invalid 'sub' claim)".to_string())
        })?;
        Ok(Identity {
            id,
            username: data.claims.preferred_username.filter(|u| !u.is_empty()),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use super::*;
    use console_core::ErrorKind;

    pub(crate) const SECRET: &str = "test-secret";

    pub(crate) fn sign(claims: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub(crate) fn token_for(id: Uuid, username: &str) -> String {
        sign(json!({
            "sub": id.to_string(),
            "preferred_username": username,
            "exp": chrono::Utc::now().timestamp() + 3600,
        }))
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(DecodingKey::from_secret(SECRET.as_bytes()), Algorithm::HS256)
    }

    #[test]
    fn valid_token_yields_identity() {
        let id = Uuid::new_v4();
        let identity = verifier().verify(&token_for(id, "alice")).unwrap();
        assert_eq!(identity.id, id);
        assert_eq!(identity.username.as_deref(), Some("alice"));
    }

    #[test]
    fn audience_is_not_enforced() {
        let token = sign(json!({
            "sub": Uuid::new_v4().to_string(),
            "aud": "some-other-client",
            "exp": chrono::Utc::now().timestamp() + 3600,
        }));
        let identity = verifier().verify(&token).unwrap();
        assert_eq!(identity.username, None);
    }

    #[test]
    fn invalid_sub_is_unauthorized() {
        let token = sign(json!({
            "sub": "not-a-uuid",
            "exp": chrono::Utc::now().timestamp() + 3600,
        }));
        let err = verifier().verify(&token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(err.to_string().contains("invalid 'sub' claim"));
    }

    #[test]
    fn expired_or_forged_tokens_are_rejected() {
        let expired = sign(json!({
            "sub": Uuid::new_v4().to_string(),
            "exp": chrono::Utc::now().timestamp() - 3600,
        }));
        assert_eq!(
            verifier().verify(&expired).unwrap_err().kind(),
            ErrorKind::Unauthorized
        );

        let forged = jsonwebtoken::encode(
            &Header::default(),
            &json!({ "sub": Uuid::new_v4().to_string(), "exp": chrono::Utc::now().timestamp() + 3600 }),
            &EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();
        assert_eq!(
            verifier().verify(&forged).unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert!(verifier().verify("garbage").is_err());
    }
}
