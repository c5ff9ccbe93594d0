//! Bearer token issuing and verification
//!
//! Tokens are HS256-signed JWTs carrying the user id, the admin flag, and
//! the issue/expiry timestamps. The expiry is part of the signed payload, so
//! verification needs nothing beyond the signing secret.

use chrono::{DateTime, Utc};
use hotel_core::{AuthConfig, Identity};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validity window of every issued token (24 hours)
pub const TOKEN_VALIDITY_SECS: i64 = 24 * 60 * 60;

/// The only signing algorithm accepted on verification
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claim set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: String,
    /// Admin flag
    pub adm: bool,
    /// Issued at timestamp (Unix seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
}

impl Claims {
    fn into_identity(self) -> Identity {
        Identity::new(self.sub, self.adm)
    }
}

/// Token issuing and verification errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Failed to sign token: {0}")]
    SigningError(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies signed, time-bounded identity tokens
///
/// The secret is fixed at construction and never changes afterwards, so a
/// single instance can be shared across request tasks.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("algorithm", &ALGORITHM)
            .field("validity_secs", &TOKEN_VALIDITY_SECS)
            .finish()
    }
}

impl TokenAuthority {
    /// Create an authority for `secret`
    ///
    /// The caller is responsible for rejecting an empty secret at startup
    /// (see [`hotel_core::AppConfig::validate`]).
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is compared against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes())
    }

    /// Issue a token for `identity`, valid for 24 hours from now
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: identity.id.clone(),
            adm: identity.is_admin,
            iat,
            exp: iat + TOKEN_VALIDITY_SECS,
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(TokenError::SigningError)
    }

    /// Verify a token and return the identity it was issued for
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against the clock value `now`
    ///
    /// Signature, algorithm and claim shape are checked first, so a forged
    /// token is always `InvalidToken` even when its expiry has passed.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let claims = self.decode_claims(token)?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims.into_identity())
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                TokenError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    const SECRET: &[u8] = b"test-secret-for-token-authority";

    fn authority() -> TokenAuthority {
        TokenAuthority::new(SECRET)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let authority = authority();
        let token = authority.issue(&Identity::user("u1")).unwrap();

        let identity = authority.verify(&token).unwrap();
        assert_eq!(identity, Identity::user("u1"));
    }

    #[test]
    fn test_admin_flag_round_trips() {
        let authority = authority();
        let token = authority.issue(&Identity::admin("root")).unwrap();

        assert!(authority.verify(&token).unwrap().is_admin);
    }

    #[test]
    fn test_expiry_window_boundaries() {
        let authority = authority();
        let token = authority.issue_at(&Identity::user("u1"), t0()).unwrap();

        let just_before = t0() + Duration::hours(23) + Duration::minutes(59);
        assert_eq!(
            authority.verify_at(&token, just_before).unwrap().id,
            "u1"
        );

        let just_after = t0() + Duration::hours(24) + Duration::minutes(1);
        assert!(matches!(
            authority.verify_at(&token, just_after),
            Err(TokenError::TokenExpired)
        ));
    }

    #[test]
    fn test_expired_exactly_at_expiry() {
        let authority = authority();
        let token = authority.issue_at(&Identity::user("u1"), t0()).unwrap();

        let at_expiry = t0() + Duration::seconds(TOKEN_VALIDITY_SECS);
        assert!(matches!(
            authority.verify_at(&token, at_expiry),
            Err(TokenError::TokenExpired)
        ));

        let one_second_before = at_expiry - Duration::seconds(1);
        assert!(authority.verify_at(&token, one_second_before).is_ok());
    }

    #[test]
    fn test_claims_carry_fixed_window() {
        let authority = authority();
        let token = authority.issue_at(&Identity::user("u1"), t0()).unwrap();
        let claims = authority.decode_claims(&token).unwrap();

        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp - claims.iat, TOKEN_VALIDITY_SECS);
    }

    #[test]
    fn test_wrong_secret() {
        let token = TokenAuthority::new(b"secret-one")
            .issue(&Identity::user("u1"))
            .unwrap();

        let result = TokenAuthority::new(b"secret-two").verify(&token);
        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_is_invalid() {
        let token = TokenAuthority::new(b"secret-one")
            .issue_at(&Identity::user("u1"), t0())
            .unwrap();

        let long_after = t0() + Duration::days(30);
        let result = TokenAuthority::new(b"secret-two").verify_at(&token, long_after);
        assert!(matches!(result, Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "u1".to_string(),
            adm: false,
            iat: now,
            exp: now + TOKEN_VALIDITY_SECS,
        };

        for algorithm in [Algorithm::HS384, Algorithm::HS512] {
            let token = encode(
                &Header::new(algorithm),
                &claims,
                &EncodingKey::from_secret(SECRET),
            )
            .unwrap();

            assert!(
                matches!(authority().verify(&token), Err(TokenError::InvalidToken)),
                "{algorithm:?} token must be rejected"
            );
        }
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let now = Utc::now().timestamp();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"sub":"u1","adm":true,"iat":{now},"exp":{}}}"#,
            now + TOKEN_VALIDITY_SECS
        ));

        let token = format!("{header}.{payload}.");
        assert!(matches!(
            authority().verify(&token),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let authority = authority();
        let token = authority.issue(&Identity::user("u1")).unwrap();

        let now = Utc::now().timestamp();
        let forged_payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"sub":"u1","adm":true,"iat":{now},"exp":{}}}"#,
            now + TOKEN_VALIDITY_SECS
        ));
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(
            authority.verify(&forged),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn test_claim_shape_mismatch_rejected() {
        #[derive(Serialize)]
        struct Legacy {
            id: String,
            issued: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(ALGORITHM),
            &Legacy {
                id: "u1".to_string(),
                issued: now,
                exp: now + TOKEN_VALIDITY_SECS,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            authority().verify(&token),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let authority = authority();
        for token in ["", "invalid.token.here", "a.b", "not-a-token"] {
            assert!(matches!(
                authority.verify(token),
                Err(TokenError::InvalidToken)
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_verify_returns_issued_identity(
            id in "[A-Za-z0-9_-]{1,40}",
            admin in any::<bool>(),
            elapsed in 0i64..TOKEN_VALIDITY_SECS,
        ) {
            let authority = authority();
            let identity = Identity::new(id, admin);
            let token = authority.issue_at(&identity, t0()).unwrap();

            let verified = authority
                .verify_at(&token, t0() + Duration::seconds(elapsed))
                .unwrap();
            prop_assert_eq!(verified, identity);
        }

        #[test]
        fn prop_past_expiry_is_always_expired(overdue in 0i64..(365 * 24 * 3600)) {
            let authority = authority();
            let token = authority.issue_at(&Identity::user("u1"), t0()).unwrap();

            let now = t0() + Duration::seconds(TOKEN_VALIDITY_SECS + overdue);
            prop_assert!(matches!(
                authority.verify_at(&token, now),
                Err(TokenError::TokenExpired)
            ));
        }
    }
}
