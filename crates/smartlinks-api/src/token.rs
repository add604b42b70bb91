use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use smartlinks_types::api::Claims;

/// Mints and checks HS256 session tokens. Verification is stateless.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("token lifetime out of range"))?;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let tokens = TokenConfig::new("test-secret", Duration::hours(1));
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, "a@x.com").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let ours = TokenConfig::new("ours", Duration::hours(1));
        let theirs = TokenConfig::new("theirs", Duration::hours(1));
        let token = theirs.issue(Uuid::new_v4(), "a@x.com").unwrap();
        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the default 60s validation leeway.
        let tokens = TokenConfig::new("test-secret", Duration::hours(-2));
        let token = tokens.issue(Uuid::new_v4(), "a@x.com").unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn unrepresentable_lifetime_is_an_error() {
        let tokens = TokenConfig::new("test-secret", Duration::MAX);
        assert!(tokens.issue(Uuid::new_v4(), "a@x.com").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenConfig::new("test-secret", Duration::hours(1));
        assert!(tokens.verify("not.a.jwt").is_err());
        assert!(tokens.verify("").is_err());
    }
}
