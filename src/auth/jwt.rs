//! JWT token handling

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::models::{Claims, Role};

const DEFAULT_SECRET: &str = "default-secret-change-me";

/// Upper bound on the configured token lifetime (ten years)
pub const MAX_EXPIRATION_HOURS: u64 = 24 * 365 * 10;

/// Why a presented token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    expiration_hours: u64,
}

impl JwtConfig {
    /// `expiration_hours` is capped at [`MAX_EXPIRATION_HOURS`]
    pub fn new(secret: String, expiration_hours: u64) -> Self {
        Self {
            secret,
            expiration_hours: expiration_hours.min(MAX_EXPIRATION_HOURS),
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, falling back to the built-in development secret");
            DEFAULT_SECRET.to_string()
        });
        let expiration_hours = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);
        if expiration_hours > MAX_EXPIRATION_HOURS {
            log::warn!(
                "JWT_EXPIRATION_HOURS={} exceeds the maximum, using {}",
                expiration_hours,
                MAX_EXPIRATION_HOURS
            );
        }
        Self::new(secret, expiration_hours)
    }

    pub fn lifetime(&self) -> Duration {
        // bounded by MAX_EXPIRATION_HOURS, fits in i64
        Duration::hours(self.expiration_hours as i64)
    }
}

/// JWT manager
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Issue a token for `subject` valid from `now` for the configured lifetime.
    ///
    /// Deterministic: the same subject, role and instant give the same token.
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.config.lifetime()).timestamp(),
            iat_micros: now.timestamp_micros(),
        };
        self.encode_claims(&claims)
    }

    /// Sign a claim set. Identical claims always produce an identical token.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
    }

    /// Verify signature and structure, then check expiry against `now`
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked below against the caller's clock, without leeway
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manager() -> JwtManager {
        JwtManager::new(JwtConfig::new("test-secret".to_string(), 24))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify_token() {
        let manager = manager();
        let token = manager.issue("user_123", Role::Member, t0()).unwrap();

        assert_eq!(token.split('.').count(), 3);

        let claims = manager.verify(&token, t0()).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.role, Role::Member);
        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp, (t0() + Duration::hours(24)).timestamp());
    }

    #[test]
    fn test_token_valid_until_just_before_expiry() {
        let manager = manager();
        let token = manager.issue("user_123", Role::Admin, t0()).unwrap();

        let last_second = t0() + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(manager.verify(&token, last_second).unwrap().role, Role::Admin);

        let at_expiry = t0() + Duration::hours(24);
        assert_eq!(manager.verify(&token, at_expiry), Err(TokenError::Expired));
        assert_eq!(
            manager.verify(&token, at_expiry + Duration::days(3)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_invalid_token() {
        let manager = manager();

        assert_eq!(
            manager.verify("invalid.token.here", t0()),
            Err(TokenError::Malformed)
        );
        assert_eq!(manager.verify("", t0()), Err(TokenError::Malformed));
        assert_eq!(manager.verify("no-dots-at-all", t0()), Err(TokenError::Malformed));
    }

    #[test]
    fn test_foreign_secret_is_bad_signature() {
        let ours = manager();
        let theirs = JwtManager::new(JwtConfig::new("other-secret".to_string(), 24));

        let token = theirs.issue("user_123", Role::Admin, t0()).unwrap();
        assert_eq!(ours.verify(&token, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_claims_fail_signature() {
        let manager = manager();
        let member = manager.issue("user_123", Role::Member, t0()).unwrap();
        let admin = manager.issue("user_123", Role::Admin, t0()).unwrap();

        // graft the admin payload onto the member signature
        let m: Vec<&str> = member.split('.').collect();
        let a: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", m[0], a[1], m[2]);

        assert_eq!(manager.verify(&forged, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let manager = manager();
        let claims = Claims {
            sub: "user_123".to_string(),
            role: Role::Member,
            iat: t0().timestamp(),
            exp: t0().timestamp() + 60,
            iat_micros: t0().timestamp_micros(),
        };

        let first = manager.encode_claims(&claims).unwrap();
        let second = manager.encode_claims(&claims).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_issue_is_deterministic_per_instant() {
        let manager = manager();
        let a = manager.issue("user_123", Role::Member, t0()).unwrap();
        let same = manager.issue("user_123", Role::Member, t0()).unwrap();
        assert_eq!(a, same);

        // one microsecond later is a different token for the same identity
        let later = t0() + Duration::microseconds(1);
        let b = manager.issue("user_123", Role::Member, later).unwrap();
        assert_ne!(a, b);
        assert_eq!(manager.verify(&b, later).unwrap().sub, "user_123");
        assert_eq!(manager.verify(&b, later).unwrap().iat, t0().timestamp());
    }

    #[test]
    fn test_lifetime_is_capped() {
        let config = JwtConfig::new("test-secret".to_string(), u64::MAX);
        assert_eq!(
            config.lifetime(),
            Duration::hours(MAX_EXPIRATION_HOURS as i64)
        );

        let manager = JwtManager::new(config);
        let token = manager.issue("user_123", Role::Member, t0()).unwrap();
        let claims = manager.verify(&token, t0()).unwrap();
        assert_eq!(
            claims.exp,
            (t0() + Duration::hours(MAX_EXPIRATION_HOURS as i64)).timestamp()
        );
    }
}
