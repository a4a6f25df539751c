//! Registration and login

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::jwt::JwtManager;
use super::models::{Gender, Identity, MemberStatus, Profile, RegisterRequest, Role};
use super::password::{hash_password, validate_password, verify_password};
use crate::store::{StoreError, UserStore};
use crate::ConnectError;

/// Verified against when the email is unknown, so both login failures cost one KDF run
const DECOY_PASSWORD: &str = "Decoy-Password-0";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtManager,
    decoy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtManager) -> Result<Self, ConnectError> {
        let decoy_hash = hash_password(DECOY_PASSWORD)?;
        Ok(Self {
            users,
            jwt,
            decoy_hash: decoy_hash.into(),
        })
    }

    /// Create an identity with `role` and issue its first token
    pub fn register(
        &self,
        req: RegisterRequest,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<(Identity, String), ConnectError> {
        let email = normalize_email(&req.email);
        validate_email(&email)?;
        validate_password(&req.password)?;
        let profile = profile_from_request(&req)?;

        if self.users.email_exists(&email)? {
            return Err(ConnectError::DuplicateEmail);
        }

        let password_hash = hash_password(&req.password)?;

        let identity = Identity {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash,
            role,
            profile,
            created_at: now,
            updated_at: now,
        };

        // a concurrent registration may have taken the email since the check above
        match self.users.insert_user(&identity) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(ConnectError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        let token = self.issue(&identity, now)?;
        log::info!("Registered {} identity {}", identity.role.as_str(), identity.id);
        Ok((identity, token))
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown email and wrong password are both `InvalidCredentials`.
    pub fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(Identity, String), ConnectError> {
        let email = normalize_email(email);

        let Some(identity) = self.users.find_user_by_email(&email)? else {
            let _ = verify_password(password, &self.decoy_hash);
            log::debug!("Login rejected: no matching identity");
            return Err(ConnectError::InvalidCredentials);
        };

        match verify_password(password, &identity.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("Login rejected: wrong password for {}", identity.id);
                return Err(ConnectError::InvalidCredentials);
            }
            Err(e) => {
                log::error!("Stored credential of {} is unusable", identity.id);
                return Err(e);
            }
        }

        let token = self.issue(&identity, now)?;
        log::info!("Identity {} logged in", identity.id);
        Ok((identity, token))
    }

    /// Create the bootstrap administrator unless the email is already registered.
    ///
    /// Returns the new identity, or `None` when nothing was created.
    pub fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Identity>, ConnectError> {
        let email = normalize_email(email);
        if let Some(existing) = self.users.find_user_by_email(&email)? {
            match existing.role {
                Role::Admin => log::info!("Administrator {} already present", existing.id),
                other => log::warn!(
                    "Bootstrap email already belongs to {} identity {}, no administrator created",
                    other.as_str(),
                    existing.id
                ),
            }
            return Ok(None);
        }

        let req = RegisterRequest {
            email,
            password: password.to_string(),
            first_name: "Admin".to_string(),
            last_name: "Community".to_string(),
            phone: "-".to_string(),
            gender: None,
            bac_year: None,
            bac_track: None,
            status: Some(MemberStatus::Employee.as_str().to_string()),
            specialty: None,
        };
        let (identity, _) = self.register(req, Role::Admin, now)?;
        Ok(Some(identity))
    }

    fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, ConnectError> {
        self.jwt.issue(&identity.id, identity.role, now).map_err(|e| {
            log::error!("JWT creation error: {}", e);
            ConnectError::Internal("token issuance failed".to_string())
        })
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), ConnectError> {
    let well_formed = email.len() >= 5
        && !email.chars().any(char::is_whitespace)
        && matches!(email.split_once('@'), Some((local, domain)) if !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(ConnectError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> Result<String, ConnectError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConnectError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

pub(crate) fn parse_gender(raw: &str) -> Result<Gender, ConnectError> {
    Gender::parse(raw).ok_or_else(|| ConnectError::Validation(format!("Unknown gender: {}", raw)))
}

pub(crate) fn parse_status(raw: &str) -> Result<MemberStatus, ConnectError> {
    MemberStatus::parse(raw)
        .ok_or_else(|| ConnectError::Validation(format!("Unknown status: {}", raw)))
}

fn profile_from_request(req: &RegisterRequest) -> Result<Profile, ConnectError> {
    Ok(Profile {
        first_name: required("first_name", &req.first_name)?,
        last_name: required("last_name", &req.last_name)?,
        phone: required("phone", &req.phone)?,
        gender: req.gender.as_deref().map(parse_gender).transpose()?,
        bac_year: req.bac_year,
        bac_track: req.bac_track.clone(),
        status: req.status.as_deref().map(parse_status).transpose()?,
        specialty: req.specialty.clone(),
        avatar: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use crate::store::SqliteStore;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let jwt = JwtManager::new(JwtConfig::new("test-secret".to_string(), 24));
        AuthService::new(store, jwt).unwrap()
    }

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Amina".to_string(),
            last_name: "Test".to_string(),
            phone: "0611223344".to_string(),
            gender: Some("female".to_string()),
            bac_year: Some(2015),
            bac_track: Some("Sciences".to_string()),
            status: Some("student".to_string()),
            specialty: None,
        }
    }

    #[test]
    fn test_register_stores_hashed_password() {
        let auth = service();
        let (identity, token) = auth
            .register(request(" A@X.com ", "Secret123"), Role::Member, Utc::now())
            .unwrap();

        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.role, Role::Member);
        assert_ne!(identity.password_hash, "Secret123");
        assert_eq!(identity.profile.gender, Some(Gender::Female));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_register_duplicate_email() {
        let auth = service();
        let (first, _) = auth
            .register(request("a@x.com", "Secret123"), Role::Member, Utc::now())
            .unwrap();

        assert_matches!(
            auth.register(request("A@X.COM", "Other1234"), Role::Member, Utc::now()),
            Err(ConnectError::DuplicateEmail)
        );

        let (again, _) = auth.login("a@x.com", "Secret123", Utc::now()).unwrap();
        assert_eq!(again.id, first.id);
    }

    #[test]
    fn test_register_validation() {
        let auth = service();
        assert_matches!(
            auth.register(request("not-an-email", "Secret123"), Role::Member, Utc::now()),
            Err(ConnectError::Validation(_))
        );
        assert_matches!(
            auth.register(request("a@x.com", "weak"), Role::Member, Utc::now()),
            Err(ConnectError::Validation(_))
        );

        let mut bad_status = request("a@x.com", "Secret123");
        bad_status.status = Some("retired".to_string());
        assert_matches!(
            auth.register(bad_status, Role::Member, Utc::now()),
            Err(ConnectError::Validation(_))
        );

        let mut blank_name = request("a@x.com", "Secret123");
        blank_name.first_name = "   ".to_string();
        assert_matches!(
            auth.register(blank_name, Role::Member, Utc::now()),
            Err(ConnectError::Validation(_))
        );
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let auth = service();
        auth.register(request("a@x.com", "Secret123"), Role::Member, Utc::now())
            .unwrap();

        let wrong_password = auth.login("a@x.com", "wrong", Utc::now()).unwrap_err();
        let unknown_email = auth.login("nobody@x.com", "Secret123", Utc::now()).unwrap_err();

        assert_matches!(wrong_password, ConnectError::InvalidCredentials);
        assert_matches!(unknown_email, ConnectError::InvalidCredentials);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn test_login_case_insensitive_email() {
        let auth = service();
        auth.register(request("a@x.com", "Secret123"), Role::Member, Utc::now())
            .unwrap();
        assert!(auth.login("  A@x.COM", "Secret123", Utc::now()).is_ok());
    }

    #[test]
    fn test_ensure_admin_is_idempotent() {
        let auth = service();
        let created = auth
            .ensure_admin("root@x.com", "AdminPass1", Utc::now())
            .unwrap();
        assert_eq!(created.map(|i| i.role), Some(Role::Admin));

        assert!(auth
            .ensure_admin("ROOT@x.com", "AdminPass1", Utc::now())
            .unwrap()
            .is_none());

        let (admin, _) = auth.login("root@x.com", "AdminPass1", Utc::now()).unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn test_ensure_admin_leaves_member_with_same_email() {
        let auth = service();
        let (member, _) = auth
            .register(request("taken@x.com", "Secret123"), Role::Member, Utc::now())
            .unwrap();

        assert!(auth
            .ensure_admin("taken@x.com", "AdminPass1", Utc::now())
            .unwrap()
            .is_none());

        let (again, _) = auth.login("taken@x.com", "Secret123", Utc::now()).unwrap();
        assert_eq!(again.id, member.id);
        assert_eq!(again.role, Role::Member);
    }

    /// Store whose existence check misses a registration that lands in between
    struct RacingStore {
        inner: SqliteStore,
    }

    impl UserStore for RacingStore {
        fn insert_user(&self, identity: &Identity) -> Result<(), StoreError> {
            self.inner.insert_user(identity)
        }

        fn update_user(&self, identity: &Identity) -> Result<(), StoreError> {
            self.inner.update_user(identity)
        }

        fn find_user_by_id(&self, id: &str) -> Result<Option<Identity>, StoreError> {
            self.inner.find_user_by_id(id)
        }

        fn find_user_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
            self.inner.find_user_by_email(email)
        }

        fn email_exists(&self, _email: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        fn list_users(&self) -> Result<Vec<Identity>, StoreError> {
            self.inner.list_users()
        }
    }

    #[test]
    fn test_register_race_caught_by_unique_constraint() {
        let store = Arc::new(RacingStore {
            inner: SqliteStore::in_memory().unwrap(),
        });
        let jwt = JwtManager::new(JwtConfig::new("test-secret".to_string(), 24));
        let auth = AuthService::new(store.clone(), jwt).unwrap();

        let (first, _) = auth
            .register(request("race@x.com", "Secret123"), Role::Member, Utc::now())
            .unwrap();
        assert_matches!(
            auth.register(request("RACE@x.com", "Other1234"), Role::Member, Utc::now()),
            Err(ConnectError::DuplicateEmail)
        );

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, first.id);
    }

    #[test]
    fn test_concurrent_registrations_with_one_email() {
        let auth = service();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let auth = &auth;
                    scope.spawn(move || {
                        auth.register(request("same@x.com", "Secret123"), Role::Member, Utc::now())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for failure in results.iter().filter(|r| r.is_err()) {
            assert_matches!(failure, Err(ConnectError::DuplicateEmail));
        }
    }
}
