//! Identity and authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse permission class carried by every identity and token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "MEMBER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MEMBER" => Some(Role::Member),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Whether a member is still studying or already working
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Student,
    Employee,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Student => "student",
            MemberStatus::Employee => "employee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(MemberStatus::Student),
            "employee" => Some(MemberStatus::Employee),
            _ => None,
        }
    }
}

/// Profile attributes. Opaque to the auth core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub gender: Option<Gender>,
    pub bac_year: Option<i32>,
    pub bac_track: Option<String>,
    pub status: Option<MemberStatus>,
    pub specialty: Option<String>,
    pub avatar: Option<String>,
}

/// Registered identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // identity id
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    /// Issue instant in microseconds, so tokens issued at different instants differ
    pub iat_micros: i64,
}

/// API request/response types
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub gender: Option<String>,
    pub bac_year: Option<i32>,
    pub bac_track: Option<String>,
    pub status: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Identity,
}

/// Partial profile update: every present field overwrites exactly that field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub bac_year: Option<i32>,
    pub bac_track: Option<String>,
    pub status: Option<String>,
    pub specialty: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(Role::Member.as_str()), Some(Role::Member));
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn test_identity_never_serializes_password_hash() {
        let now = Utc::now();
        let identity = Identity {
            id: "user_1".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Member,
            profile: Profile {
                first_name: "Ada".to_string(),
                ..Default::default()
            },
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["first_name"], "Ada");
        assert_eq!(json["role"], "MEMBER");
    }

    #[test]
    fn test_enum_parsing_is_lenient_on_case() {
        assert_eq!(Gender::parse(" Female "), Some(Gender::Female));
        assert_eq!(MemberStatus::parse("EMPLOYEE"), Some(MemberStatus::Employee));
        assert_eq!(MemberStatus::parse("retired"), None);
    }
}
