//! Member profiles and the admin user directory

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::auth::models::{Identity, UpdateProfileRequest};
use crate::auth::service::{parse_gender, parse_status};
use crate::auth::{require_role, CallerContext, Role};
use crate::store::UserStore;
use crate::ConnectError;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub fn get_profile(&self, caller: &CallerContext) -> Result<Identity, ConnectError> {
        self.users
            .find_user_by_id(&caller.identity_id)?
            .ok_or(ConnectError::IdentityGone)
    }

    /// Each field present in `req` overwrites that same field and nothing else.
    /// Email, role and password are not touched.
    pub fn update_profile(
        &self,
        caller: &CallerContext,
        req: UpdateProfileRequest,
        now: DateTime<Utc>,
    ) -> Result<Identity, ConnectError> {
        let mut identity = self.get_profile(caller)?;
        let profile = &mut identity.profile;

        if let Some(first_name) = req.first_name {
            profile.first_name = non_blank("first_name", first_name)?;
        }
        if let Some(last_name) = req.last_name {
            profile.last_name = non_blank("last_name", last_name)?;
        }
        if let Some(phone) = req.phone {
            profile.phone = non_blank("phone", phone)?;
        }
        if let Some(gender) = req.gender {
            profile.gender = Some(parse_gender(&gender)?);
        }
        if let Some(bac_year) = req.bac_year {
            profile.bac_year = Some(bac_year);
        }
        if let Some(bac_track) = req.bac_track {
            profile.bac_track = Some(bac_track);
        }
        if let Some(status) = req.status {
            profile.status = Some(parse_status(&status)?);
        }
        if let Some(specialty) = req.specialty {
            profile.specialty = Some(specialty);
        }
        if let Some(avatar) = req.avatar {
            profile.avatar = Some(avatar);
        }
        identity.updated_at = now;

        self.users.update_user(&identity)?;
        log::info!("Profile {} updated", identity.id);
        Ok(identity)
    }

    /// Member directory, open to any signed-in caller
    pub fn list_directory(&self, caller: &CallerContext) -> Result<Vec<Identity>, ConnectError> {
        log::debug!("Directory listed by {}", caller.identity_id);
        Ok(self.users.list_users()?)
    }

    /// Admin only
    pub fn list_users(&self, caller: &CallerContext) -> Result<Vec<Identity>, ConnectError> {
        require_role(caller, Role::Admin)?;
        Ok(self.users.list_users()?)
    }

    /// Admins may read anyone; members only themselves
    pub fn get_user(&self, caller: &CallerContext, id: &str) -> Result<Identity, ConnectError> {
        if caller.identity_id != id {
            require_role(caller, Role::Admin)?;
        }
        self.users.find_user_by_id(id)?.ok_or(ConnectError::NotFound)
    }
}

fn non_blank(field: &str, value: String) -> Result<String, ConnectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConnectError::Validation(format!("{} cannot be blank", field)));
    }
    Ok(trimmed.to_string())
}
