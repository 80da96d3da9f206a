//! User management DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use iam_core::domain::entities::{Account, Profile, RoleName};

/// Optional profile fields accepted by invite and create requests.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileDto {
    pub full_name: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub fleet_size: Option<u32>,
    pub phone: Option<String>,
    pub vehicle: Option<String>,
}

impl From<ProfileDto> for Profile {
    fn from(dto: ProfileDto) -> Self {
        Self {
            full_name: dto.full_name,
            city: dto.city,
            company: dto.company,
            fleet_size: dto.fleet_size,
            phone: dto.phone,
            vehicle: dto.vehicle,
        }
    }
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        Self {
            full_name: profile.full_name,
            city: profile.city,
            company: profile.company,
            fleet_size: profile.fleet_size,
            phone: profile.phone,
            vehicle: profile.vehicle,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteUserRequest {
    #[validate(email)]
    pub email: String,
    /// Role name; tolerant of the `ROLE_` prefix.
    pub role: String,
    #[serde(flatten)]
    pub profile: ProfileDto,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdminRequest {
    pub username: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: String,
    #[serde(flatten)]
    pub profile: ProfileDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeEmailRequest {
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(email)]
    pub new_email: String,
}

/// Public view of an account. Credentials and token material never appear.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub roles: Vec<RoleName>,
    pub status: String,
    pub enabled: bool,
    pub created_by: Option<Uuid>,
    #[serde(flatten)]
    pub profile: ProfileDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            username: account.username,
            roles: account.roles.into_iter().collect(),
            status: account.status.as_str().to_string(),
            enabled: account.enabled,
            created_by: account.created_by,
            profile: account.profile.into(),
            created_at: account.audit.created_at,
            updated_at: account.audit.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
