//! Account aggregate: credentials, lifecycle status and the reset-token bundle.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::RoleName;

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Created by an administrator invitation, waiting for activation.
    Invited,
    /// Legacy pre-activation state, treated like `Invited` for sign-in.
    PendingActivation,
    /// Fully usable account.
    Active,
    /// Administratively disabled.
    Disabled,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "INVITED",
            Self::PendingActivation => "PENDING_ACTIVATION",
            Self::Active => "ACTIVE",
            Self::Disabled => "DISABLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INVITED" => Some(Self::Invited),
            "PENDING_ACTIVATION" => Some(Self::PendingActivation),
            "ACTIVE" => Some(Self::Active),
            "DISABLED" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Creation and modification timestamps, embedded by composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditMetadata {
    fn now() -> Self {
        let now = Utc::now();
        Self { created_at: now, updated_at: now }
    }
}

/// Optional profile fields captured at invitation or registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub fleet_size: Option<u32>,
    pub phone: Option<String>,
    pub vehicle: Option<String>,
}

/// Stored credentials of an outstanding single-use reset/activation token.
///
/// The raw token is never persisted: `signature` (SHA-256) is the lookup key
/// and `hash` (bcrypt) is the verification secret. The bundle exists as a
/// whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTokenBundle {
    pub hash: String,
    pub signature: String,
    pub expires_at: DateTime<Utc>,
}

/// Account aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub roles: BTreeSet<RoleName>,
    pub created_by: Option<Uuid>,
    pub enabled: bool,
    pub status: AccountStatus,
    pub profile: Profile,
    /// Outstanding reset token, if any. `None` after consumption.
    pub reset_token: Option<ResetTokenBundle>,
    pub reset_token_used: bool,
    pub reset_token_used_at: Option<DateTime<Utc>>,
    pub audit: AuditMetadata,
}

impl Account {
    /// Creates an invited account carrying a placeholder password hash.
    ///
    /// The placeholder satisfies the non-null credential constraint until
    /// activation sets a real password; it is random and never communicated.
    pub fn new_invited(
        email: impl Into<String>,
        placeholder_hash: impl Into<String>,
        role: RoleName,
        created_by: Option<Uuid>,
    ) -> Self {
        let email = email.into();
        Self {
            id: Uuid::new_v4(),
            username: email.clone(),
            email,
            password_hash: placeholder_hash.into(),
            roles: BTreeSet::from([role]),
            created_by,
            enabled: true,
            status: AccountStatus::Invited,
            profile: Profile::default(),
            reset_token: None,
            reset_token_used: false,
            reset_token_used_at: None,
            audit: AuditMetadata::now(),
        }
    }

    /// Creates an active account with a real password hash.
    pub fn new_active(
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: BTreeSet<RoleName>,
        created_by: Option<Uuid>,
    ) -> Self {
        let email = email.into();
        let username = username.into();
        let username = if username.trim().is_empty() { email.clone() } else { username };
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash: password_hash.into(),
            roles,
            created_by,
            enabled: true,
            status: AccountStatus::Active,
            profile: Profile::default(),
            reset_token: None,
            reset_token_used: false,
            reset_token_used_at: None,
            audit: AuditMetadata::now(),
        }
    }

    /// Returns a new snapshot with `role` added. The role set is never
    /// mutated in place.
    pub fn with_role(mut self, role: RoleName) -> Self {
        if self.roles.insert(role) {
            self.touch();
        }
        self
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    /// Display name preferred for notifications.
    pub fn display_name(&self) -> Option<&str> {
        self.profile.full_name.as_deref()
    }

    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
        self.touch();
    }

    pub fn set_email(&mut self, email: String) {
        self.email = email;
        self.touch();
    }

    /// Activates and unlocks the account. Token-based resets always land here.
    pub fn activate(&mut self) {
        self.status = AccountStatus::Active;
        self.enabled = true;
        self.touch();
    }

    pub fn disable(&mut self) {
        self.status = AccountStatus::Disabled;
        self.enabled = false;
        self.touch();
    }

    /// Marks the account as invited unless it is already active.
    pub fn mark_invited(&mut self) {
        if self.status != AccountStatus::Active {
            self.status = AccountStatus::Invited;
        }
        self.enabled = true;
        self.touch();
    }

    /// Installs a fresh reset-token bundle, invalidating any prior token.
    pub fn assign_reset_token(&mut self, bundle: ResetTokenBundle) {
        self.reset_token = Some(bundle);
        self.reset_token_used = false;
        self.reset_token_used_at = None;
        self.touch();
    }

    /// Consumes the outstanding token: marks it used and clears the bundle so
    /// nothing redeemable survives in the store.
    pub fn consume_reset_token(&mut self, at: DateTime<Utc>) {
        self.reset_token = None;
        self.reset_token_used = true;
        self.reset_token_used_at = Some(at);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.audit.updated_at = Utc::now();
    }
}
