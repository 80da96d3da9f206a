//! Startup seeding of the configured admin account.

use crate::config::SuperadminSettings;

use iam_core::repositories::AccountRepository;
use iam_core::services::account::AccountService;
use iam_core::services::hashing::PasswordHasher;
use iam_core::services::outbound::{EventPublisher, NotificationDispatcher};

/// Creates or refreshes the seeded admin account.
///
/// Seeding failures are logged but never abort startup; the service is
/// still useful for already-provisioned accounts.
pub async fn seed_admin<R, H, N, E>(
    service: &AccountService<R, H, N, E>,
    settings: Option<&SuperadminSettings>,
) where
    R: AccountRepository,
    H: PasswordHasher,
    N: NotificationDispatcher,
    E: EventPublisher,
{
    let Some(settings) = settings else {
        log::warn!("SUPERADMIN_EMAIL/SUPERADMIN_PASSWORD not set, skipping admin seeding");
        return;
    };

    match service
        .ensure_admin(settings.username.as_deref(), &settings.email, &settings.password)
        .await
    {
        Ok(account) => log::info!("admin account {} is ready", account.email),
        Err(e) => log::error!("admin seeding failed: {e}"),
    }
}
