//! Invitation upsert and resend tests.

use crate::domain::commands::AccountCommand;
use crate::domain::entities::{AccountStatus, Profile, RoleName};
use crate::errors::{AuthError, DomainError};

use super::mocks::{harness, raced_harness};

#[tokio::test]
async fn invite_creates_an_invited_account_with_a_pending_token() {
    let h = harness();
    let (account, token) = h.invite("driver@fleet.test", RoleName::Driver).await;

    assert_eq!(account.status, AccountStatus::Invited);
    assert!(account.enabled);
    assert!(account.has_role(RoleName::Driver));
    assert!(account.reset_token.is_some());
    assert!(!account.reset_token_used);
    assert!(!token.is_empty());

    // Creation is announced exactly once.
    let events = h.publisher.created.lock().await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn invite_rejects_malformed_addresses() {
    let h = harness();
    for email in ["", "   ", "not-an-email"] {
        let err = h
            .service
            .execute(AccountCommand::InviteUser {
                email: email.to_string(),
                role: RoleName::Driver,
                profile: Profile::default(),
                created_by: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }), "{email:?}");
    }
}

#[tokio::test]
async fn repeated_invite_is_an_upsert_not_a_duplicate() {
    let h = harness();
    h.invite("multi@fleet.test", RoleName::Driver).await;
    let (account, _) = h.invite("multi@fleet.test", RoleName::Carrier).await;

    assert_eq!(h.repo.len().await, 1);
    assert!(account.has_role(RoleName::Driver));
    assert!(account.has_role(RoleName::Carrier));
    assert_eq!(account.status, AccountStatus::Invited);

    // Only the first invitation counts as a creation.
    let events = h.publisher.created.lock().await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn reinvite_invalidates_the_previous_token() {
    let h = harness();
    let (_, old_token) = h.invite("stale@fleet.test", RoleName::Driver).await;
    let (_, new_token) = h.invite("stale@fleet.test", RoleName::Driver).await;
    assert_ne!(old_token, new_token);

    let err = h
        .service
        .execute(AccountCommand::ResetPasswordWithToken {
            token: old_token,
            new_password: "chosen-pass1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    h.service
        .execute(AccountCommand::ResetPasswordWithToken {
            token: new_token,
            new_password: "chosen-pass1".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn losing_the_creation_race_folds_into_the_existing_account() {
    let h = raced_harness();

    // The store reports a unique-constraint conflict on the first create,
    // with the rival CARRIER row already in place.
    let account = h
        .service
        .execute(AccountCommand::InviteUser {
            email: "raced@fleet.test".to_string(),
            role: RoleName::Driver,
            profile: Profile::default(),
            created_by: None,
        })
        .await
        .unwrap()
        .into_account()
        .unwrap();

    assert_eq!(h.repo.len().await, 1);
    assert_eq!(account.status, AccountStatus::Invited);
    assert!(account.has_role(RoleName::Carrier));
    assert!(account.has_role(RoleName::Driver));

    // The re-issued token on the folded account still activates it.
    let mails = h.notifier.activations.lock().await;
    assert_eq!(mails.len(), 1);
    let token = mails[0].token.clone();
    drop(mails);

    h.service
        .execute(AccountCommand::ResetPasswordWithToken {
            token,
            new_password: "chosen-pass1".to_string(),
        })
        .await
        .unwrap();
    h.service
        .execute(AccountCommand::SignIn {
            email: "raced@fleet.test".to_string(),
            password: "chosen-pass1".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn invite_of_an_active_account_keeps_it_active() {
    let h = harness();
    let existing = h.create_active("vet@fleet.test", "hunter2pass", RoleName::Carrier).await;

    let (account, _) = h.invite("vet@fleet.test", RoleName::Driver).await;
    assert_eq!(account.id, existing.id);
    assert_eq!(account.status, AccountStatus::Active);
    assert!(account.has_role(RoleName::Carrier));
    assert!(account.has_role(RoleName::Driver));

    // The established password still works alongside the fresh token.
    assert!(h.sign_in("vet@fleet.test", "hunter2pass").await.is_ok());
}

#[tokio::test]
async fn reinvite_replaces_the_profile_wholesale() {
    let h = harness();
    h.service
        .execute(AccountCommand::InviteUser {
            email: "prof@fleet.test".to_string(),
            role: RoleName::Carrier,
            profile: Profile {
                full_name: Some("Ana Lima".to_string()),
                city: Some("Porto".to_string()),
                ..Default::default()
            },
            created_by: None,
        })
        .await
        .unwrap();

    let account = h
        .service
        .execute(AccountCommand::InviteUser {
            email: "prof@fleet.test".to_string(),
            role: RoleName::Carrier,
            profile: Profile { company: Some("Lima Cargo".to_string()), ..Default::default() },
            created_by: None,
        })
        .await
        .unwrap()
        .into_account()
        .unwrap();

    // The latest submission is authoritative; omitted fields are cleared.
    assert_eq!(account.profile.company.as_deref(), Some("Lima Cargo"));
    assert_eq!(account.profile.full_name, None);
    assert_eq!(account.profile.city, None);
}

#[tokio::test]
async fn resend_issues_a_fresh_token() {
    let h = harness();
    let (account, first_token) = h.invite("again@fleet.test", RoleName::Driver).await;

    h.service
        .execute(AccountCommand::ResendInvite { account_id: account.id })
        .await
        .unwrap();

    let mails = h.notifier.activations.lock().await;
    assert_eq!(mails.len(), 2);
    assert_ne!(mails[1].token, first_token);
    assert_eq!(mails[1].to, "again@fleet.test");
}

#[tokio::test]
async fn resend_refuses_disabled_accounts() {
    let h = harness();
    let (account, _) = h.invite("off@fleet.test", RoleName::Driver).await;
    h.service
        .execute(AccountCommand::UpdateUserStatus { account_id: account.id, enabled: false })
        .await
        .unwrap();

    let err = h
        .service
        .execute(AccountCommand::ResendInvite { account_id: account.id })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::AccountDisabled)));
}

#[tokio::test]
async fn invited_user_activates_and_signs_in_end_to_end() {
    let h = harness();
    let (_, token) = h.invite("journey@fleet.test", RoleName::Carrier).await;

    // Activation requires the token before any sign-in works.
    assert!(h.sign_in("journey@fleet.test", "chosen-pass1").await.is_err());

    let account = h
        .service
        .execute(AccountCommand::ResetPasswordWithToken {
            token,
            new_password: "chosen-pass1".to_string(),
        })
        .await
        .unwrap()
        .into_account()
        .unwrap();
    assert_eq!(account.status, AccountStatus::Active);
    assert!(account.reset_token.is_none());
    assert!(account.reset_token_used);

    assert!(h.sign_in("journey@fleet.test", "chosen-pass1").await.is_ok());
}
