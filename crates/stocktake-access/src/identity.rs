// SPDX-FileCopyrightText: 2026 Stocktake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution: map an externally-authenticated identity to the
//! internal user record, creating it on first sight.

use std::sync::Arc;

use stocktake_core::traits::InventoryStore;
use stocktake_core::types::{new_id, now_iso};
use stocktake_core::{Identity, StocktakeError, User};
use tracing::{debug, info};

/// Resolve an identity to its user record, creating one lazily.
///
/// Idempotent on email: the same identity always resolves to the same user.
/// A concurrent first-contact race loses the insert with Conflict and wins
/// the re-fetch; an identity is never rejected, only storage faults
/// propagate.
pub async fn resolve(
    store: &Arc<dyn InventoryStore>,
    identity: &Identity,
) -> Result<User, StocktakeError> {
    if let Some(user) = store.get_user_by_email(&identity.email).await? {
        debug!(email = %identity.email, "identity resolved to existing user");
        return Ok(user);
    }

    let user = User {
        id: new_id(),
        email: identity.email.clone(),
        display_name: display_name_for(identity),
        created_at: now_iso(),
    };
    match store.insert_user(&user).await {
        Ok(()) => {
            info!(email = %user.email, user_id = %user.id, "user created on first contact");
            Ok(user)
        }
        Err(StocktakeError::Conflict(_)) => {
            // Lost the first-contact race; the row now exists.
            store
                .get_user_by_email(&identity.email)
                .await?
                .ok_or_else(|| {
                    StocktakeError::Internal(format!(
                        "user {} vanished after conflicting insert",
                        identity.email
                    ))
                })
        }
        Err(e) => Err(e),
    }
}

/// Display name from the identity, or the email local part when absent.
fn display_name_for(identity: &Identity) -> String {
    match identity.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => identity
            .email
            .split('@')
            .next()
            .unwrap_or(&identity.email)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_test_utils::{fixtures, MemoryStore};

    fn store() -> Arc<dyn InventoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn first_contact_creates_user() {
        let store = store();
        let user = resolve(&store, &fixtures::identity("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.display_name, "alice");
        assert!(store.get_user(&user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn resolution_is_idempotent_on_email() {
        let store = store();
        let first = resolve(&store, &fixtures::identity("alice@example.com"))
            .await
            .unwrap();
        let second = resolve(
            &store,
            &Identity {
                email: "alice@example.com".to_string(),
                display_name: Some("Alice Renamed".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(first.id, second.id);
        // The original record wins; identity display names are not synced.
        assert_eq!(second.display_name, "alice");
    }

    #[tokio::test]
    async fn blank_display_name_falls_back_to_local_part() {
        let store = store();
        let user = resolve(
            &store,
            &Identity {
                email: "bob@example.com".to_string(),
                display_name: Some("   ".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(user.display_name, "bob");
    }
}
