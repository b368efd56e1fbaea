// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use agora_data::{DataStore, RepositoriesFactory};
use agora_events::{AgoraError, OrderedSet};
use agora_provider::{AuthorizationPayload, ComputeProvider, WalletSigner};
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{CapabilityRepositoryFactory, DecryptionCapability};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Turns a one-time wallet signature into a reusable, time-boxed decryption
/// capability, cached per account.
///
/// A cached capability is reused as long as the requested contract scope is
/// set-equal to the signed one and the window has not lapsed; otherwise a
/// fresh key pair is generated, a new authorization is signed and the cache
/// entry is overwritten wholesale. Nothing is cached on any failure path, and
/// the single cache write happens after the last suspension point, so a
/// caller dropping an in-flight issuance leaves the cache exactly as it was.
///
/// Concurrent requests that both find the cache empty may race to issue; the
/// last writer wins and each result is independently valid.
pub struct DecryptionSession {
    provider: Arc<dyn ComputeProvider>,
    signer: Arc<dyn WalletSigner>,
    store: DataStore,
    duration_seconds: u64,
    clock: Clock,
}

impl DecryptionSession {
    pub fn new(
        provider: Arc<dyn ComputeProvider>,
        signer: Arc<dyn WalletSigner>,
        store: DataStore,
        duration_seconds: u64,
    ) -> Self {
        Self {
            provider,
            signer,
            store,
            duration_seconds,
            clock: Arc::new(Utc::now),
        }
    }

    /// Swap in a deterministic clock. Expiry behavior is otherwise untestable
    /// without waiting out the window.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Return a capability for `account` covering exactly `contracts`,
    /// issuing one when the cache misses, mismatches or has expired.
    pub async fn capability_for(
        &self,
        account: Address,
        contracts: &[Address],
        force_renew: bool,
    ) -> Result<DecryptionCapability, AgoraError> {
        let scope = OrderedSet::from_iter(contracts.iter().copied());
        let repo = self.store.repositories().capability(&account);
        let now = (self.clock)();

        if !force_renew {
            let stored: Option<DecryptionCapability> = repo
                .read()
                .await
                .map_err(|err| AgoraError::data(err.to_string()))?;
            if let Some(stored) = stored {
                if stored.is_valid_for(&scope, now) {
                    debug!(%account, "Reusing cached decryption capability");
                    return Ok(stored);
                }
            }
        }

        let keypair = self.provider.generate_keypair().await?;
        let issued_at = now.timestamp();
        let payload = AuthorizationPayload::new(
            keypair.public_key.clone(),
            &scope,
            issued_at,
            self.duration_seconds,
        );
        let signature = self.signer.sign(account, &payload).await?;

        // Have the provider accept the signed authorization before anything
        // is cached; a rejection here must leave no trace.
        self.provider
            .issue_capability(
                &keypair,
                &scope,
                issued_at,
                self.duration_seconds,
                &signature,
            )
            .await?;

        let capability = DecryptionCapability {
            public_key: keypair.public_key.clone(),
            private_key: keypair.private_key.clone(),
            signature,
            issued_at,
            duration_seconds: self.duration_seconds,
            contracts: scope,
        };

        // No suspension point between here and returning: once the entry is
        // handed to the store the issuance is complete, and a cancellation
        // earlier in this function has not touched the cache.
        repo.write(&capability);
        info!(%account, expires_at = capability.expires_at(), "Issued decryption capability");

        Ok(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use agora_data::InMemStore;
    use agora_provider::{MockComputeProvider, MockWalletSigner, Signature};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::time::Duration;

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn contract() -> Address {
        Address::repeat_byte(0xc0)
    }

    struct Fixture {
        session: DecryptionSession,
        signer: Arc<MockWalletSigner>,
        store: DataStore,
        now: Arc<Mutex<i64>>,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(MockComputeProvider::seeded(99));
        let signer = Arc::new(MockWalletSigner::approving());
        let store = DataStore::from(&InMemStore::new(false).start());
        let now = Arc::new(Mutex::new(1_700_000_000i64));

        let clock_now = now.clone();
        let session = DecryptionSession::new(provider, signer.clone(), store.clone(), 3_600)
            .with_clock(Arc::new(move || {
                Utc.timestamp_opt(*clock_now.lock().unwrap(), 0).unwrap()
            }));

        Fixture {
            session,
            signer,
            store,
            now,
        }
    }

    #[actix::test]
    async fn same_scope_reuses_the_cached_capability() {
        let fx = fixture();
        let first = fx
            .session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap();
        let second = fx
            .session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(fx.signer.request_count(), 1);
    }

    #[actix::test]
    async fn different_scope_forces_a_renewal() {
        let fx = fixture();
        fx.session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap();

        let other = Address::repeat_byte(0xd0);
        let renewed = fx
            .session
            .capability_for(alice(), &[contract(), other], false)
            .await
            .unwrap();

        assert_eq!(fx.signer.request_count(), 2);
        assert!(renewed.contracts.contains(&other));
    }

    #[actix::test]
    async fn expiry_forces_a_renewal() {
        let fx = fixture();
        fx.session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap();

        *fx.now.lock().unwrap() += 3_600;
        fx.session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap();

        assert_eq!(fx.signer.request_count(), 2);
    }

    #[actix::test]
    async fn force_renew_ignores_a_valid_cache_entry() {
        let fx = fixture();
        fx.session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap();
        fx.session
            .capability_for(alice(), &[contract()], true)
            .await
            .unwrap();

        assert_eq!(fx.signer.request_count(), 2);
    }

    #[actix::test]
    async fn rejection_caches_nothing() {
        let fx = fixture();
        fx.signer.set_mode(agora_provider::SignerMode::Reject);

        let err = fx
            .session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap_err();
        assert_eq!(err, AgoraError::UserRejected);

        let repo = fx.store.repositories().capability(&alice());
        assert!(repo.read().await.unwrap().is_none());
    }

    #[actix::test]
    async fn capabilities_are_cached_per_account() {
        let fx = fixture();
        fx.session
            .capability_for(alice(), &[contract()], false)
            .await
            .unwrap();

        let bob = Address::repeat_byte(0xb0);
        fx.session
            .capability_for(bob, &[contract()], false)
            .await
            .unwrap();

        assert_eq!(fx.signer.request_count(), 2);
        let repo = fx.store.repositories().capability(&alice());
        assert!(repo.read().await.unwrap().is_some());
    }

    #[actix::test]
    async fn racing_issuances_both_succeed_and_one_wins_the_cache() {
        let fx = fixture();

        let (first, second) = tokio::join!(
            fx.session.capability_for(alice(), &[contract()], false),
            fx.session.capability_for(alice(), &[contract()], false),
        );
        let first = first.unwrap();
        let second = second.unwrap();

        // both observed the empty cache and signed independently
        assert_eq!(fx.signer.request_count(), 2);

        // last write wins; either result is independently valid
        let cached = fx
            .store
            .repositories()
            .capability(&alice())
            .read()
            .await
            .unwrap()
            .unwrap();
        assert!(cached == first || cached == second);
    }

    /// Signer whose future never resolves, standing in for a wallet prompt
    /// the user walked away from.
    struct StallingSigner;

    #[async_trait]
    impl WalletSigner for StallingSigner {
        async fn sign(
            &self,
            _account: Address,
            _payload: &AuthorizationPayload,
        ) -> Result<Signature, AgoraError> {
            std::future::pending().await
        }
    }

    #[actix::test]
    async fn cancelled_issuance_leaves_no_cache_entry() {
        let provider = Arc::new(MockComputeProvider::seeded(7));
        let store = DataStore::from(&InMemStore::new(false).start());
        let session = DecryptionSession::new(
            provider,
            Arc::new(StallingSigner),
            store.clone(),
            3_600,
        );

        let issuance = session.capability_for(alice(), &[contract()], false);
        // dropping the timed-out future aborts the issuance mid-signature
        let result = tokio::time::timeout(Duration::from_millis(20), issuance).await;
        assert!(result.is_err());

        let repo = store.repositories().capability(&alice());
        assert!(repo.read().await.unwrap().is_none());
    }
}
