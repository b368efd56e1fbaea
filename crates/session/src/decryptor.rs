// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::HashMap;
use std::sync::Arc;

use agora_events::{AgoraError, CiphertextHandle};
use agora_provider::ComputeProvider;
use alloy_primitives::Address;

use crate::DecryptionCapability;

/// Resolves a batch of handles scoped to one contract in a single provider
/// round trip.
pub struct BatchDecryptor {
    provider: Arc<dyn ComputeProvider>,
}

impl BatchDecryptor {
    pub fn new(provider: Arc<dyn ComputeProvider>) -> Self {
        Self { provider }
    }

    /// Decrypt `handles` under `capability`. Never-written placeholder
    /// handles resolve to zero locally; when nothing else remains no provider
    /// call is made at all. Retry policy on `ProviderUnavailable` belongs to
    /// the caller.
    pub async fn decrypt(
        &self,
        contract: Address,
        handles: &[CiphertextHandle],
        capability: &DecryptionCapability,
    ) -> Result<HashMap<CiphertextHandle, u64>, AgoraError> {
        let mut values: HashMap<CiphertextHandle, u64> = handles
            .iter()
            .filter(|handle| handle.is_zero())
            .map(|handle| (*handle, 0))
            .collect();

        let pending: Vec<(CiphertextHandle, Address)> = handles
            .iter()
            .filter(|handle| !handle.is_zero())
            .map(|handle| (*handle, contract))
            .collect();

        if pending.is_empty() {
            return Ok(values);
        }

        let capability = capability.to_capability(self.provider.as_ref()).await?;
        let decrypted = self.provider.batch_decrypt(&capability, &pending).await?;
        values.extend(decrypted);

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_events::OrderedSet;
    use agora_provider::{
        AuthorizationPayload, MockComputeProvider, MockWalletSigner, WalletSigner,
    };

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn contract() -> Address {
        Address::repeat_byte(0xc0)
    }

    async fn stored_capability(
        provider: &MockComputeProvider,
        account: Address,
    ) -> DecryptionCapability {
        let keypair = provider.generate_keypair().await.unwrap();
        let scope = OrderedSet::from(vec![contract()]);
        let payload = AuthorizationPayload::new(keypair.public_key.clone(), &scope, 0, 3_600);
        let signer = MockWalletSigner::approving();
        let signature = signer.sign(account, &payload).await.unwrap();

        DecryptionCapability {
            public_key: keypair.public_key,
            private_key: keypair.private_key,
            signature,
            issued_at: 0,
            duration_seconds: 3_600,
            contracts: scope,
        }
    }

    #[tokio::test]
    async fn zero_handles_short_circuit_without_a_round_trip() {
        let provider = Arc::new(MockComputeProvider::seeded(1));
        let capability = stored_capability(&provider, alice()).await;

        // an offline provider proves no round trip happens
        provider.set_offline(true);

        let decryptor = BatchDecryptor::new(provider);
        let values = decryptor
            .decrypt(contract(), &[CiphertextHandle::ZERO], &capability)
            .await
            .unwrap();

        assert_eq!(values[&CiphertextHandle::ZERO], 0);
    }

    #[tokio::test]
    async fn decrypts_authorized_handles() {
        let provider = Arc::new(MockComputeProvider::seeded(2));
        let capability = stored_capability(&provider, alice()).await;

        let handle = provider.trivial_encrypt(15).await.unwrap();
        provider.allow(handle, alice()).await.unwrap();

        let decryptor = BatchDecryptor::new(provider);
        let values = decryptor
            .decrypt(contract(), &[handle, CiphertextHandle::ZERO], &capability)
            .await
            .unwrap();

        assert_eq!(values[&handle], 15);
        assert_eq!(values[&CiphertextHandle::ZERO], 0);
    }

    #[tokio::test]
    async fn unauthorized_handles_fail_closed() {
        let provider = Arc::new(MockComputeProvider::seeded(3));
        let capability = stored_capability(&provider, alice()).await;

        let handle = provider.trivial_encrypt(4).await.unwrap();

        let decryptor = BatchDecryptor::new(provider);
        let err = decryptor
            .decrypt(contract(), &[handle], &capability)
            .await
            .unwrap_err();
        assert!(matches!(err, AgoraError::Unauthorized { .. }));
    }
}
