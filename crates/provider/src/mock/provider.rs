// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use agora_events::{AgoraError, CiphertextHandle, OrderedSet};
use alloy_primitives::Address;
use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{
    AuthorizationPayload, Capability, ComputeProvider, EncryptedScore, InputProof, Keypair,
    Signature,
};

use super::MockSignature;

pub type SharedRng = Arc<Mutex<ChaCha20Rng>>;

/// Range the mock's input proofs attest to.
const SCORE_BOUND: u64 = 10;

struct ProofBinding {
    handle: CiphertextHandle,
    contract: Address,
    account: Address,
    range_ok: bool,
    consumed: bool,
}

#[derive(Default)]
struct MockState {
    values: HashMap<CiphertextHandle, u64>,
    proofs: HashMap<InputProof, ProofBinding>,
    acl: HashSet<(CiphertextHandle, Address)>,
}

/// In-process stand-in for the confidential-compute provider. Keeps a clear
/// value table behind opaque handles, tracks proof consumption (replay of a
/// used proof is rejected, the guarantee the submission path leans on) and a
/// provider-side permission table, and can be switched offline to exercise
/// transport-failure paths.
pub struct MockComputeProvider {
    state: Mutex<MockState>,
    rng: SharedRng,
    offline: AtomicBool,
}

impl MockComputeProvider {
    pub fn new(rng: SharedRng) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            rng,
            offline: AtomicBool::new(false),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))))
    }

    /// Simulate a transport outage: every subsequent call fails with
    /// `ProviderUnavailable` until switched back on.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), AgoraError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AgoraError::provider_unavailable("mock provider offline"));
        }
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, MockState>, AgoraError> {
        self.state
            .lock()
            .map_err(|_| AgoraError::provider_unavailable("mock provider state poisoned"))
    }

    fn random_bytes<const N: usize>(&self) -> Result<[u8; N], AgoraError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AgoraError::provider_unavailable("mock provider rng poisoned"))?;
        Ok(rng.gen())
    }

    fn fresh_handle(&self) -> Result<CiphertextHandle, AgoraError> {
        Ok(CiphertextHandle::from_bytes(self.random_bytes::<32>()?))
    }
}

#[async_trait]
impl ComputeProvider for MockComputeProvider {
    async fn encrypt_input(
        &self,
        contract: Address,
        account: Address,
        value: u64,
    ) -> Result<EncryptedScore, AgoraError> {
        self.ensure_online()?;
        let handle = self.fresh_handle()?;
        let proof = InputProof(self.random_bytes::<64>()?.to_vec());

        let mut state = self.state()?;
        state.values.insert(handle, value);
        state.proofs.insert(
            proof.clone(),
            ProofBinding {
                handle,
                contract,
                account,
                range_ok: value <= SCORE_BOUND,
                consumed: false,
            },
        );

        Ok(EncryptedScore { handle, proof })
    }

    async fn verify_and_bind_proof(
        &self,
        handle: CiphertextHandle,
        proof: &InputProof,
        submitter: Address,
        contract: Address,
    ) -> Result<(), AgoraError> {
        self.ensure_online()?;
        let mut state = self.state()?;

        let rejected = AgoraError::InvalidProof {
            submitter,
            contract,
        };

        let Some(binding) = state.proofs.get_mut(proof) else {
            return Err(rejected);
        };

        if binding.consumed
            || !binding.range_ok
            || binding.handle != handle
            || binding.account != submitter
            || binding.contract != contract
        {
            return Err(rejected);
        }

        binding.consumed = true;
        Ok(())
    }

    async fn trivial_encrypt(&self, value: u64) -> Result<CiphertextHandle, AgoraError> {
        self.ensure_online()?;
        let handle = self.fresh_handle()?;
        self.state()?.values.insert(handle, value);
        Ok(handle)
    }

    async fn homomorphic_add(
        &self,
        a: CiphertextHandle,
        b: CiphertextHandle,
    ) -> Result<CiphertextHandle, AgoraError> {
        self.ensure_online()?;
        let mut state = self.state()?;

        let lookup = |state: &MockState, h: CiphertextHandle| {
            state
                .values
                .get(&h)
                .copied()
                .ok_or_else(|| AgoraError::provider_unavailable(format!("unknown handle {h}")))
        };
        let sum = lookup(&state, a)?.saturating_add(lookup(&state, b)?);

        let handle = self.fresh_handle()?;
        state.values.insert(handle, sum);
        Ok(handle)
    }

    async fn allow(&self, handle: CiphertextHandle, account: Address) -> Result<(), AgoraError> {
        self.ensure_online()?;
        self.state()?.acl.insert((handle, account));
        Ok(())
    }

    async fn generate_keypair(&self) -> Result<Keypair, AgoraError> {
        self.ensure_online()?;
        Ok(Keypair {
            public_key: format!("apk_{}", hex::encode(self.random_bytes::<32>()?)),
            private_key: format!("ask_{}", hex::encode(self.random_bytes::<32>()?)),
        })
    }

    async fn issue_capability(
        &self,
        keypair: &Keypair,
        contracts: &OrderedSet<Address>,
        issued_at: i64,
        duration_seconds: u64,
        signature: &Signature,
    ) -> Result<Capability, AgoraError> {
        self.ensure_online()?;

        let decoded: MockSignature = bincode::deserialize(&signature.0).map_err(|_| {
            AgoraError::Unauthorized {
                account: Address::ZERO,
                contract: Address::ZERO,
            }
        })?;

        let payload = AuthorizationPayload::new(
            keypair.public_key.clone(),
            contracts,
            issued_at,
            duration_seconds,
        );
        if decoded.digest != payload.digest()? {
            return Err(AgoraError::Unauthorized {
                account: decoded.account,
                contract: Address::ZERO,
            });
        }

        Ok(Capability {
            account: decoded.account,
            public_key: keypair.public_key.clone(),
            private_key: keypair.private_key.clone(),
            contracts: OrderedSet::from_iter(contracts.iter().copied()),
            issued_at,
            duration_seconds,
        })
    }

    async fn batch_decrypt(
        &self,
        capability: &Capability,
        requests: &[(CiphertextHandle, Address)],
    ) -> Result<HashMap<CiphertextHandle, u64>, AgoraError> {
        self.ensure_online()?;
        let state = self.state()?;

        let mut out = HashMap::new();
        for (handle, contract) in requests {
            if !capability.covers(*contract) {
                return Err(AgoraError::Unauthorized {
                    account: capability.account(),
                    contract: *contract,
                });
            }
            if !state.acl.contains(&(*handle, capability.account())) {
                return Err(AgoraError::Unauthorized {
                    account: capability.account(),
                    contract: *contract,
                });
            }
            let value = state.values.get(handle).copied().ok_or_else(|| {
                AgoraError::provider_unavailable(format!("unknown handle {handle}"))
            })?;
            out.insert(*handle, value);
        }
        Ok(out)
    }
}
