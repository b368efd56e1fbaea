// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::Arc;

use actix::Addr;
use agora_board::{
    Aggregate, AllowDecryptAll, AllowDecryptAverage, FeedbackBoard, GetAggregate, SubmitScore,
};
use agora_data::DataStore;
use agora_events::{AgoraError, EventId};
use agora_provider::{ComputeProvider, EncryptedScore, WalletSigner};
use agora_registry::{CategoryRegistry, SCORE_MAX};
use agora_session::{BatchDecryptor, DecryptionSession};
use alloy_primitives::Address;

/// Clear aggregate for one category after an authorized decryption.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecryptedAggregate {
    pub sum: u64,
    pub count: u64,
    pub average: f64,
}

/// `average` guards against an empty aggregate instead of dividing by zero.
pub fn derive_average(sum: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

pub struct AgoraClientParams {
    pub board: Addr<FeedbackBoard>,
    pub provider: Arc<dyn ComputeProvider>,
    pub signer: Arc<dyn WalletSigner>,
    pub store: DataStore,
    pub contract: Address,
    pub account: Address,
    pub registry: CategoryRegistry,
    pub capability_duration_seconds: u64,
}

/// One account's session with the protocol: the provider handle, board
/// address, decryption session and batch decryptor, created once at startup
/// and passed to whatever needs them. There is no module-level state.
pub struct AgoraClient {
    board: Addr<FeedbackBoard>,
    provider: Arc<dyn ComputeProvider>,
    session: DecryptionSession,
    decryptor: BatchDecryptor,
    contract: Address,
    account: Address,
    registry: CategoryRegistry,
}

impl AgoraClient {
    pub fn new(params: AgoraClientParams) -> Self {
        let session = DecryptionSession::new(
            params.provider.clone(),
            params.signer,
            params.store,
            params.capability_duration_seconds,
        );
        let decryptor = BatchDecryptor::new(params.provider.clone());

        Self {
            board: params.board,
            provider: params.provider,
            session,
            decryptor,
            contract: params.contract,
            account: params.account,
            registry: params.registry,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Session manager for this account's capabilities. Exposed so callers
    /// can pre-warm or force-renew outside a decrypt call.
    pub fn session(&self) -> &DecryptionSession {
        &self.session
    }

    /// Encrypt a rating client-side for this account and contract.
    pub async fn encrypt_score(&self, value: u64) -> Result<EncryptedScore, AgoraError> {
        if value > SCORE_MAX {
            return Err(AgoraError::ScoreOutOfRange { value });
        }
        self.provider
            .encrypt_input(self.contract, self.account, value)
            .await
    }

    /// Submit an encrypted rating to the board. Returns the event id of the
    /// accepted submission as the transaction receipt.
    pub async fn submit_score(
        &self,
        category_id: u8,
        score: EncryptedScore,
    ) -> Result<EventId, AgoraError> {
        self.board
            .send(SubmitScore {
                category_id,
                score,
                submitter: self.account,
            })
            .await
            .map_err(mailbox_error)?
    }

    /// Latest encrypted (sum, count) pair for a category.
    pub async fn get_aggregate(&self, category_id: u8) -> Result<Aggregate, AgoraError> {
        self.board
            .send(GetAggregate { category_id })
            .await
            .map_err(mailbox_error)?
    }

    /// Grant this account standing permission to decrypt one category.
    pub async fn allow_decrypt_average(&self, category_id: u8) -> Result<EventId, AgoraError> {
        self.allow_decrypt_average_for(category_id, self.account)
            .await
    }

    /// Grant an arbitrary grantee standing permission to decrypt one
    /// category.
    pub async fn allow_decrypt_average_for(
        &self,
        category_id: u8,
        grantee: Address,
    ) -> Result<EventId, AgoraError> {
        self.board
            .send(AllowDecryptAverage {
                category_id,
                requester: self.account,
                grantee,
            })
            .await
            .map_err(mailbox_error)?
    }

    /// Grant a grantee standing permission to decrypt every category.
    pub async fn allow_decrypt_all(&self, grantee: Address) -> Result<EventId, AgoraError> {
        self.board
            .send(AllowDecryptAll {
                requester: self.account,
                grantee,
            })
            .await
            .map_err(mailbox_error)?
    }

    /// Fetch, decrypt and derive one category's aggregate, reusing the cached
    /// capability when it is still valid.
    pub async fn decrypt_aggregate(
        &self,
        category_id: u8,
    ) -> Result<DecryptedAggregate, AgoraError> {
        self.decrypt_aggregate_with(category_id, false).await
    }

    pub async fn decrypt_aggregate_with(
        &self,
        category_id: u8,
        force_renew: bool,
    ) -> Result<DecryptedAggregate, AgoraError> {
        let aggregate = self.get_aggregate(category_id).await?;

        let capability = self
            .session
            .capability_for(self.account, &[self.contract], force_renew)
            .await?;

        let values = self
            .decryptor
            .decrypt(
                self.contract,
                &[aggregate.sum, aggregate.count],
                &capability,
            )
            .await?;

        let sum = values.get(&aggregate.sum).copied().unwrap_or(0);
        let count = values.get(&aggregate.count).copied().unwrap_or(0);

        Ok(DecryptedAggregate {
            sum,
            count,
            average: derive_average(sum, count),
        })
    }
}

fn mailbox_error(err: actix::MailboxError) -> AgoraError {
    AgoraError::data(format!("board mailbox unavailable: {err}"))
}
