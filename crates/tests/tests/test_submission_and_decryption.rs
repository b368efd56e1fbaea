// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::{Actor, Addr};
use agora_board::{BoardRepositoryFactory, FeedbackBoard, FeedbackBoardParams};
use agora_data::{DataStore, InMemStore, RepositoriesFactory};
use agora_events::{AgoraError, AgoraEvent, Event, EventBus, GetErrors, GetHistory};
use agora_logger::SimpleLogger;
use agora_provider::{MockComputeProvider, MockWalletSigner};
use agora_registry::CategoryRegistry;
use agora_sdk::{AgoraClient, AgoraClientParams};
use alloy_primitives::Address;
use anyhow::Result;
use std::sync::Arc;

const THIRTY_DAYS: u64 = 30 * 24 * 60 * 60;

fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

struct TestNode {
    bus: Addr<EventBus<AgoraEvent>>,
    board: Addr<FeedbackBoard>,
    provider: Arc<MockComputeProvider>,
    signer: Arc<MockWalletSigner>,
    store: DataStore,
    contract: Address,
}

async fn setup_node(seed: u64) -> Result<TestNode> {
    let bus = EventBus::<AgoraEvent>::default().start();
    let provider = Arc::new(MockComputeProvider::seeded(seed));
    let signer = Arc::new(MockWalletSigner::approving());
    let store = DataStore::from(&InMemStore::new(false).start());
    let contract = Address::repeat_byte(0xc0);

    let board = FeedbackBoard::attach(
        FeedbackBoardParams {
            bus: bus.clone(),
            provider: provider.clone(),
            contract,
            registry: CategoryRegistry::civic(),
        },
        store.repositories().board(),
    )
    .await?;

    SimpleLogger::<AgoraEvent>::attach("node", bus.clone());

    Ok(TestNode {
        bus,
        board,
        provider,
        signer,
        store,
        contract,
    })
}

fn client_for(node: &TestNode, account: Address) -> AgoraClient {
    AgoraClient::new(AgoraClientParams {
        board: node.board.clone(),
        provider: node.provider.clone(),
        signer: node.signer.clone(),
        store: node.store.clone(),
        contract: node.contract,
        account,
        registry: CategoryRegistry::civic(),
        capability_duration_seconds: THIRTY_DAYS,
    })
}

#[actix::test]
async fn initializes_aggregates_to_encrypted_zero() -> Result<()> {
    let node = setup_node(1).await?;
    let client = client_for(&node, alice());

    client.allow_decrypt_average(0).await?;
    let decrypted = client.decrypt_aggregate(0).await?;

    assert_eq!(decrypted.sum, 0);
    assert_eq!(decrypted.count, 0);
    assert_eq!(decrypted.average, 0.0);
    Ok(())
}

#[actix::test]
async fn rejects_out_of_range_categories() -> Result<()> {
    let node = setup_node(2).await?;
    let client = client_for(&node, alice());

    let expected = AgoraError::InvalidCategory {
        category: 9,
        count: 5,
    };

    let err = client.get_aggregate(9).await.unwrap_err();
    assert_eq!(err, expected);

    let score = client.encrypt_score(5).await?;
    let err = client.submit_score(9, score).await.unwrap_err();
    assert_eq!(err, expected);

    // the client-side range pre-check fires before anything is encrypted
    let err = client.encrypt_score(11).await.unwrap_err();
    assert_eq!(err, AgoraError::ScoreOutOfRange { value: 11 });
    Ok(())
}

#[actix::test]
async fn accepts_a_submission_and_updates_the_aggregate() -> Result<()> {
    let node = setup_node(3).await?;
    let client = client_for(&node, alice());

    let score = client.encrypt_score(7).await?;
    client.submit_score(0, score).await?;

    client.allow_decrypt_average(0).await?;
    let decrypted = client.decrypt_aggregate(0).await?;

    assert_eq!(decrypted.sum, 7);
    assert_eq!(decrypted.count, 1);
    assert_eq!(decrypted.average, 7.0);

    let history = node.bus.send(GetHistory::new()).await?;
    let types: Vec<String> = history.iter().map(|evt| evt.event_type()).collect();
    assert!(types.contains(&"ScoreSubmitted".to_string()));
    assert!(types.contains(&"AggregateUpdated".to_string()));
    Ok(())
}

#[actix::test]
async fn aggregates_submissions_across_contributors() -> Result<()> {
    let node = setup_node(4).await?;
    let alice_client = client_for(&node, alice());
    let bob_client = client_for(&node, bob());

    // category 2: alice first
    let score = alice_client.encrypt_score(8).await?;
    alice_client.submit_score(2, score).await?;
    let score = bob_client.encrypt_score(6).await?;
    bob_client.submit_score(2, score).await?;

    // category 3: same ratings, opposite order
    let score = bob_client.encrypt_score(6).await?;
    bob_client.submit_score(3, score).await?;
    let score = alice_client.encrypt_score(8).await?;
    alice_client.submit_score(3, score).await?;

    alice_client.allow_decrypt_average(2).await?;
    alice_client.allow_decrypt_average(3).await?;

    let first = alice_client.decrypt_aggregate(2).await?;
    assert_eq!(first.sum, 14);
    assert_eq!(first.count, 2);
    assert_eq!(first.average, 7.0);

    // the fold commutes
    let second = alice_client.decrypt_aggregate(3).await?;
    assert_eq!(second.sum, first.sum);
    assert_eq!(second.count, first.count);
    Ok(())
}

#[actix::test]
async fn blanket_grants_cover_every_category_and_repeat_cleanly() -> Result<()> {
    let node = setup_node(5).await?;
    let deployer = client_for(&node, bob());
    let reader = client_for(&node, alice());

    // repeated blanket grant is not an error and changes nothing
    deployer.allow_decrypt_all(alice()).await?;
    deployer.allow_decrypt_all(alice()).await?;

    for category_id in 0..reader.registry().count() {
        let decrypted = reader.decrypt_aggregate(category_id).await?;
        assert_eq!(decrypted.sum, 0);
        assert_eq!(decrypted.count, 0);
    }
    Ok(())
}

#[actix::test]
async fn grants_apply_to_later_submissions() -> Result<()> {
    let node = setup_node(6).await?;
    let client = client_for(&node, alice());

    // grant first, submit afterwards: the standing grant must carry over to
    // the replaced pair
    client.allow_decrypt_average(1).await?;

    let score = client.encrypt_score(9).await?;
    client.submit_score(1, score).await?;

    let decrypted = client.decrypt_aggregate(1).await?;
    assert_eq!(decrypted.sum, 9);
    assert_eq!(decrypted.count, 1);
    Ok(())
}

#[actix::test]
async fn unauthorized_decrypt_fails_closed() -> Result<()> {
    let node = setup_node(7).await?;
    let client = client_for(&node, bob());

    // the handles themselves are readable
    client.get_aggregate(1).await?;

    let err = client.decrypt_aggregate(1).await.unwrap_err();
    assert!(matches!(err, AgoraError::Unauthorized { .. }));
    Ok(())
}

#[actix::test]
async fn cached_capability_is_reused_across_decrypts() -> Result<()> {
    let node = setup_node(8).await?;
    let client = client_for(&node, alice());
    client.allow_decrypt_average(0).await?;

    client.decrypt_aggregate(0).await?;
    client.decrypt_aggregate(0).await?;
    assert_eq!(node.signer.request_count(), 1);

    client.decrypt_aggregate_with(0, true).await?;
    assert_eq!(node.signer.request_count(), 2);
    Ok(())
}

#[actix::test]
async fn replayed_proofs_are_rejected_without_touching_state() -> Result<()> {
    let node = setup_node(9).await?;
    let client = client_for(&node, alice());

    let score = client.encrypt_score(7).await?;
    client.submit_score(0, score.clone()).await?;

    let err = client.submit_score(0, score).await.unwrap_err();
    assert!(matches!(err, AgoraError::InvalidProof { .. }));

    client.allow_decrypt_average(0).await?;
    let decrypted = client.decrypt_aggregate(0).await?;
    assert_eq!(decrypted.sum, 7);
    assert_eq!(decrypted.count, 1);

    // the failure also surfaced on the bus
    let errors = node.bus.send(GetErrors::new()).await?;
    assert!(errors
        .iter()
        .any(|err| matches!(err, AgoraError::InvalidProof { .. })));
    Ok(())
}

#[actix::test]
async fn provider_outage_is_transient_and_leaves_state_untouched() -> Result<()> {
    let node = setup_node(10).await?;
    let client = client_for(&node, alice());

    let score = client.encrypt_score(5).await?;
    node.provider.set_offline(true);
    let err = client.submit_score(4, score).await.unwrap_err();
    assert!(err.is_transient());

    node.provider.set_offline(false);
    client.allow_decrypt_average(4).await?;
    let decrypted = client.decrypt_aggregate(4).await?;
    assert_eq!(decrypted.sum, 0);
    assert_eq!(decrypted.count, 0);
    Ok(())
}

#[actix::test]
async fn concurrent_submissions_to_one_category_are_both_reflected() -> Result<()> {
    let node = setup_node(13).await?;
    let alice_client = client_for(&node, alice());
    let bob_client = client_for(&node, bob());

    let alice_score = alice_client.encrypt_score(8).await?;
    let bob_score = bob_client.encrypt_score(6).await?;

    // both submissions race against the same category; neither update may be
    // lost to the other's read-modify-write
    let (first, second) = tokio::join!(
        alice_client.submit_score(2, alice_score),
        bob_client.submit_score(2, bob_score),
    );
    first?;
    second?;

    alice_client.allow_decrypt_average(2).await?;
    let decrypted = alice_client.decrypt_aggregate(2).await?;
    assert_eq!(decrypted.sum, 14);
    assert_eq!(decrypted.count, 2);
    Ok(())
}

#[actix::test]
async fn board_state_survives_a_restart() -> Result<()> {
    let node = setup_node(11).await?;
    let client = client_for(&node, alice());

    let score = client.encrypt_score(3).await?;
    client.submit_score(0, score).await?;
    let before = client.get_aggregate(0).await?;

    // a second board over the same repository hydrates the persisted pairs
    // instead of re-initializing
    let restarted = FeedbackBoard::attach(
        FeedbackBoardParams {
            bus: node.bus.clone(),
            provider: node.provider.clone(),
            contract: node.contract,
            registry: CategoryRegistry::civic(),
        },
        node.store.repositories().board(),
    )
    .await?;

    let after = restarted
        .send(agora_board::GetAggregate { category_id: 0 })
        .await??;
    assert_eq!(after, before);
    Ok(())
}

#[actix::test]
async fn capability_cache_survives_a_client_restart() -> Result<()> {
    let node = setup_node(12).await?;
    let client = client_for(&node, alice());
    client.allow_decrypt_average(0).await?;
    client.decrypt_aggregate(0).await?;
    assert_eq!(node.signer.request_count(), 1);

    // a fresh client over the same store reuses the persisted capability
    let reopened = client_for(&node, alice());
    reopened.decrypt_aggregate(0).await?;
    assert_eq!(node.signer.request_count(), 1);
    Ok(())
}
