// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Actor;
use agora_board::{BoardRepositoryFactory, BoardState, FeedbackBoard, FeedbackBoardParams};
use agora_data::{DataStore, RepositoriesFactory, SledStore};
use agora_events::{AgoraEvent, CategoryId, EventBus};
use agora_provider::MockComputeProvider;
use agora_registry::CategoryRegistry;
use alloy_primitives::Address;
use anyhow::Result;
use std::sync::Arc;

#[actix::test]
async fn board_checkpoints_into_sled() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let bus = EventBus::<AgoraEvent>::default().start();
    let sled = SledStore::new(&bus, &tmp.path().join("db"))?;
    let store = DataStore::from(&sled);

    let provider = Arc::new(MockComputeProvider::seeded(21));
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

    let live = board
        .send(agora_board::GetAggregate { category_id: 0 })
        .await??;

    // the initialized state is durably readable through the repository
    let persisted: BoardState = store
        .repositories()
        .board()
        .read()
        .await?
        .expect("board state should be persisted");
    assert_eq!(persisted.aggregate(CategoryId(0))?, live);

    // a board hydrated from the same repository serves identical pairs
    let rehydrated = FeedbackBoard::attach(
        FeedbackBoardParams {
            bus: bus.clone(),
            provider,
            contract,
            registry: CategoryRegistry::civic(),
        },
        store.repositories().board(),
    )
    .await?;
    let after = rehydrated
        .send(agora_board::GetAggregate { category_id: 0 })
        .await??;
    assert_eq!(after, live);
    Ok(())
}
