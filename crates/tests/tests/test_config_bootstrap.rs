// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Actor;
use agora_board::{BoardRepositoryFactory, FeedbackBoard, FeedbackBoardParams};
use agora_config::load_config;
use agora_data::{DataStore, RepositoriesFactory, SledStore};
use agora_events::{AgoraEvent, EventBus};
use agora_provider::{MockComputeProvider, MockWalletSigner};
use agora_registry::CategoryRegistry;
use agora_sdk::{AgoraClient, AgoraClientParams};
use alloy_primitives::Address;
use anyhow::Result;
use std::fs;
use std::sync::Arc;

/// A node boots from a yaml config: contract address, capability window and
/// database location all come from the file rather than hard-coded values.
#[actix::test]
async fn node_boots_from_a_yaml_config() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let config_path = tmp.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            r#"
contract_address: "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0"
capability_duration_days: 7
data_dir: "{}"
db_file: "agora.db"
"#,
            tmp.path().display()
        ),
    )?;

    let config = load_config(Some(&config_path.to_string_lossy()))?;
    let contract = config.contract_address().expect("contract configured");
    assert_eq!(contract, Address::repeat_byte(0xc0));
    assert_eq!(config.capability_duration_seconds(), 7 * 24 * 60 * 60);

    let bus = EventBus::<AgoraEvent>::default().start();
    let sled = SledStore::new(&bus, &config.db_file())?;
    let store = DataStore::from(&sled);

    let provider = Arc::new(MockComputeProvider::seeded(31));
    let signer = Arc::new(MockWalletSigner::approving());

    let board = FeedbackBoard::attach(
        FeedbackBoardParams {
            bus,
            provider: provider.clone(),
            contract,
            registry: CategoryRegistry::civic(),
        },
        store.repositories().board(),
    )
    .await?;

    let account = Address::repeat_byte(0xa1);
    let client = AgoraClient::new(AgoraClientParams {
        board,
        provider,
        signer,
        store,
        contract,
        account,
        registry: CategoryRegistry::civic(),
        capability_duration_seconds: config.capability_duration_seconds(),
    });

    let score = client.encrypt_score(10).await?;
    client.submit_score(0, score).await?;
    client.allow_decrypt_average(0).await?;

    let decrypted = client.decrypt_aggregate(0).await?;
    assert_eq!(decrypted.sum, 10);
    assert_eq!(decrypted.count, 1);
    Ok(())
}
