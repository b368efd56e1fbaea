// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::PathBuf;

use crate::{Get, Insert, InsertSync, Remove};
use actix::{Actor, ActorContext, Addr, Handler};
use agora_events::{AgoraError, AgoraEvent, BusError, EventBus, Subscribe};
use anyhow::{Context, Result};
use sled::Db;
use tracing::{error, info};

/// Durable store actor over a sled database. Listens for `Shutdown` so the
/// database handle is dropped (and flushed) before the process exits.
pub struct SledStore {
    db: Option<SledDb>,
    bus: Addr<EventBus<AgoraEvent>>,
}

impl Actor for SledStore {
    type Context = actix::Context<Self>;
}

impl SledStore {
    pub fn new(bus: &Addr<EventBus<AgoraEvent>>, path: &PathBuf) -> Result<Addr<Self>> {
        info!("Starting SledStore");
        let db = SledDb::new(path)?;

        let store = Self {
            db: Some(db),
            bus: bus.clone(),
        }
        .start();

        bus.do_send(Subscribe::new("Shutdown", store.clone().into()));

        Ok(store)
    }
}

impl Handler<Insert> for SledStore {
    type Result = ();

    fn handle(&mut self, event: Insert, _: &mut Self::Context) -> Self::Result {
        if let Some(ref mut db) = &mut self.db {
            if let Err(err) = db.insert(event) {
                self.bus.err(AgoraError::data(err.to_string()))
            }
        }
    }
}

impl Handler<InsertSync> for SledStore {
    type Result = Result<()>;

    fn handle(&mut self, event: InsertSync, _: &mut Self::Context) -> Self::Result {
        let Some(ref mut db) = &mut self.db else {
            anyhow::bail!("Attempt to write to dropped db");
        };
        db.insert(event.into())
    }
}

impl Handler<Remove> for SledStore {
    type Result = ();

    fn handle(&mut self, event: Remove, _: &mut Self::Context) -> Self::Result {
        if let Some(ref mut db) = &mut self.db {
            if let Err(err) = db.remove(event) {
                self.bus.err(AgoraError::data(err.to_string()))
            }
        }
    }
}

impl Handler<Get> for SledStore {
    type Result = Option<Vec<u8>>;

    fn handle(&mut self, event: Get, _: &mut Self::Context) -> Self::Result {
        if let Some(ref mut db) = &mut self.db {
            match db.get(event) {
                Ok(v) => v,
                Err(err) => {
                    self.bus.err(AgoraError::data(err.to_string()));
                    None
                }
            }
        } else {
            error!("Attempt to get data from dropped db");
            None
        }
    }
}

impl Handler<AgoraEvent> for SledStore {
    type Result = ();
    fn handle(&mut self, msg: AgoraEvent, ctx: &mut Self::Context) -> Self::Result {
        if let AgoraEvent::Shutdown { .. } = msg {
            let _db = self.db.take(); // db will be dropped
            ctx.stop()
        }
    }
}

pub struct SledDb {
    db: Db,
}

impl SledDb {
    pub fn new(path: &PathBuf) -> Result<Self> {
        let db = sled::open(path).with_context(|| {
            format!(
                "Could not open database at path '{}'",
                path.to_string_lossy()
            )
        })?;
        Ok(Self { db })
    }

    pub fn insert(&mut self, msg: Insert) -> Result<()> {
        self.db
            .insert(msg.key(), msg.value().to_vec())
            .context("Could not insert data into db")?;
        Ok(())
    }

    pub fn remove(&mut self, msg: Remove) -> Result<()> {
        self.db
            .remove(msg.key())
            .context("Could not remove data from db")?;
        Ok(())
    }

    pub fn get(&mut self, event: Get) -> Result<Option<Vec<u8>>> {
        let key = event.key();
        let str_key = String::from_utf8_lossy(key).into_owned();
        let res = self
            .db
            .get(key)
            .context(format!("Failed to fetch {}", str_key))?;

        Ok(res.map(|v| v.to_vec()))
    }
}
