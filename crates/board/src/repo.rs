// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use agora_config::StoreKeys;
use agora_data::{Repositories, Repository};

use crate::BoardState;

pub trait BoardRepositoryFactory {
    fn board(&self) -> Repository<BoardState>;
}

impl BoardRepositoryFactory for Repositories {
    fn board(&self) -> Repository<BoardState> {
        Repository::new(self.store.scope(StoreKeys::board()))
    }
}
