// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use agora_config::StoreKeys;
use agora_data::{Repositories, Repository};
use alloy_primitives::Address;

use crate::DecryptionCapability;

pub trait CapabilityRepositoryFactory {
    fn capability(&self, account: &Address) -> Repository<DecryptionCapability>;
}

impl CapabilityRepositoryFactory for Repositories {
    fn capability(&self, account: &Address) -> Repository<DecryptionCapability> {
        Repository::new(self.store.scope(StoreKeys::capability(account)))
    }
}
