// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::CategoryId;
use actix::Message;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A standing decrypt grant was recorded for one category's aggregate.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct AverageDecryptionRequested {
    pub category_id: CategoryId,
    pub requester: Address,
    pub grantee: Address,
}

impl Display for AverageDecryptionRequested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AverageDecryptionRequested({}, grantee: {})",
            self.category_id, self.grantee
        )
    }
}
