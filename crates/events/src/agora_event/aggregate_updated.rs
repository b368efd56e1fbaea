// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CategoryId, CiphertextHandle};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A category's (sum, count) pair was replaced with a fresh pair.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct AggregateUpdated {
    pub category_id: CategoryId,
    pub sum: CiphertextHandle,
    pub count: CiphertextHandle,
}

impl Display for AggregateUpdated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AggregateUpdated({})", self.category_id)
    }
}
