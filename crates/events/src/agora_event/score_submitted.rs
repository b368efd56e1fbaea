// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CategoryId, CiphertextHandle};
use actix::Message;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// One encrypted rating was accepted and folded into its category aggregate.
/// Carries the input handle so that every accepted submission broadcasts a
/// distinct event.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct ScoreSubmitted {
    pub submitter: Address,
    pub category_id: CategoryId,
    pub handle: CiphertextHandle,
}

impl Display for ScoreSubmitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScoreSubmitted({}, submitter: {})",
            self.category_id, self.submitter
        )
    }
}
