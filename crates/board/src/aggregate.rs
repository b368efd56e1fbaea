// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use agora_events::{AgoraError, CategoryId, CiphertextHandle};
use serde::{Deserialize, Serialize};

use crate::AclState;

/// Encrypted running totals for one category. Updates always replace the
/// whole pair; the previous handles become unreachable garbage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub sum: CiphertextHandle,
    pub count: CiphertextHandle,
}

/// Full board state: one aggregate per category plus the decrypt ACL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    aggregates: Vec<Aggregate>,
    pub acl: AclState,
}

impl BoardState {
    pub fn init(aggregates: Vec<Aggregate>) -> Self {
        Self {
            aggregates,
            acl: AclState::new(),
        }
    }

    /// Latest pair for the category. The id has been registry-validated, so a
    /// miss indicates corrupted state rather than caller error.
    pub fn aggregate(&self, category_id: CategoryId) -> Result<Aggregate, AgoraError> {
        self.aggregates
            .get(category_id.value() as usize)
            .copied()
            .ok_or_else(|| {
                AgoraError::data(format!("no aggregate initialized for {category_id}"))
            })
    }

    /// Swap in a freshly computed pair for the category.
    pub fn replace(
        &mut self,
        category_id: CategoryId,
        next: Aggregate,
    ) -> Result<(), AgoraError> {
        let slot = self
            .aggregates
            .get_mut(category_id.value() as usize)
            .ok_or_else(|| {
                AgoraError::data(format!("no aggregate initialized for {category_id}"))
            })?;
        *slot = next;
        Ok(())
    }

    /// Every category's current pair, in id order.
    pub fn all_aggregates(&self) -> impl Iterator<Item = (CategoryId, Aggregate)> + '_ {
        self.aggregates
            .iter()
            .enumerate()
            .map(|(idx, aggregate)| (CategoryId(idx as u8), *aggregate))
    }
}
