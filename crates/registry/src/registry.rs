// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use agora_events::{AgoraError, CategoryId};
use serde::{Deserialize, Serialize};

/// Lowest rating a contributor may submit.
pub const SCORE_MIN: u64 = 0;
/// Highest rating a contributor may submit. The input proof attests to this
/// bound; the registry only exposes it for client-side pre-checks.
pub const SCORE_MAX: u64 = 10;

/// The civic deployment's category labels, in id order.
const CIVIC_LABELS: [&str; 5] = [
    "Transportation",
    "Utilities",
    "Safety",
    "Sanitation",
    "Custom",
];

/// Fixed, immutable set of category identifiers. Pure lookup and validation;
/// the only state is the label list fixed at construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryRegistry {
    labels: Vec<String>,
}

impl CategoryRegistry {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Registry for the civic feedback deployment.
    pub fn civic() -> Self {
        Self::new(CIVIC_LABELS)
    }

    pub fn count(&self) -> u8 {
        self.labels.len() as u8
    }

    /// Check a raw id against the registry. Every operation that takes a
    /// category from the outside goes through here before anything else.
    pub fn validate(&self, raw: u8) -> Result<CategoryId, AgoraError> {
        if raw < self.count() {
            Ok(CategoryId(raw))
        } else {
            Err(AgoraError::InvalidCategory {
                category: raw,
                count: self.count(),
            })
        }
    }

    pub fn label(&self, id: CategoryId) -> Option<&str> {
        self.labels.get(id.value() as usize).map(String::as_str)
    }

    /// All valid ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        (0..self.count()).map(CategoryId)
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::civic()
    }
}
