// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a feedback category.
///
/// Construction does not check range; the category registry is the single
/// authority on which ids exist and hands these out after validation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CategoryId(pub u8);

impl CategoryId {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cat:{}", self.0)
    }
}

impl From<u8> for CategoryId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<CategoryId> for u8 {
    fn from(value: CategoryId) -> Self {
        value.0
    }
}
