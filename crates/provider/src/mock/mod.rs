// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod provider;
mod signer;

pub use provider::*;
pub use signer::*;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Wire format of the mock signer's signatures. The mock provider decodes
/// this to recover the signing account, standing in for signature recovery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MockSignature {
    pub account: Address,
    pub digest: [u8; 32],
}
