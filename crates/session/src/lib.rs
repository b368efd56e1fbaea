// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod capability;
mod decryptor;
mod repo;
mod session;

pub use capability::*;
pub use decryptor::*;
pub use repo::*;
pub use session::*;
