// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod data_store;
mod in_mem;
mod into_key;
mod persistable;
mod repository;
mod sled_store;

pub use data_store::*;
pub use in_mem::*;
pub use into_key::IntoKey;
pub use persistable::*;
pub use repository::*;
pub use sled_store::*;
