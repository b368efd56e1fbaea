// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod acl;
mod aggregate;
mod board;
mod repo;

pub use acl::*;
pub use aggregate::*;
pub use board::*;
pub use repo::*;
