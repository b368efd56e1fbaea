// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod agora_event;
mod category_id;
mod error;
mod event_id;
mod eventbus;
mod handle;
mod ordered_set;

pub use agora_event::*;
pub use category_id::*;
pub use error::*;
pub use event_id::*;
pub use eventbus::*;
pub use handle::*;
pub use ordered_set::*;
