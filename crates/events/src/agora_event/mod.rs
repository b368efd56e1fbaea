// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod aggregate_updated;
mod all_averages_decryption_requested;
mod average_decryption_requested;
mod score_submitted;
mod shutdown;

pub use aggregate_updated::*;
pub use all_averages_decryption_requested::*;
pub use average_decryption_requested::*;
pub use score_submitted::*;
pub use shutdown::*;

use crate::{AgoraError, CategoryId, ErrorEvent, Event, EventId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to help define From traits for AgoraEvent
macro_rules! impl_from_event {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for AgoraEvent {
                fn from(data: $variant) -> Self {
                    AgoraEvent::$variant {
                        id: EventId::hash(data.clone()),
                        data,
                    }
                }
            }
        )*
    };
}

/// Everything the aggregation core broadcasts. Events are append-only
/// observability; no component reads them back to derive state.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub enum AgoraEvent {
    ScoreSubmitted {
        id: EventId,
        data: ScoreSubmitted,
    },
    AggregateUpdated {
        id: EventId,
        data: AggregateUpdated,
    },
    AverageDecryptionRequested {
        id: EventId,
        data: AverageDecryptionRequested,
    },
    AllAveragesDecryptionRequested {
        id: EventId,
        data: AllAveragesDecryptionRequested,
    },
    AgoraError {
        id: EventId,
        data: AgoraError,
    },
    Shutdown {
        id: EventId,
        data: Shutdown,
    },
}

impl_from_event!(
    ScoreSubmitted,
    AggregateUpdated,
    AverageDecryptionRequested,
    AllAveragesDecryptionRequested,
    AgoraError,
    Shutdown
);

impl AgoraEvent {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    pub fn get_id(&self) -> EventId {
        match self {
            AgoraEvent::ScoreSubmitted { id, .. } => id.clone(),
            AgoraEvent::AggregateUpdated { id, .. } => id.clone(),
            AgoraEvent::AverageDecryptionRequested { id, .. } => id.clone(),
            AgoraEvent::AllAveragesDecryptionRequested { id, .. } => id.clone(),
            AgoraEvent::AgoraError { id, .. } => id.clone(),
            AgoraEvent::Shutdown { id, .. } => id.clone(),
        }
    }

    /// Category this event concerns, when it is category-scoped.
    pub fn get_category_id(&self) -> Option<CategoryId> {
        match self {
            AgoraEvent::ScoreSubmitted { data, .. } => Some(data.category_id),
            AgoraEvent::AggregateUpdated { data, .. } => Some(data.category_id),
            AgoraEvent::AverageDecryptionRequested { data, .. } => Some(data.category_id),
            _ => None,
        }
    }
}

impl Event for AgoraEvent {
    type Id = EventId;

    fn event_type(&self) -> String {
        let s = match self {
            AgoraEvent::ScoreSubmitted { .. } => "ScoreSubmitted",
            AgoraEvent::AggregateUpdated { .. } => "AggregateUpdated",
            AgoraEvent::AverageDecryptionRequested { .. } => "AverageDecryptionRequested",
            AgoraEvent::AllAveragesDecryptionRequested { .. } => {
                "AllAveragesDecryptionRequested"
            }
            AgoraEvent::AgoraError { .. } => "AgoraError",
            AgoraEvent::Shutdown { .. } => "Shutdown",
        };
        s.to_string()
    }

    fn event_id(&self) -> Self::Id {
        self.get_id()
    }
}

impl ErrorEvent for AgoraEvent {
    type Error = AgoraError;

    fn as_error(&self) -> Option<&Self::Error> {
        match self {
            AgoraEvent::AgoraError { data, .. } => Some(data),
            _ => None,
        }
    }

    fn from_error(error: Self::Error) -> Self {
        AgoraEvent::from(error)
    }
}

impl fmt::Display for AgoraEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgoraEvent::ScoreSubmitted { data, .. } => data.fmt(f),
            AgoraEvent::AggregateUpdated { data, .. } => data.fmt(f),
            AgoraEvent::AverageDecryptionRequested { data, .. } => data.fmt(f),
            AgoraEvent::AllAveragesDecryptionRequested { data, .. } => data.fmt(f),
            AgoraEvent::AgoraError { data, .. } => write!(f, "AgoraError({})", data),
            AgoraEvent::Shutdown { data, .. } => data.fmt(f),
        }
    }
}
