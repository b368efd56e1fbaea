// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;

//////////////////////////////////////////////////////////////////////////////
// Core Traits
//////////////////////////////////////////////////////////////////////////////

/// Trait that must be implemented by events used with EventBus
pub trait Event: Message<Result = ()> + Clone + Send + Sync + Unpin + 'static {
    type Id: Hash + Eq + Clone + Unpin;
    fn event_type(&self) -> String;
    fn event_id(&self) -> Self::Id;
}

/// Trait for events that can carry a failure from the core taxonomy
pub trait ErrorEvent: Event {
    type Error: Clone;

    fn as_error(&self) -> Option<&Self::Error>;
    fn from_error(error: Self::Error) -> Self;
}

//////////////////////////////////////////////////////////////////////////////
// Configuration
//////////////////////////////////////////////////////////////////////////////

/// Configuration for EventBus behavior
pub struct EventBusConfig {
    pub capture_history: bool,
    pub deduplicate: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capture_history: true,
            deduplicate: true,
        }
    }
}

//////////////////////////////////////////////////////////////////////////////
// EventBus Implementation
//////////////////////////////////////////////////////////////////////////////

/// Central bus for one node. Components publish events here and any number
/// of listeners subscribe by event type, or to "*" for everything. The board
/// emits its ledger events to this bus; consumers poll or subscribe, the bus
/// is never read back to derive state.
pub struct EventBus<E: Event> {
    config: EventBusConfig,
    history: Vec<E>,
    ids: HashSet<E::Id>,
    listeners: HashMap<String, Vec<Recipient<E>>>,
}

impl<E: Event> Actor for EventBus<E> {
    type Context = Context<Self>;
}

impl<E: Event> EventBus<E> {
    pub fn new(config: EventBusConfig) -> Self {
        EventBus {
            config,
            listeners: HashMap::new(),
            ids: HashSet::new(),
            history: vec![],
        }
    }

    fn add_to_history(&mut self, event: E) {
        if self.config.capture_history {
            self.history.push(event.clone());
        }
        if self.config.deduplicate {
            self.ids.insert(event.event_id());
        }
    }

    fn is_duplicate(&self, event: &E) -> bool {
        self.config.deduplicate && self.ids.contains(&event.event_id())
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

impl<E: Event> Handler<E> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, event: E, _: &mut Context<Self>) {
        if self.is_duplicate(&event) {
            return;
        }

        if let Some(listeners) = self.listeners.get("*") {
            for listener in listeners {
                listener.do_send(event.clone())
            }
        }

        if let Some(listeners) = self.listeners.get(&event.event_type()) {
            for listener in listeners {
                listener.do_send(event.clone())
            }
        }

        self.add_to_history(event);
    }
}

//////////////////////////////////////////////////////////////////////////////
// Subscribe Message
//////////////////////////////////////////////////////////////////////////////

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe<E: Event> {
    pub event_type: String,
    pub listener: Recipient<E>,
}

impl<E: Event> Subscribe<E> {
    pub fn new(event_type: impl Into<String>, listener: Recipient<E>) -> Self {
        Self {
            event_type: event_type.into(),
            listener,
        }
    }
}

impl<E: Event> Handler<Subscribe<E>> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, msg: Subscribe<E>, _: &mut Context<Self>) {
        self.listeners
            .entry(msg.event_type)
            .or_default()
            .push(msg.listener);
    }
}

//////////////////////////////////////////////////////////////////////////////
// History Management
//////////////////////////////////////////////////////////////////////////////

#[derive(Message)]
#[rtype(result = "Vec<E>")]
pub struct GetHistory<E: Event>(PhantomData<E>);

impl<E: Event> GetHistory<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Event> Default for GetHistory<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Handler<GetHistory<E>> for EventBus<E> {
    type Result = Vec<E>;

    fn handle(&mut self, _: GetHistory<E>, _: &mut Context<Self>) -> Vec<E> {
        self.history.clone()
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct ResetHistory;

impl<E: Event> Handler<ResetHistory> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, _: ResetHistory, _: &mut Context<Self>) {
        self.history.clear()
    }
}

//////////////////////////////////////////////////////////////////////////////
// Error Handling
//////////////////////////////////////////////////////////////////////////////

#[derive(Message)]
#[rtype(result = "Vec<E::Error>")]
pub struct GetErrors<E: ErrorEvent>(PhantomData<E>);

impl<E: ErrorEvent> GetErrors<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: ErrorEvent> Default for GetErrors<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ErrorEvent> Handler<GetErrors<E>> for EventBus<E> {
    type Result = Vec<E::Error>;

    fn handle(&mut self, _: GetErrors<E>, _: &mut Context<Self>) -> Vec<E::Error> {
        self.history
            .iter()
            .filter_map(|evt| evt.as_error())
            .cloned()
            .collect()
    }
}

//////////////////////////////////////////////////////////////////////////////
// Error Bus Trait
//////////////////////////////////////////////////////////////////////////////

/// Trait to report failures onto the bus without blocking
pub trait BusError<E: ErrorEvent> {
    fn err(&self, err: E::Error);
}

impl<E: ErrorEvent> BusError<E> for Addr<EventBus<E>> {
    fn err(&self, err: E::Error) {
        self.do_send(E::from_error(err))
    }
}

impl<E: ErrorEvent> BusError<E> for Recipient<E> {
    fn err(&self, err: E::Error) {
        self.do_send(E::from_error(err))
    }
}
