// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::{Actor, Addr, Context, Handler};
use agora_events::{AgoraEvent, Event, EventBus, Subscribe};
use std::marker::PhantomData;
use tracing::{error, info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub trait EventLogging: Event {
    fn log(&self, logger_name: &str);
}

/// Bus listener that writes every broadcast event to the log, tagged with the
/// node name it is attached under.
pub struct SimpleLogger<E: EventLogging> {
    name: String,
    _p: PhantomData<E>,
}

impl<E: EventLogging> SimpleLogger<E> {
    pub fn attach(name: &str, bus: Addr<EventBus<E>>) -> Addr<Self> {
        let addr = Self {
            name: name.to_owned(),
            _p: PhantomData,
        }
        .start();
        bus.do_send(Subscribe::<E>::new(
            "*".to_string(),
            addr.clone().recipient(),
        ));
        info!(node=%name, "READY!");
        addr
    }
}

impl<E: EventLogging> Actor for SimpleLogger<E> {
    type Context = Context<Self>;
}

impl<E: EventLogging> Handler<E> for SimpleLogger<E> {
    type Result = ();

    fn handle(&mut self, msg: E, _: &mut Self::Context) -> Self::Result {
        msg.log(&self.name);
    }
}

impl EventLogging for AgoraEvent {
    fn log(&self, logger_name: &str) {
        match self {
            AgoraEvent::AgoraError { data, .. } => error!(me=logger_name, err=%data, "ERROR!"),
            _ => match self.get_category_id() {
                Some(category_id) => {
                    info!(me=logger_name, evt=%self, %category_id, "Event Broadcasted")
                }
                None => info!(me=logger_name, evt=%self, "Event Broadcasted"),
            },
        };
    }
}

/// Plain stdout tracing for binaries and tests.
pub fn setup_simple_tracing(log_level: Level) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();
}
