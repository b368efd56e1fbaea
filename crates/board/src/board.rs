// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::VecDeque;
use std::sync::Arc;

use actix::prelude::*;
use agora_data::{Persistable, Repository};
use agora_events::{
    AggregateUpdated, AgoraError, AgoraEvent, AllAveragesDecryptionRequested,
    AverageDecryptionRequested, BusError, CategoryId, EventBus, EventId, ScoreSubmitted,
};
use agora_provider::{ComputeProvider, EncryptedScore};
use agora_registry::CategoryRegistry;
use alloy_primitives::Address;
use anyhow::Result;
use tokio::sync::oneshot;
use tracing::info;

use crate::{Aggregate, BoardState};

//////////////////////////////////////////////////////////////////////////////
// Messages
//////////////////////////////////////////////////////////////////////////////

/// Read the latest (sum, count) pair for a category.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Aggregate, AgoraError>")]
pub struct GetAggregate {
    pub category_id: u8,
}

/// Fold one encrypted rating into its category aggregate.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<EventId, AgoraError>")]
pub struct SubmitScore {
    pub category_id: u8,
    pub score: EncryptedScore,
    pub submitter: Address,
}

/// Grant `grantee` standing permission to decrypt one category's aggregate.
/// Any account may authorize any grantee; the open trust model is deliberate.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<EventId, AgoraError>")]
pub struct AllowDecryptAverage {
    pub category_id: u8,
    pub requester: Address,
    pub grantee: Address,
}

/// Grant `grantee` standing permission to decrypt every category's aggregate.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<EventId, AgoraError>")]
pub struct AllowDecryptAll {
    pub requester: Address,
    pub grantee: Address,
}

#[derive(Message)]
#[rtype(result = "()")]
struct Pump;

//////////////////////////////////////////////////////////////////////////////
// Transition queue
//////////////////////////////////////////////////////////////////////////////

type Reply = oneshot::Sender<Result<EventId, AgoraError>>;

enum Transition {
    Submit {
        category_id: CategoryId,
        score: EncryptedScore,
        submitter: Address,
        reply: Reply,
    },
    GrantCategory {
        category_id: CategoryId,
        requester: Address,
        grantee: Address,
        reply: Reply,
    },
    GrantAll {
        requester: Address,
        grantee: Address,
        reply: Reply,
    },
}

//////////////////////////////////////////////////////////////////////////////
// FeedbackBoard
//////////////////////////////////////////////////////////////////////////////

pub struct FeedbackBoardParams {
    pub bus: Addr<EventBus<AgoraEvent>>,
    pub provider: Arc<dyn ComputeProvider>,
    pub contract: Address,
    pub registry: CategoryRegistry,
}

/// The on-ledger side of the protocol: aggregate store, submission processor
/// and authorization manager behind one mailbox.
///
/// Mutating operations run through a FIFO transition queue with at most one
/// transition's provider round-trips in flight; its state change is applied
/// in actor context before the next transition starts, so a read-modify-write
/// over a category's pair can never interleave with another and a caller's
/// read after its submission resolves always sees the new pair. Reads are
/// answered immediately from current state.
pub struct FeedbackBoard {
    bus: Addr<EventBus<AgoraEvent>>,
    provider: Arc<dyn ComputeProvider>,
    contract: Address,
    registry: CategoryRegistry,
    state: Persistable<BoardState>,
    queue: VecDeque<Transition>,
    in_flight: bool,
}

impl FeedbackBoard {
    /// Load persisted state or initialize every category's aggregate to a
    /// trivially-encrypted zero pair, then start the actor. Initialization
    /// completes before the first message is accepted.
    pub async fn attach(
        params: FeedbackBoardParams,
        repo: Repository<BoardState>,
    ) -> Result<Addr<Self>> {
        let state = match repo.read().await? {
            Some(persisted) => Persistable::new(Some(persisted), &repo),
            None => {
                let mut aggregates = Vec::new();
                for _ in params.registry.ids() {
                    let sum = params.provider.trivial_encrypt(0).await?;
                    let count = params.provider.trivial_encrypt(0).await?;
                    params.provider.allow(sum, params.contract).await?;
                    params.provider.allow(count, params.contract).await?;
                    aggregates.push(Aggregate { sum, count });
                }
                let state = Persistable::new(Some(BoardState::init(aggregates)), &repo);
                info!(
                    categories = params.registry.count(),
                    "Initialized feedback board aggregates"
                );
                state.save()
            }
        };

        Ok(FeedbackBoard {
            bus: params.bus,
            provider: params.provider,
            contract: params.contract,
            registry: params.registry,
            state,
            queue: VecDeque::new(),
            in_flight: false,
        }
        .start())
    }

    fn pump(&mut self, ctx: &mut Context<Self>) {
        if self.in_flight {
            return;
        }
        let Some(transition) = self.queue.pop_front() else {
            return;
        };
        self.in_flight = true;
        match transition {
            Transition::Submit {
                category_id,
                score,
                submitter,
                reply,
            } => self.start_submit(category_id, score, submitter, reply, ctx),
            Transition::GrantCategory {
                category_id,
                requester,
                grantee,
                reply,
            } => self.start_grant_category(category_id, requester, grantee, reply, ctx),
            Transition::GrantAll {
                requester,
                grantee,
                reply,
            } => self.start_grant_all(requester, grantee, reply, ctx),
        }
    }

    fn finish(
        &mut self,
        ctx: &mut Context<Self>,
        reply: Reply,
        outcome: Result<EventId, AgoraError>,
    ) {
        if let Err(ref err) = outcome {
            self.bus.err(err.clone());
        }
        let _ = reply.send(outcome);
        self.in_flight = false;
        ctx.notify(Pump);
    }

    fn current_state(&self) -> Result<BoardState, AgoraError> {
        self.state
            .get()
            .ok_or_else(|| AgoraError::data("board state not initialized"))
    }

    fn start_submit(
        &mut self,
        category_id: CategoryId,
        score: EncryptedScore,
        submitter: Address,
        reply: Reply,
        ctx: &mut Context<Self>,
    ) {
        let snapshot = self.current_state().and_then(|state| {
            let current = state.aggregate(category_id)?;
            Ok((current, state.acl.grantees_for(category_id)))
        });
        let (current, grantees) = match snapshot {
            Ok(snapshot) => snapshot,
            Err(err) => return self.finish(ctx, reply, Err(err)),
        };

        let provider = self.provider.clone();
        let contract = self.contract;
        let input_handle = score.handle;

        let fut = async move {
            provider
                .verify_and_bind_proof(score.handle, &score.proof, submitter, contract)
                .await?;

            let one = provider.trivial_encrypt(1).await?;
            let sum = provider.homomorphic_add(current.sum, score.handle).await?;
            let count = provider.homomorphic_add(current.count, one).await?;
            let next = Aggregate { sum, count };

            // the fresh pair must stay decryptable by the board and by every
            // standing grantee
            for handle in [next.sum, next.count] {
                provider.allow(handle, contract).await?;
                for grantee in &grantees {
                    provider.allow(handle, *grantee).await?;
                }
            }

            Ok::<Aggregate, AgoraError>(next)
        };

        ctx.spawn(fut.into_actor(self).map(move |res, act, ctx| {
            let outcome = res.and_then(|next| {
                act.state
                    .try_mutate(|mut state| {
                        state.replace(category_id, next)?;
                        Ok(state)
                    })
                    .map_err(|err| AgoraError::data(err.to_string()))?;

                let submitted = AgoraEvent::from(ScoreSubmitted {
                    submitter,
                    category_id,
                    handle: input_handle,
                });
                let receipt = submitted.get_id();
                act.bus.do_send(submitted);
                act.bus.do_send(AgoraEvent::from(AggregateUpdated {
                    category_id,
                    sum: next.sum,
                    count: next.count,
                }));
                Ok(receipt)
            });
            act.finish(ctx, reply, outcome);
        }));
    }

    fn start_grant_category(
        &mut self,
        category_id: CategoryId,
        requester: Address,
        grantee: Address,
        reply: Reply,
        ctx: &mut Context<Self>,
    ) {
        let current = match self
            .current_state()
            .and_then(|state| state.aggregate(category_id))
        {
            Ok(current) => current,
            Err(err) => return self.finish(ctx, reply, Err(err)),
        };

        let provider = self.provider.clone();
        let fut = async move {
            provider.allow(current.sum, grantee).await?;
            provider.allow(current.count, grantee).await?;
            Ok::<(), AgoraError>(())
        };

        ctx.spawn(fut.into_actor(self).map(move |res, act, ctx| {
            let outcome = res.and_then(|_| {
                act.state
                    .try_mutate(|mut state| {
                        state.acl.grant(category_id, grantee);
                        Ok(state)
                    })
                    .map_err(|err| AgoraError::data(err.to_string()))?;

                let event = AgoraEvent::from(AverageDecryptionRequested {
                    category_id,
                    requester,
                    grantee,
                });
                let receipt = event.get_id();
                act.bus.do_send(event);
                Ok(receipt)
            });
            act.finish(ctx, reply, outcome);
        }));
    }

    fn start_grant_all(
        &mut self,
        requester: Address,
        grantee: Address,
        reply: Reply,
        ctx: &mut Context<Self>,
    ) {
        let pairs = match self
            .current_state()
            .map(|state| state.all_aggregates().collect::<Vec<_>>())
        {
            Ok(pairs) => pairs,
            Err(err) => return self.finish(ctx, reply, Err(err)),
        };

        let provider = self.provider.clone();
        let fut = async move {
            for (_, aggregate) in &pairs {
                provider.allow(aggregate.sum, grantee).await?;
                provider.allow(aggregate.count, grantee).await?;
            }
            Ok::<(), AgoraError>(())
        };

        ctx.spawn(fut.into_actor(self).map(move |res, act, ctx| {
            let outcome = res.and_then(|_| {
                act.state
                    .try_mutate(|mut state| {
                        state.acl.grant_all(grantee);
                        Ok(state)
                    })
                    .map_err(|err| AgoraError::data(err.to_string()))?;

                let event =
                    AgoraEvent::from(AllAveragesDecryptionRequested { requester, grantee });
                let receipt = event.get_id();
                act.bus.do_send(event);
                Ok(receipt)
            });
            act.finish(ctx, reply, outcome);
        }));
    }
}

impl Actor for FeedbackBoard {
    type Context = Context<Self>;
}

impl Handler<Pump> for FeedbackBoard {
    type Result = ();

    fn handle(&mut self, _: Pump, ctx: &mut Self::Context) -> Self::Result {
        self.pump(ctx)
    }
}

impl Handler<GetAggregate> for FeedbackBoard {
    type Result = Result<Aggregate, AgoraError>;

    fn handle(&mut self, msg: GetAggregate, _: &mut Self::Context) -> Self::Result {
        let category_id = self.registry.validate(msg.category_id)?;
        self.current_state()?.aggregate(category_id)
    }
}

impl Handler<SubmitScore> for FeedbackBoard {
    type Result = ResponseFuture<Result<EventId, AgoraError>>;

    fn handle(&mut self, msg: SubmitScore, ctx: &mut Self::Context) -> Self::Result {
        let category_id = match self.registry.validate(msg.category_id) {
            Ok(category_id) => category_id,
            Err(err) => return Box::pin(std::future::ready(Err(err))),
        };

        let (tx, rx) = oneshot::channel();
        self.queue.push_back(Transition::Submit {
            category_id,
            score: msg.score,
            submitter: msg.submitter,
            reply: tx,
        });
        self.pump(ctx);

        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(AgoraError::data("board dropped the transition")))
        })
    }
}

impl Handler<AllowDecryptAverage> for FeedbackBoard {
    type Result = ResponseFuture<Result<EventId, AgoraError>>;

    fn handle(&mut self, msg: AllowDecryptAverage, ctx: &mut Self::Context) -> Self::Result {
        let category_id = match self.registry.validate(msg.category_id) {
            Ok(category_id) => category_id,
            Err(err) => return Box::pin(std::future::ready(Err(err))),
        };

        let (tx, rx) = oneshot::channel();
        self.queue.push_back(Transition::GrantCategory {
            category_id,
            requester: msg.requester,
            grantee: msg.grantee,
            reply: tx,
        });
        self.pump(ctx);

        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(AgoraError::data("board dropped the transition")))
        })
    }
}

impl Handler<AllowDecryptAll> for FeedbackBoard {
    type Result = ResponseFuture<Result<EventId, AgoraError>>;

    fn handle(&mut self, msg: AllowDecryptAll, ctx: &mut Self::Context) -> Self::Result {
        let (tx, rx) = oneshot::channel();
        self.queue.push_back(Transition::GrantAll {
            requester: msg.requester,
            grantee: msg.grantee,
            reply: tx,
        });
        self.pump(ctx);

        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(AgoraError::data("board dropped the transition")))
        })
    }
}
