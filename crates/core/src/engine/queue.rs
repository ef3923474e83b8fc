//! Queue manager. Steps spawned while resolving a unit of work go to the
//! front of the queue in the order they were produced, so cascades run depth
//! first; top-level turn work appends to the back. The loop halts whenever a
//! pending input request is installed and resumes on `advance`.

use super::{dispatch, interpreter, Engine};
use crate::cards::NO_CARD;
use crate::effect::{ActionDef, EffectCtx};
use crate::events::{Event, EventBus};
use crate::pending::{PendingAction, QueuedStep, SelectCard, SelectHandCard, StepKind};
use crate::state::{InterruptFrame, Phase};

impl Engine {
    /// Drain the continuation queue until input is needed, the turn hands
    /// over, or the game ends. Safe to call at any time; does nothing while
    /// an input request is outstanding.
    pub fn advance(&mut self, events: &mut EventBus) {
        if self.state.phase == Phase::GameOver {
            self.spawned.clear();
            return;
        }
        self.flush_spawned();
        while self.state.pending.is_none() && self.state.phase != Phase::GameOver {
            let step = match self.state.queue.pop_front() {
                Some(step) => step,
                None => break,
            };
            self.exec_step(step, events);
            self.flush_spawned();
        }
    }

    pub(crate) fn flush_spawned(&mut self) {
        let spawned = std::mem::take(&mut self.spawned);
        for step in spawned.into_iter().rev() {
            self.state.queue.push_front(step);
        }
    }

    fn exec_step(&mut self, step: QueuedStep, events: &mut EventBus) {
        match step.kind {
            StepKind::RunSlot { subject } => {
                interpreter::run_slot(self, step.ctx, subject, events);
            }
            StepKind::Actions { actions, prev } => {
                if !dispatch::source_still_valid(&self.state, &step.ctx) {
                    self.cancel_effect(&step.ctx, events);
                    return;
                }
                let mut ctx = step.ctx;
                if let Some(slot) = self.state.board_slot(ctx.source) {
                    ctx.lane = slot.lane;
                }
                interpreter::run_actions(self, &ctx, &actions, prev, events);
            }
            StepKind::Reissue(pending) => self.exec_reissue(*pending, events),
            StepKind::Phase(phase_step) => self.exec_phase(phase_step, events),
        }
    }

    fn exec_reissue(&mut self, pending: PendingAction, events: &mut EventBus) {
        if !dispatch::source_still_valid(&self.state, pending.ctx()) {
            self.cancel_effect(pending.ctx(), events);
            return;
        }
        match pending {
            PendingAction::SelectCard(mut request) => {
                if let Some(slot) = self.state.board_slot(request.ctx.source) {
                    request.ctx.lane = slot.lane;
                }
                let pool = interpreter::collect_candidates(
                    self,
                    &request.ctx,
                    &request.filter,
                    request.purpose,
                    &request.used,
                );
                if pool.is_empty() {
                    self.log_no_more_targets(&request.ctx);
                    let prev = request.used.last().copied();
                    self.spawn_then(request.ctx, request.then, prev);
                } else {
                    self.install_pending(PendingAction::SelectCard(request), events);
                }
            }
            PendingAction::SelectHandCard(request) => {
                if self.state.side(request.side).hand.is_empty() {
                    self.log_no_more_targets(&request.ctx);
                    self.spawn_then(request.ctx, request.then, None);
                } else {
                    self.install_pending(PendingAction::SelectHandCard(request), events);
                }
            }
            other => self.install_pending(other, events),
        }
    }

    /// Install the single outstanding input request. When the decision falls
    /// to the side not holding the turn, the turn marker flips and the
    /// interrupted turn is parked on the stack until the request clears.
    pub(crate) fn install_pending(&mut self, pending: PendingAction, events: &mut EventBus) {
        let actor = pending.actor();
        if actor != self.state.turn {
            self.state.interrupts.push(InterruptFrame {
                turn: self.state.turn,
                phase: self.state.phase,
            });
            self.state.turn = actor;
            self.state
                .log_line(format!("{} must respond", actor.label()));
        }
        events.push(Event::InputRequested {
            actor,
            source: pending.source(),
        });
        self.state.pending = Some(pending);
    }

    /// Restore the interrupted turn once its forced decision has cleared.
    pub(crate) fn finish_pending(&mut self) {
        if let Some(frame) = self.state.interrupts.pop() {
            self.state.turn = frame.turn;
            self.state.phase = frame.phase;
        }
    }

    pub(crate) fn spawn_actions(
        &mut self,
        ctx: EffectCtx,
        actions: Vec<ActionDef>,
        prev: Option<crate::cards::CardId>,
    ) {
        if actions.is_empty() {
            return;
        }
        let ctx = ctx.for_actor(ctx.owner);
        self.spawned.push(QueuedStep {
            ctx,
            kind: StepKind::Actions { actions, prev },
        });
    }

    /// Chain follow-up actions after a completed selection.
    pub(crate) fn spawn_then(
        &mut self,
        ctx: EffectCtx,
        then: Vec<ActionDef>,
        prev: Option<crate::cards::CardId>,
    ) {
        self.spawn_actions(ctx, then, prev);
    }

    pub(crate) fn cancel_effect(&mut self, ctx: &EffectCtx, events: &mut EventBus) {
        let title = self
            .card_title(ctx.source)
            .unwrap_or_else(|| format!("card {}", ctx.source));
        self.state
            .log_line(format!("Effect of {} is cancelled", title));
        events.push(Event::EffectCancelled { source: ctx.source });
    }

    pub(crate) fn log_no_more_targets(&mut self, ctx: &EffectCtx) {
        let title = self
            .card_title(ctx.source)
            .unwrap_or_else(|| "the effect".to_string());
        self.state
            .log_line(format!("No further targets for {}", title));
    }

    /// Display name lookup across every zone, for log lines about cards that
    /// may have left the board.
    pub(crate) fn card_title(&self, id: crate::cards::CardId) -> Option<String> {
        if id == NO_CARD {
            return None;
        }
        for side in [crate::cards::Side::Player, crate::cards::Side::Opponent] {
            let player = self.state.side(side);
            for zone in [&player.hand, &player.deck, &player.discard] {
                if let Some(card) = zone.iter().find(|card| card.id == id) {
                    return Some(card.title());
                }
            }
            for stack in &player.lanes {
                if let Some(card) = stack.iter().find(|card| card.id == id) {
                    return Some(card.title());
                }
            }
        }
        None
    }
}

// Referenced by resolver and queue paths that rebuild reduced selections.
pub(crate) fn reissue_step(ctx: EffectCtx, pending: PendingAction) -> QueuedStep {
    QueuedStep {
        ctx,
        kind: StepKind::Reissue(Box::new(pending)),
    }
}

pub(crate) fn reduced_select_card(mut request: SelectCard, picked: crate::cards::CardId) -> SelectCard {
    request.remaining = request.remaining.saturating_sub(1);
    request.used.push(picked);
    request
}

pub(crate) fn reduced_hand_select(mut request: SelectHandCard) -> SelectHandCard {
    request.remaining = request.remaining.saturating_sub(1);
    request
}
