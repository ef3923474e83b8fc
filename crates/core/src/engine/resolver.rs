//! Resolution of submitted targets. Every submission is re-validated against
//! live state; a bad pick leaves the outstanding request untouched so the
//! player can try again, while a request whose effect source died underneath
//! it is cancelled with a log line and the game moves on.

use super::{dispatch, handlers, interpreter, queue, turn, Engine, EngineError};
use crate::cards::CardId;
use crate::effect::EffectFlow;
use crate::events::EventBus;
use crate::passive;
use crate::pending::{
    CardPurpose, Choice, ChoiceEffect, HandPurpose, LanePurpose, PendingAction, Rearrange,
    SelectCard, SelectHandCard, SelectLane, TargetChoice,
};
use crate::state::Phase;

impl Engine {
    /// Answer the outstanding input request. `Err(InvalidTarget)` means the
    /// submission was rejected and the request still stands.
    pub fn submit_target(
        &mut self,
        choice: TargetChoice,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        if self.state.phase == Phase::GameOver {
            return Err(EngineError::GameOver);
        }
        let pending = match self.state.pending.clone() {
            Some(pending) => pending,
            None => return Err(EngineError::NoInputOutstanding),
        };
        if !dispatch::source_still_valid(&self.state, pending.ctx()) {
            self.state.pending = None;
            self.cancel_effect(pending.ctx(), events);
            self.finish_pending();
            self.advance(events);
            return Ok(());
        }
        if matches!(choice, TargetChoice::Decline) {
            if !pending.is_optional() {
                log::debug!("decline submitted for a mandatory request");
                return Err(EngineError::InvalidTarget);
            }
            self.state.pending = None;
            self.state
                .log_line(format!("{} declines", pending.actor().label()));
            self.finish_pending();
            self.advance(events);
            return Ok(());
        }
        match (pending, choice) {
            (PendingAction::SelectCard(request), TargetChoice::Card(id)) => {
                self.resolve_select_card(request, id, events)?
            }
            (PendingAction::SelectLane(request), TargetChoice::Lane(lane)) => {
                self.resolve_select_lane(request, lane, events)?
            }
            (PendingAction::SelectHandCard(request), TargetChoice::HandCard(id)) => {
                self.resolve_hand_card(request, id, events)?
            }
            (PendingAction::Choice(request), TargetChoice::Option(index)) => {
                self.resolve_choice(request, index, events)?
            }
            (PendingAction::Rearrange(request), TargetChoice::Order(order)) => {
                self.resolve_rearrange(request, &order, events)?
            }
            _ => {
                log::debug!("submission kind does not match the outstanding request");
                return Err(EngineError::InvalidTarget);
            }
        }
        self.advance(events);
        Ok(())
    }

    fn resolve_select_card(
        &mut self,
        request: SelectCard,
        id: CardId,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let mut ctx = request.ctx;
        if let Some(slot) = self.state.board_slot(ctx.source) {
            ctx.lane = slot.lane;
        }
        let pool =
            interpreter::collect_candidates(self, &ctx, &request.filter, request.purpose, &request.used);
        if !pool.contains(&id) {
            log::debug!("card {id} is not a legal {} target", request.purpose.label());
            return Err(EngineError::InvalidTarget);
        }
        self.state.pending = None;
        self.finish_pending();

        if let CardPurpose::Shift { dest, chooser } = request.purpose {
            let mut reduced = queue::reduced_select_card(request, id);
            reduced.ctx = ctx;
            let outcome = handlers::shift_lane_phase(self, &ctx, id, dest, chooser, false, events);
            if reduced.remaining > 0 {
                self.spawned
                    .push(queue::reissue_step(ctx, PendingAction::SelectCard(reduced)));
            } else if outcome.flow == EffectFlow::Waiting {
                // The chained tail waits behind the destination choice.
                if let Some(pending) = self.state.pending.as_mut() {
                    pending.then_mut().append(&mut reduced.then);
                }
            } else {
                self.spawn_then(ctx, reduced.then, Some(id));
            }
            return Ok(());
        }

        interpreter::apply_single(self, request.purpose, id, events);
        let reduced = queue::reduced_select_card(request, id);
        if reduced.remaining > 0 {
            self.spawned
                .push(queue::reissue_step(ctx, PendingAction::SelectCard(reduced)));
        } else {
            self.spawn_then(ctx, reduced.then, Some(id));
        }
        Ok(())
    }

    fn resolve_select_lane(
        &mut self,
        request: SelectLane,
        lane: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        if !request.allowed.contains(&lane) {
            log::debug!("lane {lane} is not among the offered choices");
            return Err(EngineError::InvalidTarget);
        }
        match request.purpose {
            LanePurpose::ShiftCard { card } => {
                if self.state.board_slot(card).is_none() {
                    self.state.pending = None;
                    self.cancel_effect(&request.ctx, events);
                    self.finish_pending();
                    return Ok(());
                }
                if !passive::can_shift(&self.state, &self.catalog, card, lane).is_allowed() {
                    log::debug!("shift into lane {lane} is no longer legal");
                    return Err(EngineError::InvalidTarget);
                }
                self.state.pending = None;
                self.finish_pending();
                self.shift_card(card, lane, events);
                self.spawn_then(request.ctx, request.then, Some(card));
            }
            LanePurpose::PlayTop { deck, face_up } => {
                if interpreter::effect_play_blocked(&self.state, &self.catalog, deck, lane, face_up)
                {
                    log::debug!("play into lane {lane} is no longer legal");
                    return Err(EngineError::InvalidTarget);
                }
                self.state.pending = None;
                self.finish_pending();
                handlers::play_top_now(self, deck, lane, face_up, events);
                self.spawn_then(request.ctx, request.then, None);
            }
            LanePurpose::SwapFirst { side } => {
                self.state.pending = None;
                self.finish_pending();
                self.install_pending(
                    PendingAction::SelectLane(SelectLane {
                        ctx: request.ctx,
                        purpose: LanePurpose::SwapSecond { side, first: lane },
                        allowed: (0..self.state.config.lanes)
                            .filter(|other| *other != lane)
                            .collect(),
                        optional: false,
                        then: request.then,
                    }),
                    events,
                );
            }
            LanePurpose::SwapSecond { side, first } => {
                self.state.pending = None;
                self.finish_pending();
                self.swap_protocols(side, first, lane, events);
                self.spawn_then(request.ctx, request.then, None);
            }
        }
        Ok(())
    }

    fn resolve_hand_card(
        &mut self,
        request: SelectHandCard,
        id: CardId,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        if self.state.side(request.side).hand_position(id).is_none() {
            log::debug!("card {id} is not in {}'s hand", request.side.label());
            return Err(EngineError::InvalidTarget);
        }
        self.state.pending = None;
        self.finish_pending();
        match request.purpose {
            HandPurpose::Discard => self.discard_hand(request.side, &[id], events),
            HandPurpose::Give => {
                self.give_hand_card(request.side, id, events);
            }
        }
        let reduced = queue::reduced_hand_select(request);
        if reduced.remaining > 0 {
            let ctx = reduced.ctx;
            self.spawned
                .push(queue::reissue_step(ctx, PendingAction::SelectHandCard(reduced)));
        } else {
            self.spawn_then(reduced.ctx, reduced.then, None);
        }
        Ok(())
    }

    fn resolve_choice(
        &mut self,
        request: Choice,
        index: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let option = match request.options.get(index) {
            Some(option) => option.clone(),
            None => {
                log::debug!("option {index} is out of range");
                return Err(EngineError::InvalidTarget);
            }
        };
        self.state.pending = None;
        self.finish_pending();
        self.state.log_line(format!(
            "{} chooses: {}",
            request.ctx.actor.label(),
            option.label
        ));
        match option.effect {
            ChoiceEffect::Actions(mut actions) => {
                // One combined list so `Prev` threads from the arm into the tail.
                actions.extend(request.then);
                self.spawn_actions(request.ctx, actions, None);
            }
            ChoiceEffect::ApplyCard { purpose, card } => {
                let mut picked = None;
                if self.state.board_slot(card).is_some()
                    && handlers::direct_allowed(self, purpose, card)
                {
                    if let CardPurpose::Shift { dest, chooser } = purpose {
                        let outcome = handlers::shift_lane_phase(
                            self,
                            &request.ctx,
                            card,
                            dest,
                            chooser,
                            false,
                            events,
                        );
                        if outcome.flow == EffectFlow::Waiting {
                            if let Some(pending) = self.state.pending.as_mut() {
                                pending.then_mut().extend(request.then);
                            }
                            return Ok(());
                        }
                        picked = outcome.picked;
                    } else if interpreter::apply_single(self, purpose, card, events) {
                        picked = Some(card);
                    }
                }
                self.spawn_then(request.ctx, request.then, picked);
            }
            ChoiceEffect::CompileLane(lane) => {
                let side = request.ctx.actor;
                if turn::compile_candidates(self, side).contains(&lane) {
                    self.compile_lane(side, lane, events);
                } else {
                    self.state
                        .log_line(format!("Line {} can no longer compile", lane + 1));
                }
                if self.state.phase != Phase::GameOver {
                    self.spawn_then(request.ctx, request.then, None);
                }
            }
        }
        Ok(())
    }

    fn resolve_rearrange(
        &mut self,
        request: Rearrange,
        order: &[usize],
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let lanes = self.state.config.lanes;
        let mut seen = vec![false; lanes];
        let valid = order.len() == lanes
            && order.iter().all(|old| {
                if *old < lanes && !seen[*old] {
                    seen[*old] = true;
                    true
                } else {
                    false
                }
            });
        if !valid {
            log::debug!("order {order:?} is not a lane permutation");
            return Err(EngineError::InvalidTarget);
        }
        if !passive::can_rearrange(&self.state, &self.catalog, request.side).is_allowed() {
            log::debug!("rearrange is no longer legal");
            return Err(EngineError::InvalidTarget);
        }
        self.state.pending = None;
        self.finish_pending();
        self.rearrange_protocols(request.side, order, events);
        self.spawn_then(request.ctx, request.then, None);
        Ok(())
    }
}
