//! Turn lifecycle. Every phase transition runs as a queue step so that
//! start-of-turn triggers, the compile check, end-of-turn triggers and the
//! hand limit can each be suspended by player input and picked back up.

use super::{Engine, EngineError};
use crate::cards::{EffectSlot, Side, NO_CARD};
use crate::effect::{EffectCtx, TriggerKind};
use crate::events::{Event, EventBus};
use crate::passive;
use crate::pending::{
    Choice, ChoiceEffect, ChoiceOption, HandPurpose, PendingAction, PhaseStep, QueuedStep,
    SelectHandCard, StepKind,
};
use crate::state::Phase;

impl Engine {
    /// Context for turn machinery that no card owns.
    fn system_ctx(&self) -> EffectCtx {
        EffectCtx {
            source: NO_CARD,
            owner: self.state.turn,
            actor: self.state.turn,
            lane: 0,
            slot: EffectSlot::Top,
            trigger: TriggerKind::StartOfTurn,
        }
    }

    fn push_phase(&mut self, step: PhaseStep) {
        self.state.queue.push_back(QueuedStep {
            ctx: self.system_ctx(),
            kind: StepKind::Phase(step),
        });
    }

    pub(crate) fn begin_turn(&mut self, events: &mut EventBus) {
        let side = self.state.turn;
        self.state.phase = Phase::Start;
        self.state.action_taken = false;
        self.state.player.stats.reset();
        self.state.opponent.stats.reset();
        events.push(Event::TurnStarted {
            side,
            turn: self.state.turn_count,
        });
        self.state.log_line(format!(
            "{}'s turn {} begins",
            side.label(),
            self.state.turn_count
        ));
        self.push_phase(PhaseStep::StartTriggers);
        self.push_phase(PhaseStep::CheckCompile);
        self.push_phase(PhaseStep::EnterMain);
    }

    /// Queue the back half of the turn after the main action.
    fn finish_turn(&mut self) {
        self.push_phase(PhaseStep::EndTriggers);
        self.push_phase(PhaseStep::HandLimit);
        self.push_phase(PhaseStep::PassTurn);
    }

    fn main_action_guard(&self) -> Result<(), EngineError> {
        if self.state.phase == Phase::GameOver {
            return Err(EngineError::GameOver);
        }
        if self.state.pending.is_some() {
            return Err(EngineError::InputOutstanding);
        }
        if self.state.phase != Phase::Main {
            return Err(EngineError::InvalidPhase(self.state.phase));
        }
        if self.state.action_taken {
            return Err(EngineError::ActionTaken);
        }
        Ok(())
    }

    /// The active side's main action: one card from hand into a lane.
    pub fn play_from_hand(
        &mut self,
        id: crate::cards::CardId,
        lane: usize,
        face_up: bool,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.main_action_guard()?;
        if lane >= self.state.config.lanes {
            return Err(EngineError::InvalidLane(lane));
        }
        let side = self.state.turn;
        let position = self
            .state
            .side(side)
            .hand_position(id)
            .ok_or(EngineError::UnknownCard(id))?;
        let protocol = self.state.side(side).hand[position].protocol.clone();
        match passive::can_play(&self.state, &self.catalog, side, lane, face_up, &protocol) {
            passive::Legality::Allowed => {}
            passive::Legality::Blocked(reason) => return Err(EngineError::PlayBlocked(reason)),
        }
        let card = self.state.side_mut(side).hand.remove(position);
        let played = self.play_to_lane(side, card, lane, face_up, events);
        if face_up {
            self.spawn_card_trigger(played, TriggerKind::OnPlay);
        }
        self.state.action_taken = true;
        self.finish_turn();
        self.advance(events);
        Ok(())
    }

    /// The alternative main action: draw back up to the hand size.
    pub fn refresh(&mut self, events: &mut EventBus) -> Result<(), EngineError> {
        self.main_action_guard()?;
        let side = self.state.turn;
        let deficit = self
            .state
            .config
            .hand_size
            .saturating_sub(self.state.side(side).hand.len());
        self.state.log_line(format!("{} refreshes", side.label()));
        if deficit > 0 {
            self.draw_cards(side, deficit as u32, events);
        }
        self.state.action_taken = true;
        self.finish_turn();
        self.advance(events);
        Ok(())
    }

    pub(crate) fn exec_phase(&mut self, step: PhaseStep, events: &mut EventBus) {
        match step {
            PhaseStep::StartTriggers => {
                self.spawn_board_pass(TriggerKind::StartOfTurn, None);
            }
            PhaseStep::CheckCompile => self.check_compile(events),
            PhaseStep::EnterMain => {
                self.state.phase = Phase::Main;
            }
            PhaseStep::EndTriggers => {
                self.state.phase = Phase::End;
                self.spawn_board_pass(TriggerKind::EndOfTurn, None);
            }
            PhaseStep::HandLimit => self.enforce_hand_limit(events),
            PhaseStep::PassTurn => self.pass_turn(events),
        }
    }

    fn check_compile(&mut self, events: &mut EventBus) {
        let side = self.state.turn;
        let lanes = compile_candidates(self, side);
        match lanes.len() {
            0 => {}
            1 => self.compile_lane(side, lanes[0], events),
            _ => {
                let options = lanes
                    .iter()
                    .map(|lane| ChoiceOption {
                        label: format!(
                            "Compile {} (line {})",
                            self.state.side(side).protocols[*lane],
                            lane + 1
                        ),
                        effect: ChoiceEffect::CompileLane(*lane),
                    })
                    .collect();
                self.install_pending(
                    PendingAction::Choice(Choice {
                        ctx: self.system_ctx(),
                        options,
                        then: Vec::new(),
                    }),
                    events,
                );
            }
        }
    }

    /// Discard one card at a time until the hand fits, re-checking after each
    /// discard since reactives may change the hand again.
    fn enforce_hand_limit(&mut self, events: &mut EventBus) {
        let side = self.state.turn;
        if self.state.side(side).hand.len() <= self.state.config.hand_size {
            return;
        }
        let ctx = self.system_ctx();
        self.spawned.push(QueuedStep {
            ctx,
            kind: StepKind::Phase(PhaseStep::HandLimit),
        });
        self.install_pending(
            PendingAction::SelectHandCard(SelectHandCard {
                ctx,
                purpose: HandPurpose::Discard,
                side,
                remaining: 1,
                optional: false,
                then: Vec::new(),
            }),
            events,
        );
    }

    fn pass_turn(&mut self, events: &mut EventBus) {
        let side = self.state.turn;
        for clear_side in [Side::Player, Side::Opponent] {
            for stack in &mut self.state.side_mut(clear_side).lanes {
                for card in stack {
                    card.revealed = false;
                }
            }
        }
        events.push(Event::TurnEnded { side });
        self.state
            .log_line(format!("{}'s turn ends", side.label()));
        self.state.turn = side.flip();
        self.state.turn_count += 1;
        self.begin_turn(events);
    }
}

/// Lanes the given side may compile right now: not yet compiled, at or above
/// the threshold, and strictly ahead of the opposing total.
pub(crate) fn compile_candidates(engine: &Engine, side: Side) -> Vec<usize> {
    let threshold = engine.state.config.compile_threshold;
    (0..engine.state.config.lanes)
        .filter(|lane| !engine.state.side(side).compiled[*lane])
        .filter(|lane| {
            let own = passive::lane_value(&engine.state, &engine.catalog, side, *lane);
            let theirs = passive::lane_value(&engine.state, &engine.catalog, side.flip(), *lane);
            own >= threshold && own > theirs
        })
        .collect()
}
