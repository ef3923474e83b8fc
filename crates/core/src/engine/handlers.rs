//! Action handlers for the data-driven interpreter. Each handler computes its
//! candidate set from live state and either mutates immediately or installs a
//! pending input request. Scripted effects auto-resolve a forced single
//! candidate; effects of compiled-in cards prompt whenever targets exist.

use super::interpreter::{self, ActionOutcome};
use super::Engine;
use crate::cards::{CardId, Side};
use crate::effect::{ActionDef, ChoiceArm, ChoiceBy, EffectCtx, TriggerKind};
use crate::events::EventBus;
use crate::filter::{Amount, LaneReq, TargetBase, TargetSpec, Who};
use crate::passive;
use crate::pending::{
    CardPurpose, Choice, ChoiceEffect, ChoiceOption, HandPurpose, LanePurpose, PendingAction,
    Rearrange, SelectCard, SelectHandCard, SelectLane,
};

pub(crate) fn dispatch_action(
    engine: &mut Engine,
    ctx: &EffectCtx,
    action: &ActionDef,
    prev: Option<CardId>,
    events: &mut EventBus,
) -> ActionOutcome {
    match action {
        ActionDef::Draw { who, amount } => handle_draw(engine, ctx, *who, amount, events),
        ActionDef::Discard {
            who,
            amount,
            random,
        } => handle_discard(engine, ctx, *who, amount, *random, events),
        ActionDef::Flip { target } => {
            handle_targeting(engine, ctx, CardPurpose::Flip, target, prev, events)
        }
        ActionDef::Delete { target } => {
            handle_targeting(engine, ctx, CardPurpose::Delete, target, prev, events)
        }
        ActionDef::Return { target } => {
            handle_targeting(engine, ctx, CardPurpose::Return, target, prev, events)
        }
        ActionDef::Reveal { target } => {
            handle_targeting(engine, ctx, CardPurpose::Reveal, target, prev, events)
        }
        ActionDef::Shift {
            target,
            dest,
            chooser,
        } => handle_shift(engine, ctx, target, *dest, *chooser, prev, events),
        ActionDef::PlayTop { who, face_up, dest } => {
            handle_play_top(engine, ctx, *who, *face_up, *dest, events)
        }
        ActionDef::Give { random } => handle_give(engine, ctx, *random, events),
        ActionDef::Take => handle_take(engine, ctx, events),
        ActionDef::Rearrange { who } => handle_rearrange(engine, ctx, *who, events),
        ActionDef::Swap { who } => handle_swap(engine, ctx, *who, events),
        ActionDef::Either { first, second } => handle_either(engine, ctx, first, second, events),
        ActionDef::EachLane { actions, resume_at } => {
            handle_each_lane(engine, ctx, actions, *resume_at, events)
        }
        ActionDef::Rule { .. } | ActionDef::ValueMod { .. } | ActionDef::Property { .. } => {
            log::warn!("passive payload reached the interpreter; ignored");
            ActionOutcome::done()
        }
    }
}

fn source_is_builtin(engine: &Engine, ctx: &EffectCtx) -> bool {
    engine
        .state
        .board_card(ctx.source)
        .map_or(false, |card| card.is_builtin())
}

fn handle_draw(
    engine: &mut Engine,
    ctx: &EffectCtx,
    who: Who,
    amount: &Amount,
    events: &mut EventBus,
) -> ActionOutcome {
    let side = who.resolve(ctx.owner);
    let count = amount.resolve(&engine.state, &engine.catalog, ctx);
    if count > 0 {
        engine.draw_cards(side, count, events);
    }
    ActionOutcome::done()
}

fn handle_discard(
    engine: &mut Engine,
    ctx: &EffectCtx,
    who: Who,
    amount: &Amount,
    random: bool,
    events: &mut EventBus,
) -> ActionOutcome {
    let side = who.resolve(ctx.owner);
    let count = amount.resolve(&engine.state, &engine.catalog, ctx);
    let hand = engine.state.side(side).hand.len();
    if count == 0 || hand == 0 {
        return ActionOutcome::done();
    }
    if random {
        engine.discard_random(side, count, events);
        return ActionOutcome::done();
    }
    if count as usize >= hand {
        // Nothing to choose; the whole hand goes.
        let ids: Vec<CardId> = engine
            .state
            .side(side)
            .hand
            .iter()
            .map(|card| card.id)
            .collect();
        engine.discard_hand(side, &ids, events);
        return ActionOutcome::done();
    }
    engine.install_pending(
        PendingAction::SelectHandCard(SelectHandCard {
            ctx: ctx.for_actor(side),
            purpose: HandPurpose::Discard,
            side,
            remaining: count,
            optional: false,
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

fn handle_targeting(
    engine: &mut Engine,
    ctx: &EffectCtx,
    purpose: CardPurpose,
    target: &TargetSpec,
    prev: Option<CardId>,
    events: &mut EventBus,
) -> ActionOutcome {
    match &target.base {
        TargetBase::This => {
            direct_target(engine, ctx, purpose, ctx.source, target.optional, events)
        }
        TargetBase::Prev => match prev {
            Some(id) => direct_target(engine, ctx, purpose, id, target.optional, events),
            None => ActionOutcome::done(),
        },
        TargetBase::Choose(filter) => {
            let candidates = interpreter::collect_candidates(engine, ctx, filter, purpose, &[]);
            if candidates.is_empty() {
                engine.log_no_more_targets(ctx);
                return ActionOutcome::done();
            }
            let forced = !target.optional && target.count == 1 && candidates.len() == 1;
            if forced && !source_is_builtin(engine, ctx) {
                let id = candidates[0];
                if interpreter::apply_single(engine, purpose, id, events) {
                    return ActionOutcome::done_with(id);
                }
                return ActionOutcome::done();
            }
            engine.install_pending(
                PendingAction::SelectCard(SelectCard {
                    ctx: *ctx,
                    purpose,
                    filter: filter.clone(),
                    remaining: target.count,
                    used: Vec::new(),
                    optional: target.optional,
                    then: Vec::new(),
                }),
                events,
            );
            ActionOutcome::waiting()
        }
    }
}

/// Fixed-target action for `This`/`Prev`. Mandatory targets mutate on the
/// spot; optional ones go through a yes-or-skip choice. Blocked or vanished
/// targets are a skip, not an error.
fn direct_target(
    engine: &mut Engine,
    ctx: &EffectCtx,
    purpose: CardPurpose,
    id: CardId,
    optional: bool,
    events: &mut EventBus,
) -> ActionOutcome {
    if engine.state.board_slot(id).is_none() || !direct_allowed(engine, purpose, id) {
        return ActionOutcome::done();
    }
    if !optional {
        if interpreter::apply_single(engine, purpose, id, events) {
            return ActionOutcome::done_with(id);
        }
        return ActionOutcome::done();
    }
    let title = engine.card_title(id).unwrap_or_else(|| format!("card {id}"));
    engine.install_pending(
        PendingAction::Choice(Choice {
            ctx: *ctx,
            options: vec![
                ChoiceOption {
                    label: format!("{} {}", purpose_verb(purpose), title),
                    effect: ChoiceEffect::ApplyCard { purpose, card: id },
                },
                ChoiceOption {
                    label: "Skip".to_string(),
                    effect: ChoiceEffect::Actions(Vec::new()),
                },
            ],
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

pub(crate) fn direct_allowed(engine: &Engine, purpose: CardPurpose, id: CardId) -> bool {
    match purpose {
        CardPurpose::Delete => passive::can_delete(&engine.state, &engine.catalog, id),
        CardPurpose::Flip => passive::can_flip(&engine.state, &engine.catalog, id).is_allowed(),
        CardPurpose::Return | CardPurpose::Reveal => true,
        CardPurpose::Shift { .. } => false,
    }
}

fn purpose_verb(purpose: CardPurpose) -> &'static str {
    match purpose {
        CardPurpose::Delete => "Delete",
        CardPurpose::Flip => "Flip",
        CardPurpose::Return => "Return",
        CardPurpose::Reveal => "Reveal",
        CardPurpose::Shift { .. } => "Shift",
    }
}

fn handle_shift(
    engine: &mut Engine,
    ctx: &EffectCtx,
    target: &TargetSpec,
    dest: LaneReq,
    chooser: ChoiceBy,
    prev: Option<CardId>,
    events: &mut EventBus,
) -> ActionOutcome {
    let purpose = CardPurpose::Shift { dest, chooser };
    match &target.base {
        TargetBase::This => {
            shift_lane_phase(engine, ctx, ctx.source, dest, chooser, target.optional, events)
        }
        TargetBase::Prev => match prev {
            Some(id) => shift_lane_phase(engine, ctx, id, dest, chooser, target.optional, events),
            None => ActionOutcome::done(),
        },
        TargetBase::Choose(filter) => {
            let candidates = interpreter::collect_candidates(engine, ctx, filter, purpose, &[]);
            if candidates.is_empty() {
                engine.log_no_more_targets(ctx);
                return ActionOutcome::done();
            }
            let forced = !target.optional && target.count == 1 && candidates.len() == 1;
            if forced && !source_is_builtin(engine, ctx) {
                return shift_lane_phase(engine, ctx, candidates[0], dest, chooser, false, events);
            }
            engine.install_pending(
                PendingAction::SelectCard(SelectCard {
                    ctx: *ctx,
                    purpose,
                    filter: filter.clone(),
                    remaining: target.count,
                    used: Vec::new(),
                    optional: target.optional,
                    then: Vec::new(),
                }),
                events,
            );
            ActionOutcome::waiting()
        }
    }
}

/// Second half of a shift: the destination lane. Entered directly for
/// `This`/`Prev` targets and by the resolver once a card is picked.
pub(crate) fn shift_lane_phase(
    engine: &mut Engine,
    ctx: &EffectCtx,
    id: CardId,
    dest: LaneReq,
    chooser: ChoiceBy,
    optional: bool,
    events: &mut EventBus,
) -> ActionOutcome {
    let dests = interpreter::legal_shift_dests(engine, id, dest, ctx.lane);
    if dests.is_empty() {
        engine.log_no_more_targets(ctx);
        return ActionOutcome::done();
    }
    if !optional && dests.len() == 1 && !source_is_builtin(engine, ctx) {
        engine.shift_card(id, dests[0], events);
        return ActionOutcome::done_with(id);
    }
    let actor = match chooser {
        ChoiceBy::Actor => ctx.actor,
        ChoiceBy::CardOwner => engine
            .state
            .board_slot(id)
            .map_or(ctx.actor, |slot| slot.side),
    };
    engine.install_pending(
        PendingAction::SelectLane(SelectLane {
            ctx: ctx.for_actor(actor),
            purpose: LanePurpose::ShiftCard { card: id },
            allowed: dests,
            optional,
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

fn handle_play_top(
    engine: &mut Engine,
    ctx: &EffectCtx,
    who: Who,
    face_up: bool,
    dest: LaneReq,
    events: &mut EventBus,
) -> ActionOutcome {
    let side = who.resolve(ctx.owner);
    let player = engine.state.side(side);
    if player.deck.is_empty() && player.discard.is_empty() {
        engine.log_no_more_targets(ctx);
        return ActionOutcome::done();
    }
    let lanes: Vec<usize> = (0..engine.state.config.lanes)
        .filter(|lane| dest.matches(ctx.lane, *lane))
        .filter(|lane| {
            !interpreter::effect_play_blocked(&engine.state, &engine.catalog, side, *lane, face_up)
        })
        .collect();
    if lanes.is_empty() {
        engine.log_no_more_targets(ctx);
        return ActionOutcome::done();
    }
    if lanes.len() == 1 && !source_is_builtin(engine, ctx) {
        play_top_now(engine, side, lanes[0], face_up, events);
        return ActionOutcome::done();
    }
    engine.install_pending(
        PendingAction::SelectLane(SelectLane {
            ctx: ctx.for_actor(side),
            purpose: LanePurpose::PlayTop {
                deck: side,
                face_up,
            },
            allowed: lanes,
            optional: false,
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

/// Move the top deck card straight onto a lane. Face-up arrivals dispatch
/// their play commands like a normal play.
pub(crate) fn play_top_now(
    engine: &mut Engine,
    side: Side,
    lane: usize,
    face_up: bool,
    events: &mut EventBus,
) {
    let card = match engine.pop_deck_top(side) {
        Some(card) => card,
        None => return,
    };
    let id = engine.play_to_lane(side, card, lane, face_up, events);
    if face_up {
        engine.spawn_card_trigger(id, TriggerKind::OnPlay);
    }
}

fn handle_give(
    engine: &mut Engine,
    ctx: &EffectCtx,
    random: bool,
    events: &mut EventBus,
) -> ActionOutcome {
    let side = ctx.owner;
    if engine.state.side(side).hand.is_empty() {
        engine.log_no_more_targets(ctx);
        return ActionOutcome::done();
    }
    if random {
        if let Some(index) = engine.rng.pick_index(engine.state.side(side).hand.len()) {
            let id = engine.state.side(side).hand[index].id;
            engine.give_hand_card(side, id, events);
        }
        return ActionOutcome::done();
    }
    engine.install_pending(
        PendingAction::SelectHandCard(SelectHandCard {
            ctx: ctx.for_actor(side),
            purpose: HandPurpose::Give,
            side,
            remaining: 1,
            optional: false,
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

fn handle_take(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> ActionOutcome {
    if engine.take_random(ctx.owner, events).is_none() {
        engine.log_no_more_targets(ctx);
    }
    ActionOutcome::done()
}

fn handle_rearrange(
    engine: &mut Engine,
    ctx: &EffectCtx,
    who: Who,
    events: &mut EventBus,
) -> ActionOutcome {
    let side = who.resolve(ctx.owner);
    if !passive::can_rearrange(&engine.state, &engine.catalog, side).is_allowed() {
        engine
            .state
            .log_line(format!("{}'s protocols cannot be rearranged", side.label()));
        return ActionOutcome::done();
    }
    engine.install_pending(
        PendingAction::Rearrange(Rearrange {
            ctx: *ctx,
            side,
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

fn handle_swap(
    engine: &mut Engine,
    ctx: &EffectCtx,
    who: Who,
    events: &mut EventBus,
) -> ActionOutcome {
    let side = who.resolve(ctx.owner);
    if !passive::can_rearrange(&engine.state, &engine.catalog, side).is_allowed() {
        engine
            .state
            .log_line(format!("{}'s protocols cannot be rearranged", side.label()));
        return ActionOutcome::done();
    }
    engine.install_pending(
        PendingAction::SelectLane(SelectLane {
            ctx: *ctx,
            purpose: LanePurpose::SwapFirst { side },
            allowed: (0..engine.state.config.lanes).collect(),
            optional: false,
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

fn handle_either(
    engine: &mut Engine,
    ctx: &EffectCtx,
    first: &ChoiceArm,
    second: &ChoiceArm,
    events: &mut EventBus,
) -> ActionOutcome {
    engine.install_pending(
        PendingAction::Choice(Choice {
            ctx: *ctx,
            options: vec![
                ChoiceOption {
                    label: first.label.clone(),
                    effect: ChoiceEffect::Actions(first.actions.clone()),
                },
                ChoiceOption {
                    label: second.label.clone(),
                    effect: ChoiceEffect::Actions(second.actions.clone()),
                },
            ],
            then: Vec::new(),
        }),
        events,
    );
    ActionOutcome::waiting()
}

fn handle_each_lane(
    engine: &mut Engine,
    ctx: &EffectCtx,
    actions: &[ActionDef],
    resume_at: usize,
    events: &mut EventBus,
) -> ActionOutcome {
    for lane in resume_at..engine.state.config.lanes {
        let mut lane_ctx = *ctx;
        lane_ctx.lane = lane;
        let flow = interpreter::run_actions(engine, &lane_ctx, actions, None, events);
        if flow == crate::effect::EffectFlow::Waiting {
            // The lane's own tail is already chained; append the rest of the
            // sweep after it.
            if lane + 1 < engine.state.config.lanes {
                if let Some(pending) = engine.state.pending.as_mut() {
                    pending.then_mut().push(ActionDef::EachLane {
                        actions: actions.to_vec(),
                        resume_at: lane + 1,
                    });
                }
            }
            return ActionOutcome::waiting();
        }
    }
    ActionOutcome::done()
}
