//! Effect interpreter. Executes one card slot's effects or one action list,
//! installing a pending input request whenever a step needs a player.
//! Everything here recomputes candidates from live state; nothing caches a
//! target list across a mutation.

use super::{dispatch, handlers, Engine};
use crate::cards::{CardEffects, CardId, Side};
use crate::effect::{ActionDef, EffectCtx, EffectFlow, RuleKind};
use crate::events::EventBus;
use crate::filter::{CardFilter, LaneReq};
use crate::passive;
use crate::pending::CardPurpose;
use crate::state::GameState;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ActionOutcome {
    pub flow: EffectFlow,
    /// Card an auto-resolved targeting step settled on; feeds `Prev` chains.
    pub picked: Option<CardId>,
}

impl ActionOutcome {
    pub fn done() -> Self {
        Self {
            flow: EffectFlow::Done,
            picked: None,
        }
    }

    pub fn done_with(id: CardId) -> Self {
        Self {
            flow: EffectFlow::Done,
            picked: Some(id),
        }
    }

    pub fn waiting() -> Self {
        Self {
            flow: EffectFlow::Waiting,
            picked: None,
        }
    }
}

/// Run one card slot's effects for the trigger in `ctx`. The step may be
/// stale by the time it surfaces; ineligible sources are skipped with a log
/// line, never an error.
pub(crate) fn run_slot(
    engine: &mut Engine,
    base_ctx: EffectCtx,
    subject: Option<Side>,
    events: &mut EventBus,
) -> EffectFlow {
    let slot = match engine.state.board_slot(base_ctx.source) {
        Some(slot) => slot,
        None => {
            engine.cancel_effect(&base_ctx, events);
            return EffectFlow::Done;
        }
    };
    let mut ctx = base_ctx;
    ctx.lane = slot.lane;
    ctx.owner = slot.side;
    ctx.actor = slot.side;
    if !dispatch::slot_eligible(&engine.state, &engine.catalog, &ctx) {
        engine.cancel_effect(&ctx, events);
        return EffectFlow::Done;
    }

    let card = &engine.state.side(slot.side).lanes[slot.lane][slot.index];
    let title = card.title();
    let on_matches = |on: crate::filter::OwnerReq| match subject {
        Some(subject) => on.matches(slot.side, subject),
        None => true,
    };
    enum Work {
        Builtin(Vec<super::builtin::BuiltinFn>),
        Scripted(Vec<Vec<ActionDef>>),
    }
    let work = match &card.effects {
        CardEffects::Builtin => Work::Builtin(
            engine
                .catalog
                .builtin_slots(&card.protocol, card.value)
                .iter()
                .filter(|entry| {
                    entry.slot == ctx.slot && entry.trigger == ctx.trigger && on_matches(entry.on)
                })
                .map(|entry| entry.run)
                .collect(),
        ),
        CardEffects::Scripted(scripted) => Work::Scripted(
            scripted
                .slot(ctx.slot)
                .iter()
                .filter(|def| def.trigger == ctx.trigger && on_matches(def.on))
                .map(|def| def.actions.clone())
                .collect(),
        ),
    };

    match work {
        Work::Builtin(fns) => {
            for run in fns {
                engine.state.log_line(format!("{} effect fires", title));
                if run(engine, &ctx, events) == EffectFlow::Waiting {
                    return EffectFlow::Waiting;
                }
            }
            EffectFlow::Done
        }
        Work::Scripted(lists) => {
            for (index, actions) in lists.iter().enumerate() {
                engine.state.log_line(format!("{} effect fires", title));
                if run_actions(engine, &ctx, actions, None, events) == EffectFlow::Waiting {
                    for rest in &lists[index + 1..] {
                        engine.spawn_actions(ctx, rest.clone(), None);
                    }
                    return EffectFlow::Waiting;
                }
            }
            EffectFlow::Done
        }
    }
}

/// Interpret an action list in order, threading the previously resolved card
/// into `Prev` targets. When a step suspends, the unfinished tail is attached
/// to the new pending action's continuation.
pub(crate) fn run_actions(
    engine: &mut Engine,
    ctx: &EffectCtx,
    actions: &[ActionDef],
    mut prev: Option<CardId>,
    events: &mut EventBus,
) -> EffectFlow {
    for (index, action) in actions.iter().enumerate() {
        let outcome = handlers::dispatch_action(engine, ctx, action, prev, events);
        match outcome.flow {
            EffectFlow::Done => {
                if outcome.picked.is_some() {
                    prev = outcome.picked;
                }
            }
            EffectFlow::Waiting => {
                let rest = &actions[index + 1..];
                if !rest.is_empty() {
                    match engine.state.pending.as_mut() {
                        Some(pending) => pending.then_mut().extend_from_slice(rest),
                        None => log::warn!("suspended action left no pending request"),
                    }
                }
                return EffectFlow::Waiting;
            }
        }
    }
    EffectFlow::Done
}

/// Candidates for a targeting purpose: the filter plus purpose legality.
/// Protected cards drop out of delete pools, unflippable cards out of flip
/// pools, and shift candidates must have at least one open destination.
pub(crate) fn collect_candidates(
    engine: &Engine,
    ctx: &EffectCtx,
    filter: &CardFilter,
    purpose: CardPurpose,
    used: &[CardId],
) -> Vec<CardId> {
    let mut pool = filter.candidates(&engine.state, &engine.catalog, ctx, used);
    pool.retain(|id| match purpose {
        CardPurpose::Delete => passive::can_delete(&engine.state, &engine.catalog, *id),
        CardPurpose::Flip => passive::can_flip(&engine.state, &engine.catalog, *id).is_allowed(),
        CardPurpose::Return => true,
        CardPurpose::Reveal => engine
            .state
            .board_card(*id)
            .map_or(false, |card| !card.face_up && !card.revealed),
        CardPurpose::Shift { dest, .. } => {
            !legal_shift_dests(engine, *id, dest, ctx.lane).is_empty()
        }
    });
    pool
}

/// Lanes a card may legally shift to under the destination requirement.
/// `Same` means the line the effect is running in, `Other` any line but the
/// card's current one.
pub(crate) fn legal_shift_dests(
    engine: &Engine,
    id: CardId,
    dest: LaneReq,
    effect_lane: usize,
) -> Vec<usize> {
    let slot = match engine.state.board_slot(id) {
        Some(slot) => slot,
        None => return Vec::new(),
    };
    (0..engine.state.config.lanes)
        .filter(|lane| *lane != slot.lane)
        .filter(|lane| match dest {
            LaneReq::Any | LaneReq::Other => true,
            LaneReq::Same => *lane == effect_lane,
        })
        .filter(|lane| passive::can_shift(&engine.state, &engine.catalog, id, *lane).is_allowed())
        .collect()
}

/// Apply a non-shift purpose to one card. Returns false when the mutation
/// did not happen (card gone or blocked), which callers treat as a skip.
pub(crate) fn apply_single(
    engine: &mut Engine,
    purpose: CardPurpose,
    id: CardId,
    events: &mut EventBus,
) -> bool {
    match purpose {
        CardPurpose::Delete => engine.delete_card(id, events),
        CardPurpose::Flip => engine.flip_card(id, events),
        CardPurpose::Return => engine.return_card(id, events),
        CardPurpose::Reveal => engine.reveal_card(id, events),
        CardPurpose::Shift { .. } => false,
    }
}

/// Block-rule check for effect-driven plays, which skip protocol matching
/// but still respect face blocks.
pub(crate) fn effect_play_blocked(
    state: &GameState,
    catalog: &super::Catalog,
    side: Side,
    lane: usize,
    face_up: bool,
) -> bool {
    let active = passive::active_rules(state, catalog);
    let kind = if face_up {
        RuleKind::BlockFaceUpPlay
    } else {
        RuleKind::BlockFaceDownPlay
    };
    active.has_rule(kind, lane, side)
}
