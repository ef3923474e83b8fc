//! Trigger dispatch. `find_triggerable` is a pure query from state to an
//! ordered match list; turning matches into queued steps is the only side
//! effect here. Eligibility is checked again when a step surfaces, so stale
//! matches dissolve instead of erroring.

use crate::cards::{CardEffects, CardId, EffectSlot, Side};
use crate::effect::{EffectCtx, TriggerKind};
use crate::engine::Catalog;
use crate::passive;
use crate::pending::{QueuedStep, StepKind};
use crate::state::{BoardSlot, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMatch {
    pub ctx: EffectCtx,
}

/// All card slots whose effects should fire for `trigger`, in resolution
/// order: active side first, then lane, then stack bottom to top, then slot
/// top to bottom. `subject` narrows reactive triggers to listeners matching
/// their `on` requirement against the side that acted.
pub(crate) fn find_triggerable(
    state: &GameState,
    catalog: &Catalog,
    trigger: TriggerKind,
    subject: Option<Side>,
) -> Vec<TriggerMatch> {
    let mut matches = Vec::new();
    for side in [state.turn, state.turn.flip()] {
        if matches_turn_pass_only(trigger) && side != state.turn {
            continue;
        }
        for (lane, stack) in state.side(side).lanes.iter().enumerate() {
            for (index, card) in stack.iter().enumerate() {
                let slot = BoardSlot { side, lane, index };
                for effect_slot in [EffectSlot::Top, EffectSlot::Middle, EffectSlot::Bottom] {
                    let ctx = EffectCtx {
                        source: card.id,
                        owner: side,
                        actor: side,
                        lane,
                        slot: effect_slot,
                        trigger,
                    };
                    if !slot_has_trigger(state, catalog, slot, effect_slot, trigger, subject) {
                        continue;
                    }
                    if !slot_eligible(state, catalog, &ctx) {
                        continue;
                    }
                    matches.push(TriggerMatch { ctx });
                }
            }
        }
    }
    matches
}

fn matches_turn_pass_only(trigger: TriggerKind) -> bool {
    matches!(trigger, TriggerKind::StartOfTurn | TriggerKind::EndOfTurn)
}

/// Whether the card in `slot` carries any effect for `trigger` in
/// `effect_slot`, regardless of current positional eligibility.
fn slot_has_trigger(
    state: &GameState,
    catalog: &Catalog,
    slot: BoardSlot,
    effect_slot: EffectSlot,
    trigger: TriggerKind,
    subject: Option<Side>,
) -> bool {
    let card = &state.side(slot.side).lanes[slot.lane][slot.index];
    let on_matches = |on: crate::filter::OwnerReq| match subject {
        Some(subject) => on.matches(slot.side, subject),
        None => true,
    };
    match &card.effects {
        CardEffects::Builtin => catalog
            .builtin_slots(&card.protocol, card.value)
            .iter()
            .any(|entry| {
                entry.slot == effect_slot && entry.trigger == trigger && on_matches(entry.on)
            }),
        CardEffects::Scripted(scripted) => scripted
            .slot(effect_slot)
            .iter()
            .any(|def| def.trigger == trigger && on_matches(def.on)),
    }
}

/// Positional eligibility, recomputed from live state. Top effects need only
/// a face-up card; middle and bottom effects additionally need the card
/// uncovered, except that on-cover effects fire on the card being covered.
pub(crate) fn slot_eligible(state: &GameState, catalog: &Catalog, ctx: &EffectCtx) -> bool {
    let slot = match state.board_slot(ctx.source) {
        Some(slot) => slot,
        None => return false,
    };
    let card = &state.side(slot.side).lanes[slot.lane][slot.index];
    if !card.face_up {
        return false;
    }
    if ctx.trigger != TriggerKind::OnCover {
        let needs_uncovered = matches!(ctx.slot, EffectSlot::Middle | EffectSlot::Bottom);
        if needs_uncovered && !state.is_uncovered(slot) {
            return false;
        }
    }
    if ctx.slot == EffectSlot::Middle
        && ctx.trigger == TriggerKind::OnPlay
        && passive::is_command_ignored(state, catalog, slot.lane, slot.side)
    {
        return false;
    }
    true
}

/// Whether a multi-part effect may keep going: its source must still be on
/// the board and face-up, and non-top effects additionally need it uncovered.
/// On-cover effects are exempt from the cover check, since they fire on a
/// card that was just covered. System-issued work (no source card) is always
/// valid.
pub(crate) fn source_still_valid(state: &GameState, ctx: &EffectCtx) -> bool {
    if ctx.source == crate::cards::NO_CARD {
        return true;
    }
    let slot = match state.board_slot(ctx.source) {
        Some(slot) => slot,
        None => return false,
    };
    if ctx.trigger == TriggerKind::OnCover {
        return true;
    }
    let card = &state.side(slot.side).lanes[slot.lane][slot.index];
    if !card.face_up {
        return false;
    }
    ctx.slot == EffectSlot::Top || state.is_uncovered(slot)
}

pub(crate) fn card_steps(
    state: &GameState,
    catalog: &Catalog,
    id: CardId,
    trigger: TriggerKind,
) -> Vec<QueuedStep> {
    let slot = match state.board_slot(id) {
        Some(slot) => slot,
        None => return Vec::new(),
    };
    let mut steps = Vec::new();
    for effect_slot in [EffectSlot::Top, EffectSlot::Middle, EffectSlot::Bottom] {
        if !slot_has_trigger(state, catalog, slot, effect_slot, trigger, None) {
            continue;
        }
        steps.push(QueuedStep {
            ctx: EffectCtx {
                source: id,
                owner: slot.side,
                actor: slot.side,
                lane: slot.lane,
                slot: effect_slot,
                trigger,
            },
            kind: StepKind::RunSlot { subject: None },
        });
    }
    steps
}

pub(crate) fn board_steps(
    state: &GameState,
    catalog: &Catalog,
    trigger: TriggerKind,
    subject: Option<Side>,
) -> Vec<QueuedStep> {
    find_triggerable(state, catalog, trigger, subject)
        .into_iter()
        .map(|found| QueuedStep {
            ctx: found.ctx,
            kind: StepKind::RunSlot { subject },
        })
        .collect()
}
