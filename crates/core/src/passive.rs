//! Passive rule engine. Rules, value modifiers and card properties are never
//! stored in `GameState`; every query rebuilds them from the cards currently
//! showing a passive effect, so covering or flipping a source card retires its
//! rules without any bookkeeping.

use crate::cards::{CardId, EffectSlot, Side};
use crate::effect::{CardProperty, RuleKind, RuleScope, RuleTarget, TriggerKind, ValueModOp};
use crate::engine::Catalog;
use crate::filter::FaceReq;
use crate::state::{BoardSlot, GameState};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockReason {
    #[error("face-down plays are blocked here")]
    FaceDownPlayBlocked,
    #[error("face-up plays are blocked here")]
    FaceUpPlayBlocked,
    #[error("card does not match a protocol of this line")]
    ProtocolMismatch,
    #[error("card must not match a protocol of this line")]
    MatchForbidden,
    #[error("card cannot be flipped")]
    FlipBlocked,
    #[error("card cannot be shifted")]
    ShiftBlocked,
    #[error("protocols cannot be rearranged")]
    RearrangeBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legality {
    Allowed,
    Blocked(BlockReason),
}

impl Legality {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Legality::Allowed)
    }
}

/// A standing rule, resolved to its live scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveRule {
    pub kind: RuleKind,
    pub owner: Side,
    /// None means the rule is board-wide.
    pub lane: Option<usize>,
    pub target: RuleTarget,
    pub source: CardId,
}

impl PassiveRule {
    pub fn covers(&self, lane: usize, side: Side) -> bool {
        self.lane.map_or(true, |own_lane| own_lane == lane)
            && self.target.applies(self.owner, side)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueModifier {
    pub op: ValueModOp,
    pub face: FaceReq,
    pub owner: Side,
    pub lane: Option<usize>,
    pub target: RuleTarget,
    pub source: CardId,
}

/// Snapshot of everything passive currently in force.
#[derive(Debug, Clone, Default)]
pub struct ActiveRules {
    pub rules: Vec<PassiveRule>,
    pub mods: Vec<ValueModifier>,
    pub props: Vec<(CardId, CardProperty)>,
}

impl ActiveRules {
    pub fn has_rule(&self, kind: RuleKind, lane: usize, side: Side) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.kind == kind && rule.covers(lane, side))
    }

    pub fn card_props<'a>(&'a self, id: CardId) -> impl Iterator<Item = CardProperty> + 'a {
        self.props
            .iter()
            .filter(move |(card, _)| *card == id)
            .map(|(_, prop)| *prop)
    }
}

fn slot_shows_passive(state: &GameState, slot: BoardSlot, effect_slot: EffectSlot) -> bool {
    match effect_slot {
        EffectSlot::Top | EffectSlot::Middle => true,
        EffectSlot::Bottom => state.is_uncovered(slot),
    }
}

/// Rebuild the full passive picture from the board.
pub fn active_rules(state: &GameState, catalog: &Catalog) -> ActiveRules {
    let mut active = ActiveRules::default();
    for side in [Side::Player, Side::Opponent] {
        for (lane, stack) in state.side(side).lanes.iter().enumerate() {
            for (index, card) in stack.iter().enumerate() {
                if !card.face_up {
                    continue;
                }
                let slot = BoardSlot { side, lane, index };
                collect_card(state, catalog, slot, card.id, &mut active);
            }
        }
    }
    active
}

fn collect_card(
    state: &GameState,
    catalog: &Catalog,
    slot: BoardSlot,
    id: CardId,
    active: &mut ActiveRules,
) {
    let card = &state.side(slot.side).lanes[slot.lane][slot.index];
    let resolve_lane = |scope: RuleScope| match scope {
        RuleScope::Global => None,
        RuleScope::ThisLane => Some(slot.lane),
    };
    if card.is_builtin() {
        for decl in catalog.passive_decls(&card.protocol, card.value) {
            if !slot_shows_passive(state, slot, decl.slot) {
                continue;
            }
            for (kind, scope, target) in decl.rules {
                active.rules.push(PassiveRule {
                    kind: *kind,
                    owner: slot.side,
                    lane: resolve_lane(*scope),
                    target: *target,
                    source: id,
                });
            }
            for (op, face, scope, target) in decl.mods {
                active.mods.push(ValueModifier {
                    op: *op,
                    face: *face,
                    owner: slot.side,
                    lane: resolve_lane(*scope),
                    target: *target,
                    source: id,
                });
            }
            for prop in decl.props {
                active.props.push((id, *prop));
            }
        }
        return;
    }
    let scripted = match &card.effects {
        crate::cards::CardEffects::Scripted(s) => s,
        crate::cards::CardEffects::Builtin => return,
    };
    for effect_slot in [EffectSlot::Top, EffectSlot::Middle, EffectSlot::Bottom] {
        if !slot_shows_passive(state, slot, effect_slot) {
            continue;
        }
        for def in scripted.slot(effect_slot) {
            if def.trigger != TriggerKind::Passive {
                continue;
            }
            for action in &def.actions {
                match action {
                    crate::effect::ActionDef::Rule {
                        kind,
                        scope,
                        target,
                    } => active.rules.push(PassiveRule {
                        kind: *kind,
                        owner: slot.side,
                        lane: resolve_lane(*scope),
                        target: *target,
                        source: id,
                    }),
                    crate::effect::ActionDef::ValueMod {
                        op,
                        face,
                        scope,
                        target,
                    } => active.mods.push(ValueModifier {
                        op: *op,
                        face: *face,
                        owner: slot.side,
                        lane: resolve_lane(*scope),
                        target: *target,
                        source: id,
                    }),
                    crate::effect::ActionDef::Property { prop } => {
                        active.props.push((id, *prop))
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Effective value of a board card. A `ValueIs` property beats a `Set`
/// modifier, which beats the printed or face-down base plus deltas.
pub fn effective_value(state: &GameState, catalog: &Catalog, id: CardId) -> i32 {
    let slot = match state.board_slot(id) {
        Some(slot) => slot,
        None => return 0,
    };
    let card = &state.side(slot.side).lanes[slot.lane][slot.index];
    let active = active_rules(state, catalog);
    for prop in active.card_props(id) {
        if let CardProperty::ValueIs(value) = prop {
            return value;
        }
    }
    let base = if card.face_up {
        card.value
    } else {
        state.config.face_down_value
    };
    let mut total = base;
    let mut fixed = None;
    for modifier in &active.mods {
        let face_ok = match modifier.face {
            FaceReq::Any => true,
            FaceReq::Up => card.face_up,
            FaceReq::Down => !card.face_up,
        };
        let lane_ok = modifier.lane.map_or(true, |lane| lane == slot.lane);
        if !face_ok || !lane_ok || !modifier.target.applies(modifier.owner, slot.side) {
            continue;
        }
        match modifier.op {
            ValueModOp::Add(delta) => total += delta,
            ValueModOp::Set(value) => fixed = fixed.or(Some(value)),
        }
    }
    fixed.unwrap_or(total)
}

pub fn lane_value(state: &GameState, catalog: &Catalog, side: Side, lane: usize) -> i32 {
    state.side(side).lanes[lane]
        .iter()
        .map(|card| effective_value(state, catalog, card.id))
        .sum()
}

/// Legality of playing `protocol` into `lane` for `side`. Block rules win
/// over bypasses, bypasses over inversions, then base matching applies.
pub fn can_play(
    state: &GameState,
    catalog: &Catalog,
    side: Side,
    lane: usize,
    face_up: bool,
    protocol: &str,
) -> Legality {
    let active = active_rules(state, catalog);
    if face_up {
        if active.has_rule(RuleKind::BlockFaceUpPlay, lane, side) {
            return Legality::Blocked(BlockReason::FaceUpPlayBlocked);
        }
    } else {
        if active.has_rule(RuleKind::BlockFaceDownPlay, lane, side) {
            return Legality::Blocked(BlockReason::FaceDownPlayBlocked);
        }
        return Legality::Allowed;
    }
    let matches = state.player.protocols[lane] == protocol
        || state.opponent.protocols[lane] == protocol;
    if active.has_rule(RuleKind::AllowAnyProtocol, lane, side) {
        return Legality::Allowed;
    }
    if active.has_rule(RuleKind::RequireMismatch, lane, side) {
        return if matches {
            Legality::Blocked(BlockReason::MatchForbidden)
        } else {
            Legality::Allowed
        };
    }
    if matches {
        Legality::Allowed
    } else {
        Legality::Blocked(BlockReason::ProtocolMismatch)
    }
}

pub fn can_flip(state: &GameState, catalog: &Catalog, id: CardId) -> Legality {
    let slot = match state.board_slot(id) {
        Some(slot) => slot,
        None => return Legality::Blocked(BlockReason::FlipBlocked),
    };
    let active = active_rules(state, catalog);
    if active
        .card_props(id)
        .any(|prop| prop == CardProperty::CannotBeFlipped)
    {
        return Legality::Blocked(BlockReason::FlipBlocked);
    }
    if active.has_rule(RuleKind::BlockFlip, slot.lane, slot.side) {
        return Legality::Blocked(BlockReason::FlipBlocked);
    }
    Legality::Allowed
}

pub fn can_shift(state: &GameState, catalog: &Catalog, id: CardId, to: usize) -> Legality {
    let slot = match state.board_slot(id) {
        Some(slot) => slot,
        None => return Legality::Blocked(BlockReason::ShiftBlocked),
    };
    let active = active_rules(state, catalog);
    if active.has_rule(RuleKind::BlockShiftOutOf, slot.lane, slot.side) {
        return Legality::Blocked(BlockReason::ShiftBlocked);
    }
    if active.has_rule(RuleKind::BlockShiftInto, to, slot.side) {
        return Legality::Blocked(BlockReason::ShiftBlocked);
    }
    Legality::Allowed
}

pub fn can_rearrange(state: &GameState, catalog: &Catalog, side: Side) -> Legality {
    let active = active_rules(state, catalog);
    let blocked = active
        .rules
        .iter()
        .any(|rule| rule.kind == RuleKind::BlockRearrange && rule.target.applies(rule.owner, side));
    if blocked {
        Legality::Blocked(BlockReason::RearrangeBlocked)
    } else {
        Legality::Allowed
    }
}

/// Deletion protection. Protected cards silently drop out of delete candidate
/// pools instead of producing errors.
pub fn can_delete(state: &GameState, catalog: &Catalog, id: CardId) -> bool {
    let slot = match state.board_slot(id) {
        Some(slot) => slot,
        None => return false,
    };
    let active = active_rules(state, catalog);
    if active
        .card_props(id)
        .any(|prop| prop == CardProperty::CannotBeDeleted)
    {
        return false;
    }
    !active.has_rule(RuleKind::ProtectDelete, slot.lane, slot.side)
}

/// Whether middle commands of cards owned by `owner` in `lane` are ignored.
pub fn is_command_ignored(state: &GameState, catalog: &Catalog, lane: usize, owner: Side) -> bool {
    active_rules(state, catalog).has_rule(RuleKind::IgnoreCommands, lane, owner)
}
