//! Target filter vocabulary shared by the interpreter, the built-in effect
//! registry and the passive rule engine. Filters are pure data; candidate
//! lists are recomputed from live state on every query so that mid-resolution
//! board changes are always reflected.

use crate::cards::{CardId, Side};
use crate::effect::EffectCtx;
use crate::engine::Catalog;
use crate::passive;
use crate::state::{GameState, StatKind};
use serde::{Deserialize, Serialize};

/// Ownership requirement, relative to the effect owner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OwnerReq {
    #[default]
    Any,
    Own,
    Opponent,
}

impl OwnerReq {
    pub fn matches(self, owner: Side, candidate: Side) -> bool {
        match self {
            OwnerReq::Any => true,
            OwnerReq::Own => candidate == owner,
            OwnerReq::Opponent => candidate == owner.flip(),
        }
    }
}

/// A concrete side chosen relative to the effect owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Who {
    Own,
    Opponent,
}

impl Who {
    pub fn resolve(self, owner: Side) -> Side {
        match self {
            Who::Own => owner,
            Who::Opponent => owner.flip(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoverReq {
    #[default]
    Any,
    Covered,
    Uncovered,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FaceReq {
    #[default]
    Any,
    Up,
    Down,
}

/// Lane requirement, relative to a reference lane. For filters the reference
/// is the effect source's lane. For shift destinations `Same` points at the
/// effect source's lane and `Other` at any lane but the moved card's own.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LaneReq {
    #[default]
    Any,
    Same,
    Other,
}

impl LaneReq {
    pub fn matches(self, reference: usize, lane: usize) -> bool {
        match self {
            LaneReq::Any => true,
            LaneReq::Same => lane == reference,
            LaneReq::Other => lane != reference,
        }
    }
}

/// Value requirement against effective values. `Highest`/`Lowest` narrow the
/// candidate pool after all other constraints; ties keep every tied card.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub enum ValueReq {
    #[default]
    Any,
    AtLeast(i32),
    AtMost(i32),
    Exactly(i32),
    Highest,
    Lowest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardFilter {
    #[serde(default)]
    pub owner: OwnerReq,
    #[serde(default)]
    pub cover: CoverReq,
    #[serde(default)]
    pub face: FaceReq,
    #[serde(default)]
    pub lanes: LaneReq,
    #[serde(default)]
    pub value: ValueReq,
    /// Require the candidate's protocol to match (or mismatch) one of the two
    /// protocols assigned to its own lane.
    #[serde(default)]
    pub matches_protocol: Option<bool>,
    /// Exclude the effect source itself from the candidate pool.
    #[serde(default)]
    pub exclude_source: bool,
}

impl CardFilter {
    pub fn own(face: FaceReq) -> Self {
        Self {
            owner: OwnerReq::Own,
            face,
            ..Self::default()
        }
    }

    pub fn opponent(face: FaceReq) -> Self {
        Self {
            owner: OwnerReq::Opponent,
            face,
            ..Self::default()
        }
    }

    fn matches_basic(
        &self,
        state: &GameState,
        catalog: &Catalog,
        ctx: &EffectCtx,
        id: CardId,
    ) -> bool {
        let slot = match state.board_slot(id) {
            Some(slot) => slot,
            None => return false,
        };
        if self.exclude_source && id == ctx.source {
            return false;
        }
        if !self.owner.matches(ctx.owner, slot.side) {
            return false;
        }
        if !self.lanes.matches(ctx.lane, slot.lane) {
            return false;
        }
        let uncovered = state.is_uncovered(slot);
        match self.cover {
            CoverReq::Any => {}
            CoverReq::Covered if uncovered => return false,
            CoverReq::Uncovered if !uncovered => return false,
            _ => {}
        }
        let card = &state.side(slot.side).lanes[slot.lane][slot.index];
        match self.face {
            FaceReq::Any => {}
            FaceReq::Up if !card.face_up => return false,
            FaceReq::Down if card.face_up => return false,
            _ => {}
        }
        if let Some(want_match) = self.matches_protocol {
            let lane_protocols = [
                state.player.protocols[slot.lane].as_str(),
                state.opponent.protocols[slot.lane].as_str(),
            ];
            let is_match = lane_protocols.contains(&card.protocol.as_str());
            if is_match != want_match {
                return false;
            }
        }
        let value = passive::effective_value(state, catalog, id);
        match self.value {
            ValueReq::Any | ValueReq::Highest | ValueReq::Lowest => true,
            ValueReq::AtLeast(min) => value >= min,
            ValueReq::AtMost(max) => value <= max,
            ValueReq::Exactly(want) => value == want,
        }
    }

    /// All board cards satisfying the filter, in stable board order: active
    /// side first, then lane, then bottom to top. `exclude` removes ids that
    /// a multi-step action already consumed.
    pub fn candidates(
        &self,
        state: &GameState,
        catalog: &Catalog,
        ctx: &EffectCtx,
        exclude: &[CardId],
    ) -> Vec<CardId> {
        let mut found = Vec::new();
        for side in [state.turn, state.turn.flip()] {
            for stack in &state.side(side).lanes {
                for card in stack {
                    if exclude.contains(&card.id) {
                        continue;
                    }
                    if self.matches_basic(state, catalog, ctx, card.id) {
                        found.push(card.id);
                    }
                }
            }
        }
        match self.value {
            ValueReq::Highest => keep_extremum(state, catalog, found, true),
            ValueReq::Lowest => keep_extremum(state, catalog, found, false),
            _ => found,
        }
    }

    /// Membership check against a freshly computed candidate list. Used to
    /// re-validate player submissions after the board may have changed.
    pub fn allows(
        &self,
        state: &GameState,
        catalog: &Catalog,
        ctx: &EffectCtx,
        exclude: &[CardId],
        id: CardId,
    ) -> bool {
        self.candidates(state, catalog, ctx, exclude).contains(&id)
    }
}

fn keep_extremum(
    state: &GameState,
    catalog: &Catalog,
    ids: Vec<CardId>,
    highest: bool,
) -> Vec<CardId> {
    let best = ids
        .iter()
        .map(|id| passive::effective_value(state, catalog, *id));
    let best = if highest { best.max() } else { best.min() };
    match best {
        Some(best) => ids
            .into_iter()
            .filter(|id| passive::effective_value(state, catalog, *id) == best)
            .collect(),
        None => ids,
    }
}

/// What a targeting action aims at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TargetBase {
    /// Choose from the board by filter.
    Choose(CardFilter),
    /// The card resolved by the previous action in the same chain.
    Prev,
    /// The effect source itself.
    This,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetSpec {
    pub base: TargetBase,
    #[serde(default = "default_count")]
    pub count: u32,
    /// "You may" actions accept a decline instead of a selection.
    #[serde(default)]
    pub optional: bool,
}

impl TargetSpec {
    pub fn choose(filter: CardFilter) -> Self {
        Self {
            base: TargetBase::Choose(filter),
            count: 1,
            optional: false,
        }
    }

    pub fn this() -> Self {
        Self {
            base: TargetBase::This,
            count: 1,
            optional: false,
        }
    }

    pub fn prev() -> Self {
        Self {
            base: TargetBase::Prev,
            count: 1,
            optional: false,
        }
    }

    pub fn may(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn times(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// Counted quantity, resolved against live state when the action runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Amount {
    Fixed(u32),
    /// One per board card matching the filter at resolution time.
    PerMatching(CardFilter),
    /// One per action of the given kind taken by the effect owner this turn.
    PerStat(StatKind),
}

impl Amount {
    pub fn resolve(&self, state: &GameState, catalog: &Catalog, ctx: &EffectCtx) -> u32 {
        match self {
            Amount::Fixed(n) => *n,
            Amount::PerMatching(filter) => {
                filter.candidates(state, catalog, ctx, &[]).len() as u32
            }
            Amount::PerStat(kind) => state.side(ctx.owner).stats.get(*kind),
        }
    }
}
