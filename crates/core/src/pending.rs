//! Pending input requests and the continuation queue. At most one
//! `PendingAction` exists at a time; everything else waits in the queue as
//! `QueuedStep`s and is re-validated against live state when it surfaces.

use crate::cards::{CardId, Side};
use crate::effect::{ActionDef, ChoiceBy, EffectCtx};
use crate::filter::{CardFilter, LaneReq};
use serde::{Deserialize, Serialize};

/// What happens to a board card once it is selected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardPurpose {
    Delete,
    Flip,
    Return,
    Reveal,
    /// Selection is followed by a lane choice for the destination.
    Shift { dest: LaneReq, chooser: ChoiceBy },
}

impl CardPurpose {
    pub fn label(self) -> &'static str {
        match self {
            CardPurpose::Delete => "delete",
            CardPurpose::Flip => "flip",
            CardPurpose::Return => "return",
            CardPurpose::Reveal => "reveal",
            CardPurpose::Shift { .. } => "shift",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LanePurpose {
    /// Destination for a previously selected card.
    ShiftCard { card: CardId },
    PlayTop { deck: Side, face_up: bool },
    SwapFirst { side: Side },
    SwapSecond { side: Side, first: usize },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HandPurpose {
    Discard,
    Give,
}

/// Collect one or more board cards matching a filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectCard {
    pub ctx: EffectCtx,
    pub purpose: CardPurpose,
    pub filter: CardFilter,
    /// Cards still to collect, including the one this request asks for.
    pub remaining: u32,
    /// Already consumed by earlier steps of the same action.
    pub used: Vec<CardId>,
    pub optional: bool,
    /// Actions chained after the full selection completes.
    pub then: Vec<ActionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectLane {
    pub ctx: EffectCtx,
    pub purpose: LanePurpose,
    /// Legal at request time; legality is recomputed on submission.
    pub allowed: Vec<usize>,
    pub optional: bool,
    pub then: Vec<ActionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectHandCard {
    pub ctx: EffectCtx,
    pub purpose: HandPurpose,
    /// Whose hand is picked from; always the actor's own hand.
    pub side: Side,
    pub remaining: u32,
    pub optional: bool,
    pub then: Vec<ActionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ChoiceEffect {
    Actions(Vec<ActionDef>),
    /// Apply a purpose to a card already fixed by the effect text, as in
    /// "you may flip that card".
    ApplyCard { purpose: CardPurpose, card: CardId },
    CompileLane(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOption {
    pub label: String,
    pub effect: ChoiceEffect,
}

/// Pick one option from a fixed list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    pub ctx: EffectCtx,
    pub options: Vec<ChoiceOption>,
    pub then: Vec<ActionDef>,
}

/// Reorder one side's protocol assignments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rearrange {
    pub ctx: EffectCtx,
    /// Side whose protocols are reordered (the actor still chooses the order).
    pub side: Side,
    pub then: Vec<ActionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PendingAction {
    SelectCard(SelectCard),
    SelectLane(SelectLane),
    SelectHandCard(SelectHandCard),
    Choice(Choice),
    Rearrange(Rearrange),
}

impl PendingAction {
    pub fn ctx(&self) -> &EffectCtx {
        match self {
            PendingAction::SelectCard(p) => &p.ctx,
            PendingAction::SelectLane(p) => &p.ctx,
            PendingAction::SelectHandCard(p) => &p.ctx,
            PendingAction::Choice(p) => &p.ctx,
            PendingAction::Rearrange(p) => &p.ctx,
        }
    }

    pub fn actor(&self) -> Side {
        self.ctx().actor
    }

    pub fn source(&self) -> CardId {
        self.ctx().source
    }

    pub(crate) fn then_mut(&mut self) -> &mut Vec<ActionDef> {
        match self {
            PendingAction::SelectCard(p) => &mut p.then,
            PendingAction::SelectLane(p) => &mut p.then,
            PendingAction::SelectHandCard(p) => &mut p.then,
            PendingAction::Choice(p) => &mut p.then,
            PendingAction::Rearrange(p) => &mut p.then,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            PendingAction::SelectCard(p) => p.optional,
            PendingAction::SelectLane(p) => p.optional,
            PendingAction::SelectHandCard(p) => p.optional,
            PendingAction::Choice(_) => false,
            PendingAction::Rearrange(_) => false,
        }
    }
}

/// A player's answer to the outstanding `PendingAction`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TargetChoice {
    Card(CardId),
    Lane(usize),
    HandCard(CardId),
    Option(usize),
    /// New protocol order for a rearrange; `order[new_lane] = old_lane`.
    Order(Vec<usize>),
    /// Skip an optional request, dropping its chained continuation.
    Decline,
}

/// Turn sequencing steps driven through the queue so that any of them can be
/// suspended by player input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PhaseStep {
    StartTriggers,
    CheckCompile,
    EnterMain,
    EndTriggers,
    HandLimit,
    PassTurn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StepKind {
    /// Run one card slot's effects for the trigger in `ctx`. Eligibility is
    /// recomputed when the step surfaces; a stale step is skipped with a log
    /// line rather than an error. `subject` is the side whose action a
    /// reactive trigger answered.
    RunSlot { subject: Option<Side> },
    /// Interpret a list of actions, usually the tail of a chained effect.
    Actions {
        actions: Vec<ActionDef>,
        prev: Option<CardId>,
    },
    /// Remainder of a multi-step selection that cascade work displaced.
    Reissue(Box<PendingAction>),
    Phase(PhaseStep),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedStep {
    pub ctx: EffectCtx,
    pub kind: StepKind,
}
