//! The data-driven effect vocabulary. Built-in card functions and scripted
//! card definitions both bottom out in these types, so every card resolves
//! through one pipeline regardless of origin.

use crate::cards::{CardId, EffectSlot, Side};
use crate::filter::{Amount, FaceReq, LaneReq, TargetSpec, Who};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Middle commands: on play, on uncover, and re-run after a flip to face-up.
    OnPlay,
    /// Fires on the card itself when it is flipped face-up.
    OnFlip,
    /// Fires on the card being covered, at the moment it is covered.
    OnCover,
    StartOfTurn,
    EndOfTurn,
    /// Never dispatched; scanned by the passive rule engine.
    Passive,
    AfterDraw,
    AfterDiscard,
    AfterDelete,
    AfterFlip,
    AfterShift,
}

impl TriggerKind {
    /// Reactive triggers respond to something either side did and are
    /// dispatched as a whole-board pass after the mutation.
    pub fn is_reactive(self) -> bool {
        matches!(
            self,
            TriggerKind::AfterDraw
                | TriggerKind::AfterDiscard
                | TriggerKind::AfterDelete
                | TriggerKind::AfterFlip
                | TriggerKind::AfterShift
        )
    }
}

/// Everything an effect needs to know about where it came from. Carried by
/// pending actions and queued steps so a resolution can be picked back up
/// after player input or an interrupt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectCtx {
    pub source: CardId,
    pub owner: Side,
    /// The side making choices for this effect. Differs from `owner` when an
    /// effect forces the other player to act.
    pub actor: Side,
    /// Lane the source occupied when the effect fired. Filters with `Same` or
    /// `Other` lane requirements resolve against this.
    pub lane: usize,
    pub slot: EffectSlot,
    pub trigger: TriggerKind,
}

impl EffectCtx {
    pub fn opponent(&self) -> Side {
        self.owner.flip()
    }

    pub fn for_actor(mut self, actor: Side) -> Self {
        self.actor = actor;
        self
    }
}

/// Standing rule installed by a passive effect while its source stays eligible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RuleKind {
    BlockFaceDownPlay,
    BlockFaceUpPlay,
    /// Face-up plays ignore protocol matching.
    AllowAnyProtocol,
    /// Face-up plays must NOT match a lane protocol.
    RequireMismatch,
    BlockFlip,
    BlockShiftInto,
    BlockShiftOutOf,
    BlockRearrange,
    /// Middle commands of affected cards are skipped entirely.
    IgnoreCommands,
    /// Affected cards cannot be chosen for deletion.
    ProtectDelete,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleScope {
    #[default]
    Global,
    /// The lane the rule source currently occupies.
    ThisLane,
}

/// Which side a rule or value modifier bears on, relative to the rule owner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleTarget {
    #[default]
    All,
    Own,
    Opponent,
}

impl RuleTarget {
    pub fn applies(self, owner: Side, side: Side) -> bool {
        match self {
            RuleTarget::All => true,
            RuleTarget::Own => side == owner,
            RuleTarget::Opponent => side == owner.flip(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueModOp {
    Add(i32),
    Set(i32),
}

/// Marker granted to the source card itself by a passive effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardProperty {
    CannotBeDeleted,
    CannotBeFlipped,
    ValueIs(i32),
}

/// Who picks the card and destination of a shift.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChoiceBy {
    /// The effect's acting side chooses.
    #[default]
    Actor,
    /// The owner of the shifted card chooses, interrupting if necessary.
    CardOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceArm {
    pub label: String,
    pub actions: Vec<ActionDef>,
}

/// One step of card behavior. Targeting steps either resolve immediately or
/// raise a pending input request; the rest mutate and continue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ActionDef {
    Draw {
        who: Who,
        amount: Amount,
    },
    Discard {
        who: Who,
        amount: Amount,
        #[serde(default)]
        random: bool,
    },
    Flip {
        target: TargetSpec,
    },
    Delete {
        target: TargetSpec,
    },
    /// Send a board card back to its owner's hand.
    Return {
        target: TargetSpec,
    },
    Shift {
        target: TargetSpec,
        #[serde(default)]
        dest: LaneReq,
        #[serde(default)]
        chooser: ChoiceBy,
    },
    Reveal {
        target: TargetSpec,
    },
    /// Play the top card of a deck without looking at it.
    PlayTop {
        who: Who,
        face_up: bool,
        #[serde(default)]
        dest: LaneReq,
    },
    /// Hand a card from the owner's hand to the opponent's.
    Give {
        #[serde(default)]
        random: bool,
    },
    /// Take a random card from the opponent's hand.
    Take,
    Rearrange {
        who: Who,
    },
    /// Swap two of the target side's protocol assignments.
    Swap {
        who: Who,
    },
    Rule {
        kind: RuleKind,
        #[serde(default)]
        scope: RuleScope,
        #[serde(default)]
        target: RuleTarget,
    },
    ValueMod {
        op: ValueModOp,
        #[serde(default)]
        face: FaceReq,
        #[serde(default)]
        scope: RuleScope,
        #[serde(default)]
        target: RuleTarget,
    },
    Property {
        prop: CardProperty,
    },
    Either {
        first: ChoiceArm,
        second: ChoiceArm,
    },
    /// Run the inner actions once per lane, left to right. `resume_at` is
    /// only set internally when a prompt suspends the sweep partway.
    EachLane {
        actions: Vec<ActionDef>,
        #[serde(default)]
        resume_at: usize,
    },
}

impl ActionDef {
    /// Passive payloads only make sense under a `Passive` trigger; the loader
    /// rejects them anywhere else.
    pub fn is_passive_payload(&self) -> bool {
        matches!(
            self,
            ActionDef::Rule { .. } | ActionDef::ValueMod { .. } | ActionDef::Property { .. }
        )
    }
}

/// One effect block as authored on a card slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectDef {
    pub trigger: TriggerKind,
    /// For reactive triggers: whose action the effect listens to, relative to
    /// the card owner.
    #[serde(default)]
    pub on: crate::filter::OwnerReq,
    pub actions: Vec<ActionDef>,
}

impl EffectDef {
    pub fn new(trigger: TriggerKind, actions: Vec<ActionDef>) -> Self {
        Self {
            trigger,
            on: crate::filter::OwnerReq::Any,
            actions,
        }
    }

    /// Replacement for definitions that fail load-time validation. Keeps the
    /// card playable while doing nothing when dispatched.
    pub fn no_op(trigger: TriggerKind) -> Self {
        Self::new(trigger, Vec::new())
    }
}

/// Outcome of running an effect block or a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectFlow {
    Done,
    /// A pending input request was installed; resolution continues from the
    /// queue once it is answered.
    Waiting,
}
