//! The compiled-in protocol set. Each table entry couples a card to the
//! effect functions it dispatches and the standing rules it projects while
//! showing. The functions bottom out in the same action vocabulary the
//! scripted loader produces, so built-in and scripted cards resolve through
//! one pipeline; the difference is that built-in sources always prompt when
//! more than zero targets exist.

use super::{interpreter, Engine};
use crate::cards::EffectSlot;
use crate::effect::{
    ActionDef, CardProperty, ChoiceArm, ChoiceBy, EffectCtx, EffectFlow, RuleKind, RuleScope,
    RuleTarget, TriggerKind, ValueModOp,
};
use crate::events::EventBus;
use crate::filter::{Amount, CardFilter, FaceReq, LaneReq, OwnerReq, TargetSpec, ValueReq, Who};
use crate::state::StatKind;

pub(crate) type BuiltinFn = fn(&mut Engine, &EffectCtx, &mut EventBus) -> EffectFlow;

/// One dispatchable effect of a compiled-in card.
pub(crate) struct BuiltinSlot {
    pub slot: EffectSlot,
    pub trigger: TriggerKind,
    /// For reactive triggers: whose action is listened to, relative to the
    /// card owner.
    pub on: OwnerReq,
    pub run: BuiltinFn,
}

impl BuiltinSlot {
    const fn middle(run: BuiltinFn) -> Self {
        Self {
            slot: EffectSlot::Middle,
            trigger: TriggerKind::OnPlay,
            on: OwnerReq::Any,
            run,
        }
    }

    const fn top(trigger: TriggerKind, run: BuiltinFn) -> Self {
        Self {
            slot: EffectSlot::Top,
            trigger,
            on: OwnerReq::Any,
            run,
        }
    }

    const fn bottom(trigger: TriggerKind, run: BuiltinFn) -> Self {
        Self {
            slot: EffectSlot::Bottom,
            trigger,
            on: OwnerReq::Any,
            run,
        }
    }

    const fn on(mut self, on: OwnerReq) -> Self {
        self.on = on;
        self
    }
}

/// Standing rules, value modifiers and markers a compiled-in card projects
/// while the named slot is showing.
pub(crate) struct PassiveDecl {
    pub slot: EffectSlot,
    pub rules: &'static [(RuleKind, RuleScope, RuleTarget)],
    pub mods: &'static [(ValueModOp, FaceReq, RuleScope, RuleTarget)],
    pub props: &'static [CardProperty],
}

impl PassiveDecl {
    const fn top() -> Self {
        Self {
            slot: EffectSlot::Top,
            rules: &[],
            mods: &[],
            props: &[],
        }
    }

    const fn bottom() -> Self {
        Self {
            slot: EffectSlot::Bottom,
            rules: &[],
            mods: &[],
            props: &[],
        }
    }

    const fn rules(mut self, rules: &'static [(RuleKind, RuleScope, RuleTarget)]) -> Self {
        self.rules = rules;
        self
    }

    const fn mods(mut self, mods: &'static [(ValueModOp, FaceReq, RuleScope, RuleTarget)]) -> Self {
        self.mods = mods;
        self
    }

    const fn props(mut self, props: &'static [CardProperty]) -> Self {
        self.props = props;
        self
    }
}

pub(crate) const PROTOCOLS: [(&str, &str); 12] = [
    ("Fire", "#e03131"),
    ("Water", "#1c7ed6"),
    ("Life", "#2f9e44"),
    ("Death", "#343a40"),
    ("Light", "#f08c00"),
    ("Darkness", "#6741d9"),
    ("Metal", "#868e96"),
    ("Plague", "#82c91e"),
    ("Psychic", "#d6336c"),
    ("Speed", "#fab005"),
    ("Gravity", "#7048e8"),
    ("Spirit", "#0ca678"),
];

pub(crate) fn slots(protocol: &str, value: i32) -> &'static [BuiltinSlot] {
    lookup(REGISTRY, protocol, value)
}

pub(crate) fn passive_decls(protocol: &str, value: i32) -> &'static [PassiveDecl] {
    lookup(PASSIVES, protocol, value)
}

fn lookup<T>(
    table: &'static [(&'static str, i32, &'static [T])],
    protocol: &str,
    value: i32,
) -> &'static [T] {
    table
        .iter()
        .find(|(name, v, _)| *name == protocol && *v == value)
        .map_or(&[], |(_, _, entries)| *entries)
}

/// Dispatchable effects. Cards without an entry here are vanilla; Death-0 has
/// no listed effect either, its self-delete on flip is handled in the flip
/// path itself.
static REGISTRY: &[(&str, i32, &[BuiltinSlot])] = &[
    // Fire-0: Discard 1 card, then draw 2.
    ("Fire", 0, &[BuiltinSlot::middle(fire_0)]),
    // Fire-1: Delete 1 face-down card.
    ("Fire", 1, &[BuiltinSlot::middle(fire_1)]),
    // Fire-2: Flip 1 other card. When this card flips face-up, draw 1.
    (
        "Fire",
        2,
        &[
            BuiltinSlot::middle(fire_2),
            BuiltinSlot::top(TriggerKind::OnFlip, draw_one),
        ],
    ),
    // Fire-3: Delete 1 card with value 2 or less.
    ("Fire", 3, &[BuiltinSlot::middle(fire_3)]),
    // Fire-4: Delete 1 of your cards and draw 3, or draw 1.
    ("Fire", 4, &[BuiltinSlot::middle(fire_4)]),
    // Water-0: Flip 1 other card, then shift that card.
    ("Water", 0, &[BuiltinSlot::middle(water_0)]),
    // Water-1: Return 1 card. After your opponent discards, draw 1.
    (
        "Water",
        1,
        &[
            BuiltinSlot::middle(water_1),
            BuiltinSlot::bottom(TriggerKind::AfterDiscard, draw_one).on(OwnerReq::Opponent),
        ],
    ),
    // Water-2: When this card is covered, draw 1.
    ("Water", 2, &[BuiltinSlot::bottom(TriggerKind::OnCover, draw_one)]),
    // Water-3: Flip 2 other cards. After an opponent card flips, draw 1.
    (
        "Water",
        3,
        &[
            BuiltinSlot::middle(water_3),
            BuiltinSlot::top(TriggerKind::AfterFlip, draw_one).on(OwnerReq::Opponent),
        ],
    ),
    // Life-0: Draw 1 for each of your face-down cards.
    ("Life", 0, &[BuiltinSlot::middle(life_0)]),
    // Life-1: Play the top card of your deck face-down in this line.
    ("Life", 1, &[BuiltinSlot::middle(life_1)]),
    // Life-3: Draw 2, then discard 1.
    ("Life", 3, &[BuiltinSlot::middle(life_3)]),
    // Life-4: At the start of your turn, draw 1.
    (
        "Life",
        4,
        &[BuiltinSlot::bottom(TriggerKind::StartOfTurn, draw_one)],
    ),
    // Death-1: Delete 1 other card, then delete this card.
    ("Death", 1, &[BuiltinSlot::middle(death_1)]),
    // Death-2: Delete the highest value opponent card. After any card is
    // deleted, draw 1.
    (
        "Death",
        2,
        &[
            BuiltinSlot::middle(death_2),
            BuiltinSlot::top(TriggerKind::AfterDelete, draw_one),
        ],
    ),
    // Death-3: In each line, delete the lowest value card.
    ("Death", 3, &[BuiltinSlot::middle(death_3)]),
    // Death-4: When this card is covered, delete it.
    (
        "Death",
        4,
        &[BuiltinSlot::bottom(TriggerKind::OnCover, delete_self)],
    ),
    // Light-0: Reveal 2 opponent face-down cards.
    ("Light", 0, &[BuiltinSlot::middle(light_0)]),
    // Light-1: Flip 1 of your face-down cards.
    ("Light", 1, &[BuiltinSlot::middle(light_1)]),
    // Light-3: Draw 1 for each of your cards deleted this turn.
    ("Light", 3, &[BuiltinSlot::middle(light_3)]),
    // Light-4: At the end of your turn, reveal 1 opponent face-down card.
    (
        "Light",
        4,
        &[BuiltinSlot::bottom(TriggerKind::EndOfTurn, light_4)],
    ),
    // Darkness-0: Flip 1 opponent face-up card face-down.
    ("Darkness", 0, &[BuiltinSlot::middle(darkness_0)]),
    // Darkness-1: Play the top card of your deck face-down in another line.
    ("Darkness", 1, &[BuiltinSlot::middle(darkness_1)]),
    // Darkness-3: Shift 1 of your face-down cards.
    ("Darkness", 3, &[BuiltinSlot::middle(darkness_3)]),
    // Metal-3: Delete 1 other card in this line.
    ("Metal", 3, &[BuiltinSlot::middle(metal_3)]),
    // Plague-0: Your opponent discards 2 cards.
    ("Plague", 0, &[BuiltinSlot::middle(plague_0)]),
    // Plague-1: Your opponent discards 1 card at random.
    ("Plague", 1, &[BuiltinSlot::middle(plague_1)]),
    // Plague-2: After your opponent draws, they discard 1 card.
    (
        "Plague",
        2,
        &[BuiltinSlot::bottom(TriggerKind::AfterDraw, plague_2).on(OwnerReq::Opponent)],
    ),
    // Plague-3: Each player discards 1 card.
    ("Plague", 3, &[BuiltinSlot::middle(plague_3)]),
    // Psychic-0: Your opponent discards 1 card, then shift 1 opponent card;
    // its owner picks the destination.
    ("Psychic", 0, &[BuiltinSlot::middle(psychic_0)]),
    // Psychic-1: Reveal 1 opponent face-down card. You may flip that card.
    ("Psychic", 1, &[BuiltinSlot::middle(psychic_1)]),
    // Psychic-2: Rearrange your opponent's protocols.
    ("Psychic", 2, &[BuiltinSlot::middle(psychic_2)]),
    // Psychic-4: Swap 2 of your protocols.
    ("Psychic", 4, &[BuiltinSlot::middle(psychic_4)]),
    // Speed-0: At the start of your turn, you may shift this card.
    (
        "Speed",
        0,
        &[BuiltinSlot::bottom(TriggerKind::StartOfTurn, speed_0)],
    ),
    // Speed-1: Shift 1 of your cards.
    ("Speed", 1, &[BuiltinSlot::middle(speed_1)]),
    // Speed-2: Shift 1 opponent card. After one of your cards shifts, draw 1.
    (
        "Speed",
        2,
        &[
            BuiltinSlot::middle(speed_2),
            BuiltinSlot::top(TriggerKind::AfterShift, draw_one).on(OwnerReq::Own),
        ],
    ),
    // Speed-3: Draw 1 for each of your cards that shifted this turn.
    ("Speed", 3, &[BuiltinSlot::middle(speed_3)]),
    // Speed-4: When this card is covered, shift it.
    (
        "Speed",
        4,
        &[BuiltinSlot::bottom(TriggerKind::OnCover, speed_4)],
    ),
    // Gravity-0: Shift 1 card into this line.
    ("Gravity", 0, &[BuiltinSlot::middle(gravity_0)]),
    // Gravity-2: Shift 1 opponent card into this line.
    ("Gravity", 2, &[BuiltinSlot::middle(gravity_2)]),
    // Gravity-3: Shift 1 of your cards into this line, or draw 2.
    ("Gravity", 3, &[BuiltinSlot::middle(gravity_3)]),
    // Spirit-0: Take 1 random card from your opponent's hand.
    ("Spirit", 0, &[BuiltinSlot::middle(spirit_0)]),
    // Spirit-1: Give 1 card to your opponent, then draw 2.
    ("Spirit", 1, &[BuiltinSlot::middle(spirit_1)]),
    // Spirit-2: Return 1 of your cards to your hand.
    ("Spirit", 2, &[BuiltinSlot::middle(spirit_2)]),
    // Spirit-3: Give 1 card at random, or discard 2 cards.
    ("Spirit", 3, &[BuiltinSlot::middle(spirit_3)]),
];

/// Standing rules and modifiers.
static PASSIVES: &[(&str, i32, &[PassiveDecl])] = &[
    // Water-4: Your opponent cannot flip cards in this line.
    (
        "Water",
        4,
        &[PassiveDecl::top().rules(&[(
            RuleKind::BlockFlip,
            RuleScope::ThisLane,
            RuleTarget::Opponent,
        )])],
    ),
    // Life-2: Your face-down cards in this line count 1 higher.
    (
        "Life",
        2,
        &[PassiveDecl::top().mods(&[(
            ValueModOp::Add(1),
            FaceReq::Down,
            RuleScope::ThisLane,
            RuleTarget::Own,
        )])],
    ),
    // Life-4: You may play cards of any protocol face-up in this line.
    (
        "Life",
        4,
        &[PassiveDecl::top().rules(&[(
            RuleKind::AllowAnyProtocol,
            RuleScope::ThisLane,
            RuleTarget::Own,
        )])],
    ),
    // Darkness-0: Cards played face-up in this line must not match a
    // protocol of the line.
    (
        "Darkness",
        0,
        &[PassiveDecl::top().rules(&[(
            RuleKind::RequireMismatch,
            RuleScope::ThisLane,
            RuleTarget::All,
        )])],
    ),
    // Darkness-2: All your face-down cards count 1 higher.
    (
        "Darkness",
        2,
        &[PassiveDecl::top().mods(&[(
            ValueModOp::Add(1),
            FaceReq::Down,
            RuleScope::Global,
            RuleTarget::Own,
        )])],
    ),
    // Darkness-4: Cards cannot be played face-up in this line.
    (
        "Darkness",
        4,
        &[PassiveDecl::top().rules(&[(
            RuleKind::BlockFaceUpPlay,
            RuleScope::ThisLane,
            RuleTarget::All,
        )])],
    ),
    // Metal-0: While uncovered, this card cannot be deleted.
    (
        "Metal",
        0,
        &[PassiveDecl::bottom().props(&[CardProperty::CannotBeDeleted])],
    ),
    // Metal-1: Your opponent cannot play cards face-down in this line.
    (
        "Metal",
        1,
        &[PassiveDecl::top().rules(&[(
            RuleKind::BlockFaceDownPlay,
            RuleScope::ThisLane,
            RuleTarget::Opponent,
        )])],
    ),
    // Metal-2: Your opponent cannot shift cards into this line.
    (
        "Metal",
        2,
        &[PassiveDecl::top().rules(&[(
            RuleKind::BlockShiftInto,
            RuleScope::ThisLane,
            RuleTarget::Opponent,
        )])],
    ),
    // Metal-4: Your opponent cannot shift cards out of this line.
    (
        "Metal",
        4,
        &[PassiveDecl::top().rules(&[(
            RuleKind::BlockShiftOutOf,
            RuleScope::ThisLane,
            RuleTarget::Opponent,
        )])],
    ),
    // Light-2: Your face-up cards in this line count 1 higher.
    (
        "Light",
        2,
        &[PassiveDecl::top().mods(&[(
            ValueModOp::Add(1),
            FaceReq::Up,
            RuleScope::ThisLane,
            RuleTarget::Own,
        )])],
    ),
    // Plague-4: This card counts as 1. Your cards in this line cannot be
    // deleted.
    (
        "Plague",
        4,
        &[PassiveDecl::top()
            .rules(&[(
                RuleKind::ProtectDelete,
                RuleScope::ThisLane,
                RuleTarget::Own,
            )])
            .props(&[CardProperty::ValueIs(1)])],
    ),
    // Psychic-3: Your opponent's middle commands in this line do not fire.
    (
        "Psychic",
        3,
        &[PassiveDecl::top().rules(&[(
            RuleKind::IgnoreCommands,
            RuleScope::ThisLane,
            RuleTarget::Opponent,
        )])],
    ),
    // Gravity-1: This card cannot be flipped. Cards cannot be shifted out of
    // this line.
    (
        "Gravity",
        1,
        &[PassiveDecl::top()
            .rules(&[(
                RuleKind::BlockShiftOutOf,
                RuleScope::ThisLane,
                RuleTarget::All,
            )])
            .props(&[CardProperty::CannotBeFlipped])],
    ),
    // Gravity-2: Your opponent cannot rearrange protocols.
    (
        "Gravity",
        2,
        &[PassiveDecl::top().rules(&[(
            RuleKind::BlockRearrange,
            RuleScope::Global,
            RuleTarget::Opponent,
        )])],
    ),
    // Gravity-4: Face-down cards in this line count 3.
    (
        "Gravity",
        4,
        &[PassiveDecl::top().mods(&[(
            ValueModOp::Set(3),
            FaceReq::Down,
            RuleScope::ThisLane,
            RuleTarget::All,
        )])],
    ),
    // Spirit-4: Opponent face-up cards in this line count 1 lower.
    (
        "Spirit",
        4,
        &[PassiveDecl::top().mods(&[(
            ValueModOp::Add(-1),
            FaceReq::Up,
            RuleScope::ThisLane,
            RuleTarget::Opponent,
        )])],
    ),
];

fn run(
    engine: &mut Engine,
    ctx: &EffectCtx,
    actions: Vec<ActionDef>,
    events: &mut EventBus,
) -> EffectFlow {
    interpreter::run_actions(engine, ctx, &actions, None, events)
}

/// Shared by every "draw 1" trigger in the table.
fn draw_one(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Draw {
            who: Who::Own,
            amount: Amount::Fixed(1),
        }],
        events,
    )
}

fn delete_self(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Delete {
            target: TargetSpec::this(),
        }],
        events,
    )
}

fn fire_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Discard {
                who: Who::Own,
                amount: Amount::Fixed(1),
                random: false,
            },
            ActionDef::Draw {
                who: Who::Own,
                amount: Amount::Fixed(2),
            },
        ],
        events,
    )
}

fn fire_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Delete {
            target: TargetSpec::choose(CardFilter {
                face: FaceReq::Down,
                ..CardFilter::default()
            }),
        }],
        events,
    )
}

fn fire_2(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Flip {
            target: TargetSpec::choose(CardFilter {
                exclude_source: true,
                ..CardFilter::default()
            }),
        }],
        events,
    )
}

fn fire_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Delete {
            target: TargetSpec::choose(CardFilter {
                value: ValueReq::AtMost(2),
                ..CardFilter::default()
            }),
        }],
        events,
    )
}

fn fire_4(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Either {
            first: ChoiceArm {
                label: "Delete 1 of your cards, then draw 3".to_string(),
                actions: vec![
                    ActionDef::Delete {
                        target: TargetSpec::choose(CardFilter::own(FaceReq::Any)),
                    },
                    ActionDef::Draw {
                        who: Who::Own,
                        amount: Amount::Fixed(3),
                    },
                ],
            },
            second: ChoiceArm {
                label: "Draw 1".to_string(),
                actions: vec![ActionDef::Draw {
                    who: Who::Own,
                    amount: Amount::Fixed(1),
                }],
            },
        }],
        events,
    )
}

fn water_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Flip {
                target: TargetSpec::choose(CardFilter {
                    exclude_source: true,
                    ..CardFilter::default()
                }),
            },
            ActionDef::Shift {
                target: TargetSpec::prev(),
                dest: LaneReq::Any,
                chooser: ChoiceBy::Actor,
            },
        ],
        events,
    )
}

fn water_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Return {
            target: TargetSpec::choose(CardFilter::default()),
        }],
        events,
    )
}

fn water_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Flip {
            target: TargetSpec::choose(CardFilter {
                exclude_source: true,
                ..CardFilter::default()
            })
            .times(2),
        }],
        events,
    )
}

fn life_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Draw {
            who: Who::Own,
            amount: Amount::PerMatching(CardFilter::own(FaceReq::Down)),
        }],
        events,
    )
}

fn life_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::PlayTop {
            who: Who::Own,
            face_up: false,
            dest: LaneReq::Same,
        }],
        events,
    )
}

fn life_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Draw {
                who: Who::Own,
                amount: Amount::Fixed(2),
            },
            ActionDef::Discard {
                who: Who::Own,
                amount: Amount::Fixed(1),
                random: false,
            },
        ],
        events,
    )
}

fn death_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Delete {
                target: TargetSpec::choose(CardFilter {
                    exclude_source: true,
                    ..CardFilter::default()
                }),
            },
            ActionDef::Delete {
                target: TargetSpec::this(),
            },
        ],
        events,
    )
}

fn death_2(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Delete {
            target: TargetSpec::choose(CardFilter {
                owner: OwnerReq::Opponent,
                value: ValueReq::Highest,
                ..CardFilter::default()
            }),
        }],
        events,
    )
}

fn death_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::EachLane {
            actions: vec![ActionDef::Delete {
                target: TargetSpec::choose(CardFilter {
                    lanes: LaneReq::Same,
                    value: ValueReq::Lowest,
                    ..CardFilter::default()
                }),
            }],
            resume_at: 0,
        }],
        events,
    )
}

fn light_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Reveal {
            target: TargetSpec::choose(CardFilter::opponent(FaceReq::Down)).times(2),
        }],
        events,
    )
}

fn light_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Flip {
            target: TargetSpec::choose(CardFilter::own(FaceReq::Down)),
        }],
        events,
    )
}

fn light_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Draw {
            who: Who::Own,
            amount: Amount::PerStat(StatKind::Deleted),
        }],
        events,
    )
}

fn light_4(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Reveal {
            target: TargetSpec::choose(CardFilter::opponent(FaceReq::Down)),
        }],
        events,
    )
}

fn darkness_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Flip {
            target: TargetSpec::choose(CardFilter::opponent(FaceReq::Up)),
        }],
        events,
    )
}

fn darkness_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::PlayTop {
            who: Who::Own,
            face_up: false,
            dest: LaneReq::Other,
        }],
        events,
    )
}

fn darkness_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Shift {
            target: TargetSpec::choose(CardFilter::own(FaceReq::Down)),
            dest: LaneReq::Any,
            chooser: ChoiceBy::Actor,
        }],
        events,
    )
}

fn metal_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Delete {
            target: TargetSpec::choose(CardFilter {
                lanes: LaneReq::Same,
                exclude_source: true,
                ..CardFilter::default()
            }),
        }],
        events,
    )
}

fn plague_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Discard {
            who: Who::Opponent,
            amount: Amount::Fixed(2),
            random: false,
        }],
        events,
    )
}

fn plague_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Discard {
            who: Who::Opponent,
            amount: Amount::Fixed(1),
            random: true,
        }],
        events,
    )
}

fn plague_2(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Discard {
            who: Who::Opponent,
            amount: Amount::Fixed(1),
            random: false,
        }],
        events,
    )
}

fn plague_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Discard {
                who: Who::Own,
                amount: Amount::Fixed(1),
                random: false,
            },
            ActionDef::Discard {
                who: Who::Opponent,
                amount: Amount::Fixed(1),
                random: false,
            },
        ],
        events,
    )
}

fn psychic_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Discard {
                who: Who::Opponent,
                amount: Amount::Fixed(1),
                random: false,
            },
            ActionDef::Shift {
                target: TargetSpec::choose(CardFilter::opponent(FaceReq::Any)),
                dest: LaneReq::Any,
                chooser: ChoiceBy::CardOwner,
            },
        ],
        events,
    )
}

fn psychic_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Reveal {
                target: TargetSpec::choose(CardFilter::opponent(FaceReq::Down)),
            },
            ActionDef::Flip {
                target: TargetSpec::prev().may(),
            },
        ],
        events,
    )
}

fn psychic_2(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Rearrange { who: Who::Opponent }],
        events,
    )
}

fn psychic_4(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(engine, ctx, vec![ActionDef::Swap { who: Who::Own }], events)
}

fn speed_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Shift {
            target: TargetSpec::this().may(),
            dest: LaneReq::Any,
            chooser: ChoiceBy::Actor,
        }],
        events,
    )
}

fn speed_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Shift {
            target: TargetSpec::choose(CardFilter::own(FaceReq::Any)),
            dest: LaneReq::Any,
            chooser: ChoiceBy::Actor,
        }],
        events,
    )
}

fn speed_2(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Shift {
            target: TargetSpec::choose(CardFilter::opponent(FaceReq::Any)),
            dest: LaneReq::Any,
            chooser: ChoiceBy::Actor,
        }],
        events,
    )
}

fn speed_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Draw {
            who: Who::Own,
            amount: Amount::PerStat(StatKind::Shifted),
        }],
        events,
    )
}

fn speed_4(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Shift {
            target: TargetSpec::this(),
            dest: LaneReq::Any,
            chooser: ChoiceBy::Actor,
        }],
        events,
    )
}

fn gravity_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Shift {
            target: TargetSpec::choose(CardFilter {
                lanes: LaneReq::Other,
                ..CardFilter::default()
            }),
            dest: LaneReq::Same,
            chooser: ChoiceBy::Actor,
        }],
        events,
    )
}

fn gravity_2(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Shift {
            target: TargetSpec::choose(CardFilter {
                owner: OwnerReq::Opponent,
                lanes: LaneReq::Other,
                ..CardFilter::default()
            }),
            dest: LaneReq::Same,
            chooser: ChoiceBy::Actor,
        }],
        events,
    )
}

fn gravity_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Either {
            first: ChoiceArm {
                label: "Shift 1 of your cards into this line".to_string(),
                actions: vec![ActionDef::Shift {
                    target: TargetSpec::choose(CardFilter {
                        owner: OwnerReq::Own,
                        lanes: LaneReq::Other,
                        ..CardFilter::default()
                    }),
                    dest: LaneReq::Same,
                    chooser: ChoiceBy::Actor,
                }],
            },
            second: ChoiceArm {
                label: "Draw 2".to_string(),
                actions: vec![ActionDef::Draw {
                    who: Who::Own,
                    amount: Amount::Fixed(2),
                }],
            },
        }],
        events,
    )
}

fn spirit_0(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(engine, ctx, vec![ActionDef::Take], events)
}

fn spirit_1(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![
            ActionDef::Give { random: false },
            ActionDef::Draw {
                who: Who::Own,
                amount: Amount::Fixed(2),
            },
        ],
        events,
    )
}

fn spirit_2(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Return {
            target: TargetSpec::choose(CardFilter::own(FaceReq::Any)),
        }],
        events,
    )
}

fn spirit_3(engine: &mut Engine, ctx: &EffectCtx, events: &mut EventBus) -> EffectFlow {
    run(
        engine,
        ctx,
        vec![ActionDef::Either {
            first: ChoiceArm {
                label: "Give 1 card at random".to_string(),
                actions: vec![ActionDef::Give { random: true }],
            },
            second: ChoiceArm {
                label: "Discard 2 cards".to_string(),
                actions: vec![ActionDef::Discard {
                    who: Who::Own,
                    amount: Amount::Fixed(2),
                    random: false,
                }],
            },
        }],
        events,
    )
}
