use mainline_core::{
    ActionDef, Amount, Card, CardEffects, CardFilter, CardId, Catalog, ChoiceArm, ChoiceBy,
    CoverReq, EffectDef, Engine, EngineError, EventBus, FaceReq, GameConfig, GameSetup, LaneReq,
    OwnerReq, PendingAction, Phase, ScriptedEffects, Side, StatKind, TargetChoice, TargetSpec,
    TriggerKind, Who,
};
use pretty_assertions::assert_eq;

fn new_game(seed: u64) -> (Engine, EventBus) {
    let setup = GameSetup {
        player: ["Fire", "Water", "Life"].iter().map(|s| s.to_string()).collect(),
        opponent: ["Death", "Speed", "Metal"].iter().map(|s| s.to_string()).collect(),
    };
    let mut engine =
        Engine::new(GameConfig::default(), Catalog::builtin(), setup, seed).expect("new engine");
    let mut events = EventBus::default();
    engine.begin(&mut events).expect("begin");
    (engine, events)
}

fn vanilla(protocol: &str, value: i32) -> Card {
    Card::new(protocol, value, CardEffects::Builtin)
}

fn scripted_on_play(protocol: &str, value: i32, actions: Vec<ActionDef>) -> Card {
    scripted_with(
        protocol,
        value,
        ScriptedEffects {
            middle: vec![EffectDef::new(TriggerKind::OnPlay, actions)],
            ..ScriptedEffects::default()
        },
    )
}

fn scripted_with(protocol: &str, value: i32, effects: ScriptedEffects) -> Card {
    Card::new(protocol, value, CardEffects::Scripted(effects))
}

fn stage(engine: &mut Engine, side: Side, lane: usize, mut card: Card, id: CardId, face_up: bool) -> CardId {
    card.id = id;
    card.face_up = face_up;
    engine.state.side_mut(side).lanes[lane].push(card);
    id
}

fn give(engine: &mut Engine, side: Side, mut card: Card, id: CardId) -> CardId {
    card.id = id;
    engine.state.side_mut(side).hand.push(card);
    id
}

fn log_contains(engine: &Engine, needle: &str) -> bool {
    engine.state.log.iter().any(|line| line.contains(needle))
}

fn delete_face_down() -> ActionDef {
    ActionDef::Delete {
        target: TargetSpec::choose(CardFilter {
            face: FaceReq::Down,
            ..CardFilter::default()
        }),
    }
}

fn draw_own(amount: Amount) -> ActionDef {
    ActionDef::Draw {
        who: Who::Own,
        amount,
    }
}

#[test]
fn forced_single_candidate_resolves_without_input() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 1, vanilla("Metal", 5), 100, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play("Fire", 1, vec![delete_face_down()]),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(engine.pending_action().is_none());
    assert!(log_contains(&engine, "Fire-1 effect fires"));
    assert!(log_contains(&engine, "Metal-5 from line 2 is deleted (Opponent)"));
    assert!(engine.state.board_card(100).is_none());
    assert_eq!(engine.state.turn, Side::Opponent);
}

#[test]
fn two_candidates_raise_a_prompt() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 1, vanilla("Metal", 5), 100, false);
    stage(&mut engine, Side::Opponent, 2, vanilla("Life", 5), 101, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play("Fire", 1, vec![delete_face_down()]),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    match engine.pending_action() {
        Some(PendingAction::SelectCard(request)) => assert_eq!(request.remaining, 1),
        other => panic!("expected a card selection, got {other:?}"),
    }
    engine
        .submit_target(TargetChoice::Card(101), &mut events)
        .expect("delete");
    assert!(engine.state.board_card(100).is_some());
    assert!(engine.state.board_card(101).is_none());
}

#[test]
fn covered_only_filter_rejects_uncovered_cards() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 0, vanilla("Metal", 5), 100, false);
    stage(&mut engine, Side::Opponent, 0, vanilla("Speed", 5), 101, false);
    stage(&mut engine, Side::Opponent, 1, vanilla("Life", 5), 102, false);
    stage(&mut engine, Side::Opponent, 1, vanilla("Water", 5), 103, false);
    stage(&mut engine, Side::Opponent, 2, vanilla("Death", 5), 104, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![ActionDef::Delete {
                target: TargetSpec::choose(CardFilter {
                    owner: OwnerReq::Opponent,
                    cover: CoverReq::Covered,
                    ..CardFilter::default()
                }),
            }],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    // Only the two covered base cards qualify, so the pick is prompted.
    assert!(matches!(
        engine.pending_action(),
        Some(PendingAction::SelectCard(_))
    ));
    let err = engine
        .submit_target(TargetChoice::Card(104), &mut events)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget));
    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("delete");
    assert!(engine.state.board_card(100).is_none());
    assert!(engine.state.board_card(101).is_some(), "the cover stays put");
}

#[test]
fn optional_target_prompts_even_when_forced() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 1, vanilla("Metal", 5), 100, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![ActionDef::Delete {
                target: TargetSpec::choose(CardFilter {
                    face: FaceReq::Down,
                    ..CardFilter::default()
                })
                .may(),
            }],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    match engine.pending_action() {
        Some(PendingAction::SelectCard(request)) => assert!(request.optional),
        other => panic!("expected a card selection, got {other:?}"),
    }
    engine
        .submit_target(TargetChoice::Decline, &mut events)
        .expect("decline");
    assert!(log_contains(&engine, "Player declines"));
    assert!(engine.state.board_card(100).is_some());
}

#[test]
fn empty_pool_skips_and_continues() {
    let (mut engine, mut events) = new_game(1);
    engine.state.player.hand.truncate(2);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play("Fire", 1, vec![delete_face_down(), draw_own(Amount::Fixed(1))]),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(log_contains(&engine, "No further targets for Fire-1"));
    assert!(log_contains(&engine, "Player draws 1 card(s)"));
    assert_eq!(engine.state.player.hand.len(), 3);
    assert!(engine.pending_action().is_none());
}

#[test]
fn auto_picked_card_threads_into_prev() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Player, 2, vanilla("Life", 5), 100, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![
                ActionDef::Flip {
                    target: TargetSpec::choose(CardFilter::own(FaceReq::Down)),
                },
                ActionDef::Delete {
                    target: TargetSpec::prev(),
                },
            ],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(log_contains(&engine, "Life-5 in line 3 flips face-up"));
    assert!(log_contains(&engine, "Life-5 from line 3 is deleted (Player)"));
    assert!(engine.state.board_card(100).is_none());
    assert!(engine.state.player.discard.iter().any(|card| card.id == 100));
    assert!(engine.pending_action().is_none());
}

#[test]
fn either_always_asks() {
    let (mut engine, mut events) = new_game(1);
    engine.state.player.hand.truncate(2);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![ActionDef::Either {
                first: ChoiceArm {
                    label: "Draw 2".to_string(),
                    actions: vec![draw_own(Amount::Fixed(2))],
                },
                second: ChoiceArm {
                    label: "Discard 1".to_string(),
                    actions: vec![ActionDef::Discard {
                        who: Who::Own,
                        amount: Amount::Fixed(1),
                        random: false,
                    }],
                },
            }],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    match engine.pending_action() {
        Some(PendingAction::Choice(request)) => {
            let labels: Vec<&str> = request
                .options
                .iter()
                .map(|option| option.label.as_str())
                .collect();
            assert_eq!(labels, vec!["Draw 2", "Discard 1"]);
        }
        other => panic!("expected a choice, got {other:?}"),
    }

    engine
        .submit_target(TargetChoice::Option(0), &mut events)
        .expect("pick arm");
    assert!(log_contains(&engine, "Player chooses: Draw 2"));
    assert_eq!(engine.state.player.hand.len(), 4);
    assert_eq!(engine.state.turn, Side::Opponent);
}

#[test]
fn each_lane_sweeps_left_to_right() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 0, vanilla("Metal", 5), 100, false);
    stage(&mut engine, Side::Opponent, 1, vanilla("Life", 5), 101, false);
    stage(&mut engine, Side::Opponent, 2, vanilla("Water", 5), 102, false);
    let sweep = ActionDef::EachLane {
        actions: vec![ActionDef::Delete {
            target: TargetSpec::choose(CardFilter {
                owner: OwnerReq::Opponent,
                lanes: LaneReq::Same,
                ..CardFilter::default()
            }),
        }],
        resume_at: 0,
    };
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play("Fire", 1, vec![sweep]),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(engine.pending_action().is_none());
    assert!(engine.state.board_card(100).is_none());
    assert!(engine.state.board_card(101).is_none());
    assert!(engine.state.board_card(102).is_none());
    assert_eq!(engine.state.opponent.discard.len(), 3);
}

#[test]
fn suspended_sweep_resumes_at_the_next_lane() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 0, vanilla("Metal", 5), 100, false);
    stage(&mut engine, Side::Opponent, 1, vanilla("Life", 5), 101, false);
    stage(&mut engine, Side::Opponent, 1, vanilla("Life", 4), 102, false);
    stage(&mut engine, Side::Opponent, 2, vanilla("Water", 5), 103, false);
    let sweep = ActionDef::EachLane {
        actions: vec![ActionDef::Delete {
            target: TargetSpec::choose(CardFilter {
                owner: OwnerReq::Opponent,
                lanes: LaneReq::Same,
                ..CardFilter::default()
            }),
        }],
        resume_at: 0,
    };
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play("Fire", 1, vec![sweep]),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    // Lane 1 had two candidates, so the sweep parked its remainder behind
    // the prompt.
    assert!(engine.state.board_card(100).is_none());
    match engine.pending_action() {
        Some(PendingAction::SelectCard(request)) => {
            assert!(matches!(
                request.then[..],
                [ActionDef::EachLane { resume_at: 2, .. }]
            ));
        }
        other => panic!("expected a card selection, got {other:?}"),
    }

    engine
        .submit_target(TargetChoice::Card(102), &mut events)
        .expect("delete");
    assert!(engine.state.board_card(101).is_some(), "one pick per lane");
    assert!(engine.state.board_card(103).is_none());
    assert_eq!(engine.state.opponent.discard.len(), 3);
}

#[test]
fn uncovering_a_card_reruns_its_commands() {
    let (mut engine, mut events) = new_game(1);
    stage(
        &mut engine,
        Side::Opponent,
        1,
        scripted_on_play("Speed", 1, vec![draw_own(Amount::Fixed(1))]),
        101,
        true,
    );
    stage(&mut engine, Side::Opponent, 1, vanilla("Metal", 5), 102, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![ActionDef::Delete {
                target: TargetSpec::choose(CardFilter::opponent(FaceReq::Down)),
            }],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(engine.state.board_card(102).is_none());
    assert!(log_contains(&engine, "Speed-1 effect fires"));
    assert!(log_contains(&engine, "Opponent draws 1 card(s)"));
    assert_eq!(engine.state.opponent.hand.len(), 6);
}

#[test]
fn per_matching_counts_the_live_board() {
    let (mut engine, mut events) = new_game(1);
    engine.state.player.hand.truncate(2);
    stage(&mut engine, Side::Player, 1, vanilla("Life", 5), 100, false);
    stage(&mut engine, Side::Player, 2, vanilla("Water", 5), 101, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![draw_own(Amount::PerMatching(CardFilter::own(FaceReq::Down)))],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(log_contains(&engine, "Player draws 2 card(s)"));
    assert_eq!(engine.state.player.hand.len(), 4);
}

#[test]
fn per_stat_reads_this_turns_tally() {
    let (mut engine, mut events) = new_game(1);
    engine.state.player.hand.truncate(2);
    engine.state.player.stats.deleted = 2;
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![draw_own(Amount::PerStat(StatKind::Deleted))],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(log_contains(&engine, "Player draws 2 card(s)"));
    assert_eq!(engine.state.player.hand.len(), 4);
}

#[test]
fn reactive_listener_filters_by_subject() {
    let (mut engine, mut events) = new_game(1);
    engine.state.player.hand.truncate(2);
    stage(
        &mut engine,
        Side::Player,
        2,
        scripted_with(
            "Life",
            5,
            ScriptedEffects {
                bottom: vec![EffectDef {
                    trigger: TriggerKind::AfterDiscard,
                    on: OwnerReq::Opponent,
                    actions: vec![draw_own(Amount::Fixed(1))],
                }],
                ..ScriptedEffects::default()
            },
        ),
        100,
        true,
    );
    stage(
        &mut engine,
        Side::Player,
        1,
        scripted_with(
            "Water",
            5,
            ScriptedEffects {
                bottom: vec![EffectDef {
                    trigger: TriggerKind::AfterDiscard,
                    on: OwnerReq::Own,
                    actions: vec![draw_own(Amount::Fixed(1))],
                }],
                ..ScriptedEffects::default()
            },
        ),
        101,
        true,
    );
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            2,
            vec![ActionDef::Discard {
                who: Who::Opponent,
                amount: Amount::Fixed(1),
                random: true,
            }],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    // Only the listener keyed to opponent discards reacted.
    assert!(log_contains(&engine, "Life-5 effect fires"));
    assert!(!log_contains(&engine, "Water-5 effect fires"));
    assert_eq!(engine.state.player.hand.len(), 3);
    assert_eq!(engine.state.opponent.hand.len(), 4);
    assert_eq!(engine.state.opponent.discard.len(), 1);
}

#[test]
fn reactive_dispatch_runs_active_side_first_in_lane_order() {
    let (mut engine, mut events) = new_game(1);
    engine.state.player.hand.truncate(3);
    let listener = |protocol: &str, value: i32| {
        scripted_with(
            protocol,
            value,
            ScriptedEffects {
                bottom: vec![EffectDef {
                    trigger: TriggerKind::AfterDiscard,
                    on: OwnerReq::Any,
                    actions: Vec::new(),
                }],
                ..ScriptedEffects::default()
            },
        )
    };
    stage(&mut engine, Side::Player, 0, listener("Water", 5), 100, true);
    stage(&mut engine, Side::Player, 2, listener("Life", 5), 101, true);
    stage(&mut engine, Side::Opponent, 0, listener("Metal", 5), 102, true);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![
                ActionDef::Discard {
                    who: Who::Own,
                    amount: Amount::Fixed(1),
                    random: true,
                },
                ActionDef::Discard {
                    who: Who::Own,
                    amount: Amount::Fixed(1),
                    random: true,
                },
            ],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    // Two discards over an unchanged board dispatch the same listeners in
    // the same order: active side first, then ascending lane.
    let fired: Vec<&str> = engine
        .state
        .log
        .iter()
        .filter_map(|line| line.strip_suffix(" effect fires"))
        .collect();
    assert_eq!(
        fired,
        vec!["Fire-1", "Water-5", "Life-5", "Metal-5", "Water-5", "Life-5", "Metal-5"]
    );
    assert!(engine.pending_action().is_none());
}

#[test]
fn flipping_a_trapped_card_deletes_it_instead() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 1, vanilla("Death", 0), 100, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![ActionDef::Flip {
                target: TargetSpec::choose(CardFilter::opponent(FaceReq::Down)),
            }],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(log_contains(&engine, "Death-0 in line 2 flips face-up"));
    assert!(log_contains(&engine, "Death-0 from line 2 is deleted (Opponent)"));
    assert!(engine.state.board_card(100).is_none());
    assert!(engine.state.opponent.discard.iter().any(|card| card.id == 100));
    assert!(engine.pending_action().is_none());
    assert_eq!(engine.state.turn, Side::Opponent);
}

#[test]
fn self_delete_waits_for_an_interrupting_reactive() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Opponent, 1, vanilla("Metal", 5), 100, false);
    stage(&mut engine, Side::Opponent, 0, vanilla("Life", 5), 101, false);
    stage(
        &mut engine,
        Side::Opponent,
        2,
        scripted_with(
            "Speed",
            4,
            ScriptedEffects {
                bottom: vec![EffectDef {
                    trigger: TriggerKind::AfterDelete,
                    on: OwnerReq::Own,
                    actions: vec![ActionDef::Discard {
                        who: Who::Own,
                        amount: Amount::Fixed(1),
                        random: false,
                    }],
                }],
                ..ScriptedEffects::default()
            },
        ),
        102,
        true,
    );
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![
                ActionDef::Delete {
                    target: TargetSpec::choose(CardFilter::opponent(FaceReq::Down)),
                },
                ActionDef::Delete {
                    target: TargetSpec::this(),
                },
            ],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("first delete");

    // The listener's discard interrupts before the self-delete runs.
    assert!(log_contains(&engine, "Speed-4 effect fires"));
    assert!(matches!(
        engine.pending_action(),
        Some(PendingAction::SelectHandCard(_))
    ));
    assert_eq!(engine.state.turn, Side::Opponent);
    assert_eq!(engine.state.interrupts.len(), 1);
    assert!(engine.state.board_card(played).is_some(), "self-delete waits");

    let discard_id = engine.state.opponent.hand[0].id;
    engine
        .submit_target(TargetChoice::HandCard(discard_id), &mut events)
        .expect("discard");

    assert!(engine.state.board_card(played).is_none());
    assert!(engine.state.player.discard.iter().any(|card| card.id == played));
    assert!(engine.state.board_card(100).is_none());
    assert!(engine.state.interrupts.is_empty());
    assert_eq!(engine.state.opponent.hand.len(), 4);
    assert_eq!(engine.state.opponent.discard.len(), 2);
    assert_eq!(engine.state.turn, Side::Opponent);
    assert_eq!(engine.state.turn_count, 2);
}

#[test]
fn covering_fires_the_covered_cards_bottom() {
    let (mut engine, mut events) = new_game(1);
    engine.state.player.hand.truncate(2);
    stage(
        &mut engine,
        Side::Player,
        0,
        scripted_with(
            "Life",
            5,
            ScriptedEffects {
                bottom: vec![EffectDef::new(
                    TriggerKind::OnCover,
                    vec![draw_own(Amount::Fixed(1))],
                )],
                ..ScriptedEffects::default()
            },
        ),
        100,
        true,
    );
    let played = give(&mut engine, Side::Player, vanilla("Fire", 5), 150);
    engine.play_from_hand(played, 0, false, &mut events).expect("play");

    assert!(log_contains(&engine, "Life-5 effect fires"));
    assert!(log_contains(&engine, "Player draws 1 card(s)"));
    assert_eq!(engine.state.player.hand.len(), 3);
}

#[test]
fn forced_shift_with_one_destination_auto_moves() {
    let (mut engine, mut events) = new_game(1);
    stage(&mut engine, Side::Player, 2, vanilla("Life", 5), 100, false);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play(
            "Fire",
            1,
            vec![ActionDef::Shift {
                target: TargetSpec::choose(CardFilter::own(FaceReq::Down)),
                dest: LaneReq::Same,
                chooser: ChoiceBy::Actor,
            }],
        ),
        150,
    );
    engine.play_from_hand(played, 0, true, &mut events).expect("play");

    assert!(engine.pending_action().is_none());
    assert!(log_contains(&engine, "shifts"));
    let slot = engine.state.board_slot(100).expect("still on board");
    assert_eq!(slot.lane, 0);
}

#[test]
fn wrong_phase_play_never_reaches_the_interpreter() {
    let (mut engine, mut events) = new_game(1);
    let played = give(
        &mut engine,
        Side::Player,
        scripted_on_play("Fire", 1, vec![draw_own(Amount::Fixed(1))]),
        150,
    );
    engine.state.phase = Phase::End;
    let err = engine.play_from_hand(played, 0, true, &mut events).unwrap_err();
    assert!(matches!(err, EngineError::InvalidPhase(Phase::End)));
    assert!(!log_contains(&engine, "Fire-1 effect fires"));
}
