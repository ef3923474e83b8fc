use mainline_core::{
    Card, CardEffects, CardId, CardPurpose, Catalog, Engine, EngineError, Event, EventBus,
    GameConfig, GameSetup, LanePurpose, PendingAction, Phase, SelectCard, SelectLane, Side,
    TargetChoice,
};
use pretty_assertions::assert_eq;

fn new_game(player: [&str; 3], opponent: [&str; 3], seed: u64) -> (Engine, EventBus) {
    let setup = GameSetup {
        player: player.iter().map(|name| name.to_string()).collect(),
        opponent: opponent.iter().map(|name| name.to_string()).collect(),
    };
    let mut engine =
        Engine::new(GameConfig::default(), Catalog::builtin(), setup, seed).expect("new engine");
    let mut events = EventBus::default();
    engine.begin(&mut events).expect("begin");
    (engine, events)
}

fn board_card(protocol: &str, value: i32, id: CardId, face_up: bool) -> Card {
    let mut card = Card::new(protocol, value, CardEffects::Builtin);
    card.id = id;
    card.face_up = face_up;
    card
}

fn put(engine: &mut Engine, side: Side, lane: usize, card: Card) -> CardId {
    let id = card.id;
    engine.state.side_mut(side).lanes[lane].push(card);
    id
}

fn give_hand(engine: &mut Engine, side: Side, protocol: &str, value: i32, id: CardId) -> CardId {
    let mut card = Card::new(protocol, value, CardEffects::Builtin);
    card.id = id;
    engine.state.side_mut(side).hand.push(card);
    id
}

fn log_contains(engine: &Engine, needle: &str) -> bool {
    engine.state.log.iter().any(|line| line.contains(needle))
}

fn select_card(engine: &Engine) -> SelectCard {
    match engine.pending_action() {
        Some(PendingAction::SelectCard(request)) => request.clone(),
        other => panic!("expected a card selection, got {other:?}"),
    }
}

fn select_lane(engine: &Engine) -> SelectLane {
    match engine.pending_action() {
        Some(PendingAction::SelectLane(request)) => request.clone(),
        other => panic!("expected a lane selection, got {other:?}"),
    }
}

#[test]
fn submit_without_request_is_rejected() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    let err = engine
        .submit_target(TargetChoice::Card(1), &mut events)
        .unwrap_err();
    assert!(matches!(err, EngineError::NoInputOutstanding));
}

#[test]
fn compiled_card_prompts_even_with_one_candidate() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Opponent, 1, board_card("Speed", 2, 100, false));
    let fire1 = give_hand(&mut engine, Side::Player, "Fire", 1, 150);
    engine.play_from_hand(fire1, 0, true, &mut events).expect("play");

    let request = select_card(&engine);
    assert_eq!(request.purpose, CardPurpose::Delete);
    assert_eq!(request.remaining, 1);
    assert!(!request.optional);
    assert!(engine.state.board_card(100).is_some(), "nothing resolves before input");

    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("delete");
    assert!(log_contains(&engine, "Speed-2 from line 2 is deleted (Opponent)"));
    assert!(engine.state.board_card(100).is_none());
    assert_eq!(engine.state.opponent.discard.len(), 1);
    assert_eq!(engine.state.turn, Side::Opponent);
}

#[test]
fn bad_submissions_leave_the_request_standing() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Opponent, 1, board_card("Speed", 2, 100, false));
    let fire1 = give_hand(&mut engine, Side::Player, "Fire", 1, 150);
    engine.play_from_hand(fire1, 0, true, &mut events).expect("play");

    // Wrong card, wrong kind, out-of-pool card: all rejected, none consume
    // the request.
    for bad in [
        TargetChoice::Card(fire1),
        TargetChoice::Lane(1),
        TargetChoice::Option(0),
        TargetChoice::Card(999),
    ] {
        let err = engine.submit_target(bad, &mut events).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTarget));
        assert!(engine.pending_action().is_some());
    }

    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("delete");
    assert!(engine.state.board_card(100).is_none());
}

#[test]
fn declining_a_mandatory_request_is_rejected() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Opponent, 1, board_card("Speed", 2, 100, false));
    let fire1 = give_hand(&mut engine, Side::Player, "Fire", 1, 150);
    engine.play_from_hand(fire1, 0, true, &mut events).expect("play");

    let err = engine
        .submit_target(TargetChoice::Decline, &mut events)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget));
    assert!(engine.pending_action().is_some());
}

#[test]
fn optional_request_accepts_a_decline() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Player, 0, board_card("Speed", 0, 100, true));
    engine.refresh(&mut events).expect("player refresh");
    engine.refresh(&mut events).expect("opponent refresh");

    // Speed-0 offers its start-of-turn shift.
    assert!(log_contains(&engine, "Speed-0 effect fires"));
    let request = select_lane(&engine);
    assert!(request.optional);
    assert_eq!(request.allowed, vec![1, 2]);
    assert_eq!(engine.state.phase, Phase::Start);

    engine
        .submit_target(TargetChoice::Decline, &mut events)
        .expect("decline");
    assert!(log_contains(&engine, "Player declines"));
    let slot = engine.state.board_slot(100).expect("still on board");
    assert_eq!(slot.lane, 0);
    assert_eq!(engine.state.phase, Phase::Main);
    assert_eq!(engine.state.turn, Side::Player);
}

#[test]
fn optional_request_accepts_a_pick() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Player, 0, board_card("Speed", 0, 100, true));
    engine.refresh(&mut events).expect("player refresh");
    engine.refresh(&mut events).expect("opponent refresh");

    engine
        .submit_target(TargetChoice::Lane(2), &mut events)
        .expect("shift");
    assert!(log_contains(&engine, "Player shifts Speed-0 from line 1 to line 3"));
    let slot = engine.state.board_slot(100).expect("still on board");
    assert_eq!(slot.lane, 2);
    assert_eq!(engine.state.phase, Phase::Main);
}

#[test]
fn request_is_cancelled_when_its_source_stops_showing() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Opponent, 1, board_card("Speed", 2, 100, false));
    put(&mut engine, Side::Opponent, 2, board_card("Metal", 5, 101, false));
    let fire1 = give_hand(&mut engine, Side::Player, "Fire", 1, 150);
    engine.play_from_hand(fire1, 0, true, &mut events).expect("play");
    assert!(engine.pending_action().is_some());

    engine
        .state
        .board_card_mut(fire1)
        .expect("played card")
        .face_up = false;
    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("submission resolves as a cancel");

    assert!(log_contains(&engine, "Effect of Fire-1 is cancelled"));
    assert!(engine.pending_action().is_none());
    assert!(engine.state.board_card(100).is_some(), "nothing was deleted");
    assert!(engine.state.board_card(101).is_some());
    assert_eq!(engine.state.turn, Side::Opponent);
}

#[test]
fn forced_opponent_discard_interrupts_the_turn() {
    let (mut engine, mut events) = new_game(["Plague", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    let plague0 = give_hand(&mut engine, Side::Player, "Plague", 0, 150);
    let _ = events.drain().count();
    engine.play_from_hand(plague0, 0, true, &mut events).expect("play");

    assert!(log_contains(&engine, "Opponent must respond"));
    assert_eq!(engine.state.turn, Side::Opponent);
    assert_eq!(engine.state.interrupts.len(), 1);
    let received: Vec<Event> = events.drain().collect();
    assert!(received
        .iter()
        .any(|event| matches!(event, Event::InputRequested { actor: Side::Opponent, .. })));

    let first = engine.state.opponent.hand[0].id;
    engine
        .submit_target(TargetChoice::HandCard(first), &mut events)
        .expect("first discard");
    // One card still owed, so the opponent is re-prompted and the turn
    // marker flips again.
    assert_eq!(engine.state.turn, Side::Opponent);
    assert_eq!(engine.state.interrupts.len(), 1);

    let second = engine.state.opponent.hand[0].id;
    engine
        .submit_target(TargetChoice::HandCard(second), &mut events)
        .expect("second discard");

    assert_eq!(engine.state.opponent.hand.len(), 3);
    assert_eq!(engine.state.opponent.discard.len(), 2);
    assert!(engine.state.interrupts.is_empty());
    // The interrupted turn finished normally afterwards.
    assert_eq!(engine.state.turn, Side::Opponent);
    assert_eq!(engine.state.turn_count, 2);
}

#[test]
fn counted_selection_reissues_and_excludes_used_cards() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Player, 2, board_card("Life", 5, 100, false));
    put(&mut engine, Side::Player, 0, board_card("Life", 5, 101, false));
    let water3 = give_hand(&mut engine, Side::Player, "Water", 3, 150);
    engine.play_from_hand(water3, 1, true, &mut events).expect("play");

    let request = select_card(&engine);
    assert_eq!(request.purpose, CardPurpose::Flip);
    assert_eq!(request.remaining, 2);

    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("first flip");
    let request = select_card(&engine);
    assert_eq!(request.remaining, 1);
    assert_eq!(request.used, vec![100]);

    let err = engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget));

    engine
        .submit_target(TargetChoice::Card(101), &mut events)
        .expect("second flip");
    assert!(engine.state.board_card(100).expect("on board").face_up);
    assert!(engine.state.board_card(101).expect("on board").face_up);
    assert_eq!(engine.state.turn, Side::Opponent);
}

#[test]
fn picked_card_threads_into_the_chained_shift() {
    let (mut engine, mut events) = new_game(["Fire", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Player, 0, board_card("Life", 5, 100, false));
    let water0 = give_hand(&mut engine, Side::Player, "Water", 0, 150);
    engine.play_from_hand(water0, 1, true, &mut events).expect("play");

    // One candidate, but a compiled-in source still prompts.
    let request = select_card(&engine);
    assert_eq!(request.purpose, CardPurpose::Flip);

    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("flip");
    assert!(engine.state.board_card(100).expect("on board").face_up);

    // The shift chained behind the flip now asks where to send that card.
    let request = select_lane(&engine);
    assert_eq!(request.purpose, LanePurpose::ShiftCard { card: 100 });
    assert_eq!(request.allowed, vec![1, 2]);

    engine
        .submit_target(TargetChoice::Lane(2), &mut events)
        .expect("shift");
    let slot = engine.state.board_slot(100).expect("still on board");
    assert_eq!(slot.lane, 2);
}

#[test]
fn rearrange_requires_a_full_permutation() {
    let (mut engine, mut events) = new_game(["Psychic", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    engine.state.opponent.compiled[2] = true;
    let psychic2 = give_hand(&mut engine, Side::Player, "Psychic", 2, 150);
    engine.play_from_hand(psychic2, 0, true, &mut events).expect("play");

    match engine.pending_action() {
        Some(PendingAction::Rearrange(request)) => {
            assert_eq!(request.side, Side::Opponent);
        }
        other => panic!("expected a rearrange request, got {other:?}"),
    }

    for bad in [vec![0, 0, 1], vec![0, 1], vec![0, 1, 3]] {
        let err = engine
            .submit_target(TargetChoice::Order(bad), &mut events)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTarget));
    }

    engine
        .submit_target(TargetChoice::Order(vec![2, 0, 1]), &mut events)
        .expect("rearrange");
    assert!(log_contains(&engine, "Opponent's protocols are rearranged"));
    assert_eq!(
        engine.state.opponent.protocols,
        vec!["Metal".to_string(), "Death".to_string(), "Speed".to_string()]
    );
    // The compile flag travelled with its protocol.
    assert_eq!(engine.state.opponent.compiled, vec![true, false, false]);
}

#[test]
fn swap_resolves_as_two_lane_picks() {
    let (mut engine, mut events) = new_game(["Psychic", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    let psychic4 = give_hand(&mut engine, Side::Player, "Psychic", 4, 150);
    engine.play_from_hand(psychic4, 0, true, &mut events).expect("play");

    let request = select_lane(&engine);
    assert_eq!(request.allowed, vec![0, 1, 2]);
    engine
        .submit_target(TargetChoice::Lane(1), &mut events)
        .expect("first pick");

    let request = select_lane(&engine);
    assert_eq!(request.allowed, vec![0, 2]);
    let err = engine
        .submit_target(TargetChoice::Lane(1), &mut events)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget));

    engine
        .submit_target(TargetChoice::Lane(2), &mut events)
        .expect("second pick");
    assert!(log_contains(&engine, "Player's protocols in lines 2 and 3 are swapped"));
    assert_eq!(
        engine.state.player.protocols,
        vec!["Psychic".to_string(), "Life".to_string(), "Water".to_string()]
    );
}

#[test]
fn shift_destination_can_fall_to_the_card_owner() {
    let (mut engine, mut events) = new_game(["Psychic", "Water", "Life"], ["Death", "Speed", "Metal"], 1);
    put(&mut engine, Side::Opponent, 1, board_card("Metal", 5, 100, true));
    let psychic0 = give_hand(&mut engine, Side::Player, "Psychic", 0, 150);
    engine.play_from_hand(psychic0, 0, true, &mut events).expect("play");

    // First the forced discard.
    let first = engine.state.opponent.hand[0].id;
    engine
        .submit_target(TargetChoice::HandCard(first), &mut events)
        .expect("forced discard");

    // The player picks which opponent card moves.
    assert_eq!(engine.state.turn, Side::Player);
    let request = select_card(&engine);
    assert!(matches!(request.purpose, CardPurpose::Shift { .. }));
    engine
        .submit_target(TargetChoice::Card(100), &mut events)
        .expect("pick card");

    // The destination falls to the card's owner, interrupting again.
    assert_eq!(engine.state.turn, Side::Opponent);
    assert!(log_contains(&engine, "Opponent must respond"));
    let request = select_lane(&engine);
    assert_eq!(request.purpose, LanePurpose::ShiftCard { card: 100 });
    assert_eq!(request.allowed, vec![0, 2]);

    engine
        .submit_target(TargetChoice::Lane(0), &mut events)
        .expect("owner picks lane");
    assert!(log_contains(&engine, "Opponent shifts Metal-5 from line 2 to line 1"));
    let slot = engine.state.board_slot(100).expect("still on board");
    assert_eq!(slot.lane, 0);
    assert_eq!(slot.side, Side::Opponent);
    assert!(engine.state.interrupts.is_empty());
}
