use crate::cards::{CardId, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    TurnStarted {
        side: Side,
        turn: u32,
    },
    TurnEnded {
        side: Side,
    },
    CardPlayed {
        card: CardId,
        side: Side,
        lane: usize,
        face_up: bool,
    },
    CardsDrawn {
        side: Side,
        count: usize,
    },
    CardDiscarded {
        card: CardId,
        side: Side,
    },
    CardDeleted {
        card: CardId,
        side: Side,
        lane: usize,
    },
    CardFlipped {
        card: CardId,
        side: Side,
        lane: usize,
        face_up: bool,
    },
    CardShifted {
        card: CardId,
        side: Side,
        from: usize,
        to: usize,
    },
    CardReturned {
        card: CardId,
        side: Side,
        lane: usize,
    },
    CardRevealed {
        card: CardId,
        side: Side,
        lane: usize,
    },
    CardGiven {
        card: CardId,
        from: Side,
        to: Side,
    },
    ProtocolsRearranged {
        side: Side,
    },
    LaneCompiled {
        side: Side,
        lane: usize,
        protocol: String,
    },
    EffectCancelled {
        source: CardId,
    },
    InputRequested {
        actor: Side,
        source: CardId,
    },
    GameWon {
        side: Side,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
