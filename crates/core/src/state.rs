use crate::cards::{Card, CardId, Side};
use crate::config::GameConfig;
use crate::pending::{PendingAction, QueuedStep};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Start,
    Main,
    End,
    GameOver,
}

/// Per-turn action tallies, reset when the owning side's turn begins.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnStats {
    pub played: u32,
    pub drawn: u32,
    pub discarded: u32,
    pub deleted: u32,
    pub flipped: u32,
    pub shifted: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatKind {
    Played,
    Drawn,
    Discarded,
    Deleted,
    Flipped,
    Shifted,
}

impl TurnStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Played => self.played,
            StatKind::Drawn => self.drawn,
            StatKind::Discarded => self.discarded,
            StatKind::Deleted => self.deleted,
            StatKind::Flipped => self.flipped,
            StatKind::Shifted => self.shifted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    /// Protocol names assigned to each line, index = lane.
    pub protocols: Vec<String>,
    /// Compile flags travel with protocols when lines are rearranged.
    pub compiled: Vec<bool>,
    /// One stack per line, ordered bottom to top.
    pub lanes: Vec<Vec<Card>>,
    pub hand: Vec<Card>,
    pub deck: Vec<Card>,
    pub discard: Vec<Card>,
    #[serde(default)]
    pub stats: TurnStats,
}

impl PlayerState {
    pub fn empty(lanes: usize) -> Self {
        Self {
            protocols: vec![String::new(); lanes],
            compiled: vec![false; lanes],
            lanes: vec![Vec::new(); lanes],
            hand: Vec::new(),
            deck: Vec::new(),
            discard: Vec::new(),
            stats: TurnStats::default(),
        }
    }

    pub fn hand_position(&self, id: CardId) -> Option<usize> {
        self.hand.iter().position(|card| card.id == id)
    }

    pub fn all_compiled(&self) -> bool {
        !self.compiled.is_empty() && self.compiled.iter().all(|flag| *flag)
    }
}

/// Position of a card on the board. `index` counts from the bottom of the stack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSlot {
    pub side: Side,
    pub lane: usize,
    pub index: usize,
}

/// Snapshot of whose turn it was when a forced out-of-turn decision began.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterruptFrame {
    pub turn: Side,
    pub phase: Phase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub config: GameConfig,
    pub turn: Side,
    pub phase: Phase,
    pub turn_count: u32,
    /// Whether the active side has taken its main action this turn.
    pub action_taken: bool,
    pub player: PlayerState,
    pub opponent: PlayerState,
    /// The single outstanding input request. Nothing else resolves while set.
    pub pending: Option<PendingAction>,
    pub queue: VecDeque<QueuedStep>,
    pub interrupts: Vec<InterruptFrame>,
    pub winner: Option<Side>,
    #[serde(default)]
    pub log: Vec<String>,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
            turn: Side::Player,
            phase: Phase::Setup,
            turn_count: 0,
            action_taken: false,
            player: PlayerState::empty(config.lanes),
            opponent: PlayerState::empty(config.lanes),
            pending: None,
            queue: VecDeque::new(),
            interrupts: Vec::new(),
            winner: None,
            log: Vec::new(),
        }
    }

    pub fn side(&self, side: Side) -> &PlayerState {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut PlayerState {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn board_slot(&self, id: CardId) -> Option<BoardSlot> {
        for side in [Side::Player, Side::Opponent] {
            for (lane, stack) in self.side(side).lanes.iter().enumerate() {
                if let Some(index) = stack.iter().position(|card| card.id == id) {
                    return Some(BoardSlot { side, lane, index });
                }
            }
        }
        None
    }

    pub fn board_card(&self, id: CardId) -> Option<&Card> {
        let slot = self.board_slot(id)?;
        self.side(slot.side).lanes[slot.lane].get(slot.index)
    }

    pub fn board_card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        let slot = self.board_slot(id)?;
        self.side_mut(slot.side).lanes[slot.lane].get_mut(slot.index)
    }

    /// A card is uncovered when it is the top of its stack.
    pub fn is_uncovered(&self, slot: BoardSlot) -> bool {
        slot.index + 1 == self.side(slot.side).lanes[slot.lane].len()
    }

    pub fn top_of(&self, side: Side, lane: usize) -> Option<&Card> {
        self.side(side).lanes.get(lane)?.last()
    }

    pub fn log_line(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}
