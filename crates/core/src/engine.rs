use crate::cards::{CardId, Side};
use crate::config::GameConfig;
use crate::events::EventBus;
use crate::passive::BlockReason;
use crate::pending::{PendingAction, QueuedStep};
use crate::rng::RngState;
use crate::state::{GameState, Phase};
use thiserror::Error;

mod catalog;
mod dispatch;
mod handlers;
mod interpreter;
mod mutate;
mod queue;
mod resolver;
mod turn;

pub(crate) mod builtin;

pub use catalog::{Catalog, CardSpec, ProtocolSpec};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid phase: {0:?}")]
    InvalidPhase(Phase),
    #[error("unknown protocol {0:?}")]
    UnknownProtocol(String),
    #[error("protocol {0:?} picked twice")]
    DuplicateProtocol(String),
    #[error("expected {expected} protocols per side, got {got}")]
    WrongProtocolCount { expected: usize, got: usize },
    #[error("card {0} not found where expected")]
    UnknownCard(CardId),
    #[error("lane {0} out of range")]
    InvalidLane(usize),
    #[error("an input request is outstanding")]
    InputOutstanding,
    #[error("the main action was already taken this turn")]
    ActionTaken,
    #[error("no input request is outstanding")]
    NoInputOutstanding,
    #[error("play blocked: {0}")]
    PlayBlocked(BlockReason),
    #[error("submitted target is not legal")]
    InvalidTarget,
    #[error("game is over")]
    GameOver,
}

/// Protocol picks for both sides, one name per lane.
#[derive(Debug, Clone)]
pub struct GameSetup {
    pub player: Vec<String>,
    pub opponent: Vec<String>,
}

#[derive(Debug)]
pub struct Engine {
    pub catalog: Catalog,
    pub state: GameState,
    pub rng: RngState,
    /// Steps produced while resolving the current unit of work. Flushed to
    /// the front of the queue so cascades run depth-first.
    spawned: Vec<QueuedStep>,
}

impl Engine {
    pub fn new(
        config: GameConfig,
        catalog: Catalog,
        setup: GameSetup,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let lanes = config.lanes;
        for picks in [&setup.player, &setup.opponent] {
            if picks.len() != lanes {
                return Err(EngineError::WrongProtocolCount {
                    expected: lanes,
                    got: picks.len(),
                });
            }
        }
        let mut seen: Vec<&str> = Vec::new();
        for name in setup.player.iter().chain(setup.opponent.iter()) {
            if catalog.protocol(name).is_none() {
                return Err(EngineError::UnknownProtocol(name.clone()));
            }
            if seen.contains(&name.as_str()) {
                return Err(EngineError::DuplicateProtocol(name.clone()));
            }
            seen.push(name);
        }

        let mut rng = RngState::from_seed(seed);
        let mut state = GameState::new(&config);
        let mut next_card_id: CardId = 1;
        for (side, picks) in [(Side::Player, &setup.player), (Side::Opponent, &setup.opponent)] {
            let player = state.side_mut(side);
            let mut deck = Vec::new();
            for (lane, name) in picks.iter().enumerate() {
                player.protocols[lane] = name.clone();
                let mut cards = catalog
                    .build_deck(name)
                    .ok_or_else(|| EngineError::UnknownProtocol(name.clone()))?;
                for card in &mut cards {
                    card.id = next_card_id;
                    next_card_id = next_card_id.saturating_add(1);
                }
                deck.extend(cards);
            }
            rng.shuffle(&mut deck);
            player.deck = deck;
        }

        Ok(Self {
            catalog,
            state,
            rng,
            spawned: Vec::new(),
        })
    }

    /// Deal starting hands and run the first turn up to the main phase.
    pub fn begin(&mut self, events: &mut EventBus) -> Result<(), EngineError> {
        if self.state.phase != Phase::Setup {
            return Err(EngineError::InvalidPhase(self.state.phase));
        }
        let count = self.state.config.starting_hand;
        for side in [Side::Player, Side::Opponent] {
            self.deal(side, count, events);
        }
        self.state.turn_count = 1;
        self.begin_turn(events);
        self.advance(events);
        Ok(())
    }

    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.state.pending.as_ref()
    }

    pub fn lane_value(&self, side: Side, lane: usize) -> i32 {
        crate::passive::lane_value(&self.state, &self.catalog, side, lane)
    }

    /// Every (lane, face_up) combination the given hand card may legally be
    /// played to right now.
    pub fn legal_plays(&self, id: CardId) -> Vec<(usize, bool)> {
        let side = self.state.turn;
        let card = match self.state.side(side).hand.iter().find(|card| card.id == id) {
            Some(card) => card,
            None => return Vec::new(),
        };
        let mut plays = Vec::new();
        for lane in 0..self.state.config.lanes {
            for face_up in [true, false] {
                let verdict = crate::passive::can_play(
                    &self.state,
                    &self.catalog,
                    side,
                    lane,
                    face_up,
                    &card.protocol,
                );
                if verdict.is_allowed() {
                    plays.push((lane, face_up));
                }
            }
        }
        plays
    }
}
