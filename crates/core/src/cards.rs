use crate::effect::EffectDef;
use serde::{Deserialize, Serialize};

pub type CardId = u32;

/// A card id of 0 means "not yet assigned"; the engine hands out ids from 1.
pub const NO_CARD: CardId = 0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn flip(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Opponent => "Opponent",
        }
    }
}

/// Vertical position of an effect block on a card face.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EffectSlot {
    Top,
    Middle,
    Bottom,
}

impl EffectSlot {
    pub fn rank(self) -> u8 {
        match self {
            EffectSlot::Top => 0,
            EffectSlot::Middle => 1,
            EffectSlot::Bottom => 2,
        }
    }
}

/// Where a card's behavior comes from. Built-in cards resolve through the
/// compiled registry keyed by protocol name and value; scripted cards carry
/// their effect definitions with them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CardEffects {
    Builtin,
    Scripted(ScriptedEffects),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScriptedEffects {
    #[serde(default)]
    pub top: Vec<EffectDef>,
    #[serde(default)]
    pub middle: Vec<EffectDef>,
    #[serde(default)]
    pub bottom: Vec<EffectDef>,
}

impl ScriptedEffects {
    pub fn slot(&self, slot: EffectSlot) -> &[EffectDef] {
        match slot {
            EffectSlot::Top => &self.top,
            EffectSlot::Middle => &self.middle,
            EffectSlot::Bottom => &self.bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.middle.is_empty() && self.bottom.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub protocol: String,
    pub value: i32,
    pub face_up: bool,
    /// Face-down card whose identity has been shown to the opponent.
    /// Cleared whenever the card flips or leaves the board.
    #[serde(default)]
    pub revealed: bool,
    pub effects: CardEffects,
}

impl Card {
    pub fn new(protocol: impl Into<String>, value: i32, effects: CardEffects) -> Self {
        Self {
            id: NO_CARD,
            protocol: protocol.into(),
            value,
            face_up: false,
            revealed: false,
            effects,
        }
    }

    /// "Fire-2" style display name. Face state is not part of the name.
    pub fn title(&self) -> String {
        format!("{}-{}", self.protocol, self.value)
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.effects, CardEffects::Builtin)
    }
}
