use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Number of lines on the board. Protocol assignments, compile flags and
    /// lane-scoped rules all index into this range.
    pub lanes: usize,
    /// Hand limit enforced at end of turn and refilled by Refresh.
    pub hand_size: usize,
    /// A line compiles when its total reaches this and beats the opposing total.
    pub compile_threshold: i32,
    /// Contribution of a face-down card to its line total, unless a passive
    /// modifier overrides it.
    pub face_down_value: i32,
    /// Cards dealt to each side before the first turn.
    pub starting_hand: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lanes: 3,
            hand_size: 5,
            compile_threshold: 10,
            face_down_value: 2,
            starting_hand: 5,
        }
    }
}
