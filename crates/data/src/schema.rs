//! On-disk document model for scripted protocols. A store is a single JSON
//! document; effect actions stay as raw values here and are validated and
//! lowered into typed definitions by `load`.

use mainline_core::{OwnerReq, TriggerKind};
use serde::{Deserialize, Serialize};

pub const CURRENT_STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreDoc {
    pub version: u32,
    #[serde(default)]
    pub protocols: Vec<ProtocolDoc>,
}

impl Default for StoreDoc {
    fn default() -> Self {
        Self {
            version: CURRENT_STORE_VERSION,
            protocols: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolDoc {
    /// Stable key for upsert and delete; the display name may change.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub cards: Vec<CardDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardDoc {
    pub value: i32,
    #[serde(default)]
    pub top: Vec<EffectDoc>,
    #[serde(default)]
    pub middle: Vec<EffectDoc>,
    #[serde(default)]
    pub bottom: Vec<EffectDoc>,
}

/// One effect block as authored. The trigger and listener are structural and
/// must parse; the actions are checked individually at lowering time so a bad
/// action degrades one definition instead of rejecting the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectDoc {
    pub trigger: TriggerKind,
    #[serde(default)]
    pub on: OwnerReq,
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
}
