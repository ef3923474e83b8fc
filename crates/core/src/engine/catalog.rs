use super::builtin;
use crate::cards::{Card, CardEffects};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardSpec {
    pub value: i32,
    pub effects: CardEffects,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolSpec {
    pub name: String,
    pub color: String,
    /// One spec per card in the protocol's deck, lowest value first.
    pub cards: Vec<CardSpec>,
}

/// Every protocol available to a game: the compiled-in set plus any scripted
/// protocols loaded from a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub protocols: Vec<ProtocolSpec>,
}

impl Catalog {
    /// The compiled-in protocols only.
    pub fn builtin() -> Self {
        let protocols = builtin::PROTOCOLS
            .iter()
            .map(|(name, color)| ProtocolSpec {
                name: (*name).to_string(),
                color: (*color).to_string(),
                cards: (0..=5)
                    .map(|value| CardSpec {
                        value,
                        effects: CardEffects::Builtin,
                    })
                    .collect(),
            })
            .collect();
        Self { protocols }
    }

    /// Scripted protocols shadow compiled-in ones of the same name.
    pub fn add_protocol(&mut self, spec: ProtocolSpec) {
        if let Some(existing) = self
            .protocols
            .iter_mut()
            .find(|existing| existing.name == spec.name)
        {
            *existing = spec;
        } else {
            self.protocols.push(spec);
        }
    }

    pub fn protocol(&self, name: &str) -> Option<&ProtocolSpec> {
        self.protocols.iter().find(|spec| spec.name == name)
    }

    /// Fresh copies of a protocol's cards, face down and without ids.
    pub fn build_deck(&self, name: &str) -> Option<Vec<Card>> {
        let spec = self.protocol(name)?;
        Some(
            spec.cards
                .iter()
                .map(|card| Card::new(spec.name.clone(), card.value, card.effects.clone()))
                .collect(),
        )
    }

    pub(crate) fn builtin_slots(&self, protocol: &str, value: i32) -> &'static [builtin::BuiltinSlot] {
        builtin::slots(protocol, value)
    }

    pub(crate) fn passive_decls(&self, protocol: &str, value: i32) -> &'static [builtin::PassiveDecl] {
        builtin::passive_decls(protocol, value)
    }
}
