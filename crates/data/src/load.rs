//! Validation and lowering of scripted protocol documents into the catalog.
//! Lowering happens exactly once at load; a definition that fails a check is
//! replaced by an empty one with a warning so the rest of the protocol stays
//! playable.

use crate::schema::{CardDoc, EffectDoc, ProtocolDoc};
use mainline_core::{
    ActionDef, CardEffects, CardSpec, Catalog, EffectDef, ProtocolSpec, ScriptedEffects,
    TargetSpec, TriggerKind,
};

/// The full catalog for a game: compiled-in protocols plus the given store
/// documents, which shadow compiled-in protocols of the same name.
pub fn build_catalog(docs: &[ProtocolDoc]) -> Catalog {
    let mut catalog = Catalog::builtin();
    for doc in docs {
        catalog.add_protocol(lower_protocol(doc));
    }
    catalog
}

fn lower_protocol(doc: &ProtocolDoc) -> ProtocolSpec {
    ProtocolSpec {
        name: doc.name.clone(),
        color: doc.color.clone(),
        cards: doc
            .cards
            .iter()
            .map(|card| lower_card(&doc.name, card))
            .collect(),
    }
}

fn lower_card(protocol: &str, card: &CardDoc) -> CardSpec {
    let slot = |docs: &[EffectDoc], where_: &str| {
        docs.iter()
            .map(|doc| lower_effect(doc, &format!("{protocol}-{} {where_}", card.value)))
            .collect()
    };
    CardSpec {
        value: card.value,
        effects: CardEffects::Scripted(ScriptedEffects {
            top: slot(&card.top, "top"),
            middle: slot(&card.middle, "middle"),
            bottom: slot(&card.bottom, "bottom"),
        }),
    }
}

fn lower_effect(doc: &EffectDoc, where_: &str) -> EffectDef {
    let mut actions = Vec::with_capacity(doc.actions.len());
    for raw in &doc.actions {
        match serde_json::from_value::<ActionDef>(raw.clone()) {
            Ok(action) => actions.push(action),
            Err(err) => {
                log::warn!("{where_}: invalid action, definition disabled: {err}");
                return EffectDef::no_op(doc.trigger);
            }
        }
    }
    let mut def = EffectDef::new(doc.trigger, actions);
    def.on = doc.on;
    if let Err(reason) = validate_def(&def) {
        log::warn!("{where_}: {reason}, definition disabled");
        return EffectDef::no_op(doc.trigger);
    }
    def
}

/// Structural checks beyond what serde can express.
fn validate_def(def: &EffectDef) -> Result<(), String> {
    if def.trigger == TriggerKind::Passive {
        if let Some(action) = def.actions.iter().find(|action| !action.is_passive_payload()) {
            return Err(format!(
                "passive definitions may only carry rules, modifiers and properties, found {}",
                action_name(action)
            ));
        }
        return Ok(());
    }
    for action in &def.actions {
        validate_action(action, false)?;
    }
    Ok(())
}

fn validate_action(action: &ActionDef, in_each_lane: bool) -> Result<(), String> {
    if action.is_passive_payload() {
        return Err(format!(
            "{} is only valid under a passive trigger",
            action_name(action)
        ));
    }
    match action {
        ActionDef::Shift { target, .. } => {
            if target.count != 1 {
                return Err("shift resolves one card at a time".to_string());
            }
            check_count(target)
        }
        ActionDef::Flip { target }
        | ActionDef::Delete { target }
        | ActionDef::Return { target }
        | ActionDef::Reveal { target } => check_count(target),
        ActionDef::Either { first, second } => {
            if first.actions.is_empty() || second.actions.is_empty() {
                return Err("both choice arms need at least one action".to_string());
            }
            for inner in first.actions.iter().chain(&second.actions) {
                validate_action(inner, in_each_lane)?;
            }
            Ok(())
        }
        ActionDef::EachLane { actions, resume_at } => {
            if in_each_lane {
                return Err("each-lane sweeps do not nest".to_string());
            }
            if *resume_at != 0 {
                return Err("resume_at is reserved for the engine".to_string());
            }
            if actions.is_empty() {
                return Err("each-lane sweep needs at least one action".to_string());
            }
            for inner in actions {
                validate_action(inner, true)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_count(target: &TargetSpec) -> Result<(), String> {
    if target.count == 0 {
        return Err("target count must be at least 1".to_string());
    }
    Ok(())
}

fn action_name(action: &ActionDef) -> &'static str {
    match action {
        ActionDef::Draw { .. } => "draw",
        ActionDef::Discard { .. } => "discard",
        ActionDef::Flip { .. } => "flip",
        ActionDef::Delete { .. } => "delete",
        ActionDef::Return { .. } => "return",
        ActionDef::Shift { .. } => "shift",
        ActionDef::Reveal { .. } => "reveal",
        ActionDef::PlayTop { .. } => "play-top",
        ActionDef::Give { .. } => "give",
        ActionDef::Take => "take",
        ActionDef::Rearrange { .. } => "rearrange",
        ActionDef::Swap { .. } => "swap",
        ActionDef::Rule { .. } => "rule",
        ActionDef::ValueMod { .. } => "value modifier",
        ActionDef::Property { .. } => "property",
        ActionDef::Either { .. } => "either",
        ActionDef::EachLane { .. } => "each-lane",
    }
}
