use mainline_core::{ActionDef, Amount, OwnerReq, TriggerKind, Who};
use mainline_data::{CardDoc, EffectDoc, ProtocolDoc, ProtocolStore, StoreDoc, CURRENT_STORE_VERSION};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn store_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("protocols.json")
}

fn sample_doc(id: &str, name: &str) -> ProtocolDoc {
    ProtocolDoc {
        id: id.to_string(),
        name: name.to_string(),
        color: "#445566".to_string(),
        cards: vec![CardDoc {
            value: 0,
            top: Vec::new(),
            middle: vec![EffectDoc {
                trigger: TriggerKind::OnPlay,
                on: OwnerReq::Any,
                actions: vec![json!({"Draw": {"who": "Own", "amount": {"Fixed": 1}}})],
            }],
            bottom: Vec::new(),
        }],
    }
}

#[test]
fn missing_file_opens_as_an_empty_store() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);

    let store = ProtocolStore::open(&path).expect("open");
    assert!(store.load_all().is_empty());
    assert!(!path.exists(), "opening alone writes nothing");
}

#[test]
fn upsert_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = ProtocolStore::open(&path).expect("open");
    store.upsert(sample_doc("p1", "Venom")).expect("upsert");
    assert!(path.exists());

    let reopened = ProtocolStore::open(&path).expect("reopen");
    assert_eq!(reopened.load_all(), vec![sample_doc("p1", "Venom")]);
}

#[test]
fn upsert_replaces_by_id() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = ProtocolStore::open(&path).expect("open");
    store.upsert(sample_doc("p1", "Venom")).expect("first upsert");
    store.upsert(sample_doc("p1", "Toxin")).expect("second upsert");

    let docs = ProtocolStore::open(&path).expect("reopen").load_all();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].name, "Toxin");
}

#[test]
fn delete_reports_whether_anything_went() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = ProtocolStore::open(&path).expect("open");
    store.upsert(sample_doc("p1", "Venom")).expect("upsert");

    assert!(store.delete("p1").expect("delete"));
    assert!(store.load_all().is_empty());
    assert!(!store.delete("p1").expect("repeat delete"));
    assert!(ProtocolStore::open(&path).expect("reopen").load_all().is_empty());
}

#[test]
fn deleting_an_unknown_id_never_writes() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = ProtocolStore::open(&path).expect("open");
    assert!(!store.delete("nope").expect("delete"));
    assert!(!path.exists());
}

#[test]
fn future_version_loads_best_effort_and_saves_current() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);
    let doc = StoreDoc {
        version: 99,
        protocols: vec![sample_doc("p1", "Venom")],
    };
    fs::write(&path, serde_json::to_string(&doc).expect("serialize")).expect("write");

    let mut store = ProtocolStore::open(&path).expect("open");
    assert_eq!(store.load_all().len(), 1);

    store.upsert(sample_doc("p2", "Toxin")).expect("upsert");
    let raw = fs::read_to_string(&path).expect("read back");
    let written: StoreDoc = serde_json::from_str(&raw).expect("parse");
    assert_eq!(written.version, CURRENT_STORE_VERSION);
    assert_eq!(written.protocols.len(), 2);
}

#[test]
fn corrupt_json_refuses_to_open() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);
    fs::write(&path, "{ this is not json").expect("write");

    let err = ProtocolStore::open(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parse"));
}

#[test]
fn authored_actions_round_trip_as_raw_values() {
    let dir = tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut doc = sample_doc("p1", "Venom");
    doc.cards[0].middle[0].actions = vec![json!({
        "Discard": {"who": "Opponent", "amount": {"Fixed": 2}, "random": true}
    })];
    let mut store = ProtocolStore::open(&path).expect("open");
    store.upsert(doc.clone()).expect("upsert");

    let reopened = ProtocolStore::open(&path).expect("reopen").load_all();
    assert_eq!(reopened[0].cards[0].middle[0].actions, doc.cards[0].middle[0].actions);
}

#[test]
fn typed_fields_parse_from_authored_json() {
    // The structural fields of an effect block parse through serde; the
    // actions list stays raw until lowering.
    let raw = json!({
        "trigger": "AfterDiscard",
        "on": "Opponent",
        "actions": [{"Draw": {"who": "Own", "amount": {"Fixed": 1}}}]
    });
    let doc: EffectDoc = serde_json::from_value(raw).expect("parse");
    assert_eq!(doc.trigger, TriggerKind::AfterDiscard);
    assert_eq!(doc.on, OwnerReq::Opponent);

    let action: ActionDef = serde_json::from_value(doc.actions[0].clone()).expect("lower");
    assert_eq!(
        action,
        ActionDef::Draw {
            who: Who::Own,
            amount: Amount::Fixed(1),
        }
    );
}
