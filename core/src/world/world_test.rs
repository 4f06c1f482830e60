use super::*;
use crate::chain::{TxOptions, TxReceipt};
use crate::invariant::{Expectation, Hold, Invariant};
use crate::parser::Node;
use crate::values::{Address, Value};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

fn addr(i: u64) -> Address {
    Address::from_index(0xac, i)
}

#[test]
fn test_successors_leave_earlier_snapshots_alone() {
    let before = World::default().add_alias("Geoff", addr(1));
    let after = before
        .clone()
        .add_alias("Torrey", addr(2))
        .add_action("Alias Torrey", None);

    assert_eq!(before.settings().aliases.len(), 1);
    assert_eq!(after.settings().aliases.len(), 2);
    assert!(before.actions().is_empty());
    assert_eq!(after.actions().len(), 1);
}

#[test]
fn test_action_log_is_newest_first() {
    let world = (1..=5).fold(World::default(), |world, i| world.add_action(format!("action {}", i), None));
    let recent: Vec<&str> = world
        .actions()
        .recent(3)
        .into_iter()
        .map(|a| a.description.as_str())
        .collect();
    assert_eq!(recent, vec!["action 5", "action 4", "action 3"]);
    assert_eq!(world.actions().last().map(|a| a.description.as_str()), Some("action 5"));
}

#[test]
fn test_action_log_shares_tail() {
    let base = World::default().add_action("one", None);
    let left = base.clone().add_action("left", None);
    let right = base.clone().add_action("right", None);
    assert_eq!(left.actions().len(), 2);
    assert_eq!(right.actions().len(), 2);
    assert_eq!(base.actions().len(), 1);
    assert_ne!(left.actions(), right.actions());
}

#[test]
fn test_add_action_with_invocation_sets_last_invocation() {
    let invocation = Invocation::new("Box Shelf: set(a, 1)", addr(0), TxReceipt::success(Vec::new(), 1));
    let world = World::default().add_action("set", Some(invocation.clone()));
    assert_eq!(world.last_invocation(), Some(&invocation));

    let world = world.add_action("note", None);
    assert_eq!(world.last_invocation(), Some(&invocation));
}

#[test]
fn test_record_marks_reverts_in_history() {
    let invocation = Invocation::new("Box Shelf: fail(no)", addr(0), TxReceipt::revert("no", 1));
    let world = invocation.record(World::default());
    assert_eq!(
        world.actions().last().map(|a| a.description.as_str()),
        Some("Box Shelf: fail(no) (reverted: no)")
    );
}

#[test]
fn test_into_result_turns_revert_into_error() {
    let invocation = Invocation::new("Box Shelf: fail(no)", addr(0), TxReceipt::revert("no", 1));
    match invocation.into_result() {
        Err(crate::ScenarioError::UnexpectedRevert { reason, .. }) => assert_eq!(reason, "no"),
        other => panic!("expected UnexpectedRevert, got {:?}", other),
    }
}

#[test]
fn test_register_contract_sets_last_contract() {
    let world = World::default().register_contract("Box", "Shelf", ContractRecord::new(addr(9), "Storage"));
    assert_eq!(world.last_contract(), Some(&addr(9)));
    assert_eq!(world.contract("box", "shelf").map(|r| r.address.clone()), Some(addr(9)));
}

#[test]
fn test_clear_invariants_by_class() {
    let world = World::default()
        .add_invariant(Invariant::Success)
        .add_invariant(Invariant::Remains {
            condition: Node::atom("LastBlock"),
            value: Value::number(1),
        });
    let cleared = world.clone().clear_invariants(Some("success"));
    assert_eq!(cleared.invariants().len(), 1);
    assert_eq!(cleared.invariants()[0].class(), "remains");
    assert!(world.clear_invariants(None).invariants().is_empty());
}

#[test]
fn test_end_event_rotates_holds_and_expectations() {
    let expectation = Expectation::Remains {
        condition: Node::atom("LastBlock"),
        value: Value::number(1),
    };
    let world = World::default()
        .hold_invariants(Hold::All)
        .add_expectation(expectation.clone())
        .set_tx_option(TxOption::Value(BigInt::from(5)));
    assert!(world.held().is_empty());
    assert_eq!(world.tx_options().value, Some(BigInt::from(5)));

    let world = world.end_event();
    assert_eq!(world.held(), &[Hold::All]);
    assert_eq!(world.expectations(), &[expectation]);
    assert!(world.pending_expectations().is_empty());
    assert_eq!(world.tx_options(), &TxOptions::default());

    let world = world.end_event();
    assert!(world.held().is_empty());
    assert!(world.expectations().is_empty());
}

#[test]
fn test_set_setting() {
    let world = World::default().add_alias("Geoff", addr(1));
    let world = world.set_setting("verbose", "true").unwrap();
    assert!(world.settings().verbose);
    let world = world.set_setting("from", "Geoff").unwrap();
    assert_eq!(world.settings().default_from, Some(addr(1)));
    let world = world.set_setting("network", "mainnet").unwrap();
    assert_eq!(world.settings().extra.get("network").map(String::as_str), Some("mainnet"));
    assert!(world.set_setting("verbose", "sometimes").is_err());
}

#[test]
fn test_registry_json_round_trip() {
    let json = r#"{
        "Erc20": {
            "ZRX": { "address": "0xc000000000000000000000000000000000000001", "contract": "StandardToken", "decimals": 18 }
        }
    }"#;
    let registry = Registry::from_json(json).unwrap();
    let record = registry.get("erc20", "zrx").unwrap();
    assert_eq!(record.contract, "StandardToken");
    assert_eq!(record.metadata.get("decimals"), Some(&serde_json::json!(18)));

    let again = Registry::from_json(&registry.to_json().unwrap()).unwrap();
    assert_eq!(again, registry);
}

#[test]
fn test_registry_last_write_wins() {
    let mut registry = Registry::default();
    registry.insert("Box", "Shelf", ContractRecord::new(addr(1), "Storage"));
    registry.insert("Box", "Shelf", ContractRecord::new(addr(2), "Storage"));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.find("Shelf").map(|(kind, r)| (kind, r.address.clone())), Some(("Box", addr(2))));
}

#[test]
fn test_registry_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.json");
    assert!(Registry::load(&path).unwrap().is_empty());

    let mut registry = Registry::default();
    registry.insert("Box", "Shelf", ContractRecord::new(addr(3), "Storage"));
    registry.save(&path).unwrap();
    assert_eq!(Registry::load(&path).unwrap(), registry);
}

#[test]
fn test_world_equality_ignores_sharing() {
    let a = World::default().add_alias("Geoff", addr(1));
    let b = World::default().add_alias("Geoff", addr(1));
    assert_eq!(a, b);
}
