use crate::errors::ScenarioError;
use crate::test_utils;
use crate::values::{Number, Value};
use crate::world::World;
use crate::Interpreter;
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

async fn setup() -> (Interpreter, World) {
    let (interpreter, _) = test_utils::interpreter();
    let world = interpreter.initial_world().await.unwrap();
    (interpreter, world)
}

async fn value(source: &str) -> Value {
    let (interpreter, world) = setup().await;
    interpreter.resolve(&world, source).await.unwrap()
}

#[tokio::test]
async fn test_literals() {
    assert_eq!(value("5").await, Value::number(5));
    assert_eq!(value("1e18").await.as_number().unwrap().encode(), BigInt::from(10u64.pow(18)));
    assert_eq!(value("true").await, Value::Bool(true));
    assert_eq!(value("nothing").await, Value::Nothing);
    assert_eq!(value("\"Hello there\"").await, Value::string("Hello there"));
}

#[tokio::test]
async fn test_aliases_ignore_case() {
    let (interpreter, world) = setup().await;
    let geoff = world.settings().lookup_alias("Geoff").cloned().unwrap();
    assert_eq!(interpreter.resolve(&world, "Geoff").await.unwrap(), Value::Address(geoff.clone()));
    assert_eq!(interpreter.resolve(&world, "geoff").await.unwrap(), Value::Address(geoff));
}

#[tokio::test]
async fn test_operators() {
    assert_eq!(value("(+ 1 2 3)").await, Value::number(6));
    assert_eq!(value("(- 10 4)").await, Value::number(6));
    assert_eq!(value("(* 2 (+ 1 2))").await, Value::number(6));
    assert_eq!(value("(/ 12 2)").await, Value::number(6));
    assert_eq!(value("(< 1 2)").await, Value::Bool(true));
    assert_eq!(value("(>= 1 2)").await, Value::Bool(false));
    assert_eq!(value("(= 2 2)").await, Value::Bool(true));
    assert_eq!(value("(!= Nothing 0)").await, Value::Bool(true));
}

#[tokio::test]
async fn test_operator_errors() {
    let (interpreter, world) = setup().await;
    for source in ["(/ 1 0)", "(+ 1 Geoff)", "(+ 1)", "(< 1 2 3)", "(< \"a\" 1)"] {
        assert!(
            matches!(
                interpreter.resolve(&world, source).await,
                Err(ScenarioError::ValueResolution { .. })
            ),
            "{} should not resolve",
            source
        );
    }
}

#[tokio::test]
async fn test_core_fetchers() {
    assert_eq!(value("(Sum 1 2 3)").await, Value::number(6));
    assert_eq!(value("(Sub 5 2)").await, Value::number(3));
    assert_eq!(value("(Multiply 5 2)").await, Value::number(10));
    assert_eq!(value("(Divide 5 2)").await.show(), "2.5");
    assert_eq!(value("(Max 3 4)").await, Value::number(4));
    assert_eq!(value("(Min 3 4)").await, Value::number(3));
    assert_eq!(value("(Equal 1 1)").await, Value::Bool(true));
    assert_eq!(
        value("(List 1 true)").await,
        Value::List(vec![Value::number(1), Value::Bool(true)])
    );
    assert_eq!(value("(Nothing)").await, Value::Nothing);
    assert_eq!(value("Anything").await, Value::Anything);
}

#[tokio::test]
async fn test_exp_scales_for_the_wire_but_shows_unscaled() {
    let exp = value("(Exp 1.5)").await;
    let number: &Number = exp.as_number().unwrap();
    assert_eq!(number.show(), "1.5");
    assert_eq!(number.encode(), BigInt::from(15u64) * BigInt::from(10u64.pow(17)));

    let six = value("(Exp 2 6)").await;
    assert_eq!(six.as_number().unwrap().encode(), BigInt::from(2_000_000));
}

#[tokio::test]
async fn test_precisely() {
    assert!(value("(Precisely 1.2345 3)").await.matches(&value("1.23").await).unwrap());
    assert!(!value("(Precisely 1.2345 4)").await.matches(&value("1.23").await).unwrap());
}

#[tokio::test]
async fn test_map_pairs() {
    let spread = value("(Map (a 1) (b 2))").await;
    assert_eq!(spread, value("(Map ((a 1) (b 2)))").await);
    assert_eq!(spread.show(), "{a: 1, b: 2}");
    assert_eq!(value("(Map (a 1))").await.show(), "{a: 1}");
}

#[tokio::test]
async fn test_nullary_fetcher_atoms() {
    assert_eq!(value("LastBlock").await, Value::number(1));
    assert_eq!(value("(LastBlock)").await, Value::number(1));
    assert_eq!(value("LastContract").await, Value::Nothing);
}

#[tokio::test]
async fn test_contract_values() {
    let (interpreter, world) = setup().await;
    assert_eq!(interpreter.resolve(&world, "(Box Shelf Address)").await.unwrap(), Value::Nothing);

    let world = interpreter.run(world, "Box Deploy Shelf").await.unwrap();
    let address = interpreter.resolve(&world, "(Box Shelf Address)").await.unwrap();
    assert!(matches!(address, Value::Address(_)));
    assert_eq!(interpreter.resolve(&world, "Shelf").await.unwrap(), address);
    assert_eq!(interpreter.resolve(&world, "LastContract").await.unwrap(), address);

    assert_eq!(interpreter.resolve(&world, "(Box Shelf Get \"size\")").await.unwrap(), Value::Nothing);
    let world = interpreter.run(world, "Box Shelf Set \"size\" 5").await.unwrap();
    assert_eq!(interpreter.resolve(&world, "(Box Shelf Get \"size\")").await.unwrap(), Value::number(5));
}

#[tokio::test]
async fn test_unresolvable_atom_names_token() {
    let (interpreter, world) = setup().await;
    match interpreter.resolve(&world, "Zorp").await {
        Err(ScenarioError::ValueResolution { token, .. }) => assert_eq!(token, "Zorp"),
        other => panic!("expected ValueResolution, got {:?}", other),
    }
}

#[tokio::test]
async fn test_out_of_range_exponent_is_a_resolution_error() {
    let (interpreter, world) = setup().await;
    for source in ["1e-9223372036854775808", "1e4000000000"] {
        match interpreter.resolve(&world, source).await {
            Err(ScenarioError::ValueResolution { token, .. }) => assert_eq!(token, source),
            other => panic!("expected ValueResolution for {}, got {:?}", source, other),
        }
    }
}

#[tokio::test]
async fn test_resolution_does_not_change_world() {
    let (interpreter, world) = setup().await;
    let before = world.clone();
    let _ = interpreter.resolve(&world, "(Sum 1 (Max 2 LastBlock))").await.unwrap();
    assert_eq!(world, before);
}
