use std::collections::BTreeMap;

use super::*;
use crate::errors::ScenarioError;
use crate::interpreter::Ctx;
use crate::parser::{Node, parse_node};
use crate::resolver::getters::{
    get_address, get_from, get_number, get_pairs, get_value, get_values, get_word,
};
use crate::test_utils;
use crate::values::{Number, Value};
use pretty_assertions::assert_eq;

fn tokens(source: &str) -> Vec<Node> {
    match parse_node(&format!("({})", source)).unwrap() {
        Node::List(items) => items,
        other => vec![other],
    }
}

async fn bind_source(params: &[Arg], source: &str) -> crate::Result<Args> {
    let (interpreter, _) = test_utils::interpreter();
    let world = interpreter.initial_world().await.unwrap();
    let nodes = tokens(source);
    bind(Ctx::new(interpreter.session()), &world, "Test", params, &nodes).await
}

#[tokio::test]
async fn test_nullable_binds_nothing_not_zero() {
    let params = [Arg::new("amount", get_number).nullable()];
    let args = bind_source(&params, "").await.unwrap();
    assert_eq!(args.get("amount").unwrap(), &Value::Nothing);
    assert_ne!(args.get("amount").unwrap(), &Value::number(0));
    assert_eq!(args.optional("amount").unwrap(), None);
}

#[tokio::test]
async fn test_default_is_used_when_tokens_run_out() {
    let params = [
        Arg::new("amount", get_number),
        Arg::new("decimals", get_number).default(Value::number(18)),
    ];
    let args = bind_source(&params, "5").await.unwrap();
    assert_eq!(args.number("amount").unwrap(), &Number::from(5));
    assert_eq!(args.number("decimals").unwrap(), &Number::from(18));

    let args = bind_source(&params, "5 6").await.unwrap();
    assert_eq!(args.number("decimals").unwrap(), &Number::from(6));
}

#[tokio::test]
async fn test_missing_argument() {
    let params = [Arg::new("to", get_address), Arg::new("amount", get_number)];
    match bind_source(&params, "Geoff").await {
        Err(ScenarioError::MissingArgument { command, param }) => {
            assert_eq!(command, "Test");
            assert_eq!(param, "amount");
        }
        other => panic!("expected MissingArgument, got {:?}", other),
    }
}

#[tokio::test]
async fn test_too_many_arguments() {
    let params = [Arg::new("amount", get_number)];
    match bind_source(&params, "1 2").await {
        Err(ScenarioError::TooManyArguments { extra, .. }) => assert_eq!(extra, "2"),
        other => panic!("expected TooManyArguments, got {:?}", other),
    }
}

#[tokio::test]
async fn test_variadic_takes_everything_left() {
    let params = [Arg::new("name", get_word), Arg::new("args", get_values).variadic()];
    let args = bind_source(&params, "Shelf 1 2 true").await.unwrap();
    assert_eq!(args.string("name").unwrap(), "Shelf");
    assert_eq!(
        args.list("args").unwrap(),
        &[Value::number(1), Value::number(2), Value::Bool(true)]
    );

    let args = bind_source(&params, "Shelf").await.unwrap();
    assert!(args.list("args").unwrap().is_empty());
}

#[tokio::test]
async fn test_mapped_variadic_applies_getter_per_node() {
    let params = [Arg::new("xs", get_number).mapped().variadic()];
    let expected = [Value::number(1), Value::number(2), Value::number(3)];

    let spread = bind_source(&params, "1 2 3").await.unwrap();
    assert_eq!(spread.list("xs").unwrap(), &expected);

    let single_list = bind_source(&params, "(1 2 3)").await.unwrap();
    assert_eq!(single_list, spread);

    let none = bind_source(&params, "").await.unwrap();
    assert!(none.list("xs").unwrap().is_empty());
}

#[tokio::test]
async fn test_mapped_positional_maps_one_list_node() {
    let params = [Arg::new("xs", get_number).mapped(), Arg::new("to", get_address)];
    let args = bind_source(&params, "(1 2) Geoff").await.unwrap();
    assert_eq!(args.list("xs").unwrap(), &[Value::number(1), Value::number(2)]);
    assert!(args.address("to").is_ok());

    let args = bind_source(&params, "7 Geoff").await.unwrap();
    assert_eq!(args.list("xs").unwrap(), &[Value::number(7)]);

    assert!(matches!(
        bind_source(&params, "(1 2) Geoff 3").await,
        Err(ScenarioError::TooManyArguments { .. })
    ));
}

#[tokio::test]
async fn test_pairs_accept_spread_nested_and_single() {
    let params = [Arg::new("pairs", get_pairs).variadic()];
    let spread = bind_source(&params, "(a 1) (b 2)").await.unwrap();
    let nested = bind_source(&params, "((a 1) (b 2))").await.unwrap();
    assert_eq!(spread, nested);
    assert_eq!(spread.list("pairs").unwrap().len(), 2);

    let single = bind_source(&params, "(a 1)").await.unwrap();
    assert_eq!(
        single.list("pairs").unwrap(),
        &[Value::List(vec![Value::string("a"), Value::number(1)])]
    );

    let empty = bind_source(&params, "()").await.unwrap();
    assert!(empty.list("pairs").unwrap().is_empty());
}

#[tokio::test]
async fn test_positional_after_variadic_is_rejected() {
    let params = [
        Arg::new("args", get_values).variadic(),
        Arg::new("amount", get_number).default(Value::number(0)),
    ];
    match bind_source(&params, "1 2").await {
        Err(ScenarioError::InvalidSignature { command, param }) => {
            assert_eq!(command, "Test");
            assert_eq!(param, "amount");
        }
        other => panic!("expected InvalidSignature, got {:?}", other),
    }

    let params = [
        Arg::new("args", get_values).variadic(),
        Arg::new("from", get_from).implicit(),
    ];
    assert!(bind_source(&params, "1 2").await.is_ok());
}

#[tokio::test]
async fn test_implicit_prefers_context_over_default_sender() {
    let (interpreter, _) = test_utils::interpreter();
    let world = interpreter.initial_world().await.unwrap();
    let params = [Arg::new("from", get_from).implicit(), Arg::new("amount", get_number)];
    let nodes = tokens("7");
    let ctx = Ctx::new(interpreter.session());

    let args = bind(ctx, &world, "Test", &params, &nodes).await.unwrap();
    let root = world.settings().lookup_alias("Root").cloned().unwrap();
    assert_eq!(args.address("from").unwrap(), &root);

    let geoff = world.settings().lookup_alias("Geoff").cloned().unwrap();
    let implicit = BTreeMap::from([("from".to_string(), Value::Address(geoff.clone()))]);
    let args = bind(ctx.with_implicit(&implicit), &world, "Test", &params, &nodes)
        .await
        .unwrap();
    assert_eq!(args.address("from").unwrap(), &geoff);
    assert_eq!(args.number("amount").unwrap(), &Number::from(7));
}

#[tokio::test]
async fn test_rescue_replaces_failed_fetch() {
    let params = [Arg::new("value", get_value).rescue(Value::Nothing)];
    let args = bind_source(&params, "NoSuchThing").await.unwrap();
    assert_eq!(args.get("value").unwrap(), &Value::Nothing);

    let params = [Arg::new("value", get_value)];
    assert!(matches!(
        bind_source(&params, "NoSuchThing").await,
        Err(ScenarioError::ValueResolution { .. })
    ));
}

#[tokio::test]
async fn test_binding_is_total() {
    let params = [
        Arg::new("to", get_address),
        Arg::new("amount", get_number).nullable(),
    ];
    for source in ["", "Geoff", "Geoff 1", "Geoff 1 2", "Geoff 1 2 3", "1 Geoff", "(", ")"] {
        let Ok(nodes) = parse_node(&format!("({})", source)) else {
            continue;
        };
        let (interpreter, _) = test_utils::interpreter();
        let world = interpreter.initial_world().await.unwrap();
        let result = bind(Ctx::new(interpreter.session()), &world, "Test", &params, nodes.tokens()).await;
        match result {
            Ok(args) => assert!(args.get("to").is_ok()),
            Err(err) => assert!(err.is_bind_error(), "unexpected error for {:?}: {}", source, err),
        }
    }
}
