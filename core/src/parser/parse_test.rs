use super::*;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn atom(s: &str) -> Node {
    Node::atom(s)
}

fn single(source: &str) -> Node {
    let events = parse(source).expect("parse failed");
    assert_eq!(events.len(), 1, "expected exactly one event in {:?}", source);
    events.into_iter().next().map(|e| e.node).unwrap()
}

#[test]
fn test_bare_event() {
    assert_eq!(
        single("Print \"Hello there\""),
        Node::list([atom("Print"), Node::quoted("Hello there")])
    );
}

#[test]
fn test_parenthesised_event_is_unwrapped() {
    assert_eq!(single("(Print \"Hello there\")"), single("Print \"Hello there\""));
}

#[test]
fn test_nested_lists() {
    assert_eq!(
        single("Gate (Erc20 ZRX Address) (Erc20 Deploy BAT)"),
        Node::list([
            atom("Gate"),
            Node::list([atom("Erc20"), atom("ZRX"), atom("Address")]),
            Node::list([atom("Erc20"), atom("Deploy"), atom("BAT")]),
        ])
    );
}

#[test]
fn test_single_atom_event() {
    assert_eq!(single("Inspect"), Node::list([atom("Inspect")]));
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        single(r#"Print "say \"hi\"\n\\""#),
        Node::list([atom("Print"), Node::quoted("say \"hi\"\n\\")])
    );
}

#[test]
fn test_one_event_per_line_with_comments() {
    let events = parse(indoc! {"
        # Deploy a token
        Erc20 Deploy ZRX -- the zero ex token

        Print \"done\"  # trailing
    "})
    .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].node,
        Node::list([atom("Erc20"), atom("Deploy"), atom("ZRX")])
    );
    assert_eq!(events[1].node, Node::list([atom("Print"), Node::quoted("done")]));
}

#[test]
fn test_list_may_span_lines() {
    let events = parse(indoc! {"
        Given (Equal 1 1)
            (Print \"yes\")
        (Invariant Static
            (Erc20 ZRX TotalSupply))
    "});
    // A new line outside parentheses starts a new event.
    let events = events.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2].node,
        Node::list([
            atom("Invariant"),
            atom("Static"),
            Node::list([atom("Erc20"), atom("ZRX"), atom("TotalSupply")]),
        ])
    );
}

#[test]
fn test_negative_numbers_are_atoms() {
    assert_eq!(
        single("Expect Changes (Value) -5"),
        Node::list([atom("Expect"), atom("Changes"), Node::list([atom("Value")]), atom("-5")])
    );
}

#[test]
fn test_empty_batch() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("\n\n   \n# only a comment\n").unwrap().is_empty());
}

#[test]
fn test_event_spans() {
    let source = "Print \"a\"\nHistory 3";
    let events = parse(source).unwrap();
    assert_eq!(events[0].span.str_of(source), "Print \"a\"");
    assert_eq!(events[1].span.str_of(source), "History 3");
}

#[test]
fn test_unclosed_paren() {
    let err = parse("Gate (Erc20 ZRX Address").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnclosedDelimiter { delimiter: '(' });
    assert_eq!(err.span, Span::new(5, 6));
}

#[test]
fn test_unclosed_paren_diagnostic_points_at_end_of_input() {
    let source = "Gate (Erc20 ZRX Address";
    let diagnostic = parse(source).unwrap_err().to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("P002"));
    assert_eq!(diagnostic.related.len(), 1);
    assert_eq!(diagnostic.related[0].span, Span::new(source.len(), source.len()));
    assert_eq!(diagnostic.related[0].message, "input ends here");

    let diagnostic = parse("Print \"a\")").unwrap_err().to_diagnostic();
    assert!(diagnostic.related.is_empty());
}

#[test]
fn test_stray_close_paren() {
    let err = parse("Print \"a\")").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    assert_eq!(err.span, Span::new(9, 10));
}

#[test]
fn test_unterminated_string() {
    let err = parse("Print \"hello").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("P003"));
}

#[test]
fn test_max_depth() {
    let err = parse_with_max_depth("Read (a (b (c (d))))", 3).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded { depth: 5, max_depth: 3 }
    ));
}

#[test]
fn test_round_trip() {
    let sources = [
        "Print \"Hello there\"",
        "Gate (Erc20 ZRX Address) (Erc20 Deploy BAT)",
        "Read (Sum 1 (Exp 0.5) -3)",
        "Print \"tab\\t quote\\\" backslash\\\\\"",
        "((nested))",
        "Assert Equal (Erc20 ZRX TotalSupply) 1e18",
    ];
    for source in sources {
        let first = parse(source).unwrap();
        let rendered: Vec<String> = first.iter().map(|e| e.node.to_string()).collect();
        let second: Vec<Node> = parse(&rendered.join("\n"))
            .unwrap()
            .into_iter()
            .map(|e| e.node)
            .collect();
        let first: Vec<Node> = first.into_iter().map(|e| e.node).collect();
        assert_eq!(first, second, "round trip changed {:?}", source);
    }
}

#[test]
fn test_format_event_round_trip() {
    let sources = [
        "Print \"Hello there\"",
        "(Print 1)",
        "((A B))",
        "(((A B)))",
        "((A) B)",
        "()",
        "Gate (Erc20 ZRX Address) (Erc20 Deploy BAT)",
    ];
    for source in sources {
        let first: Vec<Node> = parse(source).unwrap().into_iter().map(|e| e.node).collect();
        let rendered: Vec<String> = first.iter().map(format_event).collect();
        let second: Vec<Node> = parse(&rendered.join("\n"))
            .unwrap()
            .into_iter()
            .map(|e| e.node)
            .collect();
        assert_eq!(first, second, "format_event round trip changed {:?}", source);
    }
}

#[test]
fn test_format_event_keeps_parens_around_single_list() {
    let event = parse("((A B))").unwrap().remove(0);
    assert_eq!(format_event(&event.node), "((A B))");
    let event = parse("(A B)").unwrap().remove(0);
    assert_eq!(format_event(&event.node), "A B");
}

#[test]
fn test_parse_node_keeps_structure() {
    let node = parse_node("(Erc20 ZRX Address)").unwrap();
    assert_eq!(node, Node::list([atom("Erc20"), atom("ZRX"), atom("Address")]));
    assert_eq!(parse_node(&node.to_string()).unwrap(), node);
    assert_eq!(parse_node("  1e18 ").unwrap(), atom("1e18"));
}

#[test]
fn test_format_event_drops_outer_parens() {
    let node = single("(Gate (Erc20 ZRX Address) (Erc20 Deploy BAT))");
    assert_eq!(
        format_event(&node),
        "Gate (Erc20 ZRX Address) (Erc20 Deploy BAT)"
    );
}
