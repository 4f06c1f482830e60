use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use super::error::{ParseError, ParseErrorKind, convert_pest_error};
use super::node::{Event, Node, unescape_string};
use super::Span;

/// Default maximum list nesting accepted by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Parser)]
#[grammar = "parser/scenario.pest"]
pub struct ScenarioParser;

/// Parse a batch of events.
///
/// Every non-blank line is one event. A line consisting of a single
/// parenthesised list is unwrapped, so `(Print "hi")` and `Print "hi"` are
/// the same event.
pub fn parse(source: &str) -> Result<Vec<Event>, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse a batch of events, rejecting lists nested deeper than `max_depth`.
pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Vec<Event>, ParseError> {
    let mut pairs = ScenarioParser::parse(Rule::batch, source)
        .map_err(|err| convert_pest_error(err, source))?;
    let Some(batch) = pairs.next() else {
        return Ok(Vec::new());
    };

    let mut events = Vec::new();
    for pair in batch.into_inner() {
        if pair.as_rule() != Rule::event {
            continue;
        }
        let span = Span::from(pair.as_span());
        let mut nodes = pair
            .into_inner()
            .map(|p| build_node(p, source))
            .collect::<Result<Vec<_>, _>>()?;

        let node = if matches!(nodes.as_slice(), [Node::List(_)]) {
            nodes.remove(0)
        } else {
            Node::List(nodes)
        };

        let depth = node.depth();
        if depth > max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded { depth, max_depth },
                source.to_string(),
                span,
            ));
        }
        events.push(Event::new(node, span));
    }

    tracing::trace!(count = events.len(), "parsed events");
    Ok(events)
}

/// Parse exactly one node. Lists keep their parentheses, atoms stay atoms.
pub fn parse_node(source: &str) -> Result<Node, ParseError> {
    let mut pairs = ScenarioParser::parse(Rule::single, source)
        .map_err(|err| convert_pest_error(err, source))?;
    let node = pairs
        .next()
        .and_then(|single| single.into_inner().find(|p| p.as_rule() != Rule::EOI));
    match node {
        Some(pair) => build_node(pair, source),
        None => Err(ParseError::new(
            ParseErrorKind::Other {
                message: "expected a single expression".to_string(),
            },
            source.to_string(),
            Span::new(0, source.len()),
        )),
    }
}

fn build_node(pair: Pair<Rule>, source: &str) -> Result<Node, ParseError> {
    match pair.as_rule() {
        Rule::atom => Ok(Node::Atom(pair.as_str().to_string())),
        Rule::string => {
            let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Node::Quoted(unescape_string(inner)))
        }
        Rule::list => pair
            .into_inner()
            .map(|p| build_node(p, source))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::List),
        other => Err(ParseError::new(
            ParseErrorKind::Other {
                message: format!("unexpected rule {:?}", other),
            },
            source.to_string(),
            Span::from(pair.as_span()),
        )),
    }
}
