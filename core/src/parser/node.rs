//! Token trees produced by the parser.
//!
//! A node carries no type information. Types are assigned only when the
//! resolver or a getter looks at it.

use core::fmt;

use super::Span;

/// A parsed token tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// A bare word such as `Print`, `1e18` or `0xabc...`.
    Atom(String),
    /// A `"..."` string with escapes already processed.
    Quoted(String),
    /// A parenthesised group. Order is significant.
    List(Vec<Node>),
}

impl Node {
    pub fn atom(text: impl Into<String>) -> Self {
        Node::Atom(text.into())
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Node::Quoted(text.into())
    }

    pub fn list(items: impl IntoIterator<Item = Node>) -> Self {
        Node::List(items.into_iter().collect())
    }

    /// The empty list, used as the input of implicit arguments.
    pub fn empty() -> Self {
        Node::List(Vec::new())
    }

    /// Text of an atom or quoted string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Atom(s) | Node::Quoted(s) => Some(s),
            Node::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true if this is an atom equal to `name`, ignoring case.
    pub fn is_word(&self, name: &str) -> bool {
        matches!(self, Node::Atom(s) if s.eq_ignore_ascii_case(name))
    }

    /// The head atom of a list, if any.
    pub fn head(&self) -> Option<&str> {
        match self {
            Node::List(items) => match items.first() {
                Some(Node::Atom(s)) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    /// Nesting depth. Atoms have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Node::List(items) => 1 + items.iter().map(Node::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Tokens of an event: the items of a list, or the node itself.
    pub fn tokens(&self) -> &[Node] {
        match self {
            Node::List(items) => items,
            other => core::slice::from_ref(other),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Atom(s) => write!(f, "{}", s),
            Node::Quoted(s) => write!(f, "\"{}\"", escape_string(s)),
            Node::List(items) => {
                write!(f, "(")?;
                write_tokens(f, items)?;
                write!(f, ")")
            }
        }
    }
}

fn write_tokens(f: &mut fmt::Formatter<'_>, items: &[Node]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Render an event the way it is written in a script: top-level tokens
/// without the enclosing parentheses. An event that is empty, or whose only
/// token is itself a list, keeps them, so parsing the text again gives the
/// same tree.
pub fn format_event(node: &Node) -> String {
    struct Tokens<'a>(&'a [Node]);

    impl fmt::Display for Tokens<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_tokens(f, self.0)
        }
    }

    match node {
        Node::List(items) if matches!(items.as_slice(), [] | [Node::List(_)]) => node.to_string(),
        _ => Tokens(node.tokens()).to_string(),
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Process backslash escapes inside a quoted string.
pub(crate) fn unescape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// One top-level event together with its location in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub node: Node,
    pub span: Span,
}

impl Event {
    pub fn new(node: Node, span: Span) -> Self {
        Self { node, span }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_event(&self.node))
    }
}
