use crate::api::{Diagnostic, RelatedInfo};
use crate::parser::{Rule, Span};

/// Parser error with the offending source.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub source: String,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// A `(` without its `)`
    UnclosedDelimiter { delimiter: char },
    /// A `"` without its closing quote
    UnterminatedString,
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { depth: usize, max_depth: usize },
    /// Other parse errors (catch-all for Pest errors we don't specifically handle)
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, source: String, span: Span) -> Self {
        Self { kind, source, span }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                vec![],
            ),
            ParseErrorKind::UnclosedDelimiter { delimiter } => (
                format!("Unclosed delimiter '{}'", delimiter),
                "P002",
                vec!["Add the missing closing delimiter".to_string()],
            ),
            ParseErrorKind::UnterminatedString => (
                "Unterminated string literal".to_string(),
                "P003",
                vec!["Close the string with '\"'".to_string()],
            ),
            ParseErrorKind::MaxDepthExceeded { max_depth, .. } => (
                format!("Event nesting depth exceeds maximum of {} levels", max_depth),
                "P004",
                vec!["Reduce nesting or split the event".to_string()],
            ),
            ParseErrorKind::Other { message } => (message.clone(), "P999", vec![]),
        };

        let related = match &self.kind {
            ParseErrorKind::UnclosedDelimiter { .. } => vec![RelatedInfo {
                span: Span::new(self.source.len(), self.source.len()),
                message: "input ends here".to_string(),
            }],
            _ => Vec::new(),
        };

        Diagnostic {
            message,
            span: self.span.clone(),
            related,
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "error: {}", diagnostic.message)?;

        if let Some(ref code) = diagnostic.code {
            write!(f, " [{}]", code)?;
        }

        for help_msg in &diagnostic.help {
            write!(f, "\nhelp: {}", help_msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Convert a Pest error to a ParseError.
///
/// The grammar only fails on unbalanced delimiters, so the source is scanned
/// for those first and the Pest location is used as a fallback.
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    if let Some((kind, span)) = find_unbalanced(source) {
        return ParseError::new(kind, source.to_string(), span);
    }

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        pest::error::ErrorVariant::ParsingError { .. } => ParseErrorKind::UnexpectedToken {
            expected: "expression".to_string(),
            found: describe_at(source, span.0.start),
        },
        pest::error::ErrorVariant::CustomError { message } => ParseErrorKind::Other { message },
    };

    ParseError::new(kind, source.to_string(), span)
}

fn describe_at(source: &str, pos: usize) -> String {
    match source.get(pos..).and_then(|rest| rest.chars().next()) {
        Some(c) => format!("'{}'", c),
        None => "end of input".to_string(),
    }
}

/// Scan for the first unterminated string, stray `)` or unclosed `(`.
fn find_unbalanced(source: &str) -> Option<(ParseErrorKind, Span)> {
    let mut open: Vec<usize> = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut at_token_start = true;

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => {
                let mut closed = false;
                while let Some((_, s)) = chars.next() {
                    match s {
                        '\\' => {
                            chars.next();
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Some((ParseErrorKind::UnterminatedString, Span::new(idx, source.len())));
                }
                at_token_start = false;
                continue;
            }
            '#' if at_token_start => skip_line(&mut chars),
            '-' if at_token_start && matches!(chars.peek(), Some((_, '-'))) => skip_line(&mut chars),
            '(' => open.push(idx),
            ')' => {
                if open.pop().is_none() {
                    return Some((
                        ParseErrorKind::UnexpectedToken {
                            expected: "expression".to_string(),
                            found: "')'".to_string(),
                        },
                        Span::new(idx, idx + 1),
                    ));
                }
            }
            _ => {}
        }
        at_token_start = c.is_whitespace() || c == '(' || c == ')';
    }

    open.pop().map(|idx| {
        (
            ParseErrorKind::UnclosedDelimiter { delimiter: '(' },
            Span::new(idx, idx + 1),
        )
    })
}

fn skip_line(chars: &mut core::iter::Peekable<core::str::CharIndices<'_>>) {
    while let Some((_, c)) = chars.peek() {
        if *c == '\n' {
            break;
        }
        chars.next();
    }
}
