//! Error rendering using ariadne
//!
//! Parse errors and failures raised while running an event are shown
//! against the scenario source with the offending span underlined.
//! Errors without a location print as a single line.

use crate::{Diagnostic, ScenarioError};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_NAME: &str = "<scenario>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use scenario::{Interpreter, render_error};
/// use scenario::chain::MemoryChain;
///
/// # async fn demo() {
/// let interpreter = Interpreter::builder(Arc::new(MemoryChain::new())).build();
/// let world = interpreter.initial_world().await.unwrap();
/// let source = "Frobnicate 1";
/// if let Err(e) = interpreter.run(world, source).await {
///     render_error(&e, source);
/// }
/// # }
/// ```
pub fn render_error(error: &ScenarioError, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(
    error: &ScenarioError,
    source: &str,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String (useful for logs and UIs)
pub fn render_error_to_string(error: &ScenarioError, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &ScenarioError, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &ScenarioError,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error.to_diagnostic() {
        Some(diagnostic) => render_diagnostics(source, &[diagnostic], writer, use_color),
        None => writeln!(writer, "Error[{}]: {}", error.code(), error),
    }
}

fn render_diagnostics(
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let span = clamp(diag.span.0.clone(), source.len());
        let mut report = Report::build(ReportKind::Error, (SOURCE_NAME, span.clone()))
            .with_message(&diag.message)
            .with_config(ariadne::Config::default().with_color(use_color));

        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        let color = colors.next();
        report = report.with_label(
            Label::new((SOURCE_NAME, span))
                .with_message(&diag.message)
                .with_color(color),
        );

        for related in &diag.related {
            let color = colors.next();
            report = report.with_label(
                Label::new((SOURCE_NAME, clamp(related.span.0.clone(), source.len())))
                    .with_message(&related.message)
                    .with_color(color),
            );
        }

        for help_msg in &diag.help {
            report = report.with_help(help_msg);
        }

        report
            .finish()
            .write((SOURCE_NAME, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}

/// Spans past the end of input (e.g. an unclosed list) point at the last byte.
fn clamp(span: std::ops::Range<usize>, len: usize) -> std::ops::Range<usize> {
    let start = span.start.min(len);
    let end = span.end.clamp(start, len);
    if start == end && start == len && len > 0 {
        return len - 1..len;
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpreter;
    use crate::chain::MemoryChain;
    use std::sync::Arc;

    async fn run(source: &str) -> ScenarioError {
        let interpreter = Interpreter::builder(Arc::new(MemoryChain::new())).build();
        let world = interpreter.initial_world().await.unwrap();
        match interpreter.run(world, source).await {
            Err(e) => e,
            Ok(_) => panic!("expected `{}` to fail", source),
        }
    }

    #[tokio::test]
    async fn test_render_parse_error() {
        let source = "Print (1 2";
        let error = run(source).await;
        let output = render_error_to_string_no_color(&error, source);

        assert!(output.contains("Error"));
        assert!(output.contains("Print (1 2"));
    }

    #[tokio::test]
    async fn test_render_unclosed_list_labels_end_of_input() {
        let source = "Print (1 2";
        let error = run(source).await;
        let output = render_error_to_string_no_color(&error, source);

        assert!(output.contains("P002"), "{}", output);
        assert!(output.contains("input ends here"), "{}", output);
    }

    #[tokio::test]
    async fn test_render_unknown_command_points_at_event() {
        let source = "Print 1\nFrobnicate 2";
        let error = run(source).await;
        let output = render_error_to_string_no_color(&error, source);

        assert!(output.contains("S004"), "{}", output);
        assert!(output.contains("Frobnicate 2"));
        assert!(output.contains("expected one of"));
    }

    #[tokio::test]
    async fn test_render_to_string_captures_output() {
        let source = "Assert True False";
        let error = run(source).await;
        let output = render_error_to_string_no_color(&error, source);

        assert!(!output.is_empty());
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_error_without_location() {
        let error = ScenarioError::AssertionFailed("boom".to_string());
        let output = render_error_to_string_no_color(&error, "");
        assert_eq!(output, "Error[S007]: assertion failed: boom\n");
    }

    #[test]
    fn test_clamp_past_end() {
        assert_eq!(clamp(10..12, 4), 3..4);
        assert_eq!(clamp(4..4, 4), 3..4);
        assert_eq!(clamp(1..12, 4), 1..4);
        assert_eq!(clamp(2..2, 4), 2..2);
        assert_eq!(clamp(0..0, 0), 0..0);
    }
}
