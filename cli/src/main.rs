use clap::Parser;
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, ValidationResult, Validator, default_emacs_keybindings,
};
use scenario::chain::{MemoryChain, StorageContract};
use scenario::events::ContractKind;
use scenario::{Interpreter, InterpreterOptions, World, render_error};
use scenario_core::parser::{ParseErrorKind, parse};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Failures of the front end itself. Scenario errors are rendered with
/// ariadne instead and end the process with status 1.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
enum CliError {
    #[error("cannot read scenario file `{}`", path.display())]
    #[diagnostic(code(scenario::cli::read_file))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read standard input")]
    #[diagnostic(code(scenario::cli::read_stdin))]
    ReadStdin(#[source] std::io::Error),

    #[error("invalid log filter")]
    #[diagnostic(code(scenario::cli::log_filter), help("check the RUST_LOG variable"))]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
}

type Result<T> = miette::Result<T>;

/// Scenario - run contract integration scenarios
#[derive(Parser, Debug)]
#[command(name = "scenario")]
#[command(about = "Run scenario files against an in-memory chain", long_about = None)]
struct Args {
    /// Scenario files, run in order against the same world
    files: Vec<PathBuf>,

    /// Scenario text to run (if neither files nor this are given, reads from stdin)
    #[arg(short = 'e', long = "expression")]
    expression: Option<String>,

    /// Network file holding the contract registry
    #[arg(long)]
    network: Option<PathBuf>,

    /// Print every action as it is recorded
    #[arg(long)]
    verbose: bool,

    /// Give up on `SleepUntil*` after this many polls
    #[arg(long, default_value_t = 1000)]
    max_poll_iterations: usize,
}

/// Keeps the editor open while a list or string is unfinished.
struct ScenarioValidator;

impl Validator for ScenarioValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match parse(line) {
            Err(err)
                if matches!(
                    err.kind,
                    ParseErrorKind::UnclosedDelimiter { .. } | ParseErrorKind::UnterminatedString
                ) =>
            {
                ValidationResult::Incomplete
            }
            _ => ValidationResult::Complete,
        }
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline(commands: Vec<String>) -> (Reedline, DefaultPrompt) {
    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['-', '_']);
        completions.insert(commands);
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let line_editor = Reedline::create()
        .with_completer(completer)
        .with_validator(Box::new(ScenarioValidator))
        .with_menu(ReedlineMenu::EngineCompleter(Box::new(ide_menu)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("scenario".to_string()),
        DefaultPromptSegment::Empty,
    );

    (line_editor, prompt)
}

fn build_interpreter(args: &Args) -> Interpreter {
    let options = InterpreterOptions {
        network_file: args.network.clone(),
        verbose: args.verbose,
        max_poll_iterations: args.max_poll_iterations,
        ..InterpreterOptions::default()
    };
    Interpreter::builder(Arc::new(MemoryChain::new()))
        .options(options)
        .contract_kind(ContractKind::new("Storage", StorageContract::ARTIFACT))
        .build()
}

/// Run one batch. On failure the error is rendered and `None` returned.
async fn interpret_input(interpreter: &Interpreter, world: World, input: &str) -> Option<World> {
    match interpreter.run(world, input).await {
        Ok(world) => Some(world),
        Err(e) => {
            tracing::debug!(error = ?e, "batch failed");
            render_error(&e, input);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG to control log level. Default to WARN if not set.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .map_err(CliError::from)?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let interpreter = build_interpreter(&args);
    let mut world = match interpreter.initial_world().await {
        Ok(world) => world,
        Err(e) => {
            render_error(&e, "");
            std::process::exit(1);
        }
    };

    if !args.files.is_empty() || args.expression.is_some() {
        for path in &args.files {
            let source = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
                path: path.clone(),
                source,
            })?;
            tracing::info!(file = %path.display(), "running scenario file");
            world = match interpret_input(&interpreter, world, &source).await {
                Some(world) => world,
                None => std::process::exit(1),
            };
        }
        if let Some(expr) = &args.expression {
            if interpret_input(&interpreter, world, expr).await.is_none() {
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let is_interactive = atty::is(atty::Stream::Stdin);

    if is_interactive {
        let (mut line_editor, prompt) = setup_reedline(interpreter.session().commands().names());

        println!("Scenario REPL - enter events to run (Ctrl+D or Ctrl+C to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => {
                    // A failed event leaves the previous world in place.
                    if let Some(next) = interpret_input(&interpreter, world.clone(), &buffer).await {
                        world = next;
                    }
                }
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .map_err(CliError::ReadStdin)?;
        if interpret_input(&interpreter, world, &source).await.is_none() {
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_validator_waits_for_unfinished_input() {
        let validator = ScenarioValidator;
        assert!(matches!(validator.validate("Print (1 2"), ValidationResult::Incomplete));
        assert!(matches!(validator.validate("Print \"Hello"), ValidationResult::Incomplete));
        assert!(matches!(validator.validate("Print (1 2)"), ValidationResult::Complete));
        assert!(matches!(validator.validate("Print 1)"), ValidationResult::Complete));
    }

    #[test]
    fn test_read_file_error_names_path() {
        let err = CliError::ReadFile {
            path: PathBuf::from("missing.scen"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "cannot read scenario file `missing.scen`");
        assert_eq!(
            err.code().map(|code| code.to_string()),
            Some("scenario::cli::read_file".to_string())
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bad_log_filter_converts() {
        let err = tracing_subscriber::EnvFilter::try_new("scenario=bogus").map(|_| ()).map_err(CliError::from);
        assert!(matches!(err, Err(CliError::LogFilter(_))));
    }
}
