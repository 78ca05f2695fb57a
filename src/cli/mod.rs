//! Terminal front end. Handlers only talk to the store, the aggregator,
//! the settings manager, and the export helpers.

pub mod commands;
pub mod core;
pub mod formatters;
pub mod help;
pub mod output;
pub mod registry;
pub mod shell_context;

use rustyline::{error::ReadlineError, DefaultEditor};

pub use self::core::{CommandError, CommandResult};
pub use self::shell_context::ShellContext;

const PROMPT: &str = "subtrack> ";

/// Runs the command given in `args`, or an interactive shell when `args` is empty.
pub fn run_cli(args: &[String]) -> CommandResult {
    let mut context = ShellContext::from_environment()?;
    if let Some((name, rest)) = args.split_first() {
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
        return match context.execute(name, &rest) {
            Err(CommandError::ExitRequested) => Ok(()),
            other => other,
        };
    }
    run_shell(&mut context)
}

fn run_shell(context: &mut ShellContext) -> CommandResult {
    let mut editor = DefaultEditor::new()?;
    output::info("SubTrack shell. Type `help` for commands, `exit` to quit.");
    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line.as_str());
        match context.execute_line(&line) {
            Ok(()) => {}
            Err(CommandError::ExitRequested) => return Ok(()),
            Err(CommandError::UnknownCommand(_)) => {}
            Err(err) => output::error(err),
        }
    }
}
