use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::Session;
use crate::display::{print_notifications, print_result, print_view};
use crate::line;
use taxsync_application::{ACTION_TABLE, Action, ActionOutcome, Fields, dispatch};

const BUILTINS: [&str; 4] = ["show", "help", "quit", "exit"];

/// Completion, highlighting and hints over the command names.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        let mut commands: Vec<String> = ACTION_TABLE
            .iter()
            .map(|binding| binding.name.to_string())
            .chain(BUILTINS.iter().map(|name| name.to_string()))
            .collect();
        commands.sort();
        Self { commands }
    }

    fn is_command(&self, word: &str) -> bool {
        self.commands.iter().any(|cmd| cmd == word)
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        if self.is_command(word) {
            let sep = if line.len() > word.len() { " " } else { "" };
            Owned(format!("{}{}{}", word.bright_cyan(), sep, rest))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

fn print_help() {
    println!("{}", "Commands".bright_magenta().bold());
    for binding in ACTION_TABLE {
        println!("  {}", line::usage(binding).bright_cyan());
        println!("      {}", binding.summary.bright_black());
    }
    println!("  {}", "show".bright_cyan());
    println!("      {}", "Print the session".bright_black());
    println!("  {}", "quit".bright_cyan());
    println!();
    println!(
        "{}",
        "Fields can be given as key=value or in the order shown; quote values with spaces."
            .bright_black()
    );
}

/// Dispatches one action and prints what it produced.
async fn perform(session: &mut Session, action: Action, fields: &Fields) {
    let outcome = dispatch(
        &session.controller,
        &mut session.notifications,
        action,
        fields,
    )
    .await;
    print_notifications(&session.notifications.drain());

    match outcome {
        Ok(ActionOutcome::Updated) => {
            println!();
            print_view(&session.controller.render_view().await);
        }
        Ok(ActionOutcome::Calculated(result)) => {
            println!();
            print_result(&result);
        }
        Err(e) if e.is_retryable() => {
            println!("{}", "The server may be unavailable; try again.".yellow());
        }
        Err(_) => {}
    }
}

async fn handle_line(session: &mut Session, input: &str) {
    let tokens = match line::tokenize(input) {
        Ok(tokens) => tokens,
        Err(message) => {
            eprintln!("{}", message.red());
            return;
        }
    };
    let Some((command, args)) = tokens.split_first() else {
        return;
    };

    match command.as_str() {
        "help" => print_help(),
        "show" => print_view(&session.controller.render_view().await),
        name => match Action::from_name(name) {
            Some(action) => match line::fields(action.binding(), args) {
                Ok(fields) => perform(session, action, &fields).await,
                Err(message) => {
                    eprintln!("{}", message.red());
                    println!(
                        "{}",
                        format!("Usage: {}", line::usage(action.binding())).bright_black()
                    );
                }
            },
            None => println!("{}", "Unknown command (type 'help')".bright_black()),
        },
    }
}

/// Interactive session: loads state once, then runs actions until `quit`.
pub async fn run(session: &mut Session) -> Result<()> {
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== TaxSync ===".bright_magenta().bold());
    println!(
        "{}",
        "Type 'help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    perform(session, Action::Refresh, &Fields::new()).await;

    loop {
        let readline = rl.readline("taxsync> ");

        match readline {
            Ok(input) => {
                let trimmed = input.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);
                handle_line(session, trimmed).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
