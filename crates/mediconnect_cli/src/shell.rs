//! Interactive shell
//!
//! Every line is parsed with the same clap definitions as the one-shot
//! commands, so `book d1 --date 2025-06-01 --time "10:00 AM"` works the same
//! in both places. The store lives for the whole shell session, which keeps
//! registrations and bookings around until exit.

use clap::Parser;
use mediconnect_core::{CareStore, StoreConfig, log_error};
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use rustyline_async::{Readline, ReadlineEvent};

use crate::commands::{self, Commands, Context};
use crate::output::Output;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "mediconnect", disable_version_flag = true)]
struct ShellCommand {
    #[command(subcommand)]
    command: Commands,
}

/// Split a line into arguments, honouring quotes and backslash escapes
pub fn split_args(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_token = true;
                }
                None => return Err("dangling escape at end of line".to_string()),
            },
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {} quote", q));
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}

pub async fn run(store: &mut CareStore, config: &StoreConfig) -> Result<()> {
    let (mut rl, writer) = Readline::new(format!("{} ", ">".bright_blue())).into_diagnostic()?;

    // Route log lines through the shared writer so they don't break the prompt
    crate::tracing_writer::set_shared_writer(writer.clone());
    let output = Output::new().with_writer(writer);

    output.status("Type 'help' for commands, 'quit' or 'exit' to leave");
    if let Some(account) = store.current() {
        output.info("Session:", &format!("{} ({})", account.name(), account.role()));
    }

    loop {
        match rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "quit" || trimmed == "exit" {
                    output.status("Goodbye!");
                    break;
                }

                rl.add_history_entry(line.clone());

                let args = match split_args(trimmed) {
                    Ok(args) => args,
                    Err(e) => {
                        output.error(&e);
                        continue;
                    }
                };

                let command = match ShellCommand::try_parse_from(args) {
                    Ok(parsed) => parsed.command,
                    // clap renders help and usage errors itself
                    Err(e) => {
                        output.raw(e.render().to_string().trim_end());
                        continue;
                    }
                };

                let mut ctx = Context {
                    store: &mut *store,
                    config,
                    output: output.clone(),
                    interactive: true,
                };
                if let Err(e) = commands::run(&mut ctx, command).await {
                    log_error!("Command failed", e);
                    output.error(&e.to_string());
                    if let Some(help) = e.help() {
                        output.status(&help.to_string());
                    }
                }
            }
            Ok(ReadlineEvent::Interrupted) => {
                output.status("CTRL-C");
                continue;
            }
            Ok(ReadlineEvent::Eof) => {
                output.status("CTRL-D");
                break;
            }
            Err(err) => {
                output.error(&format!("Error: {:?}", err));
                break;
            }
        }
    }

    Ok(())
}
