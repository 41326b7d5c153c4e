//! Interactive chat mode handler
//!
//! Runs a readline-based loop against the chat engine: plain input is sent
//! to the active session, `/`-prefixed input drives session management.
//! The send control is effectively disabled while an exchange is pending
//! because the loop awaits each send before prompting again; `/`-commands
//! on other sessions remain available through a second terminal only in
//! the sense that the engine itself allows concurrent sends per session.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::auth::AuthGate;
use crate::cli::Cli;
use crate::config::Config;
use crate::engine::ChatEngine;
use crate::error::{MedichatError, Result};
use crate::session::{Attachment, ChatMessage, Sender};

/// Special commands recognized in the interactive loop
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialCommand {
    /// `/new [title]` - create a session and switch to it
    NewSession(Option<String>),
    /// `/sessions` - list sessions
    ListSessions,
    /// `/select <id>` - switch the active session
    Select(String),
    /// `/attach <path>` - stage a file for the next send
    Attach(String),
    /// `/cancel` - cancel the in-flight send for the active session
    Cancel,
    /// `/help` - show command help
    Help,
    /// `/quit` - leave the chat
    Quit,
    /// Anything else starting with `/`
    Unknown(String),
}

/// Parses a `/`-prefixed line into a special command
///
/// Returns `None` for ordinary chat input.
pub fn parse_special_command(line: &str) -> Option<SpecialCommand> {
    let line = line.trim();
    if !line.starts_with('/') {
        return None;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let command = match head {
        "/new" => SpecialCommand::NewSession(rest.map(String::from)),
        "/sessions" => SpecialCommand::ListSessions,
        "/select" => match rest {
            Some(id) => SpecialCommand::Select(id.to_string()),
            None => SpecialCommand::Unknown("/select requires a session id".to_string()),
        },
        "/attach" => match rest {
            Some(path) => SpecialCommand::Attach(path.to_string()),
            None => SpecialCommand::Unknown("/attach requires a file path".to_string()),
        },
        "/cancel" => SpecialCommand::Cancel,
        "/help" => SpecialCommand::Help,
        "/quit" | "/exit" => SpecialCommand::Quit,
        other => SpecialCommand::Unknown(format!("unrecognized command {}", other)),
    };

    Some(command)
}

/// Runs the interactive chat loop
///
/// # Errors
///
/// Returns an error when bootstrap fails or the terminal cannot be driven;
/// per-send failures are rendered into the transcript instead.
pub async fn run_chat(config: Config, cli: &Cli, auth: Arc<dyn AuthGate>) -> Result<()> {
    let client = super::build_client(&config, auth.clone())?;
    let engine = ChatEngine::with_timeout(client, auth, config.send_timeout());

    engine.bootstrap().await?;

    let start_session = match &cli.command {
        crate::cli::Commands::Chat { session } => session.clone(),
        _ => None,
    };
    if let Some(id) = start_session {
        engine.select_session(&id).await?;
    }

    println!("{}", "Medichat - type /help for commands".bold());
    render_active_transcript(&engine)?;

    let mut editor = DefaultEditor::new()?;
    let mut staged_attachment: Option<Attachment> = None;

    loop {
        let prompt = match &staged_attachment {
            Some(att) => format!("[{}] > ", att.file_name),
            None => "> ".to_string(),
        };

        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        if line.trim().is_empty() && staged_attachment.is_none() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        if let Some(command) = parse_special_command(&line) {
            match command {
                SpecialCommand::Quit => break,
                SpecialCommand::Help => print_help(),
                SpecialCommand::ListSessions => {
                    for summary in engine.summaries() {
                        let marker = if engine.active_id().as_deref() == Some(&summary.id) {
                            "*"
                        } else {
                            " "
                        };
                        println!("{} {}  {}  {}", marker, summary.id, summary.title, summary.created_at);
                    }
                }
                SpecialCommand::NewSession(title) => {
                    let title = title.unwrap_or_else(|| config.chat.default_session_title.clone());
                    match engine.create_session(&title).await {
                        Ok(id) => println!("Created session {}", id),
                        Err(e) => eprintln!("{} {}", "error:".red(), e),
                    }
                }
                SpecialCommand::Select(id) => match engine.select_session(&id).await {
                    Ok(()) => render_active_transcript(&engine)?,
                    Err(e) => eprintln!("{} {}", "error:".red(), e),
                },
                SpecialCommand::Attach(path) => match load_attachment(&path) {
                    Ok(att) => {
                        println!("Attached {}", att.file_name);
                        staged_attachment = Some(att);
                    }
                    Err(e) => eprintln!("{} {}", "error:".red(), e),
                },
                SpecialCommand::Cancel => {
                    if let Some(id) = engine.active_id() {
                        engine.cancel(&id);
                    }
                }
                SpecialCommand::Unknown(detail) => {
                    eprintln!("{} {}", "error:".red(), detail);
                }
            }
            continue;
        }

        // Ordinary input: dispatch to the active session. The staged
        // attachment is cleared whatever the outcome, matching the engine's
        // input-buffer contract.
        let attachment = staged_attachment.take();
        match engine.send(line.trim(), attachment).await {
            Ok(_) => render_last_exchange(&engine)?,
            Err(e) => match e.downcast_ref::<MedichatError>() {
                Some(MedichatError::SendInProgress(_)) => {
                    eprintln!("{} a send is already in progress", "error:".red());
                }
                Some(MedichatError::NothingToSend) => {}
                _ => eprintln!("{} {}", "error:".red(), e),
            },
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /new [title]    create a session and switch to it");
    println!("  /sessions       list sessions (* marks the active one)");
    println!("  /select <id>    switch the active session");
    println!("  /attach <path>  stage a file for the next send");
    println!("  /cancel         cancel the in-flight send");
    println!("  /quit           leave the chat");
}

/// Reads a file from disk into an attachment
fn load_attachment(path: &str) -> Result<Attachment> {
    let path = Path::new(path);
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(Attachment { file_name, bytes })
}

/// Prints the full transcript of the active session
fn render_active_transcript(engine: &ChatEngine<impl crate::remote::RemoteSessionClient>) -> Result<()> {
    let Some(id) = engine.active_id() else {
        return Ok(());
    };
    for message in engine.messages(&id)? {
        render_message(&message);
    }
    Ok(())
}

/// Prints the last user/assistant pair after a send
fn render_last_exchange(engine: &ChatEngine<impl crate::remote::RemoteSessionClient>) -> Result<()> {
    let Some(id) = engine.active_id() else {
        return Ok(());
    };
    let messages = engine.messages(&id)?;
    for message in messages.iter().rev().take(2).rev() {
        render_message(message);
    }
    Ok(())
}

fn render_message(message: &ChatMessage) {
    let label = match message.sender {
        Sender::User => "You".cyan().bold(),
        Sender::Ai => "AI ".green().bold(),
    };
    println!("{} {}", label, message.text);
    if let Some(name) = &message.file_name {
        println!("    [attachment: {}]", name);
    }
}
