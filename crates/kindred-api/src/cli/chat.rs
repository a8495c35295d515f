//! Interactive chat loop with in-chat slash commands.
//!
//! Reads lines from stdin; anything starting with `/` is a control command,
//! everything else goes to the generation backend.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use kindred_core::chat::engine::ChatEngine;
use kindred_types::error::ChatError;
use kindred_types::profile::{ProfileKind, SessionContext};

use crate::state::AppState;

/// In-chat slash commands.
#[derive(Debug, PartialEq)]
enum ChatCommand {
    Help,
    /// Persist the transcript under a name.
    Save(String),
    /// Load a saved session by id or name.
    Load(String),
    /// Clear the transcript.
    Reset,
    /// Print the transcript so far.
    History,
    Quit,
    Unknown(String),
}

/// Parse user input as a slash command. `None` means plain chat input.
fn parse_command(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim().to_string());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/save" => match arg {
            Some(name) if !name.is_empty() => Some(ChatCommand::Save(name)),
            _ => Some(ChatCommand::Unknown("/save requires a name".to_string())),
        },
        "/load" => match arg {
            Some(target) if !target.is_empty() => Some(ChatCommand::Load(target)),
            _ => Some(ChatCommand::Unknown(
                "/load requires a session id or name".to_string(),
            )),
        },
        "/reset" => Some(ChatCommand::Reset),
        "/history" => Some(ChatCommand::History),
        "/quit" | "/exit" | "/q" => Some(ChatCommand::Quit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}  {}", style("/save <name>").cyan(), "Save the transcript as a session");
    println!("  {}  {}", style("/load <id|name>").cyan(), "Load a saved session");
    println!("  {}  {}", style("/reset").cyan(), "Clear the transcript");
    println!("  {}  {}", style("/history").cyan(), "Show the transcript so far");
    println!("  {}  {}", style("/quit").cyan(), "End the chat");
    println!();
}

/// Resolve a `/load` target: a UUID is used directly, anything else is
/// matched against saved session names.
async fn resolve_session_id(state: &AppState, target: &str) -> Result<Uuid> {
    if let Ok(id) = target.parse::<Uuid>() {
        return Ok(id);
    }
    let sessions = state.profile_service.list_sessions().await?;
    sessions
        .into_iter()
        .find(|s| s.session_name == target)
        .map(|s| s.id)
        .ok_or_else(|| anyhow::anyhow!("no saved session named '{target}'"))
}

/// Run the interactive chat loop until `/quit` or EOF.
pub async fn run(
    state: &AppState,
    chatbot: Option<String>,
    user: Option<String>,
    resume: Option<String>,
) -> Result<()> {
    let mut ctx = SessionContext::default();
    if let Some(name) = chatbot {
        ctx.chatbot = state.profile_service.load(ProfileKind::Chatbot, &name).await?;
    }
    if let Some(name) = user {
        ctx.user = state.profile_service.load(ProfileKind::User, &name).await?;
    }

    let mut engine = ChatEngine::with_generator(Arc::clone(&state.generator));

    if let Some(target) = resume {
        let id = resolve_session_id(state, &target).await?;
        engine
            .load_history(state.profile_service.as_ref(), &mut ctx, &id)
            .await?;
        println!(
            "  {} Resumed session with {} turns",
            style("✓").green().bold(),
            engine.turn_count()
        );
    }

    println!();
    println!(
        "  {} Chatting as {} with {}. Type {} for commands.",
        style("●").green(),
        style(&ctx.user.name).cyan(),
        style(&ctx.chatbot.name).cyan(),
        style("/help").yellow()
    );
    println!();

    let opts = state.generate_options();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", style("You:").bold());
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF (Ctrl+D)
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Some(ChatCommand::Help) => print_help(),
            Some(ChatCommand::Quit) => break,
            Some(ChatCommand::Reset) => {
                engine.reset();
                println!("  {}", style("Transcript cleared.").dim());
            }
            Some(ChatCommand::History) => {
                println!();
                for turn in engine.history() {
                    println!("  {}", turn.render());
                }
                if engine.turn_count() == 0 {
                    println!("  {}", style("(empty transcript)").dim());
                }
                println!();
            }
            Some(ChatCommand::Save(name)) => {
                match engine.save_history(state.profile_service.as_ref(), &mut ctx, &name).await {
                    Ok(id) => println!(
                        "  {} Saved session {} ({})",
                        style("✓").green().bold(),
                        style(&name).cyan(),
                        style(id.to_string()).dim()
                    ),
                    Err(e) => println!("  {} {e}", style("✗").red().bold()),
                }
            }
            Some(ChatCommand::Load(target)) => match resolve_session_id(state, &target).await {
                Ok(id) => {
                    match engine.load_history(state.profile_service.as_ref(), &mut ctx, &id).await {
                        Ok(()) => println!(
                            "  {} Loaded {} turns; now {} with {}",
                            style("✓").green().bold(),
                            engine.turn_count(),
                            style(&ctx.user.name).cyan(),
                            style(&ctx.chatbot.name).cyan()
                        ),
                        Err(e) => println!("  {} {e}", style("✗").red().bold()),
                    }
                }
                Err(e) => println!("  {} {e}", style("✗").red().bold()),
            },
            Some(ChatCommand::Unknown(msg)) => {
                println!(
                    "  {} {msg} (try {})",
                    style("?").yellow().bold(),
                    style("/help").yellow()
                );
            }
            None => match engine.respond(&ctx, line.trim(), &opts).await {
                Ok(reply) => {
                    println!("{} {}", style(format!("{}:", ctx.chatbot.name)).bold().cyan(), reply);
                }
                Err(ChatError::NoModelLoaded) => {
                    println!(
                        "  {} No generation backend loaded; check [chat] in config.toml",
                        style("✗").red().bold()
                    );
                }
                Err(e) => println!("  {} {e}", style("✗").red().bold()),
            },
        }
    }

    println!();
    println!("  {}", style("Chat ended.").dim());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_input_is_not_a_command() {
        assert_eq!(parse_command("hello there"), None);
    }

    #[test]
    fn test_parse_save_with_name() {
        assert_eq!(
            parse_command("/save beach trip"),
            Some(ChatCommand::Save("beach trip".to_string()))
        );
    }

    #[test]
    fn test_parse_save_without_name() {
        assert!(matches!(
            parse_command("/save"),
            Some(ChatCommand::Unknown(_))
        ));
    }

    #[test]
    fn test_parse_quit_aliases() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_command("/dance"),
            Some(ChatCommand::Unknown("/dance".to_string()))
        );
    }
}
