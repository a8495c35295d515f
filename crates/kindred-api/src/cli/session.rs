//! Session CLI commands: list, show.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use uuid::Uuid;

use kindred_core::repository::session::SessionRepository;

use crate::state::AppState;

/// List all saved sessions in a table.
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let sessions = state.profile_service.list_sessions().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No saved sessions. Save one from a chat with {}",
            style("i").blue().bold(),
            style("/save <name>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Chatbot").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for session in &sessions {
        table.add_row(vec![
            Cell::new(&session.session_name).fg(Color::Cyan),
            Cell::new(&session.chatbot_name),
            Cell::new(&session.user_name),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(session.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Show one session including its full transcript.
pub async fn show_session(state: &AppState, id: &str, json: bool) -> Result<()> {
    let id = id
        .parse::<Uuid>()
        .map_err(|_| anyhow::anyhow!("invalid session id: '{id}'"))?;

    let record = state
        .profile_service
        .session_repo()
        .get(&id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no session with id {id}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} ({} × {})",
        style("Session:").bold(),
        style(&record.session_name).cyan(),
        record.chatbot_name,
        record.user_name
    );
    println!(
        "  {}",
        style(format!(
            "saved {}",
            record.updated_at.format("%Y-%m-%d %H:%M")
        ))
        .dim()
    );
    println!();

    for turn in &record.messages {
        println!("  {}", turn.render());
    }
    if record.messages.is_empty() {
        println!("  {}", style("(empty transcript)").dim());
    }
    println!();
    Ok(())
}
