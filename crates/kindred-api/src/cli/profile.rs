//! Profile CLI commands: list, show, save, delete.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use kindred_core::repository::profile::ProfileRepository;
use kindred_types::profile::{AttrValue, ProfileData, ProfileKind, SessionContext};

use crate::state::AppState;

/// Parse a `key=value` attribute flag into a typed value.
///
/// Values are tried as bool, integer, float, then JSON (for arrays and
/// nested objects); anything else is plain text.
pub fn parse_attr(raw: &str) -> Result<(String, AttrValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("attribute must be key=value, got '{raw}'"))?;
    if key.trim().is_empty() {
        anyhow::bail!("attribute key cannot be empty in '{raw}'");
    }

    let parsed = if let Ok(b) = value.parse::<bool>() {
        AttrValue::Bool(b)
    } else if let Ok(i) = value.parse::<i64>() {
        AttrValue::Int(i)
    } else if let Ok(f) = value.parse::<f64>() {
        AttrValue::Float(f)
    } else if value.starts_with('[') || value.starts_with('{') {
        serde_json::from_str(value)
            .map_err(|e| anyhow::anyhow!("invalid JSON attribute '{key}': {e}"))?
    } else {
        AttrValue::from(value)
    };

    Ok((key.to_string(), parsed))
}

/// List all profiles of a kind in a table.
pub async fn list_profiles(state: &AppState, kind: &str, json: bool) -> Result<()> {
    let kind = kind.parse::<ProfileKind>().map_err(|e| anyhow::anyhow!(e))?;
    let profiles = state.profile_service.profile_repo().list(kind).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!();
        println!(
            "  {} No {kind} profiles saved yet. Create one with: {}",
            style("i").blue().bold(),
            style(format!("kindred save profile {kind} <name>")).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Attributes").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for profile in &profiles {
        table.add_row(vec![
            Cell::new(&profile.name).fg(Color::Cyan),
            Cell::new(profile.data.len().to_string()),
            Cell::new(profile.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Show one profile's attributes.
pub async fn show_profile(state: &AppState, kind: &str, name: &str, json: bool) -> Result<()> {
    let kind = kind.parse::<ProfileKind>().map_err(|e| anyhow::anyhow!(e))?;
    let active = state.profile_service.load(kind, name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&active)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} ({})",
        style("Profile:").bold(),
        style(&active.name).cyan(),
        kind
    );
    if active.data.is_empty() {
        println!("  {}", style("(no attributes saved)").dim());
    } else {
        for (key, value) in &active.data {
            println!(
                "    {} {}",
                style(format!("{key}:")).bold(),
                serde_json::to_string(value)?
            );
        }
    }
    println!();
    Ok(())
}

/// Create or update a profile from `--attr` flags.
pub async fn save_profile(
    state: &AppState,
    kind: &str,
    name: &str,
    attrs: &[String],
    json: bool,
) -> Result<()> {
    let kind = kind.parse::<ProfileKind>().map_err(|e| anyhow::anyhow!(e))?;

    // Editing starts from whatever is already stored
    let mut data: ProfileData = state.profile_service.load(kind, name).await?.data;
    for raw in attrs {
        let (key, value) = parse_attr(raw)?;
        data.insert(key, value);
    }

    let mut ctx = SessionContext::default();
    let profile = state
        .profile_service
        .save(&mut ctx, kind, name, data)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Saved {kind} profile {} ({} attributes)",
        style("✓").green().bold(),
        style(&profile.name).cyan(),
        profile.data.len()
    );
    println!();
    Ok(())
}

/// Delete a profile with confirmation.
pub async fn delete_profile(
    state: &AppState,
    kind: &str,
    name: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let kind = kind.parse::<ProfileKind>().map_err(|e| anyhow::anyhow!(e))?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {kind} profile '{name}'?"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let mut ctx = SessionContext::default();
    state.profile_service.delete(&mut ctx, kind, name).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": name }));
        return Ok(());
    }

    println!();
    println!(
        "  {} Deleted {kind} profile {}",
        style("✓").green().bold(),
        style(name).cyan()
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attr_bool() {
        let (key, value) = parse_attr("curious=true").unwrap();
        assert_eq!(key, "curious");
        assert_eq!(value, AttrValue::Bool(true));
    }

    #[test]
    fn test_parse_attr_int() {
        let (_, value) = parse_attr("age=27").unwrap();
        assert_eq!(value, AttrValue::Int(27));
    }

    #[test]
    fn test_parse_attr_float() {
        let (_, value) = parse_attr("height=1.68").unwrap();
        assert_eq!(value, AttrValue::Float(1.68));
    }

    #[test]
    fn test_parse_attr_text() {
        let (_, value) = parse_attr("mood=cheerful").unwrap();
        assert_eq!(value, AttrValue::from("cheerful"));
    }

    #[test]
    fn test_parse_attr_text_with_equals() {
        let (key, value) = parse_attr("motto=live=laugh").unwrap();
        assert_eq!(key, "motto");
        assert_eq!(value, AttrValue::from("live=laugh"));
    }

    #[test]
    fn test_parse_attr_json_list() {
        let (_, value) = parse_attr(r#"likes=["tea","rain"]"#).unwrap();
        assert_eq!(
            value,
            AttrValue::List(vec![AttrValue::from("tea"), AttrValue::from("rain")])
        );
    }

    #[test]
    fn test_parse_attr_missing_equals() {
        assert!(parse_attr("no-value").is_err());
    }

    #[test]
    fn test_parse_attr_empty_key() {
        assert!(parse_attr("=oops").is_err());
    }
}
