//! Image CLI commands: one-shot generation and history listing.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use kindred_types::image::{ImageModel, ImageRequest};

use crate::state::AppState;

#[allow(clippy::too_many_arguments)]
pub async fn generate(
    state: &AppState,
    prompt: String,
    negative_prompt: String,
    model: &str,
    steps: u16,
    cfg_scale: f32,
    width: u32,
    height: u32,
    seed: Option<i64>,
    json: bool,
) -> Result<()> {
    let model = model.parse::<ImageModel>().map_err(|e| anyhow::anyhow!(e))?;

    let request = ImageRequest {
        prompt,
        negative_prompt,
        model,
        steps,
        cfg_scale,
        width,
        height,
        seed,
    };

    let record = state.image_service.generate(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!();
    println!("  {} Image generated", style("✓").green().bold());
    println!("  {}  {}", style("Model:").bold(), record.model);
    println!("  {}   {}", style("Path:").bold(), style(&record.path).cyan());
    println!();
    Ok(())
}

/// List recent generations in a table.
pub async fn list_images(state: &AppState, limit: i64, json: bool) -> Result<()> {
    let records = state.image_service.history(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!(
            "  {} No images generated yet. Try: {}",
            style("i").blue().bold(),
            style("kindred image \"a lighthouse at dusk\"").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Prompt").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Steps").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Path").fg(Color::White),
    ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(&record.prompt),
            Cell::new(record.model.to_string()).fg(Color::Cyan),
            Cell::new(record.params.steps.to_string()),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&record.path).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    Ok(())
}
