//! `gupshup personas` - list the built-in personas.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use gupshup_core::persona::builtin_personas;
use gupshup_infra::config::{ConfigOverrides, load_config, resolve_data_dir};
use gupshup_types::persona::Persona;

/// Print the persona registry as a table, or JSON with `--json`.
///
/// Needs no credential, so it works before `GOOGLE_API_KEY` is set.
pub async fn list_personas(overrides: &ConfigOverrides, json: bool) -> Result<()> {
    let config = overrides.apply(load_config(&resolve_data_dir()).await?);
    let personas = builtin_personas();

    if json {
        let pages: Vec<_> = personas.iter().map(Persona::page).collect();
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    println!();
    println!("{}", personas_table(&personas, &config.persona));
    println!();
    println!(
        "  Start one with: {}",
        style("gupshup chat --persona <slug>").yellow()
    );
    println!();
    Ok(())
}

fn personas_table(personas: &[Persona], active: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("Slug").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Tagline").fg(Color::White),
    ]);

    for persona in personas {
        let marker = if persona.slug == active.trim().to_lowercase() {
            Cell::new("●").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            marker,
            Cell::new(&persona.slug).fg(Color::White),
            Cell::new(format!("{} {}", persona.page_icon, persona.name)).fg(Color::Cyan),
            Cell::new(&persona.tagline).fg(Color::DarkGrey),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_builtin() {
        let personas = builtin_personas();
        let rendered = personas_table(&personas, "rishta").to_string();
        for persona in &personas {
            assert!(rendered.contains(&persona.slug));
        }
        assert!(rendered.contains("●"));
    }

    #[test]
    fn test_table_without_active_match_has_no_marker() {
        let rendered = personas_table(&builtin_personas(), "nobody").to_string();
        assert!(!rendered.contains("●"));
    }
}
