//! `schema` command: what the model gets to see of the database.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use heavylifter_core::sql::SqlDatabase;

/// Print the dialect, the usable tables and the table info.
pub async fn show_schema<D: SqlDatabase>(db: &D, json: bool) -> Result<()> {
    let tables = db.usable_table_names().await?;
    let table_info = db.table_info(None).await?;

    if json {
        let out = serde_json::json!({
            "dialect": db.dialect(),
            "tables": tables,
            "table_info": table_info,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} database, {} usable table(s)",
        style("⚡").bold(),
        style(db.dialect().prompt_name()).cyan(),
        tables.len()
    );
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Table").fg(Color::White)]);
    for name in &tables {
        table.add_row(vec![Cell::new(name).fg(Color::Cyan)]);
    }
    println!("{table}");
    println!();

    println!("  {}", style("── Table info ──").dim());
    println!("{table_info}");
    Ok(())
}
