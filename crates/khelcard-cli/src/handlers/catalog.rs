//! Catalog listing.

use crate::commands::CatalogArgs;
use crate::error::CliResult;
use crate::output::OutputFormat;
use khelcard::GameCatalog;

/// Execute the catalog command.
pub fn execute_catalog(args: &CatalogArgs) -> CliResult<()> {
    let catalog = GameCatalog::standard();
    match OutputFormat::from(args.format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(catalog.entries())?);
        }
        OutputFormat::Text => {
            for line in catalog_lines(&catalog) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// One aligned line per game: code, English name, Hindi name, accent
#[must_use]
pub fn catalog_lines(catalog: &GameCatalog) -> Vec<String> {
    catalog
        .entries()
        .iter()
        .map(|entry| {
            format!(
                "{}  {:<12} {:<14} {}",
                entry.code, entry.name_english, entry.name_hindi, entry.accent
            )
        })
        .collect()
}
