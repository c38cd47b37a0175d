//! Preview command handler.
//!
//! Renders the form into a fully bound preview view and prints what each
//! slot shows, the way the live preview would.

use crate::commands::PreviewArgs;
use crate::error::CliResult;
use crate::handlers::parse_day;
use crate::output::OutputFormat;
use khelcard::{
    GameCatalog, Illustration, IllustrationPicker, PreviewRenderer, PreviewView, TextSlotName,
    EMPTY_TEXT,
};
use serde::Serialize;
use std::sync::Arc;

/// What the preview region shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewReport {
    /// Big number
    pub number: String,
    /// English game name
    pub name_english: String,
    /// Hindi game name
    pub name_hindi: String,
    /// Result date line
    pub result_date: String,
    /// Date banner
    pub current_date: String,
    /// Weekday banner
    pub current_day: String,
    /// Theme class on the preview container
    pub theme: Option<String>,
    /// Visible illustration
    pub illustration: Option<Illustration>,
}

impl PreviewReport {
    /// Read a rendered view
    #[must_use]
    pub fn from_view(view: &PreviewView) -> Self {
        let text = |name| view.text(name).unwrap_or(EMPTY_TEXT).to_string();
        Self {
            number: text(TextSlotName::Number),
            name_english: text(TextSlotName::NameEnglish),
            name_hindi: text(TextSlotName::NameHindi),
            result_date: text(TextSlotName::ResultDate),
            current_date: text(TextSlotName::CurrentDate),
            current_day: text(TextSlotName::CurrentDay),
            theme: view.theme_class.clone().flatten(),
            illustration: view.illustration.flatten(),
        }
    }

    /// Label/value pairs for text output
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let illustration = self
            .illustration
            .map_or_else(|| EMPTY_TEXT.to_string(), |i| i.to_string());
        vec![
            format!("Number:       {}", self.number),
            format!("Game:         {}", self.name_english),
            format!("Game (Hindi): {}", self.name_hindi),
            format!("Result date:  {}", self.result_date),
            format!("Date:         {}", self.current_date),
            format!("Day:          {}", self.current_day),
            format!(
                "Theme:        {}",
                self.theme.as_deref().unwrap_or(EMPTY_TEXT)
            ),
            format!("Illustration: {illustration}"),
        ]
    }
}

/// Execute the preview command.
pub fn execute_preview(args: &PreviewArgs) -> CliResult<()> {
    let day = parse_day(args.selection.date.as_deref())?;
    let renderer = PreviewRenderer::new(
        Arc::new(GameCatalog::standard()),
        IllustrationPicker::default(),
    );
    let mut view = PreviewView::fully_bound();
    renderer.render(&args.selection.form().selection(), day, &mut view);
    let report = PreviewReport::from_view(&view);

    match OutputFormat::from(args.format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for line in report.lines() {
                println!("{line}");
            }
        }
    }
    Ok(())
}
