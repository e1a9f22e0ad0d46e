//! The `formats` command: list converters, status and declared formats.

use anyhow::Result;
use console::{style, Term};

use morphix_core::{ConversionContext, Converter, WorkerStatus};

pub fn command_formats(term: &Term, context: &ConversionContext) -> Result<()> {
    let bold_style = console::Style::new().bold();

    for converter in context.registry().converters() {
        let status = match converter.status() {
            WorkerStatus::Ready => style("ready").green(),
            WorkerStatus::Downloading => style("downloading").yellow(),
            WorkerStatus::NotReady => style("not-ready").dim(),
            WorkerStatus::Error => style("error").red(),
        };
        let kind = if converter.is_remote() { " (remote)" } else { "" };
        term.write_line(
            format!(
                "{}{} [{}]",
                bold_style.apply_to(converter.name()),
                kind,
                status
            )
            .as_str(),
        )?;

        // Native formats are marked with a star.
        let formats: Vec<String> = converter
            .supported_formats()
            .iter()
            .map(|f| {
                if f.is_native() {
                    format!("{}*", f.name())
                } else {
                    f.name().to_string()
                }
            })
            .collect();
        term.write_line(format!("  {}", formats.join(" ")).as_str())?;
    }

    Ok(())
}
