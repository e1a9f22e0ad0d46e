//! The `convert` command: add files, convert all, bundle the archive.

use anyhow::Result;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use morphix_core::{ConversionContext, ConversionProgress, Converter};

pub async fn command_convert(
    term: &Term,
    context: &ConversionContext,
    inputs: Vec<PathBuf>,
    to_override: Option<String>,
) -> Result<()> {
    let bold_style = console::Style::new().bold();
    let orchestrator = context.orchestrator();

    let added = orchestrator.add(inputs).await;
    if orchestrator.is_empty() {
        term.write_line(
            format!(
                "{}",
                style("No convertible files were found in the input.").yellow()
            )
            .as_str(),
        )?;
        return Ok(());
    }

    if let Some(ref to) = to_override {
        for task in &added {
            if task.is_supported() {
                task.set_target(to);
            }
        }
    }

    for task in orchestrator.tasks() {
        match task.to() {
            Some(to) => term.write_line(
                format!(
                    "{} ({} -> {}) via {}",
                    bold_style.apply_to(&task.source().file_name),
                    task.from(),
                    to,
                    task.converters()
                        .first()
                        .map(|c| c.name().to_string())
                        .unwrap_or_else(|| "none".to_string()),
                )
                .as_str(),
            )?,
            None => term.write_line(
                format!(
                    "{} ({}) {}",
                    bold_style.apply_to(&task.source().file_name),
                    task.from(),
                    style("unsupported").yellow(),
                )
                .as_str(),
            )?,
        }
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message("converting...");

    let (progress_tx, mut progress_rx) = mpsc::channel::<ConversionProgress>(64);
    let progress_bar = bar.clone();
    let consumer = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            let speed = progress.speed.as_deref().unwrap_or("");
            progress_bar.set_message(format!(
                "{} {:.0}% {}",
                progress.file, progress.percent, speed
            ));
        }
    });

    let report = orchestrator
        .convert_all_with_progress(Some(progress_tx))
        .await;
    let _ = consumer.await;
    bar.finish_and_clear();

    for task in orchestrator.tasks() {
        match task.result() {
            Some(_) => term.write_line(
                format!(
                    "{} {}",
                    style("converted").green(),
                    task.output_file_name()
                        .unwrap_or_else(|| task.source().file_name.clone()),
                )
                .as_str(),
            )?,
            None => term.write_line(
                format!(
                    "{} {}: {}",
                    style("failed").red(),
                    task.source().file_name,
                    task.error().unwrap_or_else(|| "not converted".to_string()),
                )
                .as_str(),
            )?,
        }
    }

    let archive = orchestrator.download_all().await?;

    term.write_line(
        format!(
            "{} converted, {} failed.",
            bold_style.clone().green().apply_to(report.converted),
            if report.failed > 0 {
                console::Style::new().red().apply_to(report.failed)
            } else {
                console::Style::new().apply_to(report.failed)
            },
        )
        .as_str(),
    )?;
    if let Some(archive) = archive {
        term.write_line(
            format!(
                "Archive written to {}",
                bold_style.apply_to(archive.display())
            )
            .as_str(),
        )?;
    }

    Ok(())
}
