//! pdfstitch - Merge PDF files and carry their outlines across.

mod cli;
mod telemetry;

use clap::Parser;
use std::process;

use crate::cli::Cli;
use pdfstitch::config::{Config, OverwriteMode};
use pdfstitch::error::PdfStitchError;
use pdfstitch::io::PdfWriter;
use pdfstitch::merge::Merger;
use pdfstitch::output::{OutputFormatter, display_diagnostics, display_plan, display_statistics};
use pdfstitch::report::MergeReport;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init_logging();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

async fn run(mut cli: Cli) -> Result<(), PdfStitchError> {
    cli.validate()?;
    cli.inputs = cli.get_all_inputs().await?;
    let config = cli.to_config()?;
    tracing::debug!(
        inputs = config.inputs.len(),
        outline_mode = %config.outline_mode,
        jobs = config.effective_jobs(),
        "configuration ready"
    );

    let formatter = OutputFormatter::from_config(&config);
    formatter.debug(&format!("{} v{}", pdfstitch::NAME, pdfstitch::VERSION));

    let merger = Merger::new();

    if config.dry_run {
        let plan = merger.plan(&config).await?;
        display_plan(&formatter, &plan);
        formatter.info(&format!(
            "\nOutline mode: {}. Output would be: {}",
            config.outline_mode,
            config.output.display()
        ));
        return Ok(());
    }

    let writer = PdfWriter::new();
    writer.can_write(&config.output).await?;
    handle_output_overwrite(&config, &formatter, &writer).await?;

    formatter.info(&format!("Merging {} file(s)...", config.inputs.len()));
    let output = merger.merge(&config).await?;
    display_diagnostics(&formatter, &output.diagnostics);

    let report = config
        .report
        .as_ref()
        .map(|_| MergeReport::new(&config.output, &output));
    let statistics = output.statistics;

    let write_stats = writer
        .save_with_stats(output.document, &config.output)
        .await?;

    if let (Some(report), Some(path)) = (report, config.report.as_ref()) {
        report.write_to(path).await?;
        formatter.debug(&format!("Report written to {}", path.display()));
    }

    display_statistics(&formatter, &statistics);
    formatter.success(&format!(
        "Created {} ({})",
        config.output.display(),
        write_stats.format_file_size()
    ));

    Ok(())
}

/// Decide whether an existing output file may be replaced.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
    writer: &PdfWriter,
) -> Result<(), PdfStitchError> {
    if !writer.exists(&config.output).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfStitchError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // nobody to ask
            if formatter.is_quiet() {
                return Err(PdfStitchError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfStitchError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => Err(PdfStitchError::Cancelled),
            }
        }
    }
}
