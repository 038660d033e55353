//! Linecov CLI - coverage report ingestion for test-generation loops.

use std::io::stdout;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linecov::cli::{Cli, OutputFormat};
use linecov::config::Config;
use linecov::coverage::{CoverageProcessor, ReportSource};
use linecov::output::Format;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("linecov=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> linecov::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(".")?,
    };

    let format = match cli.format {
        Some(OutputFormat::Json) => Format::Json,
        Some(OutputFormat::Markdown) => Format::Markdown,
        Some(OutputFormat::Text) => Format::Text,
        None => config.output.format.parse()?,
    };

    let source = ReportSource {
        report_path: cli.report,
        source_path: cli.source,
        coverage_type: cli.coverage_type.into(),
        diff_report_path: cli.diff_report,
        by_file: cli.by_file || config.report.by_file,
    };

    let report = CoverageProcessor::new(source).process(cli.test_time_ms)?;
    format.format(&report, &mut stdout())?;
    Ok(())
}
