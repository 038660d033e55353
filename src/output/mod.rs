//! Output formatters for coverage results.

use std::io::Write;
use std::str::FromStr;

use crate::core::{Error, Result};
use crate::coverage::CoverageReport;

/// Output format enum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
    #[default]
    Text,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Format::Json),
            "markdown" => Ok(Format::Markdown),
            "text" => Ok(Format::Text),
            other => Err(Error::config(format!("unknown output format: {other}"))),
        }
    }
}

impl Format {
    pub fn format<W: Write>(&self, report: &CoverageReport, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => format_json(report, writer),
            Format::Markdown => format_markdown(report, writer),
            Format::Text => format_text(report, writer),
        }
    }
}

fn format_json<W: Write>(report: &CoverageReport, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)?;
    Ok(())
}

fn format_text<W: Write>(report: &CoverageReport, writer: &mut W) -> Result<()> {
    match report {
        CoverageReport::Single(file) => {
            writeln!(writer, "covered lines: {}", join_lines(&file.covered_lines))?;
            writeln!(writer, "missed lines:  {}", join_lines(&file.missed_lines))?;
            writeln!(writer, "coverage: {:.2}%", file.percentage())?;
        }
        CoverageReport::ByFile(by_file) => {
            for (filename, file) in by_file {
                writeln!(
                    writer,
                    "{}: {:.2}% ({} of {} lines)",
                    filename,
                    file.percentage(),
                    file.covered_lines.len(),
                    file.total_lines()
                )?;
            }
        }
    }
    Ok(())
}

fn format_markdown<W: Write>(report: &CoverageReport, writer: &mut W) -> Result<()> {
    match report {
        CoverageReport::Single(file) => {
            writeln!(writer, "**Covered lines**: {}\n", join_lines(&file.covered_lines))?;
            writeln!(writer, "**Missed lines**: {}\n", join_lines(&file.missed_lines))?;
            writeln!(writer, "**Coverage**: {:.2}%", file.percentage())?;
        }
        CoverageReport::ByFile(by_file) => {
            writeln!(writer, "| File | Covered | Missed | Coverage |")?;
            writeln!(writer, "|------|---------|--------|----------|")?;
            for (filename, file) in by_file {
                writeln!(
                    writer,
                    "| {} | {} | {} | {:.2}% |",
                    filename,
                    file.covered_lines.len(),
                    file.missed_lines.len(),
                    file.percentage()
                )?;
            }
        }
    }
    Ok(())
}

fn join_lines(lines: &[u32]) -> String {
    if lines.is_empty() {
        return "-".to_string();
    }
    lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
