//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::coverage::CoverageType;

/// Linecov - coverage report ingestion for test-generation feedback loops.
#[derive(Parser)]
#[command(name = "linecov")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the coverage report produced by the test run
    #[arg(short, long)]
    pub report: PathBuf,

    /// Source file whose line coverage is being queried
    #[arg(short, long)]
    pub source: PathBuf,

    /// Coverage report format
    #[arg(short = 't', long = "type", value_enum)]
    pub coverage_type: CoverageTypeArg,

    /// Path to a diff-cover JSON report (required for diff-cover-json)
    #[arg(long)]
    pub diff_report: Option<PathBuf>,

    /// Aggregate coverage for every file in the report
    #[arg(long)]
    pub by_file: bool,

    /// Completion time of the test command, in milliseconds since the epoch
    #[arg(long, default_value_t = 0)]
    pub test_time_ms: u64,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Coverage report format, as accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CoverageTypeArg {
    /// Cobertura XML report
    Cobertura,
    /// LCOV .info report
    Lcov,
    /// diff-cover JSON report
    #[value(alias = "diff_cover_json")]
    DiffCoverJson,
}

impl From<CoverageTypeArg> for CoverageType {
    fn from(arg: CoverageTypeArg) -> Self {
        match arg {
            CoverageTypeArg::Cobertura => CoverageType::Cobertura,
            CoverageTypeArg::Lcov => CoverageType::Lcov,
            CoverageTypeArg::DiffCoverJson => CoverageType::DiffCoverJson,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_coverage_type_arg_maps_to_library_enum() {
        assert_eq!(
            CoverageType::from(CoverageTypeArg::Cobertura),
            CoverageType::Cobertura
        );
        assert_eq!(CoverageType::from(CoverageTypeArg::Lcov), CoverageType::Lcov);
        assert_eq!(
            CoverageType::from(CoverageTypeArg::DiffCoverJson),
            CoverageType::DiffCoverJson
        );
    }
}
