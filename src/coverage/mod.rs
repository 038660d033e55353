//! Coverage report ingestion.
//!
//! This module reads the coverage artifact a test run produced and answers,
//! for a given source file, which lines were executed, which were not, and
//! what fraction of lines is covered. It feeds the feedback loop that
//! decides whether a generated test actually exercised new code, so line
//! classification here directly gates that loop's termination.
//!
//! Supported report formats:
//! - Cobertura XML
//! - LCOV text (`.info`)
//! - diff-cover JSON
//!
//! Processing is a strictly forward pipeline: freshness check, format
//! dispatch, format-specific parse, aggregation. Every invocation works on
//! an immutable [`ReportSource`] and returns a fresh [`CoverageReport`];
//! nothing is cached or shared between calls.

pub mod cobertura;
pub mod diff_cover;
pub mod lcov;
pub mod matching;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Error, Result};

/// Coverage report formats understood by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    /// Cobertura XML schema (nested package/class/line elements).
    Cobertura,
    /// LCOV `.info` text format (`SF:`/`DA:`/`end_of_record` records).
    Lcov,
    /// diff-cover JSON per-file statistics.
    DiffCoverJson,
}

impl CoverageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageType::Cobertura => "cobertura",
            CoverageType::Lcov => "lcov",
            CoverageType::DiffCoverJson => "diff_cover_json",
        }
    }
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageType {
    type Err = Error;

    /// Unknown type strings are a configuration error, never a silent default.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cobertura" => Ok(CoverageType::Cobertura),
            "lcov" => Ok(CoverageType::Lcov),
            "diff_cover_json" => Ok(CoverageType::DiffCoverJson),
            other => Err(Error::config(format!(
                "unsupported coverage report type: {other}"
            ))),
        }
    }
}

/// A single `line` record from a coverage report, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    pub line: u32,
    pub hits: u64,
}

impl LineRecord {
    /// A line is covered iff it was executed at least once.
    pub fn is_covered(&self) -> bool {
        self.hits > 0
    }
}

/// One `<class>` grouping from a Cobertura report.
///
/// Several entries may declare the same filename (partial classes, nested
/// scopes); they are merged during aggregation, never treated as distinct
/// files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub filename: String,
    pub lines: Vec<LineRecord>,
}

/// Aggregated line coverage for one file.
///
/// `covered_lines` and `missed_lines` are sorted, deduplicated and disjoint:
/// a line reported both covered and missed by different report fragments
/// resolves to covered, since any executed code path covers the line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    pub covered_lines: Vec<u32>,
    pub missed_lines: Vec<u32>,
    /// `covered / (covered + missed)`, or `0.0` when no lines were classified.
    pub ratio: f64,
}

impl FileCoverage {
    /// Total number of classified lines.
    pub fn total_lines(&self) -> usize {
        self.covered_lines.len() + self.missed_lines.len()
    }

    /// Coverage ratio on a 0-100 scale.
    pub fn percentage(&self) -> f64 {
        self.ratio * 100.0
    }
}

/// Result of one parse: the target file alone, or every file in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CoverageReport {
    Single(FileCoverage),
    ByFile(BTreeMap<String, FileCoverage>),
}

impl CoverageReport {
    pub fn as_single(&self) -> Option<&FileCoverage> {
        match self {
            CoverageReport::Single(file) => Some(file),
            CoverageReport::ByFile(_) => None,
        }
    }

    pub fn as_by_file(&self) -> Option<&BTreeMap<String, FileCoverage>> {
        match self {
            CoverageReport::Single(_) => None,
            CoverageReport::ByFile(map) => Some(map),
        }
    }
}

/// Immutable configuration for one parse operation.
#[derive(Debug, Clone)]
pub struct ReportSource {
    /// Path to the coverage report the test run produced.
    pub report_path: PathBuf,
    /// Source file whose coverage is being queried.
    pub source_path: PathBuf,
    /// Declared format of the report.
    pub coverage_type: CoverageType,
    /// diff-cover JSON report, required for [`CoverageType::DiffCoverJson`].
    pub diff_report_path: Option<PathBuf>,
    /// Aggregate across every file in the report instead of one target.
    pub by_file: bool,
}

/// Verifies and parses one coverage artifact.
pub struct CoverageProcessor {
    source: ReportSource,
}

impl CoverageProcessor {
    pub fn new(source: ReportSource) -> Self {
        Self { source }
    }

    /// Verify the report is fresh, then parse it.
    ///
    /// `test_time_ms` is the completion time of the test command, in
    /// milliseconds since the epoch.
    ///
    /// # Panics
    ///
    /// Panics if the report file does not exist. A missing report means the
    /// test harness never produced coverage; continuing would report a false
    /// zero, so this is a precondition violation rather than a recoverable
    /// error.
    pub fn process(&self, test_time_ms: u64) -> Result<CoverageReport> {
        self.verify_freshness(test_time_ms)?;
        self.parse()
    }

    /// Check that the report exists and postdates the test run.
    ///
    /// Existence is a hard gate (see [`Self::process`]); staleness is only a
    /// warning, because some coverage tools leave mtime untouched when the
    /// output is byte-identical. The two policies are independent.
    ///
    /// # Panics
    ///
    /// Panics if the report file does not exist.
    pub fn verify_freshness(&self, test_time_ms: u64) -> Result<()> {
        let path = &self.source.report_path;
        assert!(
            path.exists(),
            "Fatal: coverage report \"{}\" was not generated",
            path.display()
        );

        let modified = fs::metadata(path)?.modified()?;
        let mtime_ms = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        if mtime_ms <= test_time_ms {
            warn!(
                report = %path.display(),
                mtime_ms,
                test_time_ms,
                "coverage report was not updated after the test command"
            );
        }

        Ok(())
    }

    /// Dispatch to the format-specific parser.
    ///
    /// In by-file mode Cobertura and LCOV aggregate across every file in the
    /// report; diff-cover is rejected there because its reports are only
    /// meaningful for a single target file. That asymmetry is intentional.
    pub fn parse(&self) -> Result<CoverageReport> {
        let source = &self.source;
        debug!(
            report = %source.report_path.display(),
            coverage_type = %source.coverage_type,
            by_file = source.by_file,
            "parsing coverage report"
        );

        if source.by_file {
            return match source.coverage_type {
                CoverageType::Cobertura => Ok(CoverageReport::ByFile(cobertura::parse_all(
                    &source.report_path,
                )?)),
                CoverageType::Lcov => {
                    Ok(CoverageReport::ByFile(lcov::parse_all(&source.report_path)?))
                }
                CoverageType::DiffCoverJson => Err(Error::config(
                    "diff_cover_json reports cannot be aggregated by file",
                )),
            };
        }

        match source.coverage_type {
            CoverageType::Cobertura => Ok(CoverageReport::Single(cobertura::parse_file(
                &source.report_path,
                &self.target_file_name()?,
            )?)),
            CoverageType::Lcov => Ok(CoverageReport::Single(lcov::parse_file(
                &source.report_path,
                &self.target_file_name()?,
            )?)),
            CoverageType::DiffCoverJson => {
                let diff_path = source.diff_report_path.as_deref().ok_or_else(|| {
                    Error::config("diff_cover_json requires a diff coverage report path")
                })?;
                Ok(CoverageReport::Single(diff_cover::parse_file(
                    diff_path,
                    &source.source_path,
                )?))
            }
        }
    }

    /// Bare file name of the target source file, for suffix matching.
    fn target_file_name(&self) -> Result<String> {
        self.source
            .source_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                Error::config(format!(
                    "source path has no file name: {}",
                    self.source.source_path.display()
                ))
            })
    }
}

/// Merge raw covered/missed line numbers into a [`FileCoverage`].
///
/// The dedup rule is cross-cutting: the covered set is built first, then
/// `missed = raw_missed - covered`, so a line executed by any fragment ends
/// up covered only. Both the Cobertura and LCOV parsers route through here
/// so the rule cannot drift between them.
pub fn aggregate_lines(
    raw_covered: impl IntoIterator<Item = u32>,
    raw_missed: impl IntoIterator<Item = u32>,
) -> FileCoverage {
    let covered: BTreeSet<u32> = raw_covered.into_iter().collect();
    let missed: BTreeSet<u32> = raw_missed
        .into_iter()
        .filter(|line| !covered.contains(line))
        .collect();

    let total = covered.len() + missed.len();
    let ratio = if total > 0 {
        covered.len() as f64 / total as f64
    } else {
        0.0
    };

    FileCoverage {
        covered_lines: covered.into_iter().collect(),
        missed_lines: missed.into_iter().collect(),
        ratio,
    }
}
