//! diff-cover JSON report parser.
//!
//! Reads the `src_stats` mapping of a diff-cover report. Matching is
//! component-aware: the first key whose trailing path components equal the
//! target's components wins, and no merging happens across keys because
//! diff-cover keys each file once.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::matching::ends_with_components;
use super::FileCoverage;
use crate::core::Result;

#[derive(Debug, Deserialize)]
struct DiffCoverReport {
    // serde_json's preserve_order keeps document order, so "first matching
    // key" is well defined.
    src_stats: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SrcStats {
    covered_lines: Vec<u32>,
    violation_lines: Vec<u32>,
    percent_covered: f64,
}

/// Parse coverage for `source_path` out of a diff-cover JSON report.
///
/// A target absent from `src_stats` is not an error: the result is empty
/// with ratio 0.0, which the caller reads as 0% coverage.
pub fn parse_file(path: &Path, source_path: &Path) -> Result<FileCoverage> {
    let content = fs::read_to_string(path)?;
    let report: DiffCoverReport = serde_json::from_str(&content)?;

    for (candidate, stats) in &report.src_stats {
        if !ends_with_components(Path::new(candidate), source_path) {
            continue;
        }
        let stats: SrcStats = serde_json::from_value(stats.clone())?;
        return Ok(FileCoverage {
            covered_lines: stats.covered_lines,
            missed_lines: stats.violation_lines,
            ratio: stats.percent_covered / 100.0,
        });
    }

    Ok(FileCoverage::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_report(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write report");
        file
    }

    const REPORT: &str = r#"{
        "report_name": "XML",
        "diff_name": "main...HEAD, staged and unstaged changes",
        "src_stats": {
            "path/to/app.py": {
                "percent_covered": 50.0,
                "violation_lines": [2, 4, 6],
                "covered_lines": [1, 3, 5]
            },
            "path/to/util.py": {
                "percent_covered": 100.0,
                "violation_lines": [],
                "covered_lines": [10, 11]
            }
        },
        "total_num_lines": 8,
        "total_num_violations": 3,
        "total_percent_covered": 62
    }"#;

    #[test]
    fn test_parse_matching_file() {
        let report = write_report(REPORT);
        let coverage = parse_file(report.path(), Path::new("path/to/app.py")).expect("parse");
        assert_eq!(coverage.covered_lines, vec![1, 3, 5]);
        assert_eq!(coverage.missed_lines, vec![2, 4, 6]);
        assert!((coverage.ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_component_suffix_match() {
        let report = write_report(REPORT);
        // Key is "path/to/app.py"; a shorter component suffix still matches.
        let coverage = parse_file(report.path(), Path::new("to/app.py")).expect("parse");
        assert_eq!(coverage.covered_lines, vec![1, 3, 5]);
    }

    #[test]
    fn test_component_boundary_is_respected() {
        let report = write_report(
            r#"{"src_stats": {"src/xa/b/app.py": {
                "percent_covered": 100.0, "violation_lines": [], "covered_lines": [1]
            }}}"#,
        );
        let coverage = parse_file(report.path(), Path::new("a/b/app.py")).expect("parse");
        // "xa" must not match "a" even though the raw string is a suffix.
        assert!(coverage.covered_lines.is_empty());
        assert_eq!(coverage.ratio, 0.0);
    }

    #[test]
    fn test_missing_file_is_soft_not_found() {
        let report = write_report(REPORT);
        let coverage =
            parse_file(report.path(), Path::new("path/to/nonexistent.py")).expect("parse");
        assert!(coverage.covered_lines.is_empty());
        assert!(coverage.missed_lines.is_empty());
        assert_eq!(coverage.ratio, 0.0);
    }

    #[test]
    fn test_first_match_wins_in_document_order() {
        let report = write_report(
            r#"{"src_stats": {
                "first/app.py": {"percent_covered": 25.0, "violation_lines": [2, 3, 4], "covered_lines": [1]},
                "second/app.py": {"percent_covered": 75.0, "violation_lines": [4], "covered_lines": [1, 2, 3]}
            }}"#,
        );
        let coverage = parse_file(report.path(), Path::new("app.py")).expect("parse");
        assert_eq!(coverage.covered_lines, vec![1]);
        assert!((coverage.ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_converted_to_ratio() {
        let report = write_report(
            r#"{"src_stats": {"app.py": {
                "percent_covered": 33.5, "violation_lines": [], "covered_lines": []
            }}}"#,
        );
        let coverage = parse_file(report.path(), Path::new("app.py")).expect("parse");
        assert!((coverage.ratio - 0.335).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let report = write_report("{not json");
        let result = parse_file(report.path(), Path::new("app.py"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_src_stats_is_error() {
        let report = write_report(r#"{"totals": {}}"#);
        let result = parse_file(report.path(), Path::new("app.py"));
        assert!(result.is_err());
    }
}
