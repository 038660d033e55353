//! LCOV `.info` format parser.
//!
//! Only `SF:`, `DA:line,hits` and `end_of_record` tokens are interpreted;
//! every other record type (`TN:`, `FN:`, `BRDA:`, ...) is skipped. Unlike
//! the other parsers, an unreadable report here is a hard error: a missing
//! LCOV file means the test-harness integration is broken, and silently
//! treating it as zero coverage would stall the caller's feedback loop.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::error;

use super::matching::ends_with_path;
use super::{aggregate_lines, FileCoverage, LineRecord};
use crate::core::{Error, Result};

/// Parse coverage for the first record whose `SF:` path ends with `target`.
///
/// Records after the first match are scanned but ignored. A target with no
/// matching record yields an empty result with ratio 0.0.
pub fn parse_file(path: &Path, target: &str) -> Result<FileCoverage> {
    let reader = open_report(path)?;

    let mut raw_covered = Vec::new();
    let mut raw_missed = Vec::new();
    let mut in_target = false;
    let mut found = false;

    for line in reader.lines() {
        let line = line.map_err(|e| read_error(path, e))?;
        let line = line.trim();

        if let Some(sf_path) = line.strip_prefix("SF:") {
            in_target = !found && ends_with_path(sf_path, target);
        } else if line == "end_of_record" {
            if in_target {
                found = true;
            }
            in_target = false;
        } else if in_target {
            if let Some(data) = line.strip_prefix("DA:") {
                let record = parse_da(data).map_err(|message| Error::parse(path, message))?;
                if record.is_covered() {
                    raw_covered.push(record.line);
                } else {
                    raw_missed.push(record.line);
                }
            }
        }
    }

    Ok(aggregate_lines(raw_covered, raw_missed))
}

/// Parse coverage for every record in the report, keyed by the raw `SF:`
/// path. Records sharing a path are merged.
pub fn parse_all(path: &Path) -> Result<BTreeMap<String, FileCoverage>> {
    let reader = open_report(path)?;

    let mut raw: BTreeMap<String, (Vec<u32>, Vec<u32>)> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in reader.lines() {
        let line = line.map_err(|e| read_error(path, e))?;
        let line = line.trim();

        if let Some(sf_path) = line.strip_prefix("SF:") {
            raw.entry(sf_path.to_string()).or_default();
            current = Some(sf_path.to_string());
        } else if line == "end_of_record" {
            current = None;
        } else if let Some(file) = current.as_ref() {
            if let Some(data) = line.strip_prefix("DA:") {
                let record = parse_da(data).map_err(|message| Error::parse(path, message))?;
                if let Some((raw_covered, raw_missed)) = raw.get_mut(file) {
                    if record.is_covered() {
                        raw_covered.push(record.line);
                    } else {
                        raw_missed.push(record.line);
                    }
                }
            }
        }
    }

    Ok(raw
        .into_iter()
        .map(|(file, (covered, missed))| (file, aggregate_lines(covered, missed)))
        .collect())
}

fn open_report(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) => Err(read_error(path, e)),
    }
}

fn read_error(path: &Path, source: std::io::Error) -> Error {
    error!(report = %path.display(), cause = %source, "error reading LCOV report");
    Error::ReportRead {
        path: path.to_path_buf(),
        source,
    }
}

/// Parse the payload of a `DA:` line: `line,hits` with an optional trailing
/// checksum field.
fn parse_da(data: &str) -> std::result::Result<LineRecord, String> {
    let mut parts = data.splitn(3, ',');
    let line = parts.next().unwrap_or_default();
    let hits = parts
        .next()
        .ok_or_else(|| format!("malformed DA entry: {data:?}"))?;

    Ok(LineRecord {
        line: line
            .trim()
            .parse()
            .map_err(|_| format!("invalid line number in DA entry: {data:?}"))?,
        hits: hits
            .trim()
            .parse()
            .map_err(|_| format!("invalid hit count in DA entry: {data:?}"))?,
    })
}
