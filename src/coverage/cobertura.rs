//! Cobertura XML format parser.
//!
//! Only `class[@filename]` elements and their nested `line[@number][@hits]`
//! elements are read; everything else in the schema is ignored. Class
//! elements sharing a filename (partial classes, nested scopes) are merged
//! through the shared aggregation rule.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::matching::ends_with_path;
use super::{aggregate_lines, ClassEntry, FileCoverage, LineRecord};
use crate::core::{Error, Result};

/// Parse coverage for the one file whose `filename` attribute ends with
/// `target`.
///
/// All matching class entries are unioned before aggregation. A target with
/// no matching class is not an error: the result is empty with ratio 0.0.
pub fn parse_file(path: &Path, target: &str) -> Result<FileCoverage> {
    let content = fs::read_to_string(path)?;
    let classes = collect_classes(&content).map_err(|message| Error::parse(path, message))?;
    Ok(aggregate_matching(&classes, target))
}

/// Parse coverage for every file in the report, keyed by the raw `filename`
/// attribute (exact key, no suffix matching).
pub fn parse_all(path: &Path) -> Result<BTreeMap<String, FileCoverage>> {
    let content = fs::read_to_string(path)?;
    let classes = collect_classes(&content).map_err(|message| Error::parse(path, message))?;
    Ok(aggregate_by_filename(classes))
}

fn aggregate_matching(classes: &[ClassEntry], target: &str) -> FileCoverage {
    let mut raw_covered = Vec::new();
    let mut raw_missed = Vec::new();

    for class in classes {
        if !ends_with_path(&class.filename, target) {
            continue;
        }
        for record in &class.lines {
            if record.is_covered() {
                raw_covered.push(record.line);
            } else {
                raw_missed.push(record.line);
            }
        }
    }

    aggregate_lines(raw_covered, raw_missed)
}

fn aggregate_by_filename(classes: Vec<ClassEntry>) -> BTreeMap<String, FileCoverage> {
    let mut raw: BTreeMap<String, (Vec<u32>, Vec<u32>)> = BTreeMap::new();

    for class in classes {
        let (raw_covered, raw_missed) = raw.entry(class.filename).or_default();
        for record in class.lines {
            if record.is_covered() {
                raw_covered.push(record.line);
            } else {
                raw_missed.push(record.line);
            }
        }
    }

    raw.into_iter()
        .map(|(filename, (covered, missed))| (filename, aggregate_lines(covered, missed)))
        .collect()
}

/// Streaming scan over the document collecting every class element.
fn collect_classes(content: &str) -> std::result::Result<Vec<ClassEntry>, String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut classes = Vec::new();
    let mut current: Option<ClassEntry> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"class" => {
                    if let Some(done) = current.take() {
                        classes.push(done);
                    }
                    if let Some(filename) = attr_value(e, b"filename") {
                        current = Some(ClassEntry {
                            filename,
                            lines: Vec::new(),
                        });
                    }
                }
                b"line" => {
                    if let Some(class) = current.as_mut() {
                        if let Some(record) = parse_line_record(e)? {
                            class.lines.push(record);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"class" {
                    if let Some(done) = current.take() {
                        classes.push(done);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("malformed XML: {e}")),
            _ => {}
        }
        buf.clear();
    }

    if let Some(done) = current.take() {
        classes.push(done);
    }

    Ok(classes)
}

fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Read `number` and `hits` from a `line` element. Elements missing either
/// attribute are skipped rather than rejected.
fn parse_line_record(
    element: &BytesStart<'_>,
) -> std::result::Result<Option<LineRecord>, String> {
    let number = attr_value(element, b"number");
    let hits = attr_value(element, b"hits");

    match (number, hits) {
        (Some(number), Some(hits)) => Ok(Some(LineRecord {
            line: parse_attr(&number, "number")?,
            hits: parse_attr(&hits, "hits")?,
        })),
        _ => Ok(None),
    }
}

fn parse_attr<T: FromStr>(value: &str, name: &str) -> std::result::Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid {name} attribute: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two class fragments declaring the same filename, plus an unrelated one.
    const FRAGMENTED: &str = r#"<?xml version="1.0"?>
<coverage line-rate="0.5">
    <packages>
        <package name="app">
            <classes>
                <class name="App" filename="app.py" line-rate="0.5">
                    <lines>
                        <line number="1" hits="1"/>
                        <line number="2" hits="0"/>
                    </lines>
                </class>
                <class name="AppHelpers" filename="app.py" line-rate="0.5">
                    <lines>
                        <line number="3" hits="2"/>
                        <line number="4" hits="0"/>
                    </lines>
                </class>
                <class name="Util" filename="util.py" line-rate="1.0">
                    <lines>
                        <line number="10" hits="3"/>
                    </lines>
                </class>
            </classes>
        </package>
    </packages>
</coverage>"#;

    #[test]
    fn test_collect_classes() {
        let classes = collect_classes(FRAGMENTED).expect("parse");
        assert_eq!(classes.len(), 3);
        assert_eq!(classes[0].filename, "app.py");
        assert_eq!(
            classes[0].lines,
            vec![
                LineRecord { line: 1, hits: 1 },
                LineRecord { line: 2, hits: 0 }
            ]
        );
        assert_eq!(classes[2].filename, "util.py");
    }

    #[test]
    fn test_fragments_merge_for_target() {
        let classes = collect_classes(FRAGMENTED).expect("parse");
        let coverage = aggregate_matching(&classes, "app.py");
        assert_eq!(coverage.covered_lines, vec![1, 3]);
        assert_eq!(coverage.missed_lines, vec![2, 4]);
        assert!((coverage.ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_suffix_match_tolerates_path_roots() {
        let xml = FRAGMENTED.replace("filename=\"app.py\"", "filename=\"/ci/build/src/app.py\"");
        let classes = collect_classes(&xml).expect("parse");
        let coverage = aggregate_matching(&classes, "app.py");
        assert_eq!(coverage.covered_lines, vec![1, 3]);
    }

    #[test]
    fn test_no_matching_class_is_empty_not_error() {
        let classes = collect_classes(FRAGMENTED).expect("parse");
        let coverage = aggregate_matching(&classes, "nonexistent.py");
        assert!(coverage.covered_lines.is_empty());
        assert!(coverage.missed_lines.is_empty());
        assert_eq!(coverage.ratio, 0.0);
    }

    #[test]
    fn test_covered_wins_across_fragments() {
        let xml = r#"<coverage><packages><package><classes>
            <class name="A" filename="app.py"><lines>
                <line number="7" hits="1"/>
            </lines></class>
            <class name="B" filename="app.py"><lines>
                <line number="7" hits="0"/>
                <line number="8" hits="0"/>
            </lines></class>
        </classes></package></packages></coverage>"#;
        let classes = collect_classes(xml).expect("parse");
        let coverage = aggregate_matching(&classes, "app.py");
        // Line 7 was executed by one fragment: covered only, never missed.
        assert_eq!(coverage.covered_lines, vec![7]);
        assert_eq!(coverage.missed_lines, vec![8]);
    }

    #[test]
    fn test_by_filename_grouping_uses_exact_keys() {
        let classes = collect_classes(FRAGMENTED).expect("parse");
        let by_file = aggregate_by_filename(classes);
        assert_eq!(by_file.len(), 2);

        let app = &by_file["app.py"];
        assert_eq!(app.covered_lines, vec![1, 3]);
        assert_eq!(app.missed_lines, vec![2, 4]);
        assert!((app.ratio - 0.5).abs() < f64::EPSILON);

        let util = &by_file["util.py"];
        assert_eq!(util.covered_lines, vec![10]);
        assert!(util.missed_lines.is_empty());
        assert!((util.ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_class_without_filename_is_ignored() {
        let xml = r#"<coverage><packages><package><classes>
            <class name="Anon"><lines><line number="1" hits="1"/></lines></class>
        </classes></package></packages></coverage>"#;
        let classes = collect_classes(xml).expect("parse");
        assert!(classes.is_empty());
    }

    #[test]
    fn test_invalid_hits_attribute_is_parse_error() {
        let xml = r#"<coverage><packages><package><classes>
            <class name="A" filename="app.py"><lines>
                <line number="1" hits="lots"/>
            </lines></class>
        </classes></package></packages></coverage>"#;
        let err = collect_classes(xml).unwrap_err();
        assert!(err.contains("hits"));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = collect_classes("<coverage><class filename=").unwrap_err();
        assert!(err.contains("malformed XML"));
    }

    #[test]
    fn test_parse_file_missing_report() {
        let result = parse_file(Path::new("/nonexistent/coverage.xml"), "app.py");
        assert!(result.is_err());
    }
}
