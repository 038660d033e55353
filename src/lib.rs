//! Linecov - coverage report ingestion for test-generation feedback loops.
//!
//! Linecov reads the coverage artifact a test run produced (Cobertura XML,
//! LCOV text, or diff-cover JSON) and answers, for a given source file,
//! which lines were executed, which were not, and what fraction of lines is
//! covered.
//!
//! # Example
//!
//! ```no_run
//! use linecov::coverage::{CoverageProcessor, CoverageType, ReportSource};
//!
//! let source = ReportSource {
//!     report_path: "coverage.xml".into(),
//!     source_path: "src/app.py".into(),
//!     coverage_type: CoverageType::Cobertura,
//!     diff_report_path: None,
//!     by_file: false,
//! };
//! let report = CoverageProcessor::new(source).process(0).unwrap();
//! println!("{report:?}");
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod coverage;
pub mod output;

pub use crate::core::{Error, Result};
pub use crate::coverage::{
    CoverageProcessor, CoverageReport, CoverageType, FileCoverage, ReportSource,
};
