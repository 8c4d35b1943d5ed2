//! Pipeline orchestration: scan, parse, merge, analyze, report.
//!
//! Files parse in parallel, but parse results are collected in input order
//! and fed to the registry sequentially so that cross-file merge tie-breaks
//! stay reproducible run to run.

use std::fs;
use std::io;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::analyze_classes;
use crate::error::exit_code;
use crate::output::Reporter;
use crate::parse::parser::parse_source;
use crate::parse::registry::ClassRegistry;
use crate::parse::Class;
use crate::scanner::Scanner;

/// Engine configuration built from the CLI.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Directory names excluded from the scan.
    pub excludes: Vec<String>,
    /// Emit the JSON report instead of the human listing.
    pub json: bool,
}

/// Runs the full analysis pipeline and reports to stdout.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Scan `paths`, analyze everything found, print the report, and return
    /// the process exit code.
    pub fn run(&self, paths: &[PathBuf]) -> i32 {
        if paths.is_empty() {
            eprintln!("Error: No paths specified");
            eprintln!("Run 'leakcheck --help' for usage");
            return exit_code::FATAL;
        }

        let scanner = Scanner::new(self.config.excludes.clone());
        let files = match scanner.scan_paths(paths) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error scanning paths: {e}");
                return exit_code::FATAL;
            }
        };

        if files.is_empty() {
            eprintln!("No C++ files found");
            return exit_code::CLEAN;
        }

        if !self.config.json {
            println!("Scanning {} file(s)...", files.len());
        }

        let classes = self.parse_files(&files);

        let mut registry = ClassRegistry::new();
        for file_classes in classes {
            registry.add_classes(file_classes);
        }
        let merged = registry.merge_classes();
        info!("Merged into {} class record(s)", merged.len());

        if !self.config.json {
            println!(
                "Found {} class(es) with pointer members",
                merged
                    .iter()
                    .filter(|c| c.members.iter().any(|m| m.is_pointer))
                    .count()
            );
        }

        let leaks = analyze_classes(merged);

        let stdout = io::stdout();
        let mut reporter = Reporter::new(stdout.lock(), self.config.json);
        if let Err(e) = reporter.report(&leaks) {
            eprintln!("Error writing report: {e}");
            return exit_code::FATAL;
        }

        if leaks.is_empty() {
            exit_code::CLEAN
        } else {
            exit_code::ISSUES_FOUND
        }
    }

    /// Parse every file concurrently. The result vector mirrors `files`'
    /// order regardless of completion order; an unreadable file logs a
    /// warning and contributes nothing.
    fn parse_files(&self, files: &[PathBuf]) -> Vec<Vec<Class>> {
        files
            .par_iter()
            .map(|file| match fs::read_to_string(file) {
                Ok(content) => {
                    let classes = parse_source(&file.to_string_lossy(), &content);
                    debug!("{}: {} class fragment(s)", file.display(), classes.len());
                    classes
                }
                Err(e) => {
                    warn!("Error parsing {}: {e}", file.display());
                    Vec::new()
                }
            })
            .collect()
    }
}
