//! CLI argument definitions for leakcheck.
//!
//! Kept in its own module so integration tests can exercise argument
//! parsing with [`clap::Parser::try_parse_from`] instead of spawning a
//! subprocess.

use std::path::PathBuf;

use clap::Parser;

/// leakcheck: C++ memory leak detector.
///
/// Static analysis tool that scans C++ sources for dynamic-memory defects
/// in class pointer members: allocations never released in the destructor,
/// new/new[] arity mismatches, re-assignment without delete, double frees
/// through aliases, and allocating classes with no destructor.
#[derive(Parser, Debug)]
#[command(name = "leakcheck")]
#[command(about = "C++ Memory Leak Detector - Static analysis tool to detect potential memory leaks", long_about = None)]
#[command(disable_version_flag = true)]
#[command(after_help = "\
EXAMPLES:
  leakcheck ./src                    Scan all C++ files in ./src
  leakcheck --exclude=vendor ./      Scan all files, excluding vendor directory
  leakcheck --json ./src > out.json  Output results as JSON")]
pub struct Cli {
    /// Files or directories to scan (recursive for directories).
    pub paths: Vec<PathBuf>,

    /// Comma-separated list of directories to exclude (e.g., vendor,build,third_party).
    #[arg(long, value_name = "DIRS")]
    pub exclude: Option<String>,

    /// Output results in JSON format.
    #[arg(long)]
    pub json: bool,

    /// Print version and exit.
    #[arg(long)]
    pub version: bool,

    /// Enable debug logging (sets log level to DEBUG).
    #[arg(long)]
    pub debug: bool,

    /// Suppress informational logging.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Split a `--exclude` value into trimmed, non-empty exclusion names.
pub fn parse_excludes(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
