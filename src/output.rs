//! Report formatting for detected leaks.
//!
//! Two formats: a human-readable listing grouped by file, and a JSON
//! envelope with per-leak records plus summary counts. Both write to any
//! `io::Write` so tests can capture output in a buffer.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::parse::{Leak, Severity};

/// Formats and writes leak findings.
pub struct Reporter<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn report(&mut self, leaks: &[Leak]) -> io::Result<()> {
        if self.json {
            self.report_json(leaks)
        } else {
            self.report_console(leaks)
        }
    }

    fn report_console(&mut self, leaks: &[Leak]) -> io::Result<()> {
        if leaks.is_empty() {
            writeln!(self.out, "[OK] No potential memory leaks detected.")?;
            return Ok(());
        }

        let mut sorted: Vec<&Leak> = leaks.iter().collect();
        sorted.sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.line.cmp(&b.line)));

        let mut current_file = "";
        for leak in &sorted {
            if leak.file != current_file {
                current_file = &leak.file;
                let base = Path::new(current_file)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(current_file);
                writeln!(self.out, "\n{base}:")?;
            }

            let icon = match leak.severity {
                Severity::Error => "[ERROR]",
                Severity::Warning => "[WARN] ",
            };
            writeln!(
                self.out,
                "  {icon} Line {} [{}::{}]: {}",
                leak.line, leak.class_name, leak.variable, leak.reason
            )?;
        }

        let errors = sorted
            .iter()
            .filter(|l| l.severity == Severity::Error)
            .count();
        let warnings = sorted.len() - errors;
        writeln!(self.out, "\nSummary: {errors} error(s), {warnings} warning(s)")?;
        Ok(())
    }

    fn report_json(&mut self, leaks: &[Leak]) -> io::Result<()> {
        let output = JsonReport {
            leaks,
            summary: JsonSummary {
                total_issues: leaks.len(),
                errors: leaks
                    .iter()
                    .filter(|l| l.severity == Severity::Error)
                    .count(),
                warnings: leaks
                    .iter()
                    .filter(|l| l.severity == Severity::Warning)
                    .count(),
            },
        };

        serde_json::to_writer_pretty(&mut self.out, &output)?;
        writeln!(self.out)?;
        Ok(())
    }
}

/// JSON envelope. The `leaks` array is a slice, so an empty result
/// serializes as `[]`, never `null`.
#[derive(Serialize)]
struct JsonReport<'a> {
    leaks: &'a [Leak],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    total_issues: usize,
    errors: usize,
    warnings: usize,
}
