//! Workbook orchestration across all export targets.

use super::assembler::{assemble, SheetSummary};
use super::resolver::ConnectionDescriptor;
use super::target::ExportTarget;
use crate::db::Connector;
use crate::error::{DumpError, Result};
use crate::workbook::Workbook;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// A target that could not be exported.
#[derive(Debug)]
pub struct TargetFailure {
    /// Position of the target in the request, zero-based.
    pub index: usize,
    /// The target as requested.
    pub target: ExportTarget,
    /// Why it failed.
    pub error: DumpError,
}

/// The in-memory result of processing every target.
#[derive(Debug)]
pub struct ExportOutcome {
    pub workbook: Workbook,
    pub sheets: Vec<SheetSummary>,
    pub failures: Vec<TargetFailure>,
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct ExportReport {
    /// Where the workbook was written.
    pub output: PathBuf,
    /// Sheets written, in workbook order.
    pub sheets: Vec<SheetSummary>,
    /// Targets that were skipped.
    pub failures: Vec<TargetFailure>,
}

impl ExportReport {
    /// Total number of targets processed.
    pub fn total(&self) -> usize {
        self.sheets.len() + self.failures.len()
    }

    /// Returns true if every target produced a sheet.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Exports an ordered list of targets into one workbook.
///
/// Targets run strictly one after another, each on its own session.
pub struct Exporter<'a> {
    connector: &'a dyn Connector,
    descriptor: &'a ConnectionDescriptor,
    headers: bool,
}

impl<'a> Exporter<'a> {
    /// Creates an exporter that writes header rows.
    pub fn new(connector: &'a dyn Connector, descriptor: &'a ConnectionDescriptor) -> Self {
        Self {
            connector,
            descriptor,
            headers: true,
        }
    }

    /// Enables or disables the header row on every sheet.
    pub fn with_headers(mut self, headers: bool) -> Self {
        self.headers = headers;
        self
    }

    /// Builds the workbook in memory without touching storage.
    ///
    /// A failing target is logged and recorded; the remaining targets still run.
    pub async fn build(&self, targets: &[ExportTarget]) -> ExportOutcome {
        let mut workbook = Workbook::new();
        let mut sheets = Vec::new();
        let mut failures = Vec::new();

        debug!(
            "Exporting {} targets from {}",
            targets.len(),
            self.descriptor.display_string()
        );

        for (index, target) in targets.iter().enumerate() {
            match assemble(
                &mut workbook,
                self.connector,
                self.descriptor,
                target,
                self.headers,
            )
            .await
            {
                Ok(summary) => {
                    info!(
                        "Exported '{}' to sheet '{}' ({} rows)",
                        target, summary.sheet_name, summary.rows
                    );
                    sheets.push(summary);
                }
                Err(e) => {
                    error!("Target {} '{}' failed: {}", index + 1, target, e);
                    failures.push(TargetFailure {
                        index,
                        target: target.clone(),
                        error: e,
                    });
                }
            }
        }

        ExportOutcome {
            workbook,
            sheets,
            failures,
        }
    }

    /// Builds the workbook and writes it to `output`.
    ///
    /// Only a failure to write the workbook is returned as an error.
    pub async fn run(&self, targets: &[ExportTarget], output: &Path) -> Result<ExportReport> {
        let outcome = self.build(targets).await;

        outcome.workbook.save(output)?;
        debug!(
            "Saved {} sheets to {}",
            outcome.workbook.sheet_count(),
            output.display()
        );

        Ok(ExportReport {
            output: output.to_path_buf(),
            sheets: outcome.sheets,
            failures: outcome.failures,
        })
    }
}
