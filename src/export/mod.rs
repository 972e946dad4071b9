//! The export engine.
//!
//! Turns an ordered list of export targets into a multi-sheet workbook:
//! targets are classified into SQL, run on a fresh session each, and their
//! rows typed cell by cell into one sheet per target.

mod assembler;
mod materialize;
mod orchestrator;
mod resolver;
mod sniff;
mod target;

pub use assembler::{assemble, SheetSummary};
pub use materialize::materialize;
pub use orchestrator::{ExportOutcome, ExportReport, Exporter, TargetFailure};
pub use resolver::ConnectionDescriptor;
pub use sniff::sniff;
pub use target::{parse_targets, ClassifiedTarget, ExportTarget, TargetKind, QUERY_KEYWORD};
