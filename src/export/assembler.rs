//! Sheet assembly: one export target becomes one sheet.

use super::materialize::materialize;
use super::resolver::ConnectionDescriptor;
use super::target::{ExportTarget, TargetKind};
use crate::db::{Connector, DatabaseClient};
use crate::error::Result;
use crate::workbook::Workbook;
use tracing::{debug, warn};

/// What was written for a successfully exported target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    /// Name of the sheet that was added.
    pub sheet_name: String,

    /// Column names in result order.
    pub columns: Vec<String>,

    /// Number of data rows, excluding the header.
    pub rows: usize,
}

/// Exports a single target into a new sheet of `workbook`.
///
/// Opens a dedicated session for the target and always closes it before
/// returning. On failure the workbook is left without a sheet for this target.
pub async fn assemble(
    workbook: &mut Workbook,
    connector: &dyn Connector,
    descriptor: &ConnectionDescriptor,
    target: &ExportTarget,
    headers: bool,
) -> Result<SheetSummary> {
    let classified = target.classify();
    debug!("Target '{}' runs: {}", target, classified.sql);

    let mut client = connector.connect(&descriptor.resolve()).await?;

    let sheet_name = match classified.kind {
        TargetKind::Query => format!("Sheet {}", workbook.sheet_count()),
        TargetKind::ObjectName => target.as_str().to_string(),
    };

    let result = fill_sheet(
        workbook,
        client.as_mut(),
        &classified.sql,
        &sheet_name,
        headers,
    )
    .await;

    if let Err(e) = client.close().await {
        warn!("Failed to close session for '{}': {}", target, e);
    }

    result
}

async fn fill_sheet(
    workbook: &mut Workbook,
    client: &mut dyn DatabaseClient,
    sql: &str,
    sheet_name: &str,
    headers: bool,
) -> Result<SheetSummary> {
    let mut cursor = client.open_cursor(sql).await?;
    let columns = cursor.column_names().to_vec();

    let sheet = workbook.add_sheet(sheet_name)?;
    let header = if headers {
        sheet.push_text_row(columns.iter().cloned())
    } else {
        Ok(())
    };

    let outcome = match header {
        Ok(()) => materialize(cursor.as_mut(), sheet).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(rows) => {
            debug!("Wrote {} rows to sheet '{}'", rows, sheet_name);
            Ok(SheetSummary {
                sheet_name: sheet_name.to_string(),
                columns,
                rows,
            })
        }
        Err(e) => {
            workbook.remove_sheet(sheet_name);
            debug!("Removed partial sheet '{}'", sheet_name);
            Err(e)
        }
    }
}
