//! Row materialization: pulls rows off a cursor into a sheet.

use super::sniff::sniff;
use crate::db::Cursor;
use crate::error::{DumpError, Result};
use crate::workbook::{Row, Sheet};

/// Streams every remaining row of `cursor` into `sheet`, in cursor order.
///
/// Each textual value is typed by [`sniff`]. Returns the number of data rows
/// written. A failed row read, or a row past the worksheet limits, is
/// returned to the caller unchanged; rows already appended stay in the sheet.
pub async fn materialize(cursor: &mut dyn Cursor, sheet: &mut Sheet) -> Result<usize> {
    let width = cursor.column_names().len();
    let mut written = 0;

    while let Some(values) = cursor.next_row().await? {
        if values.len() != width {
            return Err(DumpError::internal(format!(
                "row {} has {} values but the result set has {} columns",
                written + 1,
                values.len(),
                width
            )));
        }

        let row: Row = values.iter().map(|v| sniff(v)).collect();
        sheet.push_row(row)?;
        written += 1;
    }

    Ok(written)
}
