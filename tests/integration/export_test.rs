//! End-to-end export tests against the in-memory mock backend.

use super::read_part;
use db_xl_dump::db::{MockConnector, MockDatabase, MockTable};
use db_xl_dump::error::DumpError;
use db_xl_dump::export::{parse_targets, ConnectionDescriptor, Exporter};
use db_xl_dump::workbook::Cell;
use pretty_assertions::assert_eq;

fn hr_connector() -> MockConnector {
    MockConnector::new(
        MockDatabase::new()
            .with_table(
                "EMPLOYEES",
                MockTable::new(&["ID", "NAME", "HIRED"])
                    .with_row(&["1", "Alice", "2020-01-15"])
                    .with_row(&["2", "Bob", "2021-03-01"])
                    .with_row(&["3", "Carol", ""]),
            )
            .with_query(
                "SELECT id,name FROM DEPT WHERE id=1",
                MockTable::new(&["ID", "NAME"]).with_row(&["1", "Sales"]),
            ),
    )
}

/// Scenario: a table and a query exported together
/// Given EMPLOYEES with 3 rows and a query returning 1 row
/// When both are exported with headers
/// Then the workbook has sheets EMPLOYEES and Sheet 1 in that order
#[tokio::test(flavor = "current_thread")]
async fn test_table_then_query() {
    let connector = hr_connector();
    let descriptor = ConnectionDescriptor::from_parts("scott", "tiger", "dbhost", 5432, "hr");
    let targets = parse_targets("EMPLOYEES,SELECT id,name FROM DEPT WHERE id=1");

    let outcome = Exporter::new(&connector, &descriptor).build(&targets).await;

    assert!(outcome.failures.is_empty());
    let sheets = outcome.workbook.sheets();
    assert_eq!(sheets.len(), 2);

    assert_eq!(sheets[0].name(), "EMPLOYEES");
    assert_eq!(sheets[0].row_count(), 4);
    assert_eq!(
        sheets[0].rows()[0],
        vec![Cell::from("ID"), Cell::from("NAME"), Cell::from("HIRED")]
    );
    assert_eq!(sheets[0].rows()[3][2], Cell::from(""));

    assert_eq!(sheets[1].name(), "Sheet 1");
    assert_eq!(
        sheets[1].rows(),
        [
            vec![Cell::from("ID"), Cell::from("NAME")],
            vec![Cell::Numeric(1.0), Cell::from("Sales")],
        ]
    );
}

/// Scenario: every session is released
/// Given a mix of good and failing targets
/// When the export runs
/// Then as many sessions are closed as were opened
#[tokio::test(flavor = "current_thread")]
async fn test_sessions_are_released() {
    let connector = hr_connector();
    let descriptor = ConnectionDescriptor::from_connection_string("scott/tiger@dbhost:5432/hr");
    let targets = parse_targets("EMPLOYEES,MISSING,SELECT id,name FROM DEPT WHERE id=1");

    let outcome = Exporter::new(&connector, &descriptor).build(&targets).await;

    assert_eq!(outcome.sheets.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(connector.sessions_opened(), 3);
    assert_eq!(connector.sessions_closed(), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn test_run_writes_readable_package() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("hr.xlsx");
    let connector = hr_connector();
    let descriptor = ConnectionDescriptor::from_connection_string("scott/tiger@dbhost:5432/hr");
    let targets = parse_targets("EMPLOYEES,SELECT id,name FROM DEPT WHERE id=1");

    let report = Exporter::new(&connector, &descriptor)
        .run(&targets, &output)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.output, output);

    let workbook = read_part(&output, "xl/workbook.xml");
    assert!(workbook.contains(r#"<sheet name="EMPLOYEES" sheetId="1" r:id="rId1"/>"#));
    assert!(workbook.contains(r#"<sheet name="Sheet 1" sheetId="2" r:id="rId2"/>"#));

    let query_sheet = read_part(&output, "xl/worksheets/sheet2.xml");
    assert!(query_sheet.contains(r#"<c r="A2"><v>1</v></c>"#));
    assert!(query_sheet.contains("Sales"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_unreachable_database_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("hr.xlsx");
    let connector = MockConnector::unreachable();
    let descriptor = ConnectionDescriptor::from_connection_string("scott/tiger@nowhere:5432/hr");

    let err = Exporter::new(&connector, &descriptor)
        .run(&parse_targets("EMPLOYEES"), &output)
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::Serialization(_)));
    assert!(!output.exists());
}
