//! End-to-end export tests against a temporary SQLite database.

use super::read_part;
use db_xl_dump::db::DriverConnector;
use db_xl_dump::export::{parse_targets, ConnectionDescriptor, Exporter};
use db_xl_dump::workbook::Cell;
use pretty_assertions::assert_eq;
use sqlx::{Connection, Executor, SqliteConnection};
use tempfile::TempDir;

/// Creates a database with EMPLOYEES (3 rows) and DEPT (2 rows).
async fn hr_database() -> (TempDir, ConnectionDescriptor) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hr.db");

    let mut conn = SqliteConnection::connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await
        .unwrap();
    conn.execute(
        "CREATE TABLE EMPLOYEES (ID INTEGER, NAME TEXT, SALARY REAL, MANAGER INTEGER);
         INSERT INTO EMPLOYEES VALUES (1, 'Alice', 5000.5, NULL);
         INSERT INTO EMPLOYEES VALUES (2, 'Bob', 4200, 1);
         INSERT INTO EMPLOYEES VALUES (3, 'Carol <C&O>', 3900.25, 1);
         CREATE TABLE DEPT (ID INTEGER, NAME TEXT);
         INSERT INTO DEPT VALUES (1, 'Sales');
         INSERT INTO DEPT VALUES (2, '007');",
    )
    .await
    .unwrap();
    conn.close().await.unwrap();

    let descriptor = ConnectionDescriptor::from_connection_string(format!("sqlite:{}", path.display()));
    (dir, descriptor)
}

/// Scenario: table and query from a real database
/// Given EMPLOYEES with 3 rows and DEPT with 2 rows
/// When EMPLOYEES and a DEPT query are exported
/// Then sheets EMPLOYEES and Sheet 1 hold typed cells
#[tokio::test(flavor = "current_thread")]
async fn test_export_table_and_query() {
    let (_dir, descriptor) = hr_database().await;
    let targets = parse_targets("EMPLOYEES,SELECT ID,NAME FROM DEPT WHERE ID=1");

    let outcome = Exporter::new(&DriverConnector, &descriptor)
        .build(&targets)
        .await;

    assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);

    let employees = outcome.workbook.sheet("EMPLOYEES").unwrap();
    assert_eq!(employees.row_count(), 4);
    assert_eq!(
        employees.rows()[0],
        vec![
            Cell::from("ID"),
            Cell::from("NAME"),
            Cell::from("SALARY"),
            Cell::from("MANAGER"),
        ]
    );
    assert_eq!(
        employees.rows()[1],
        vec![
            Cell::Numeric(1.0),
            Cell::from("Alice"),
            Cell::Numeric(5000.5),
            Cell::from(""),
        ]
    );

    let query = outcome.workbook.sheet("Sheet 1").unwrap();
    assert_eq!(
        query.rows(),
        [
            vec![Cell::from("ID"), Cell::from("NAME")],
            vec![Cell::Numeric(1.0), Cell::from("Sales")],
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn test_empty_result_keeps_header() {
    let (_dir, descriptor) = hr_database().await;
    let targets = parse_targets("SELECT ID, NAME FROM DEPT WHERE ID > 100");

    let outcome = Exporter::new(&DriverConnector, &descriptor)
        .build(&targets)
        .await;

    let sheet = outcome.workbook.sheet("Sheet 0").unwrap();
    assert_eq!(sheet.rows(), [vec![Cell::from("ID"), Cell::from("NAME")]]);
}

#[tokio::test(flavor = "current_thread")]
async fn test_missing_table_is_skipped() {
    let (_dir, descriptor) = hr_database().await;
    let targets = parse_targets("NOPE,DEPT");

    let outcome = Exporter::new(&DriverConnector, &descriptor)
        .with_headers(false)
        .build(&targets)
        .await;

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 0);

    let dept = outcome.workbook.sheet("DEPT").unwrap();
    assert_eq!(dept.row_count(), 2);
    assert_eq!(dept.rows()[1], vec![Cell::Numeric(2.0), Cell::Numeric(7.0)]);
}

#[tokio::test(flavor = "current_thread")]
async fn test_written_workbook_contents() {
    let (dir, descriptor) = hr_database().await;
    let output = dir.path().join("hr.xlsx");

    let report = Exporter::new(&DriverConnector, &descriptor)
        .run(&parse_targets("EMPLOYEES,DEPT"), &output)
        .await
        .unwrap();

    assert_eq!(report.sheets.len(), 2);
    assert_eq!(report.sheets[0].rows, 3);

    let workbook = read_part(&output, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="EMPLOYEES""#));
    assert!(workbook.contains(r#"name="DEPT""#));

    let employees = read_part(&output, "xl/worksheets/sheet1.xml");
    assert!(employees.contains(r#"<c r="C2"><v>5000.5</v></c>"#));
    assert!(employees.contains("Carol &lt;C&amp;O&gt;"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_runs_are_identical() {
    let (dir, descriptor) = hr_database().await;
    let first = dir.path().join("first.xlsx");
    let second = dir.path().join("second.xlsx");
    let targets = parse_targets("EMPLOYEES,DEPT,SELECT ID FROM DEPT");
    let exporter = Exporter::new(&DriverConnector, &descriptor);

    exporter.run(&targets, &first).await.unwrap();
    exporter.run(&targets, &second).await.unwrap();

    for part in [
        "xl/workbook.xml",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/sheet2.xml",
        "xl/worksheets/sheet3.xml",
    ] {
        assert_eq!(read_part(&first, part), read_part(&second, part), "{part}");
    }
}
