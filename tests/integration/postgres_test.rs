//! PostgreSQL export tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable to run them.

use db_xl_dump::db::{DatabaseClient, DriverConnector, PostgresClient};
use db_xl_dump::error::DumpError;
use db_xl_dump::export::{parse_targets, ConnectionDescriptor, Exporter};
use db_xl_dump::workbook::Cell;
use pretty_assertions::assert_eq;

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

#[tokio::test(flavor = "current_thread")]
async fn test_typed_values_render_as_cells() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let descriptor = ConnectionDescriptor::from_connection_string(url);
    let targets = parse_targets(
        "SELECT 1::int4 AS id, 'x'::text AS name, NULL::text AS nothing, \
         2.50::numeric AS amount, DATE '2024-01-31' AS day, true AS flag",
    );

    let outcome = Exporter::new(&DriverConnector, &descriptor)
        .build(&targets)
        .await;

    assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
    let sheet = outcome.workbook.sheet("Sheet 0").unwrap();
    assert_eq!(
        sheet.rows()[1],
        vec![
            Cell::Numeric(1.0),
            Cell::from("x"),
            Cell::from(""),
            Cell::Numeric(2.5),
            Cell::from("2024-01-31"),
            Cell::from("true"),
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn test_table_export() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let table = format!("xl_dump_it_{}", std::process::id());
    let mut setup = PostgresClient::connect(&url).await.unwrap();
    for sql in [
        format!("CREATE TABLE {table} (id int4, name text)"),
        format!("INSERT INTO {table} VALUES (1, 'Sales'), (2, 'R&D')"),
    ] {
        // Statements without result rows still run through a cursor
        let mut cursor = setup.open_cursor(&sql).await.unwrap();
        while cursor.next_row().await.unwrap().is_some() {}
    }

    let descriptor = ConnectionDescriptor::from_connection_string(url.clone());
    let outcome = Exporter::new(&DriverConnector, &descriptor)
        .build(&parse_targets(&table))
        .await;

    {
        let drop = format!("DROP TABLE {table}");
        let mut cursor = setup.open_cursor(&drop).await.unwrap();
        while cursor.next_row().await.unwrap().is_some() {}
    }
    setup.close().await.unwrap();

    assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
    let sheet = outcome.workbook.sheet(&table).unwrap();
    assert_eq!(sheet.row_count(), 3);
    assert_eq!(sheet.rows()[2], vec![Cell::Numeric(2.0), Cell::from("R&D")]);
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_port() {
    let descriptor = ConnectionDescriptor::from_parts("scott", "tiger", "127.0.0.1", 1, "hr");

    let outcome = Exporter::new(&DriverConnector, &descriptor)
        .build(&parse_targets("EMPLOYEES"))
        .await;

    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(outcome.failures[0].error, DumpError::Connection(_)));
    assert!(outcome.workbook.is_empty());
}
