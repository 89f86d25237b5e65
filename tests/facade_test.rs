mod common;

use common::MockEngine;
use ddlog_sql_facade::codec::ClientValue;
use ddlog_sql_facade::dml::StatementResult;
use ddlog_sql_facade::{Catalog, Dispatcher};

fn dispatcher(ddl: &[&str]) -> Dispatcher<MockEngine> {
    let ddl: Vec<String> = ddl.iter().map(|s| s.to_string()).collect();
    let catalog = Catalog::build(&ddl, &ddlog_sql_facade::dialects::DdlDialect {}).unwrap();
    let program = ddlog_sql_facade::compile(&ddl).unwrap();
    let engine = MockEngine::new(program, &catalog);
    Dispatcher::new(&ddl, engine).unwrap()
}

fn rows(result: StatementResult) -> Vec<Vec<ClientValue>> {
    match result {
        StatementResult::Rows(rows) => rows,
        StatementResult::Ack => panic!("expected a row set"),
    }
}

#[test]
fn insert_and_select_round_trip_through_a_wildcard_view() {
    let mut d = dispatcher(&[
        "CREATE TABLE hosts (id INTEGER, name VARCHAR(36), PRIMARY KEY (id))",
        "CREATE VIEW v_hosts AS SELECT DISTINCT * FROM hosts",
    ]);
    d.execute("INSERT INTO hosts VALUES (1, 'web1')", &[]).unwrap();

    let result = rows(d.execute("SELECT * FROM v_hosts", &[]).unwrap());
    assert_eq!(
        result,
        vec![vec![ClientValue::Int(1), ClientValue::Str("web1".to_string())]]
    );
}

#[test]
fn insert_and_select_round_trip_through_a_bare_table() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))"]);
    d.execute("INSERT INTO hosts VALUES (7)", &[]).unwrap();
    let result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    assert_eq!(result, vec![vec![ClientValue::Int(7)]]);
}

#[test]
fn delete_by_primary_key_removes_the_row_and_is_idempotent() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))"]);
    d.execute("INSERT INTO hosts VALUES (1)", &[]).unwrap();
    d.execute("INSERT INTO hosts VALUES (2)", &[]).unwrap();
    d.execute("DELETE FROM hosts WHERE id = 1", &[]).unwrap();

    let result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    assert_eq!(result, vec![vec![ClientValue::Int(2)]]);

    // deleting an already-absent key is not an error
    d.execute("DELETE FROM hosts WHERE id = 1", &[]).unwrap();
    let result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    assert_eq!(result, vec![vec![ClientValue::Int(2)]]);
}

#[test]
fn delete_accepts_the_column_identifier_on_either_side_of_equals() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))"]);
    d.execute("INSERT INTO hosts VALUES (1)", &[]).unwrap();
    d.execute("DELETE FROM hosts WHERE 1 = id", &[]).unwrap();

    let result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    assert!(result.is_empty());
}

#[test]
fn projected_and_filtered_view_only_exposes_matching_rows() {
    let mut d = dispatcher(&[
        "CREATE TABLE hosts (id INTEGER, name VARCHAR(36), PRIMARY KEY (id))",
        "CREATE VIEW v_ids AS SELECT DISTINCT id AS h FROM hosts WHERE id = 1",
    ]);
    d.execute("INSERT INTO hosts VALUES (1, 'web1')", &[]).unwrap();
    d.execute("INSERT INTO hosts VALUES (2, 'web2')", &[]).unwrap();

    let result = rows(d.execute("SELECT * FROM v_ids", &[]).unwrap());
    assert_eq!(result, vec![vec![ClientValue::Int(1)]]);
}

#[test]
fn view_over_a_parenthesized_subquery_round_trips() {
    let mut d = dispatcher(&[
        "CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))",
        "CREATE VIEW v_hosts AS SELECT DISTINCT * FROM (SELECT DISTINCT * FROM hosts) AS sub",
    ]);
    d.execute("INSERT INTO hosts VALUES (1)", &[]).unwrap();
    d.execute("INSERT INTO hosts VALUES (2)", &[]).unwrap();

    let mut result = rows(d.execute("SELECT * FROM v_hosts", &[]).unwrap());
    result.sort_by_key(|r| match r[0] {
        ClientValue::Int(i) => i,
        _ => unreachable!(),
    });
    assert_eq!(result, vec![vec![ClientValue::Int(1)], vec![ClientValue::Int(2)]]);
}

#[test]
fn nullable_column_round_trips_null_and_a_present_value() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, label VARCHAR(36), PRIMARY KEY (id))"]);
    d.execute("INSERT INTO hosts VALUES (1, NULL)", &[]).unwrap();
    d.execute("INSERT INTO hosts VALUES (2, 'x')", &[]).unwrap();

    let mut result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    result.sort_by_key(|r| match r[0] {
        ClientValue::Int(i) => i,
        _ => unreachable!(),
    });
    assert_eq!(
        result,
        vec![
            vec![ClientValue::Int(1), ClientValue::Null],
            vec![ClientValue::Int(2), ClientValue::Str("x".to_string())],
        ]
    );
}

#[test]
fn nullable_column_filters_correctly_against_a_literal() {
    let mut d = dispatcher(&[
        "CREATE TABLE hosts (id INTEGER, name VARCHAR(36), PRIMARY KEY (id))",
        "CREATE VIEW v_web AS SELECT DISTINCT * FROM hosts WHERE name = 'web1'",
    ]);
    d.execute("INSERT INTO hosts VALUES (1, 'web1')", &[]).unwrap();
    d.execute("INSERT INTO hosts VALUES (2, NULL)", &[]).unwrap();

    let result = rows(d.execute("SELECT * FROM v_web", &[]).unwrap());
    assert_eq!(
        result,
        vec![vec![ClientValue::Int(1), ClientValue::Str("web1".to_string())]]
    );
}

#[test]
fn insert_into_a_view_is_rejected() {
    let mut d = dispatcher(&[
        "CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))",
        "CREATE VIEW v_hosts AS SELECT DISTINCT * FROM hosts",
    ]);
    assert!(d.execute("INSERT INTO v_hosts VALUES (1)", &[]).is_err());
}

#[test]
fn delete_without_full_primary_key_coverage_is_rejected() {
    let mut d = dispatcher(&["CREATE TABLE e (a INTEGER, b INTEGER, PRIMARY KEY (a, b))"]);
    d.execute("INSERT INTO e VALUES (1, 2)", &[]).unwrap();
    assert!(d.execute("DELETE FROM e WHERE a = 1", &[]).is_err());
}

#[test]
fn batch_rolls_back_atomically_on_a_later_statement_error() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))"]);
    let batch = vec![
        ("INSERT INTO hosts VALUES (1)".to_string(), vec![]),
        ("INSERT INTO nope VALUES (1)".to_string(), vec![]),
    ];
    assert!(d.execute_batch(&batch).is_err());

    let result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    assert!(result.is_empty());
}

#[test]
fn bigint_column_accepts_values_outside_i32_range() {
    let mut d = dispatcher(&["CREATE TABLE counters (id BIGINT, PRIMARY KEY (id))"]);
    d.execute("INSERT INTO counters VALUES (99999999999999999999)", &[])
        .unwrap();
    let result = rows(d.execute("SELECT * FROM counters", &[]).unwrap());
    assert_eq!(
        result,
        vec![vec![ClientValue::BigInt("99999999999999999999".to_string())]]
    );
}

#[test]
fn insert_consumes_positional_bindings_left_to_right_across_the_statement() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, name VARCHAR(36), PRIMARY KEY (id))"]);
    d.execute(
        "INSERT INTO hosts VALUES (?, ?), (?, ?)",
        &[
            ClientValue::Int(1),
            ClientValue::Str("web1".to_string()),
            ClientValue::Int(2),
            ClientValue::Str("web2".to_string()),
        ],
    )
    .unwrap();

    let mut result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    result.sort_by_key(|r| match r[0] {
        ClientValue::Int(i) => i,
        _ => unreachable!(),
    });
    assert_eq!(
        result,
        vec![
            vec![ClientValue::Int(1), ClientValue::Str("web1".to_string())],
            vec![ClientValue::Int(2), ClientValue::Str("web2".to_string())],
        ]
    );
}

#[test]
fn delete_accepts_a_bound_primary_key_value() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))"]);
    d.execute("INSERT INTO hosts VALUES (1)", &[]).unwrap();
    d.execute("DELETE FROM hosts WHERE id = ?", &[ClientValue::Int(1)])
        .unwrap();

    let result = rows(d.execute("SELECT * FROM hosts", &[]).unwrap());
    assert!(result.is_empty());
}

#[test]
fn insert_reports_too_few_bindings_for_its_placeholders() {
    let mut d = dispatcher(&["CREATE TABLE hosts (id INTEGER, PRIMARY KEY (id))"]);
    assert!(d
        .execute("INSERT INTO hosts VALUES (?)", &[])
        .is_err());
}
