mod common;

use encoding_rs::UTF_8;
use shape_probe::guess::Type;
use shape_probe::io_utils;
use shape_probe::render::{type_count_table, typed_create_table_statement};
use shape_probe::stats::{TypeLabel, gather_stats};

use common::{TestWorkspace, fixture_path};

#[test]
fn fixture_columns_resolve_to_expected_types() {
    let path = fixture_path("people.csv");
    let mut reader = io_utils::open_csv_reader_from_path(&path, b',').expect("open");
    let stats = gather_stats(&mut reader, true, UTF_8).expect("stats");

    assert_eq!(stats.rows_ingested(), 4);
    assert_eq!(
        stats.resolved_types(),
        vec![
            ("id", Type::Integer),
            ("name", Type::Text),
            ("score", Type::Text),
            ("active", Type::Boolean),
            ("joined", Type::Text),
            ("last_seen", Type::Text),
        ]
    );

    let score = stats.column("score").expect("score column");
    assert_eq!(score.counts[&TypeLabel::Null], 1);
    assert_eq!(score.counts[&TypeLabel::Integer], 1);
    assert_eq!(score.counts[&TypeLabel::Real], 2);

    let last_seen = stats.column("last_seen").expect("last_seen column");
    assert_eq!(last_seen.counts[&TypeLabel::Timestamp("RFC3339")], 3);
}

#[test]
fn ragged_rows_count_missing_cells_as_null() {
    let path = fixture_path("ragged.tsv");
    let delimiter = io_utils::resolve_input_delimiter(&path, None);
    let mut reader = io_utils::open_csv_reader_from_path(&path, delimiter).expect("open");
    let stats = gather_stats(&mut reader, true, UTF_8).expect("ragged input");

    let b = stats.column("b").expect("b column");
    assert_eq!(b.counts[&TypeLabel::Integer], 2);
    assert_eq!(b.counts[&TypeLabel::Null], 1);
    let c = stats.column("c").expect("c column");
    assert_eq!(c.counts[&TypeLabel::Integer], 1);
    assert_eq!(c.counts[&TypeLabel::Null], 2);
    assert!(stats.columns().iter().all(|column| column.total() == 3));
}

#[test]
fn duplicate_headers_merge_into_one_declared_column() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("dup.csv", "id,note,id
1,a,2
3,b,4
");
    let mut reader = io_utils::open_csv_reader_from_path(&path, b',').expect("open");
    let stats = gather_stats(&mut reader, true, UTF_8).expect("stats");

    assert_eq!(stats.rows_ingested(), 2);
    assert_eq!(
        stats.resolved_types(),
        vec![("id", Type::Integer), ("note", Type::Text)]
    );
    assert_eq!(stats.column("id").expect("id column").total(), 4);

    let ddl = typed_create_table_statement("dup", &stats);
    assert_eq!(ddl.matches("    id ").count(), 1);
}

#[test]
fn typed_ddl_uses_resolved_sql_types() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("metrics.csv", "host,load,up\nweb1,0.5,true\nweb2,1.25,false\n");
    let mut reader = io_utils::open_csv_reader_from_path(&path, b',').expect("open");
    let stats = gather_stats(&mut reader, true, UTF_8).expect("stats");
    let ddl = typed_create_table_statement(&io_utils::table_name_for(&path), &stats);
    assert_eq!(
        ddl,
        format!(
            "create table if not exists metrics (\n    {:<30} text,\n    {:<30} real,\n    {:<30} boolean\n);\n",
            "host", "load", "up"
        )
    );
}

#[test]
fn type_count_table_lists_each_label_once() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("mixed.csv", "v\n1\n\n2\nx\n");
    let mut reader = io_utils::open_csv_reader_from_path(&path, b',').expect("open");
    let stats = gather_stats(&mut reader, true, UTF_8).expect("stats");
    let table = type_count_table(&stats);
    let lines = table.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "column  type     count");
    assert_eq!(lines[2], "v       Integer      2");
    assert_eq!(lines[3], "        Text         1");
    assert_eq!(lines.len(), 4);
}
