mod common;

use std::fs::File;

use proptest::prelude::*;
use shape_probe::keys::get_keys;
use shape_probe::render::create_table_statements;
use shape_probe::tables::{TableDef, compute_table_defs, table_and_column};

use common::{fixture_path, fixture_text};

fn summary(defs: &[TableDef]) -> Vec<(String, Vec<String>)> {
    defs.iter()
        .map(|def| (def.table_name.clone(), def.column_names.clone()))
        .collect()
}

fn owned(name: &str, columns: &[&str]) -> (String, Vec<String>) {
    (
        name.to_string(),
        columns.iter().map(|c| c.to_string()).collect(),
    )
}

#[test]
fn fixture_compiles_to_parent_and_child_tables() {
    let keys = get_keys(File::open(fixture_path("orders.json")).expect("open")).expect("keys");
    let defs = compute_table_defs("orders", &keys);
    assert_eq!(
        summary(&defs),
        vec![
            owned("orders", &["id", "order_id", "placed_at", "notes"]),
            owned("orders_customer", &["id", "fk", "name", "email", "phone"]),
            owned("orders_items", &["id", "fk", "sku", "qty", "price"]),
            owned("orders_items_options", &["id", "fk", "gift"]),
            owned("orders_tags", &["id", "fk", "value"]),
        ]
    );
}

#[test]
fn fixture_renders_create_table_statements() {
    let keys = get_keys(fixture_text("orders.json").as_bytes()).expect("keys");
    let rendered = create_table_statements(&compute_table_defs("orders", &keys));
    assert!(rendered.starts_with(
        "create table if not exists orders (\n    id,\n    order_id,\n    placed_at,\n    notes\n);\n\n"
    ));
    assert!(rendered.ends_with(
        "create table if not exists orders_tags (\n    id,\n    fk,\n    value\n);\n"
    ));
    assert_eq!(rendered.matches("create table if not exists").count(), 5);
}

#[test]
fn no_paths_still_yield_the_root_table() {
    let defs = compute_table_defs::<&str>("t", &[]);
    assert_eq!(summary(&defs), vec![owned("t", &["id"])]);
}

#[test]
fn root_array_paths_land_in_the_root_table() {
    assert_eq!(table_and_column("t", "/"), ("t".to_string(), "value".to_string()));
    assert_eq!(table_and_column("t", "//a"), ("t".to_string(), "a".to_string()));
}

#[test]
fn nested_element_segments_collapse_underscores() {
    assert_eq!(
        table_and_column("t", "/a//b//c"),
        ("t_a_b".to_string(), "c".to_string())
    );
}

proptest! {
    #[test]
    fn root_comes_first_and_tables_follow_first_sighting(
        paths in prop::collection::vec("(/[a-c]{0,2}){1,4}", 0..12)
    ) {
        let defs = compute_table_defs("t", &paths);
        let mut expected = vec!["t".to_string()];
        for path in &paths {
            let (table, _) = table_and_column("t", path);
            if !expected.contains(&table) {
                expected.push(table);
            }
        }
        let names = defs.iter().map(|def| def.table_name.clone()).collect::<Vec<_>>();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn repeating_paths_adds_no_columns(
        paths in prop::collection::vec("(/[a-c]{0,2}){1,4}", 0..12)
    ) {
        let doubled = paths.iter().chain(paths.iter()).cloned().collect::<Vec<_>>();
        let once = compute_table_defs("t", &paths);
        prop_assert_eq!(&compute_table_defs("t", &doubled), &once);
        for def in &once {
            let mut columns = def.column_names.clone();
            columns.sort();
            columns.dedup();
            prop_assert_eq!(columns.len(), def.column_names.len());
        }
    }
}
