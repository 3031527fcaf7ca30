//! Text renderings of key-paths, table definitions and type counts.

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    cli::OutputFormat,
    stats::TypeStats,
    table::{self, Align},
    tables::TableDef,
};

const TYPED_COLUMN_WIDTH: usize = 30;

/// One key-path per line.
pub fn key_lines(keys: &[String]) -> String {
    keys.iter().map(|key| format!("{key}\n")).collect()
}

pub fn create_table_statement(def: &TableDef) -> String {
    format!(
        "create table if not exists {} (\n    {}\n);\n",
        def.table_name,
        def.column_names.join(",\n    ")
    )
}

/// Every definition in order, separated by a blank line.
pub fn create_table_statements(defs: &[TableDef]) -> String {
    defs.iter().map(create_table_statement).join("\n")
}

/// A `create table` statement whose columns carry their resolved SQL types.
pub fn typed_create_table_statement(table_name: &str, stats: &TypeStats) -> String {
    let columns = stats
        .resolved_types()
        .into_iter()
        .map(|(name, ty)| {
            format!(
                "    {name:<width$} {}",
                ty.sql_name(),
                width = TYPED_COLUMN_WIDTH
            )
        })
        .join(",\n");
    if columns.is_empty() {
        return format!("create table if not exists {table_name} (\n);\n");
    }
    format!("create table if not exists {table_name} (\n{columns}\n);\n")
}

/// `column  type  count` rows; the column name is only shown on its first row.
pub fn type_count_rows(stats: &TypeStats) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut previous: Option<&str> = None;
    for (column, label, count) in stats.rows() {
        let shown = if previous == Some(column) {
            String::new()
        } else {
            column.to_string()
        };
        previous = Some(column);
        rows.push(vec![shown, label.to_string(), count.to_string()]);
    }
    rows
}

pub fn type_count_table(stats: &TypeStats) -> String {
    let headers = vec![
        "column".to_string(),
        "type".to_string(),
        "count".to_string(),
    ];
    table::render_table(
        &headers,
        &type_count_rows(stats),
        &[Align::Left, Align::Left, Align::Right],
    )
}

/// Renders `value` as text with `text`, or serializes it as JSON or YAML.
pub fn render_as<T, F>(value: &T, format: OutputFormat, text: F) -> Result<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .context("Serializing output as JSON"),
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Serializing output as YAML"),
    }
}
