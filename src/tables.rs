//! Relational table definitions compiled from leaf key-paths.
//!
//! Each path `/a/b//c` under root `t` names the table `t_a_b` (segments before
//! the last, joined with `_`) and the column `c`. A path that ends in an array
//! element (`/tags/`) gets the column `value`. The root table starts with an
//! `id` column; every other table starts with `id` and `fk`.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

pub const ID_COLUMN: &str = "id";
pub const FOREIGN_KEY_COLUMN: &str = "fk";
pub const ELEMENT_COLUMN: &str = "value";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub table_name: String,
    pub column_names: Vec<String>,
}

impl TableDef {
    fn root(name: &str) -> Self {
        Self {
            table_name: name.to_string(),
            column_names: vec![ID_COLUMN.to_string()],
        }
    }

    fn child(name: &str) -> Self {
        Self {
            table_name: name.to_string(),
            column_names: vec![ID_COLUMN.to_string(), FOREIGN_KEY_COLUMN.to_string()],
        }
    }

    /// Appends `column` unless the table already has it.
    pub fn add_column(&mut self, column: &str) {
        if !self.column_names.iter().any(|existing| existing == column) {
            self.column_names.push(column.to_string());
        }
    }
}

/// Table registry that remembers the order tables were first seen in.
#[derive(Debug, Default)]
struct TableRegistry {
    order: Vec<String>,
    tables: HashMap<String, TableDef>,
}

impl TableRegistry {
    fn with_root(root: &str) -> Self {
        let mut registry = Self::default();
        registry.order.push(root.to_string());
        registry.tables.insert(root.to_string(), TableDef::root(root));
        registry
    }

    fn table_mut(&mut self, name: &str) -> &mut TableDef {
        if !self.tables.contains_key(name) {
            debug!("Discovered table '{name}'");
            self.order.push(name.to_string());
        }
        self.tables
            .entry(name.to_string())
            .or_insert_with(|| TableDef::child(name))
    }

    fn into_defs(mut self) -> Vec<TableDef> {
        self.order
            .iter()
            .filter_map(|name| self.tables.remove(name))
            .collect()
    }
}

/// Splits `root + path` into its table name and column name.
pub fn table_and_column(root: &str, path: &str) -> (String, String) {
    let full = format!("{root}{path}");
    let mut segments = full.split('/').collect::<Vec<_>>();
    let last = segments.pop().unwrap_or_default();

    let table_name = segments
        .join("_")
        .trim_end_matches('_')
        .replace("__", "_");
    let column_name = if last.is_empty() { ELEMENT_COLUMN } else { last };
    (table_name, column_name.to_string())
}

/// Compiles leaf key-paths into table definitions, root first and the rest in
/// the order their first path appeared.
pub fn compute_table_defs<P: AsRef<str>>(root: &str, paths: &[P]) -> Vec<TableDef> {
    let mut registry = TableRegistry::with_root(root);
    for path in paths {
        let (table_name, column_name) = table_and_column(root, path.as_ref());
        registry.table_mut(&table_name).add_column(&column_name);
    }
    registry.into_defs()
}
