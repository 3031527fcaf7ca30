use std::io::Read;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};

use crate::{
    cli::{KeysArgs, TablesArgs, TokensArgs},
    io_utils, keys, render, tables,
    tokens::{self, JsonTokens},
};

fn open_json(input: &std::path::Path, encoding: Option<&str>) -> Result<Box<dyn Read>> {
    let encoding = io_utils::resolve_encoding(encoding)?;
    debug!("Reading JSON from {input:?} as {}", encoding.name());
    io_utils::open_input(input, encoding)
}

pub fn execute_keys(args: &KeysArgs) -> Result<()> {
    let reader = open_json(&args.input, args.input_encoding.as_deref())?;
    let keys = keys::get_keys(reader)
        .with_context(|| format!("Extracting key-paths from {:?}", args.input))?;
    let rendered = render::render_as(&keys, args.format, |keys| render::key_lines(keys))?;
    io_utils::write_output(args.output.as_deref(), &rendered)?;
    info!(
        "Found {} leaf key-path(s) in {:?}",
        keys.len(),
        args.input
    );
    Ok(())
}

pub fn execute_tables(args: &TablesArgs) -> Result<()> {
    let root = args.root.trim();
    anyhow::ensure!(!root.is_empty(), "Root table name cannot be empty");
    let reader = open_json(&args.input, args.input_encoding.as_deref())?;
    let keys = keys::get_keys(reader)
        .with_context(|| format!("Extracting key-paths from {:?}", args.input))?;
    let defs = tables::compute_table_defs(root, &keys);
    debug!(
        "Tables discovered: {}",
        defs.iter().map(|def| def.table_name.as_str()).join(", ")
    );
    let rendered =
        render::render_as(&defs, args.format, |defs| render::create_table_statements(defs))?;
    io_utils::write_output(args.output.as_deref(), &rendered)?;
    info!(
        "Derived {} table(s) from {} key-path(s) in {:?}",
        defs.len(),
        keys.len(),
        args.input
    );
    Ok(())
}

pub fn execute_tokens(args: &TokensArgs) -> Result<()> {
    let reader = open_json(&args.input, args.input_encoding.as_deref())?;
    let mut source = JsonTokens::new(reader);
    let tokens = tokens::collect_tokens(&mut source)
        .with_context(|| format!("Tokenizing {:?}", args.input))?;
    let rendered = tokens
        .iter()
        .map(|token| format!("{token}\n"))
        .collect::<String>();
    io_utils::write_output(args.output.as_deref(), &rendered)?;
    info!(
        "Emitted {} token(s) from {} document(s) in {:?}",
        tokens.len(),
        source.documents_read(),
        args.input
    );
    Ok(())
}
