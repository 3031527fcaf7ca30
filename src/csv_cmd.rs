use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;
use serde::Serialize;

use crate::{
    cli::{DdlArgs, TypesArgs},
    io_utils, render,
    stats::{self, TypeStats},
};

#[derive(Debug, Serialize)]
struct FileTypes {
    input: String,
    #[serde(flatten)]
    stats: TypeStats,
}

fn gather_file(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    has_headers: bool,
) -> Result<TypeStats> {
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    info!(
        "Counting column types in {path:?} using delimiter '{}'",
        printable_delimiter(delimiter)
    );
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let stats = stats::gather_stats(&mut reader, has_headers, encoding)
        .with_context(|| format!("Counting column types in {path:?}"))?;
    info!(
        "Counted {} row(s) across {} column(s) in {path:?}",
        stats.rows_ingested(),
        stats.columns().len()
    );
    Ok(stats)
}

fn gather_all(
    inputs: &[PathBuf],
    delimiter: Option<u8>,
    encoding: Option<&str>,
    no_headers: bool,
) -> Result<Vec<(PathBuf, TypeStats)>> {
    let encoding = io_utils::resolve_encoding(encoding)?;
    inputs
        .iter()
        .map(|path| {
            gather_file(path, delimiter, encoding, !no_headers).map(|stats| (path.clone(), stats))
        })
        .collect()
}

pub fn execute_types(args: &TypesArgs) -> Result<()> {
    let gathered = gather_all(
        &args.inputs,
        args.delimiter,
        args.input_encoding.as_deref(),
        args.no_headers,
    )?;
    let reports = gathered
        .into_iter()
        .map(|(path, stats)| FileTypes {
            input: path.display().to_string(),
            stats,
        })
        .collect::<Vec<_>>();
    let rendered = render::render_as(&reports, args.format, |reports| {
        reports
            .iter()
            .map(|report| {
                format!(
                    "column/type counts for {}:\n{}",
                    report.input,
                    render::type_count_table(&report.stats)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    io_utils::write_output(args.output.as_deref(), &rendered)
}

pub fn execute_ddl(args: &DdlArgs) -> Result<()> {
    let gathered = gather_all(
        &args.inputs,
        args.delimiter,
        args.input_encoding.as_deref(),
        args.no_headers,
    )?;
    let rendered = gathered
        .iter()
        .map(|(path, stats)| {
            let table_name = args
                .table
                .clone()
                .unwrap_or_else(|| io_utils::table_name_for(path));
            render::typed_create_table_statement(&table_name, stats)
        })
        .collect::<Vec<_>>()
        .join("\n");
    io_utils::write_output(args.output.as_deref(), &rendered)?;
    info!("Wrote {} create table statement(s)", gathered.len());
    Ok(())
}

fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
