//! I/O utilities for reading JSON and CSV inputs and writing rendered output.
//!
//! All file I/O in shape-probe flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8 with
//!   byte-order-mark sniffing.
//! - **Reader/writer construction**: `open_input`, `open_csv_reader_from_path`
//!   and `open_output`.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;
use thiserror::Error;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Error)]
#[error("failed to decode text with encoding {encoding}")]
pub struct DecodeError {
    pub encoding: &'static str,
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

fn open_raw(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        )))
    }
}

/// Opens `path` (or stdin for `-`) as a UTF-8 byte stream.
///
/// A byte-order mark always wins. Without one, UTF-8 input passes through
/// untouched and any other encoding is transcoded to UTF-8.
pub fn open_input(path: &Path, encoding: &'static Encoding) -> Result<Box<dyn Read>> {
    let raw = open_raw(path)?;
    let declared = (encoding != UTF_8).then_some(encoding);
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(declared)
        .bom_sniffing(true)
        .build(raw);
    Ok(Box::new(decoder))
}

/// Builds a CSV reader that returns every row as a record, including the
/// header row, and accepts rows of differing widths.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    Ok(open_csv_reader(open_raw(path)?, delimiter))
}

/// Opens the destination for rendered output; stdout when `path` is absent or `-`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(io::stdout())),
    }
}

/// Writes a fully rendered document to `path` (stdout when absent or `-`).
pub fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    let mut writer = open_output(path)?;
    writer
        .write_all(rendered.as_bytes())
        .context("Writing output")?;
    writer.flush().context("Flushing output")
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(DecodeError {
            encoding: encoding.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, DecodeError> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Table name for a CSV input: its file stem, or `stdin` for `-`.
pub fn table_name_for(path: &Path) -> String {
    if is_dash(path) {
        return "stdin".to_string();
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("data")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("a.TSV"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), Some(b';')), b';');
    }

    #[test]
    fn unknown_encoding_label_is_rejected() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(resolve_encoding(Some(" latin1 ")).unwrap(), WINDOWS_1252);
        let err = resolve_encoding(Some("klingon")).unwrap_err();
        assert!(err.to_string().contains("Unknown encoding"));
    }

    #[test]
    fn decode_bytes_reports_invalid_sequences() {
        assert_eq!(decode_bytes(b"caf\xe9", WINDOWS_1252).unwrap(), "café");
        let err = decode_bytes(b"caf\xe9", UTF_8).unwrap_err();
        assert_eq!(err.encoding, "UTF-8");
    }

    #[test]
    fn write_output_creates_the_destination_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("out.sql");
        write_output(Some(&target), "create table t (\n);\n").expect("write");
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "create table t (\n);\n"
        );
    }

    #[test]
    fn table_names_come_from_file_stems() {
        assert_eq!(table_name_for(&PathBuf::from("dir/orders.csv")), "orders");
        assert_eq!(table_name_for(Path::new("-")), "stdin");
    }
}
