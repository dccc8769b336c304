// CSV/TSV import/export. The first record is the header row.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use gridedit_engine::Table;

use crate::{build_table, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Import delimited text. `None` sniffs the delimiter from the content.
pub fn import(path: &Path, delimiter: Option<u8>) -> Result<Table> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    import_from_string(&content, delimiter)
}

/// Delimiters tried when none is configured, in tie-break order.
const DELIMITER_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Sample lines read when guessing the delimiter.
const SNIFF_LINES: usize = 10;

/// Guess the field delimiter from the first lines of `content`.
///
/// A candidate must split the header line into at least two fields. Among
/// those, the one whose header width repeats on the most sample lines wins
/// (weighted by that width). Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(SNIFF_LINES).collect();

    DELIMITER_CANDIDATES
        .iter()
        .filter_map(|&delim| {
            let widths: Vec<usize> = sample.iter().map(|line| field_count(line, delim)).collect();
            let header = *widths.first()?;
            if header < 2 {
                return None;
            }
            let agreeing = widths.iter().filter(|&&w| w == header).count();
            Some((agreeing * header, delim))
        })
        // max_by_key keeps the last maximum; reverse so earlier candidates win ties
        .rev()
        .max_by_key(|&(score, _)| score)
        .map_or(b',', |(_, delim)| delim)
}

/// Fields in one line under `delim`, honouring quotes.
fn field_count(line: &str, delim: u8) -> usize {
    ::csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|record| record.ok())
        .map_or(1, |record| record.len())
}

/// Read a file as UTF-8, falling back to Windows-1252 (common for Excel-exported CSVs).
/// A leading byte-order mark is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Ok(Table::new()),
    };
    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    build_table(headers, rows)
}

/// Write the header row and every data row, prefixed with a UTF-8 BOM.
pub fn export(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut writer = ::csv::WriterBuilder::new().delimiter(delimiter).from_writer(file);
    if table.column_count() > 0 {
        writer.write_record(table.columns())?;
        for (_, cells) in table.rows() {
            writer.write_record(cells)?;
        }
    }
    writer.flush()?;
    Ok(())
}
