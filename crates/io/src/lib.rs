// File I/O: load a Table from, and save it to, the supported formats.
//
// Format is chosen by file extension. Loading builds a fresh Table and never
// touches an open session; saving only reads the Table it is given.

use std::path::Path;

use gridedit_engine::normalize::column_name;
use gridedit_engine::Table;
use log::info;
use thiserror::Error;

pub mod coerce;
pub mod csv;
pub mod json;
pub mod text_table;
pub mod xlsx;

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed data: {0}")]
    Malformed(String),
}

/// On-disk formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// csv, tsv, tab
    Delimited,
    /// xlsx, xlsm, xls, xlsb, ods (read); xlsx only (write)
    Spreadsheet,
    /// json: array of records
    Json,
    /// md, markdown, txt: pipe table
    TextTable,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = extension(path);
        match ext.as_str() {
            "csv" | "tsv" | "tab" => Ok(Format::Delimited),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Format::Spreadsheet),
            "json" => Ok(Format::Json),
            "md" | "markdown" | "txt" => Ok(Format::TextTable),
            "" => Err(FileError::UnsupportedFormat(format!("{} has no extension", path.display()))),
            other => Err(FileError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Delimited => "delimited text",
            Format::Spreadsheet => "spreadsheet",
            Format::Json => "JSON",
            Format::TextTable => "text table",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Field delimiter for delimited text; `None` sniffs (tab for .tsv/.tab).
    pub delimiter: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Field delimiter for delimited text; `None` = comma (tab for .tsv/.tab).
    pub delimiter: Option<u8>,
    /// Write numeric-looking cells as numbers where the format has types.
    pub coerce_numbers: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { delimiter: None, coerce_numbers: true }
    }
}

pub fn load(path: &Path) -> Result<Table> {
    load_with(path, &LoadOptions::default())
}

pub fn load_with(path: &Path, options: &LoadOptions) -> Result<Table> {
    let format = Format::from_path(path)?;
    let table = match format {
        Format::Delimited => csv::import(path, options.delimiter.or_else(|| default_delimiter(path)))?,
        Format::Spreadsheet => xlsx::import(path)?,
        Format::Json => json::import(path)?,
        Format::TextTable => text_table::import(path)?,
    };
    info!(
        "loaded {} ({}): {} rows x {} cols",
        path.display(),
        format.name(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

pub fn save(table: &Table, path: &Path) -> Result<()> {
    save_with(table, path, &SaveOptions::default())
}

pub fn save_with(table: &Table, path: &Path, options: &SaveOptions) -> Result<()> {
    let format = Format::from_path(path)?;
    match format {
        Format::Delimited => {
            let delimiter = options.delimiter.or_else(|| default_delimiter(path)).unwrap_or(b',');
            csv::export(table, path, delimiter)?
        }
        Format::Spreadsheet => {
            if extension(path) != "xlsx" {
                return Err(FileError::UnsupportedFormat(format!(
                    "cannot write {}; save as .xlsx",
                    extension(path)
                )));
            }
            xlsx::export(table, path, options.coerce_numbers)?
        }
        Format::Json => json::export(table, path, options.coerce_numbers)?,
        Format::TextTable => text_table::export(table, path)?,
    }
    info!("saved {} ({})", path.display(), format.name());
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn default_delimiter(path: &Path) -> Option<u8> {
    match extension(path).as_str() {
        "tsv" | "tab" => Some(b'\t'),
        _ => None,
    }
}

/// Build a Table from a header row and data rows read from a file.
///
/// Blank headers get their positional name, repeated headers get a `.N`
/// suffix, and rows wider than the header row widen the table.
pub(crate) fn build_table(mut headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Table> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(headers.len());
    headers.resize(width, String::new());

    let mut unique: Vec<String> = Vec::with_capacity(width);
    for (i, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() { column_name(i) } else { header };
        let mut name = base.clone();
        let mut n = 1;
        while unique.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        unique.push(name);
    }

    Table::from_rows(unique, rows).map_err(|e| FileError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn sample() -> Table {
        Table::from_rows(
            s(&["Name", "Qty", "Code"]),
            vec![s(&["apple", "3", "007"]), s(&["pear", "2.5", ""])],
        )
        .unwrap()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.CSV")).unwrap(), Format::Delimited);
        assert_eq!(Format::from_path(Path::new("a.tsv")).unwrap(), Format::Delimited);
        assert_eq!(Format::from_path(Path::new("a.ods")).unwrap(), Format::Spreadsheet);
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.md")).unwrap(), Format::TextTable);
        assert!(matches!(Format::from_path(Path::new("a.sheet")), Err(FileError::UnsupportedFormat(_))));
        assert!(matches!(Format::from_path(Path::new("noext")), Err(FileError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_build_table_fixes_headers() {
        let t = build_table(s(&["a", "", "a"]), vec![s(&["1", "2", "3", "4"])]).unwrap();
        assert_eq!(t.columns(), &["a", "B", "a.1", "D"]);
        assert_eq!(t.get(0, "D").unwrap(), "4");
    }

    #[test]
    fn test_every_format_reloads_same_table() {
        let dir = tempdir().unwrap();
        for name in ["t.csv", "t.tsv", "t.json", "t.md", "t.xlsx"] {
            let path: PathBuf = dir.path().join(name);
            save(&sample(), &path).unwrap();
            let back = load(&path).unwrap();
            assert_eq!(back.columns(), sample().columns(), "{}", name);
            assert_eq!(back.get(0, "Code").unwrap(), "007", "{}", name);
            assert_eq!(back.get(1, "Qty").unwrap(), "2.5", "{}", name);
            assert_eq!(back.get(1, "Code").unwrap(), "", "{}", name);
        }
    }

    #[test]
    fn test_save_refuses_read_only_spreadsheet_formats() {
        let dir = tempdir().unwrap();
        let err = save(&sample(), &dir.path().join("t.ods")).unwrap_err();
        assert!(matches!(err, FileError::UnsupportedFormat(_)));
        assert!(!dir.path().join("t.ods").exists());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(load(&dir.path().join("nope.csv")), Err(FileError::Io(_))));
    }
}
