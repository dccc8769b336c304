// gridedit CLI - headless table editing, search and conversion

mod exit_codes;
mod prompt;
mod script;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use gridedit_config::Settings;
use gridedit_engine::analysis;
use gridedit_engine::{AutoConfirm, EditError, EditSession, HeaderScope, MatchMode, Table};
use gridedit_io::{FileError, LoadOptions, SaveOptions};

use exit_codes::{
    edit_exit_code, file_exit_code, EXIT_ERROR, EXIT_IO, EXIT_NOT_FOUND, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE,
};
use prompt::Prompter;
use script::{Outcome, ScriptError};

#[derive(Parser)]
#[command(name = "gridedit")]
#[command(about = "Table editor (CLI mode, headless)")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/gridedit/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG also works)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Answer yes to confirmations (column deletion, search wrap)
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a blank table
    #[command(after_help = "\
Examples:
  gridedit new blank.csv
  gridedit new grid.xlsx --rows 10 --cols 4")]
    New {
        /// Output file; format from extension
        output: PathBuf,

        /// Row count (default: newTable.rows)
        #[arg(long)]
        rows: Option<usize>,

        /// Column count (default: newTable.cols)
        #[arg(long)]
        cols: Option<usize>,
    },

    /// Print a table with its row ids
    Show {
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert between formats (csv, tsv, xlsx/xls/ods, json, md/txt)
    #[command(after_help = "\
Examples:
  gridedit convert data.xlsx data.csv
  gridedit convert data.csv data.md")]
    Convert { input: PathBuf, output: PathBuf },

    /// Find cells or headers containing a term
    #[command(after_help = "\
Examples:
  gridedit find data.csv apple
  gridedit find data.csv apple --all
  gridedit find data.csv naem --header columns --fuzzy")]
    Find {
        file: PathBuf,
        term: String,

        /// Report every match instead of the first
        #[arg(long)]
        all: bool,

        /// Search column names or row ids instead of cells
        #[arg(long, value_enum)]
        header: Option<HeaderArg>,

        /// Fuzzy header match (with --header)
        #[arg(long, requires = "header")]
        fuzzy: bool,
    },

    /// Replace every occurrence of a term in every cell
    Replace {
        file: PathBuf,
        find: String,
        replace: String,

        /// Write here instead of in place
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Correlation and curve fits between two numeric columns
    Stats {
        file: PathBuf,
        x: String,
        y: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply an edit script (JSONL) to a file
    #[command(after_help = "\
Examples:
  gridedit apply data.csv ops.jsonl
  gridedit apply data.csv ops.jsonl -o edited.xlsx
  cat ops.jsonl | gridedit apply data.csv - --dry-run

Ops: edit, copy, cut, paste, insert_row, delete_row, insert_column,
delete_column, extend, fill, find, replace, replace_all, undo, redo")]
    Apply {
        file: PathBuf,

        /// Ops file, or - for stdin
        ops: String,

        /// Write here instead of in place
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the result instead of saving
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderArg {
    Columns,
    Rows,
}

impl From<HeaderArg> for HeaderScope {
    fn from(arg: HeaderArg) -> Self {
        match arg {
            HeaderArg::Columns => HeaderScope::Columns,
            HeaderArg::Rows => HeaderScope::Rows,
        }
    }
}

/// Settings plus global flags.
struct Context {
    settings: Settings,
    yes: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    debug!("settings: {:?}", settings);
    let ctx = Context { settings, yes: cli.yes };

    let result = match cli.command {
        Commands::New { output, rows, cols } => cmd_new(&ctx, output, rows, cols),
        Commands::Show { file, json } => cmd_show(&ctx, file, json),
        Commands::Convert { input, output } => cmd_convert(&ctx, input, output),
        Commands::Find { file, term, all, header, fuzzy } => cmd_find(&ctx, file, term, all, header, fuzzy),
        Commands::Replace { file, find, replace, output } => cmd_replace(&ctx, file, find, replace, output),
        Commands::Stats { file, x, y, json } => cmd_stats(&ctx, file, x, y, json),
        Commands::Apply { file, ops, output, dry_run } => cmd_apply(&ctx, file, ops, output, dry_run),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Unexpected internal failure (e.g. output serialization).
    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { code: EXIT_NOT_FOUND, message: msg.into(), hint: None }
    }

    pub fn edit(err: EditError) -> Self {
        Self { code: edit_exit_code(&err), message: err.to_string(), hint: None }
    }

    pub fn file(path: &Path, err: FileError) -> Self {
        let hint = match &err {
            FileError::UnsupportedFormat(_) => Some("use .csv, .tsv, .xlsx, .json or .md".to_string()),
            _ => None,
        };
        Self { code: file_exit_code(&err), message: format!("{}: {}", path.display(), err), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// shared
// ============================================================================

fn load_table(ctx: &Context, path: &Path) -> Result<Table, CliError> {
    let options = LoadOptions { delimiter: ctx.settings.delimiter_byte() };
    gridedit_io::load_with(path, &options).map_err(|e| CliError::file(path, e))
}

fn save_table(ctx: &Context, table: &Table, path: &Path) -> Result<(), CliError> {
    let options = SaveOptions {
        delimiter: ctx.settings.delimiter_byte(),
        coerce_numbers: ctx.settings.coerce_numbers,
    };
    gridedit_io::save_with(table, path, &options).map_err(|e| CliError::file(path, e))
}

fn open_session(ctx: &Context, path: &Path) -> Result<EditSession, CliError> {
    let mut session = EditSession::new().with_history_limit(ctx.settings.history_limit());
    session.load(|| load_table(ctx, path))?;
    Ok(session)
}

fn write_stdout(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes()).map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// new / show / convert
// ============================================================================

fn cmd_new(ctx: &Context, output: PathBuf, rows: Option<usize>, cols: Option<usize>) -> Result<(), CliError> {
    let rows = rows.unwrap_or(ctx.settings.new_table_rows);
    let cols = cols.unwrap_or(ctx.settings.new_table_cols);
    if cols == 0 {
        return Err(CliError::args("a table needs at least one column"));
    }
    let session = EditSession::blank(rows, cols);
    save_table(ctx, session.table(), &output)?;
    eprintln!("created {} ({} x {})", output.display(), rows, cols);
    Ok(())
}

fn cmd_show(ctx: &Context, file: PathBuf, json: bool) -> Result<(), CliError> {
    let table = load_table(ctx, &file)?;
    if json {
        let text = serde_json::to_string_pretty(&table).map_err(|e| CliError::internal(e.to_string()))?;
        return write_stdout(&format!("{}\n", text));
    }
    write_stdout(&render_with_ids(&table))
}

/// Pipe table with a leading row-id column, as the grid view shows it.
fn render_with_ids(table: &Table) -> String {
    let mut columns = vec!["#".to_string()];
    columns.extend(table.columns().iter().cloned());
    let rows = table
        .rows()
        .map(|(id, cells)| std::iter::once(id.to_string()).chain(cells.iter().cloned()).collect())
        .collect();
    match Table::from_rows(columns, rows) {
        Ok(view) => gridedit_io::text_table::render(&view),
        // A column already named "#": show without ids
        Err(_) => gridedit_io::text_table::render(table),
    }
}

fn cmd_convert(ctx: &Context, input: PathBuf, output: PathBuf) -> Result<(), CliError> {
    let table = load_table(ctx, &input)?;
    save_table(ctx, &table, &output)?;
    eprintln!(
        "converted {} -> {} ({} rows)",
        input.display(),
        output.display(),
        table.row_count()
    );
    Ok(())
}

// ============================================================================
// find / replace
// ============================================================================

fn cmd_find(
    ctx: &Context,
    file: PathBuf,
    term: String,
    all: bool,
    header: Option<HeaderArg>,
    fuzzy: bool,
) -> Result<(), CliError> {
    let mut session = open_session(ctx, &file)?;
    let mut prompter = Prompter::new(ctx.settings.search_wrap, ctx.yes, false);
    let mut lines = Vec::new();

    match header {
        Some(scope) => {
            let mode = if fuzzy { MatchMode::Fuzzy } else { MatchMode::Exact };
            let scope = HeaderScope::from(scope);
            if all {
                loop {
                    match session.find_header(&term, scope, mode, &mut AutoConfirm(false)) {
                        Ok(hit) => lines.push(format!("{}\t{}", hit.position, hit.label)),
                        Err(e) if e.is_not_found() => break,
                        Err(e) => return Err(CliError::edit(e)),
                    }
                }
            } else {
                let hit = session.find_header(&term, scope, mode, &mut prompter)?;
                lines.push(format!("{}\t{}", hit.position, hit.label));
            }
        }
        None if all => loop {
            match session.find_next(&term, &mut AutoConfirm(false)) {
                Ok(coord) => lines.push(coord.to_string()),
                Err(e) if e.is_not_found() => break,
                Err(e) => return Err(CliError::edit(e)),
            }
        },
        None => lines.push(session.find_next(&term, &mut prompter)?.to_string()),
    }

    if lines.is_empty() {
        return Err(CliError::not_found(format!("no match for '{}'", term)));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    write_stdout(&out)
}

fn cmd_replace(
    ctx: &Context,
    file: PathBuf,
    find: String,
    replace: String,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut session = open_session(ctx, &file)?;
    let count = session.replace_all(&find, &replace)?;
    eprintln!("replaced {} cell(s)", count);

    let target = output.as_deref().unwrap_or(&file);
    if count > 0 || output.is_some() {
        save_table(ctx, session.table(), target)?;
        session.mark_saved();
    }
    Ok(())
}

// ============================================================================
// stats
// ============================================================================

fn cmd_stats(ctx: &Context, file: PathBuf, x: String, y: String, json: bool) -> Result<(), CliError> {
    let table = load_table(ctx, &file)?;
    let result = analysis::analyze(&table, &x, &y)?;

    if json {
        let text = serde_json::to_string_pretty(&result).map_err(|e| CliError::internal(e.to_string()))?;
        return write_stdout(&format!("{}\n", text));
    }

    let coefficient = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v));
    let mut out = format!("points:      {}\n", result.points);
    out.push_str(&format!("pearson:     {}\n", coefficient(result.pearson)));
    out.push_str(&format!("spearman:    {}\n", coefficient(result.spearman)));
    for fit in [&result.linear, &result.exponential].into_iter().flatten() {
        out.push_str(&format!("{:<12} {}  (R² = {:.4})\n", format!("{:?}:", fit.kind).to_lowercase(), fit.equation(), fit.r_squared));
    }
    write_stdout(&out)
}

// ============================================================================
// apply
// ============================================================================

fn cmd_apply(
    ctx: &Context,
    file: PathBuf,
    ops_arg: String,
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), CliError> {
    // Read ops before loading so a bad script costs nothing
    let ops_text = if ops_arg == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("failed to read stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(&ops_arg).map_err(|e| CliError::io(format!("failed to read {}: {}", ops_arg, e)))?
    };
    let ops = script::parse_script(&ops_text).map_err(CliError::parse)?;
    if ops.is_empty() {
        eprintln!("No operations to apply");
        return Ok(());
    }

    let mut session = open_session(ctx, &file)?;
    let mut prompter = Prompter::new(ctx.settings.search_wrap, ctx.yes, ops_arg == "-");
    let mut report = String::new();

    for (i, op) in ops.iter().enumerate() {
        let outcome = script::run_op(&mut session, op, &mut prompter);
        for event in session.drain_events() {
            debug!("op {}: {:?}", i + 1, event);
        }
        match outcome {
            Ok(Outcome::Done(msg)) => report.push_str(&format!("{}: {}\n", i + 1, msg)),
            Ok(Outcome::Skipped(msg)) => report.push_str(&format!("{}: skipped ({})\n", i + 1, msg)),
            Err(ScriptError::Edit(e)) => {
                let err = CliError::edit(e);
                return Err(CliError { message: format!("op {}: {}", i + 1, err.message), ..err }
                    .with_hint("nothing was saved"));
            }
            Err(ScriptError::Unconfirmed(msg)) => {
                return Err(CliError::args(format!("op {}: {}", i + 1, msg)).with_hint("pass --yes to confirm"));
            }
        }
    }
    write_stdout(&report)?;

    if dry_run {
        return write_stdout(&render_with_ids(session.table()));
    }
    let target = output.as_deref().unwrap_or(&file);
    if session.is_dirty() || output.is_some() {
        save_table(ctx, session.table(), target)?;
        session.mark_saved();
        eprintln!("saved {}", target.display());
    } else {
        eprintln!("no changes");
    }
    Ok(())
}

impl From<EditError> for CliError {
    fn from(err: EditError) -> Self {
        CliError::edit(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_ids() {
        let t = Table::from_rows(vec!["Name".into()], vec![vec!["a".into()], vec!["b".into()]]).unwrap();
        let text = render_with_ids(&t);
        assert!(text.starts_with("| #   | Name |\n"));
        assert!(text.contains("| 1   | b    |"));
    }

    #[test]
    fn test_cli_error_from_edit() {
        let err: CliError = EditError::NotFound("x".into()).into();
        assert_eq!(err.code, EXIT_NOT_FOUND);
    }

    #[test]
    fn test_cli_error_codes() {
        assert_eq!(CliError::internal("boom").code, EXIT_ERROR);
        assert_eq!(CliError::args("bad").with_hint("try --help").hint.as_deref(), Some("try --help"));
    }

    #[test]
    fn test_open_session_applies_history_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "a\n1\n").unwrap();
        let mut settings = Settings::default();
        settings.history_max_entries = 1;
        let ctx = Context { settings, yes: false };

        let mut session = open_session(&ctx, &path).unwrap();
        assert_eq!(session.drain_events().len(), 1);
        let cell = gridedit_engine::Selection::new("0", 1);
        session.edit_cell(&cell, "2").unwrap();
        session.edit_cell(&cell, "3").unwrap();
        assert_eq!(session.undo_len(), 1);
    }
}
