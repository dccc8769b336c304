// Application settings
// Loaded from ~/.config/gridedit/settings.json

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do when a search reaches the end of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    /// Ask before continuing from the top (default)
    #[default]
    Ask,
    /// Always wrap without asking
    Always,
    /// Never wrap; report no further match
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // History
    #[serde(rename = "history.maxEntries")]
    pub history_max_entries: usize, // 0 = unbounded

    // New document
    #[serde(rename = "newTable.rows")]
    pub new_table_rows: usize,

    #[serde(rename = "newTable.cols")]
    pub new_table_cols: usize,

    // Saving
    #[serde(rename = "save.coerceNumbers")]
    pub coerce_numbers: bool,

    #[serde(rename = "csv.delimiter")]
    pub csv_delimiter: Option<char>, // None = sniff on load, comma on save

    // Search
    #[serde(rename = "search.wrap")]
    pub search_wrap: WrapPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_max_entries: 0,
            new_table_rows: 2,
            new_table_cols: 2,
            coerce_numbers: true,
            csv_delimiter: None,
            search_wrap: WrapPolicy::Ask,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridedit");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, writing a commented default
    /// file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => {
                    debug!("loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Undo limit for the session; `None` = unbounded.
    pub fn history_limit(&self) -> Option<usize> {
        Some(self.history_max_entries).filter(|&n| n > 0)
    }

    /// Configured CSV delimiter as a byte. Non-ASCII delimiters are ignored.
    pub fn delimiter_byte(&self) -> Option<u8> {
        let c = self.csv_delimiter?;
        if c.is_ascii() {
            Some(c as u8)
        } else {
            warn!("csv.delimiter {:?} is not ASCII; ignoring", c);
            None
        }
    }

    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Undo depth (0 = unbounded; when bounded the oldest step is dropped)
    "history.maxEntries": 0,

    // Size of a new blank table
    "newTable.rows": 2,
    "newTable.cols": 2,

    // Write numeric-looking cells as numbers in xlsx/json
    "save.coerceNumbers": true,

    // Field delimiter for .csv files (null = detect on load, comma on save)
    "csv.delimiter": null,

    // At the end of the table: "ask", "always" or "never" wrap to the top
    "search.wrap": "ask"
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            warn!("Error writing default settings.json: {}", e);
        }
    }
}
