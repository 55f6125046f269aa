//! Configuration types for the DCIM arranger

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default output root, relative to the home directory
pub const DEFAULT_OUTPUT_DIR: &str = "~/pictures/photos/pick";

/// Default folder cards are imported into
pub const DEFAULT_IMPORT_DIR: &str = "~/pictures/photos/import";

/// Configuration for the arranger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root below which `{date}-{suffix}-{prefix}` folders are created
    pub output_dir: PathBuf,

    /// Folder the `import` command mirrors a card's DCIM tree into
    pub import_dir: PathBuf,

    /// Extensions picked up by the DCIM scan (case-insensitive, no dot)
    pub photo_extensions: Vec<String>,

    /// Extensions treated as RAW by the RAW companion pass
    pub raw_extensions: Vec<String>,

    /// Number of threads for capture time lookups (0 = auto)
    pub threads: usize,

    /// Stop before moving anything when grouping or arranging reports issues
    pub abort_on_issues: bool,

    /// Directory for JSON reports (defaults to `Report` next to the executable)
    pub report_dir: Option<PathBuf>,

    /// Dry run mode - plan and report, but don't move files
    pub dry_run: bool,

    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            import_dir: PathBuf::from(DEFAULT_IMPORT_DIR),
            photo_extensions: vec![
                "jpg".into(), "jpeg".into(), "png".into(), "heic".into(),
                "heif".into(), "tiff".into(), "cr2".into(), "cr3".into(),
                "nef".into(), "arw".into(), "orf".into(), "rw2".into(),
                "dng".into(), "raf".into(),
            ],
            raw_extensions: vec![
                "nef".into(), "arw".into(), "cr2".into(), "cr3".into(),
                "dng".into(), "orf".into(), "rw2".into(), "raf".into(),
            ],
            threads: 0,
            abort_on_issues: true,
            report_dir: None,
            dry_run: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Output directory with a leading `~/` expanded
    pub fn resolved_output_dir(&self) -> PathBuf {
        expand_home(&self.output_dir)
    }

    /// Import folder with a leading `~/` expanded
    pub fn resolved_import_dir(&self) -> PathBuf {
        expand_home(&self.import_dir)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            source: e,
        })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# DCIM Arranger Configuration File
# This file uses TOML format (https://toml.io)

# Output root. Photos land in <output_dir>/<yyyyMMdd>-<suffix>-<prefix>/
output_dir = "~/pictures/photos/pick"

# Where `import` copies <card>/DCIM/ to
import_dir = "~/pictures/photos/import"

# Extensions picked up when scanning a DCIM folder
photo_extensions = ["jpg", "jpeg", "png", "heic", "heif", "tiff", "cr2", "cr3", "nef", "arw", "orf", "rw2", "dng", "raf"]

# Extensions handled by the `raw` command
raw_extensions = ["nef", "arw", "cr2", "cr3", "dng", "orf", "rw2", "raf"]

# Number of threads for EXIF reads (0 = auto-detect)
threads = 0

# Abort before moving anything if some files could not be grouped or dated
abort_on_issues = true

# Where JSON reports are written (default: Report/ next to the executable)
# report_dir = "D:/Reports"

# Dry run mode - show what would be done without actually doing it
dry_run = false

# Verbose output - show detailed processing information
verbose = false
"#
        .to_string()
    }
}

/// Expand a leading `~/` against the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError {
        source: toml::ser::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
