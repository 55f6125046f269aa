//! CLI argument parsing with clap

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DCIM Arranger - sort camera cards into dated series folders
///
/// Groups DCIM photos by camera folder and file prefix, splits them by
/// capture date, and renames them so counters that wrapped past 9999 or
/// restarted on a new card never collide.
#[derive(Parser, Debug)]
#[command(name = "dcim-arranger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy <card>/DCIM/ into the import folder, skipping files already there
    Import {
        /// Card or device root holding a DCIM folder
        source: PathBuf,

        /// Import folder (default ~/pictures/photos/import)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Dry run mode - list what would be copied without copying
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Arrange a DCIM folder into <date>-<suffix>-<prefix> folders
    Dcim {
        /// Folder to scan, usually a card's DCIM directory
        folder: PathBuf,

        /// Output root (default ~/pictures/photos/pick)
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Dry run mode - show what would be done without doing it
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Move the files that could be planned even if others had issues
        #[arg(long)]
        keep_going: bool,

        /// Number of threads for EXIF reads (0 = auto)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Move RAW files next to a JPEG into raw/, delete the rest
    Raw {
        /// Folder to clean up, usually an arranged output folder
        folder: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Dry run mode - show what would be done without doing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

impl Command {
    /// Short name used for log file naming
    pub fn name(&self) -> &'static str {
        match self {
            Command::Import { .. } => "Import",
            Command::Dcim { .. } => "Dcim",
            Command::Raw { .. } => "Raw",
        }
    }

    /// Folder the command reads from
    pub fn folder(&self) -> &PathBuf {
        match self {
            Command::Import { source, .. } => source,
            Command::Dcim { folder, .. } | Command::Raw { folder, .. } => folder,
        }
    }

    /// Whether the confirmation prompt is skipped; imports only copy and never ask
    pub fn yes(&self) -> bool {
        match self {
            Command::Import { .. } => true,
            Command::Dcim { yes, .. } | Command::Raw { yes, .. } => *yes,
        }
    }
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        match &self.command {
            Command::Import {
                target, dry_run, ..
            } => {
                if let Some(target) = target {
                    config.import_dir = target.clone();
                }
                if *dry_run {
                    config.dry_run = true;
                }
            }
            Command::Dcim {
                target,
                dry_run,
                keep_going,
                threads,
                ..
            } => {
                if let Some(target) = target {
                    config.output_dir = target.clone();
                }
                if *dry_run {
                    config.dry_run = true;
                }
                if *keep_going {
                    config.abort_on_issues = false;
                }
                if let Some(threads) = threads {
                    config.threads = *threads;
                }
            }
            Command::Raw { dry_run, .. } => {
                if *dry_run {
                    config.dry_run = true;
                }
            }
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dcim() {
        let cli = Cli::parse_from([
            "dcim-arranger",
            "dcim",
            "/media/Z63/DCIM",
            "--target",
            "/srv/pick",
            "--keep-going",
            "-v",
        ]);

        assert_eq!(cli.command.name(), "Dcim");
        assert_eq!(cli.command.folder(), &PathBuf::from("/media/Z63/DCIM"));
        assert!(!cli.command.yes());

        let config = cli.to_config();
        assert_eq!(config.output_dir, PathBuf::from("/srv/pick"));
        assert!(!config.abort_on_issues);
        assert!(config.verbose);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::parse_from(["dcim-arranger", "import", "/media/Z63", "-t", "/srv/import"]);

        assert_eq!(cli.command.name(), "Import");
        assert_eq!(cli.command.folder(), &PathBuf::from("/media/Z63"));

        let config = cli.to_config();
        assert_eq!(config.import_dir, PathBuf::from("/srv/import"));
        assert_eq!(config.output_dir, Config::default().output_dir);
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let cli = Cli::parse_from(["dcim-arranger", "-C", "nikon", "raw", "/srv/pick", "-y", "-n"]);
        let mut file_config = Config::default();
        file_config.output_dir = PathBuf::from("/from/file");

        let config = cli.merge_with_config(file_config);

        assert_eq!(cli.config_name().as_deref(), Some("nikon"));
        assert!(cli.command.yes());
        assert!(config.dry_run);
        assert_eq!(config.output_dir, PathBuf::from("/from/file"));
    }
}
