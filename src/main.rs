//! DCIM Arranger - sort camera cards into dated series folders
//!
//! `import` copies a card into a staging folder, `dcim` arranges it into
//! dated series folders, and `raw` tidies RAW files after picking. Each
//! command writes JSON reports before it changes anything.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use dcim_arranger::config::expand_home;
use dcim_arranger::execute::{execute_copies, execute_deletes, execute_moves};
use dcim_arranger::report::{
    GroupingReport, ImportReport, SeriesIssueReport, directory_details, group_raw_plan,
    summarize_plan,
};
use dcim_arranger::scan::is_within;
use dcim_arranger::{
    ArrangementPlanner, Cli, Command, Config, DateArranger, ExifTimeLookup, PlannedMove,
    ReportWriter, Scanner, group_paths, plan_import, plan_raw_companions,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod console {
    //! Styled terminal output for the commands.

    use crossterm::QueueableCommand;
    use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
    use std::fmt::Display;
    use std::io::{self, BufRead, Stdout, Write, stdout};

    const RULE_WIDTH: usize = 60;

    /// How a message should read at a glance
    #[derive(Debug, Clone, Copy)]
    pub enum Tone {
        Good,
        Info,
        Warn,
        Bad,
    }

    impl Tone {
        fn color(self) -> Color {
            match self {
                Tone::Good => Color::Green,
                Tone::Info => Color::Cyan,
                Tone::Warn => Color::Yellow,
                Tone::Bad => Color::Red,
            }
        }

        fn marker(self) -> &'static str {
            match self {
                Tone::Good => "✓",
                Tone::Info => "→",
                Tone::Warn => "⚠",
                Tone::Bad => "✗",
            }
        }
    }

    fn emit(write: impl FnOnce(&mut Stdout) -> io::Result<()>) {
        let mut out = stdout();
        // Terminal output is best effort; the log file has the record
        let _ = write(&mut out).and_then(|()| out.flush());
    }

    pub fn line(tone: Tone, message: impl Display) {
        emit(|out| {
            out.queue(PrintStyledContent(
                format!("{} ", tone.marker()).with(tone.color()).bold(),
            ))?
            .queue(Print(format!("{message}\n")))?;
            Ok(())
        });
    }

    /// Rule drawn after a heading title so the line spans the rule width
    pub fn rule_tail(title: &str) -> String {
        let used = title.chars().count() + 4;
        "─".repeat(RULE_WIDTH.saturating_sub(used))
    }

    /// `── Title ─────` spanning the rule width
    pub fn heading(title: &str) {
        let rest = rule_tail(title);
        emit(|out| {
            out.queue(Print("\n── "))?
                .queue(PrintStyledContent(title.bold()))?
                .queue(Print(format!(" {rest}\n")))?;
            Ok(())
        });
    }

    pub fn stat(key: &str, value: impl Display, tone: Tone) {
        emit(|out| {
            out.queue(PrintStyledContent(format!("  {key}: ").with(Color::DarkGrey)))?
                .queue(PrintStyledContent(value.to_string().with(tone.color()).bold()))?
                .queue(Print("\n"))?;
            Ok(())
        });
    }

    /// Ask a yes/no question on stdin, anything but `y`/`yes` is a no
    pub fn ask(question: &str) -> io::Result<bool> {
        emit(|out| {
            out.queue(PrintStyledContent("? ".with(Color::Cyan).bold()))?
                .queue(Print(format!("{question} [y/N] ")))?;
            Ok(())
        });

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

use console::Tone;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let exe_dir = executable_dir()?;
    let log_path = log_file_path(&exe_dir, &cli);
    let _guard = init_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), command = cli.command.name(), "DCIM Arranger starting");

    let config = load_config(&cli, &exe_dir)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    let reporter = ReportWriter::new(
        config
            .report_dir
            .clone()
            .unwrap_or_else(|| exe_dir.join("Report")),
    );
    let folder = expand_home(cli.command.folder());

    let outcome = match &cli.command {
        Command::Import { .. } => run_import(&config, &reporter, &folder),
        Command::Dcim { .. } => run_dcim(&cli, &config, &reporter, &folder),
        Command::Raw { .. } => run_raw(&cli, &config, &reporter, &folder),
    };

    console::stat("Log file", log_path.display(), Tone::Info);

    if let Err(e) = outcome {
        error!(error = %format!("{e:#}"), "Run failed");
        console::line(Tone::Bad, format!("{e:#}"));
        std::process::exit(1);
    }

    Ok(())
}

/// Mirror `<card>/DCIM/` into the import folder
fn run_import(config: &Config, reporter: &ReportWriter, card: &Path) -> Result<()> {
    let started = Instant::now();
    let target = config.resolved_import_dir();
    info!(source = %card.display(), target = %target.display(), "Importing card");

    if is_within(&target, card).context("Cannot resolve the import folder")? {
        anyhow::bail!(
            "Import folder {} is on the card {}",
            target.display(),
            card.display()
        );
    }

    let plan = plan_import(card, &target)?;

    console::heading("Card import");
    console::stat("To copy", plan.copies.len(), Tone::Good);
    console::stat("Already imported", plan.unchanged.len(), Tone::Info);

    let done = execute_copies(&plan.copies, config.dry_run)?;

    reporter.dump(
        "photo-import",
        &ImportReport {
            source: card.to_path_buf(),
            target: target.clone(),
            copied: done.copied,
            unchanged: plan.unchanged.len(),
            duration_sec: started.elapsed().as_secs_f64(),
        },
    )?;

    if config.dry_run {
        console::line(Tone::Warn, "Dry run - no files were copied");
    } else if plan.is_empty() {
        console::line(Tone::Good, "Import folder is already up to date");
    } else {
        console::line(Tone::Good, format!("Copied {} files to {}", done.copied, target.display()));
    }
    info!(copied = done.copied, planned = done.planned, "Import complete");

    Ok(())
}

/// Scan, group, arrange, report, confirm, move
fn run_dcim(cli: &Cli, config: &Config, reporter: &ReportWriter, folder: &Path) -> Result<()> {
    let output_root = config.resolved_output_dir();
    info!(source = %folder.display(), target = %output_root.display(), "Arranging DCIM folder");

    if is_within(&output_root, folder).context("Cannot resolve the output folder")? {
        anyhow::bail!(
            "Output directory {} is inside the source folder {}",
            output_root.display(),
            folder.display()
        );
    }
    if config.threads > 0 {
        // Only fails when the pool is already built
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global();
    }

    let paths = Scanner::new(&config.photo_extensions).scan(folder)?;
    if paths.is_empty() {
        console::line(Tone::Warn, "No photo files found in the source folder");
        return Ok(());
    }
    info!(count = paths.len(), "Scan complete");

    let grouping = group_paths(&paths);
    if !grouping.issues.is_empty() {
        let report = reporter.dump(
            "grouping-issues",
            &GroupingReport {
                series_count: grouping.series_list.len(),
                issues: &grouping.issues,
            },
        )?;
        warn!(count = grouping.issues.len(), report = %report.display(), "Some files do not follow DCF naming");
        if config.abort_on_issues {
            anyhow::bail!(
                "{} files do not follow DCF naming, see {}",
                grouping.issues.len(),
                report.display()
            );
        }
        console::line(
            Tone::Warn,
            format!("{} files skipped, see {}", grouping.issues.len(), report.display()),
        );
    }
    if grouping.series_list.is_empty() {
        console::line(Tone::Warn, "No DCIM series recognized");
        return Ok(());
    }

    let lookup = ExifTimeLookup;
    let plan = ArrangementPlanner::new(DateArranger::new(&output_root), &lookup)
        .stop_on_issues(config.abort_on_issues)
        .plan(&grouping.series_list);

    for series_issues in &plan.issues {
        reporter.dump(
            &format!("arrange-issues-{}", series_issues.series),
            &SeriesIssueReport {
                series: series_issues.series.clone(),
                issues: &series_issues.issues,
            },
        )?;
    }
    if plan.has_issues() {
        if config.abort_on_issues {
            anyhow::bail!(
                "{} photos could not be arranged, see reports in {}",
                plan.issue_count(),
                reporter.dir().display()
            );
        }
        console::line(Tone::Warn, format!("{} photos could not be arranged", plan.issue_count()));
    }
    if plan.arrangements.is_empty() {
        console::line(Tone::Warn, "Nothing to move");
        return Ok(());
    }

    let summary = summarize_plan(&plan.arrangements);
    reporter.dump("plan-summary", &summary)?;
    for (dir, detail) in directory_details(&plan.arrangements) {
        reporter.dump(&format!("plan-{}", dir), &detail)?;
    }

    console::heading("Arrangement plan");
    console::stat("Photos", summary.total, Tone::Good);
    console::stat("Folders", summary.dir_count, Tone::Info);
    console::stat("Issues", plan.issue_count(), Tone::Bad);
    for (dir, item) in &summary.dirs {
        console::line(
            Tone::Info,
            format!("{} ({} photos, max overflow {})", dir, item.count, item.max_overflow),
        );
    }

    if !config.dry_run
        && !cli.command.yes()
        && !console::ask(&format!("Move {} files?", plan.arrangements.len()))?
    {
        console::line(Tone::Warn, "Cancelled");
        return Ok(());
    }

    let moves: Vec<PlannedMove> = plan.arrangements.iter().map(PlannedMove::from).collect();
    let done = execute_moves(&moves, config.dry_run)?;

    if config.dry_run {
        console::stat("Would move", done.planned, Tone::Info);
        console::line(Tone::Warn, "Dry run - no files were moved");
    } else {
        console::stat("Moved", done.moved, Tone::Good);
    }
    info!(moved = done.moved, planned = done.planned, "DCIM arrangement complete");

    Ok(())
}

/// Move RAW files next to their JPEG into raw/, delete orphans
fn run_raw(cli: &Cli, config: &Config, reporter: &ReportWriter, root: &Path) -> Result<()> {
    let paths = Scanner::new(&config.photo_extensions).scan(root)?;
    if paths.is_empty() {
        console::line(Tone::Warn, "No photo files found in the folder");
        return Ok(());
    }
    info!(count = paths.len(), "Scan complete");

    let plan = plan_raw_companions(&paths, &config.raw_extensions);
    if plan.is_empty() {
        console::line(Tone::Good, "No RAW files need attention");
        return Ok(());
    }
    reporter.dump("raw-plan", &group_raw_plan(root, &plan))?;

    console::heading("RAW cleanup plan");
    console::stat("Move to raw/", plan.moves.len(), Tone::Info);
    console::stat("Delete", plan.deletes.len(), Tone::Warn);

    if !config.dry_run
        && !cli.command.yes()
        && !console::ask(&format!(
            "Move {} RAW files and delete {} RAW files?",
            plan.moves.len(),
            plan.deletes.len()
        ))?
    {
        console::line(Tone::Warn, "Cancelled");
        return Ok(());
    }

    // Moves first, then deletes
    let moved = execute_moves(&plan.moves, config.dry_run)?;
    let deleted = execute_deletes(&plan.deletes, config.dry_run)?;

    if config.dry_run {
        console::line(Tone::Warn, "Dry run - no files were changed");
    } else {
        console::stat("Moved", moved.moved, Tone::Good);
        console::stat("Deleted", deleted.deleted, Tone::Warn);
    }
    info!(moved = moved.moved, deleted = deleted.deleted, "RAW cleanup complete");

    Ok(())
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot locate the executable")?;
    Ok(exe.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}

/// `<exe>/Log/<Command>[-<config>]_<timestamp>.log`
fn log_file_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let stem = match cli.config_name() {
        Some(config) => format!("{}-{}", cli.command.name(), config),
        None => cli.command.name().to_string(),
    };
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    exe_dir.join("Log").join(format!("{stem}_{timestamp}.log"))
}

/// Find a config file given as a path, a bare name, or a name under `<exe>/Config`
fn find_config_file(exe_dir: &Path, given: &Path) -> PathBuf {
    let with_toml = |p: PathBuf| {
        if p.extension().is_none() {
            p.with_extension("toml")
        } else {
            p
        }
    };
    let in_config_dir = given
        .file_name()
        .map(|name| exe_dir.join("Config").join(name));

    [Some(given.to_path_buf()), Some(with_toml(given.to_path_buf()))]
        .into_iter()
        .chain([in_config_dir.clone(), in_config_dir.map(with_toml)])
        .flatten()
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| given.to_path_buf())
}

fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    match &cli.config {
        Some(given) => {
            let path = find_config_file(exe_dir, given);
            info!(config_file = %path.display(), "Loading configuration from file");
            Ok(cli.merge_with_config(Config::load_from_file(&path)?))
        }
        None => Ok(cli.to_config()),
    }
}

/// Log to stderr and to `log_path`; `--json-log` makes the file JSON lines
fn init_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log folder {}", dir.display()))?;
    }
    let file = std::fs::File::create(log_path)
        .with_context(|| format!("Cannot create log file {}", log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let json_file = cli
        .json_log
        .then(|| fmt::layer().json().with_ansi(false).with_writer(writer.clone()));
    let text_file = (!cli.json_log).then(|| fmt::layer().with_ansi(false).with_writer(writer));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_file)
        .with(text_file)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(guard)
}
