use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
};

use calclog::{config::CalculatorConfig, repl, runtime::session::Calculator};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Interactive fixed-precision calculator with undoable, persisted history.
#[derive(Debug, Parser)]
#[command(name = "calclog", version, about)]
struct Args {
    /// History file (overrides CALCULATOR_HISTORY_DIR / CSV_HISTORY_FILE).
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Do not rewrite the history file after each calculation.
    #[arg(long)]
    no_auto_save: bool,

    /// Maximum number of records kept in history.
    #[arg(long, value_name = "N")]
    max_history: Option<usize>,

    /// Maximum number of undo steps remembered.
    #[arg(long, value_name = "N")]
    max_undo: Option<usize>,

    /// Fractional digits kept in every result.
    #[arg(long, value_name = "DIGITS")]
    precision: Option<u32>,

    /// Event log file (overrides CALCULATOR_LOG_DIR / LOG_HISTORY_FILE).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut CalculatorConfig) {
        if let Some(path) = self.history_file {
            (config.history_dir, config.history_file) = split_path(&path);
        }
        if self.no_auto_save {
            config.auto_save = false;
        }
        if let Some(n) = self.max_history {
            config.max_history_size = n;
        }
        if let Some(n) = self.max_undo {
            config.max_undo_depth = n;
        }
        if let Some(p) = self.precision {
            config.precision = p;
        }
        if let Some(path) = self.log_file {
            (config.log_dir, config.log_file) = split_path(&path);
        }
    }
}

fn split_path(path: &Path) -> (PathBuf, String) {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, file)
}

fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut config = match CalculatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut config);

    if let Err(e) = init_logging(&config.log_path()) {
        eprintln!("cannot open log file {}: {e}", config.log_path().display());
        return ExitCode::FAILURE;
    }

    let mut calculator = match Calculator::open(&config) {
        Ok(calculator) => calculator,
        Err(e) => {
            error!(error = %e, "startup failed");
            eprintln!("Fatal error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        instance_id = calculator.instance_id(),
        history = %config.history_path().display(),
        auto_save = config.auto_save,
        "calculator started"
    );

    let stdin = io::stdin();
    match repl::run(&mut calculator, &config.json_history_path(), stdin.lock(), io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "terminal I/O failed");
            eprintln!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}
