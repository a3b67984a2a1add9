//! ASX interpreter CLI

use asx::config::{CONFIG_FILE, Config, ConfigError};
use asx::mixin::MixinError;
use asx::normalize::Normalizer;
use asx::{Interpreter, ParseError, RuntimeError, ast, parse_with, report_error};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asx", version, about = "ASX script interpreter")]
struct Cli {
    /// Script to run
    script: PathBuf,

    /// Report runtime errors and continue with the next statement
    #[arg(short, long)]
    ignore_errors: bool,

    /// Standard-library directory searched first by `import`
    #[arg(long)]
    std_dir: Option<PathBuf>,

    /// User directory searched by `import` (default: current directory)
    #[arg(long)]
    user_dir: Option<PathBuf>,

    /// Configuration file (default: ./asx.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parse only and print the statement tree
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Raise the log level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Emit {
    /// JSON statement tree
    Tree,
    /// Re-rendered source
    Source,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IOError: cannot read {}: {err}", path.display())]
    Read { path: PathBuf, err: std::io::Error },

    #[error("{error}")]
    Parse {
        filename: String,
        text: String,
        error: ParseError,
    },

    #[error(transparent)]
    Mixin(#[from] MixinError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("[ERROR] | {e}");
        if let CliError::Parse {
            filename,
            text,
            error,
        } = &e
        {
            report_error(filename, text, error);
        }
        std::process::exit(1);
    }
}

fn install_tracing(verbose: u8) {
    let level = match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new(CONFIG_FILE))?,
    };

    if cli.ignore_errors {
        config = config.with_ignore_errors(true);
    }
    if let Some(dir) = &cli.std_dir {
        config = config.with_std_dir(dir);
    }
    if let Some(dir) = &cli.user_dir {
        config = config.with_user_dir(dir);
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    tracing::debug!(?config, "configuration loaded");

    let text = std::fs::read_to_string(&cli.script).map_err(|err| CliError::Read {
        path: cli.script.clone(),
        err,
    })?;
    let filename = cli.script.display().to_string();

    let normalizer = Normalizer::new(config.default_tab_unit);
    let program = match parse_with(&normalizer, &text) {
        Ok(program) => program,
        Err(error) => {
            return Err(CliError::Parse {
                filename,
                text,
                error,
            });
        }
    };

    match cli.emit {
        Some(Emit::Tree) => {
            println!("{}", serde_json::to_string_pretty(&program)?);
            return Ok(());
        }
        Some(Emit::Source) => {
            print!("{}", ast::render(&program, config.default_tab_unit));
            return Ok(());
        }
        None => {}
    }

    let mut interp = Interpreter::from_config(&config)?;
    interp.run(&program)?;
    Ok(())
}
