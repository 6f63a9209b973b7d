use std::io::Read;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use quill_lang::{Config, Diagnostic, Leniency, Recorder, Reporter, Session, Severity};

/// Run a Quill script against a recording canvas and print every canvas
/// call, one per line.
#[derive(Parser)]
#[command(name = "quill", version)]
struct Args {
    /// Script to run. Read from stdin when omitted.
    input: Option<PathBuf>,

    /// Keep whatever was parsed or drawn before an error.
    #[arg(long)]
    pardon: bool,

    /// Iterations a single `while` may run before the script is stopped.
    #[arg(long, value_name = "N")]
    max_iterations: Option<usize>,

    /// Nested procedure calls allowed before the script is stopped.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
}

/// Prints diagnostics to stderr.
struct Stderr;

impl Reporter for Stderr {
    fn report(&mut self, diagnostic: Diagnostic) {
        let label = match diagnostic.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        eprintln!("{label}: {}\n  {}", diagnostic.title, diagnostic.long.replace('\n', "\n  "));
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_script(input: Option<&PathBuf>) -> Result<String, AppError> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.to_string_lossy().into_owned(),
            source,
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| AppError::Read { path: "<stdin>".into(), source })?;
            Ok(buf)
        }
    }
}

fn config(args: &Args) -> Config {
    let mut config = Config::default();
    if args.pardon {
        config = config.with_leniency(Leniency::Pardon);
    }
    if let Some(n) = args.max_iterations {
        config = config.with_max_loop_iterations(n);
    }
    if let Some(n) = args.max_depth {
        config = config.with_max_call_depth(n);
    }
    config
}

pub fn main() {
    init_tracing();
    let args = Args::parse();

    let source = match read_script(args.input.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };

    let mut session = Session::new(Recorder::new())
        .with_config(config(&args))
        .with_reporter(Stderr);
    let result = session.run(&source);
    tracing::debug!(calls = session.canvas().calls().len(), ok = result.is_ok(), "script finished");

    for call in session.canvas().calls() {
        println!("{call}");
    }
    if result.is_err() {
        exit(1);
    }
}
