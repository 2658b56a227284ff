use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use marmoset::{Interpreter, MarmosetError, Repl, ReplConfig, Value};

#[derive(Parser)]
#[command(author, version, about = "Marmoset language interpreter")]
struct Args {
    /// Log pipeline stages to stderr (overridden by MARMOSET_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Marmoset script file
    Run { script: PathBuf },
    /// Start an interactive REPL session
    Repl {
        #[arg(long, default_value = ">> ")]
        prompt: String,
        #[arg(long, default_value = "... ")]
        continuation: String,
    },
    /// Evaluate a snippet of Marmoset code and print its result
    Eval { source: String },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match dispatch(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Option<Command>) -> Result<(), MarmosetError> {
    match command {
        Some(Command::Run { script }) => run_script(script),
        Some(Command::Eval { source }) => {
            let value = evaluate(&source)?;
            println!("{value}");
            Ok(())
        }
        Some(Command::Repl {
            prompt,
            continuation,
        }) => Repl::with_config(ReplConfig {
            prompt,
            continuation,
        })
        .run(),
        None => Repl::new().run(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("MARMOSET_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_script(path: PathBuf) -> Result<(), MarmosetError> {
    let source = fs::read_to_string(&path)?;
    evaluate(&source)?;
    Ok(())
}

/// An `Error` result becomes a failing exit status.
fn evaluate(source: &str) -> Result<Value, MarmosetError> {
    let mut interpreter = Interpreter::new();
    let value = interpreter.eval_source(source)?;
    match value.error_message() {
        Some(message) => Err(MarmosetError::Runtime(message.to_string())),
        None => Ok(value),
    }
}
