//! fscript - run form scripts from the command line
//!
//! Runs a script file, evaluates a single expression, or starts an
//! interactive shell.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Once;

use clap::Parser;
use formscript::{Context, ContextConfig, DialogAnswers, runtime::DEFAULT_MAX_CALL_DEPTH};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "fscript", version, about = "Run form scripts")]
struct Cli {
    /// Script file to run as a statement list
    path: Option<PathBuf>,

    /// Evaluate an expression and print its value
    #[arg(short, long, value_name = "EXPR")]
    expr: Option<String>,

    /// Deepest allowed nesting of script calls
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Answer given by confirm()
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    confirm: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

static TRACING_INIT: Once = Once::new();

/// Install a log subscriber if `RUST_LOG` is set or `verbose` is requested
fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) if verbose => EnvFilter::new("formscript=debug"),
            Err(_) => return,
        };
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::with_config(ContextConfig {
        max_call_depth: cli.max_call_depth,
        dialogs: DialogAnswers::new(cli.confirm),
    });

    if let Some(path) = &cli.path {
        if let Err(code) = run_file(&ctx, path) {
            return code;
        }
    }

    if let Some(expr) = &cli.expr {
        return match ctx.eval_expression(expr, "command line") {
            Ok(value) => {
                println!("{}", value);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    if cli.path.is_none() {
        return run_repl(&ctx);
    }
    ExitCode::SUCCESS
}

fn run_file(ctx: &Context, path: &PathBuf) -> Result<(), ExitCode> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        ExitCode::FAILURE
    })?;

    let place = path.display().to_string();
    ctx.eval_statements(&source, &place).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    })?;

    for record in ctx.dialog_log() {
        println!("[{:?}] {}", record.kind, record.message);
    }
    Ok(())
}

fn run_repl(ctx: &Context) -> ExitCode {
    println!("fscript {}", env!("CARGO_PKG_VERSION"));
    println!("Lines ending in ';' or '}}' run as statements, anything else is evaluated. Ctrl+D to exit.\n");

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error starting line editor: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut shown = 0;
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = editor.add_history_entry(line) {
                    warn!(error = %e, "could not record history");
                }

                if line.ends_with(';') || line.ends_with('}') {
                    if let Err(e) = ctx.eval_statements(line, "repl") {
                        println!("Error: {}", e);
                    }
                } else {
                    match ctx.eval_expression(line, "repl") {
                        Ok(value) => println!("{}", value),
                        Err(e) => println!("Error: {}", e),
                    }
                }

                let log = ctx.dialog_log();
                for record in &log[shown..] {
                    println!("[{:?}] {}", record.kind, record.message);
                }
                shown = log.len();
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
