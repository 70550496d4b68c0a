#![forbid(unsafe_code)]

mod completion;
mod output;
mod parser;
mod storage;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use completion::{CompletionData, ReplHelper};
use output::{CliError, OutputMode, Reply, Screen};
use parser::ReplParser;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use saveit_core::command::CommandWord;
use saveit_core::error::ErrorCode;
use saveit_core::config::{SaveItConfig, load_config};
use saveit_core::input_history::InputHistory;
use saveit_core::logic::LogicManager;
use saveit_core::manager::ModelManager;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use storage::JsonFileStorage;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

type Session = LogicManager<ReplParser, JsonFileStorage>;

#[derive(Parser, Debug)]
#[command(
    name = "saveit",
    author,
    version,
    about = "saveit: a knowledge base of issues and their solutions",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Data file to load and save (overrides the config file).
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Config file to read instead of the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Start the interactive prompt (default)",
        after_help = "EXAMPLES:\n    # Open the prompt on the default data file\n    saveit repl\n\n    # Use a scratch data file\n    saveit --data /tmp/kb.json"
    )]
    Repl,

    #[command(
        about = "Run command lines without a prompt",
        long_about = "Run each argument as one command line, in order, and stop at `exit`.",
        after_help = "EXAMPLES:\n    # Add an issue and list everything\n    saveit exec 'add -s \"null pointer\" -d \"crash on start\"' list\n\n    # Emit machine-readable output\n    saveit exec list --json"
    )]
    Exec {
        /// Command lines, one per argument.
        #[arg(required = true, value_name = "LINE")]
        lines: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SAVEIT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "saveit=debug,info"
        } else {
            "saveit=info,warn"
        })
    });

    let format = env::var("SAVEIT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn open_session(cli: &Cli, config: &SaveItConfig) -> Session {
    let data_file = cli
        .data
        .clone()
        .unwrap_or_else(|| config.data_file.clone());
    let storage = JsonFileStorage::new(data_file);
    info!(path = %storage.path().display(), "opening data file");

    let initial = storage.load_or_empty();
    let model = ModelManager::new(initial, config.default_sort);
    let inputs = InputHistory::with_limit(config.input_history_limit);
    LogicManager::new(ReplParser, storage, model, inputs)
}

/// Commands whose purpose is to change what is on screen.
fn shows_view(input: &str) -> bool {
    input
        .split_whitespace()
        .next()
        .and_then(|word| word.parse::<CommandWord>().ok())
        .is_some_and(|word| {
            matches!(
                word,
                CommandWord::List
                    | CommandWord::Find
                    | CommandWord::FindTag
                    | CommandWord::Sort
                    | CommandWord::Select
                    | CommandWord::Home
            )
        })
}

/// Handle one line. Returns `(exit requested, line failed)`.
fn handle_line(
    session: &mut Session,
    line: &str,
    mode: OutputMode,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> anyhow::Result<(bool, bool)> {
    let before = Screen::capture(&*session);
    match session.execute(line) {
        Ok(result) => {
            let after = Screen::capture(&*session);
            let view = (shows_view(line) || after != before).then_some(after);
            let reply = Reply {
                ok: true,
                feedback: result.feedback,
                exit: result.exit,
                view,
            };
            output::render_reply(mode, &reply, out)?;
            Ok((result.exit, false))
        }
        Err(error) => {
            debug!(code = %error.code(), "input rejected");
            output::render_error(mode, &CliError::from(&error), err)?;
            Ok((false, true))
        }
    }
}

fn run_exec(session: &mut Session, lines: &[String], mode: OutputMode) -> anyhow::Result<bool> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    let mut failed = false;
    for line in lines {
        let (exit, line_failed) = handle_line(session, line, mode, &mut out, &mut err)?;
        failed |= line_failed;
        if exit {
            break;
        }
    }
    Ok(!failed)
}

fn run_repl(
    session: &mut Session,
    mode: OutputMode,
    history_limit: usize,
) -> anyhow::Result<bool> {
    let mut out = io::stdout();
    let mut err = io::stderr();

    if !mode.is_json() {
        writeln!(out, "Welcome to saveit! Type `help` to list commands, Tab to complete.")?;
    }

    let config = rustyline::Config::builder()
        .max_history_size(history_limit.max(1))
        .map_err(|e| anyhow!("invalid input history limit: {e}"))?
        .build();
    let mut editor: Editor<ReplHelper, DefaultHistory> =
        Editor::with_config(config).map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
    editor.set_helper(Some(ReplHelper::default()));

    loop {
        // Tags and statements change with every command.
        if let Some(helper) = editor.helper_mut() {
            helper.refresh(CompletionData::capture(&*session));
        }

        let prompt = match (mode.is_json(), session.is_awaiting_confirmation()) {
            (true, _) => "",
            (false, true) => "confirm> ",
            (false, false) => "saveit> ",
        };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(e) => return Err(anyhow!("readline error: {e}")),
        };
        if line.trim().is_empty() {
            continue;
        }

        editor
            .add_history_entry(line.as_str())
            .map_err(|e| anyhow!("failed to record history: {e}"))?;

        let (exit, _) = handle_line(session, &line, mode, &mut out, &mut err)?;
        if exit {
            break;
        }
    }
    Ok(true)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "failed to load config");
            let mode = output::resolve_output_mode(cli.format, cli.json, None);
            let error = CliError::with_code(ErrorCode::ConfigParseError, message);
            output::render_error(mode, &error, &mut io::stderr())?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let mode = output::resolve_output_mode(cli.format, cli.json, config.output.as_deref());
    let mut session = open_session(&cli, &config);

    let ok = match &cli.command {
        Some(Commands::Exec { lines }) => run_exec(&mut session, lines, mode)?,
        Some(Commands::Repl) | None => {
            run_repl(&mut session, mode, config.input_history_limit)?
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
