//! seqcalc - Sequence Calculator
//!
//! Evaluates a formula `a_k` for every integer `k` in a range and reports
//! the terms, their sum and their product, either once from the command
//! line or interactively in the terminal.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use log::{info, LevelFilter};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use seqcalc::application::{App, AppMode, Calculator, CalculatorConfig, SequenceRequest, DEFAULT_MAX_TERMS};
use seqcalc::infrastructure::FileRepository;
use seqcalc::presentation::{render_ui, InputHandler};

#[derive(Parser)]
#[command(name = "seqcalc")]
#[command(author, version, about = "Evaluate a formula a_k over k = m..n: terms, sum and product")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file; the interactive calculator logs nowhere otherwise
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Refuse ranges with more terms than this (0 disables the limit)
    #[arg(long, global = true, env = "SEQCALC_MAX_TERMS", default_value_t = DEFAULT_MAX_TERMS)]
    max_terms: u64,

    /// Leave the substituted expression out of each term
    #[arg(long, global = true)]
    no_expressions: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal calculator (the default)
    Tui,

    /// Evaluate one sequence and print the result
    #[command(allow_negative_numbers = true)]
    Eval {
        /// Formula in k, e.g. "1/k" or "k^2"
        #[arg(required_unless_present = "request")]
        formula: Option<String>,

        /// Lower limit m
        #[arg(required_unless_present = "request")]
        lower: Option<String>,

        /// Upper limit n
        #[arg(required_unless_present = "request")]
        upper: Option<String>,

        /// Read formula and limits from a saved request file
        #[arg(long, value_name = "FILE", conflicts_with_all = ["formula", "lower", "upper"])]
        request: Option<PathBuf>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn calculator_config(&self) -> CalculatorConfig {
        CalculatorConfig {
            show_substitution: !self.no_expressions,
            max_terms: (self.max_terms > 0).then_some(self.max_terms),
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.calculator_config();
    let interactive = !matches!(cli.command, Some(Command::Eval { .. }));

    init_logging(cli.verbose, cli.log_file.as_deref(), interactive)?;

    match cli.command {
        Some(Command::Eval {
            formula,
            lower,
            upper,
            request,
            json,
        }) => {
            let request = match request {
                Some(path) => load_request(&path)?,
                None => SequenceRequest::new(
                    formula.unwrap_or_default(),
                    lower.unwrap_or_default(),
                    upper.unwrap_or_default(),
                ),
            };
            eval(&request, config, json)
        }
        Some(Command::Tui) | None => {
            run_tui(config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Sets up `env_logger`.
///
/// The interactive calculator owns the terminal, so it only logs when a log
/// file is given.
fn init_logging(verbose: bool, log_file: Option<&Path>, interactive: bool) -> Result<()> {
    if interactive && log_file.is_none() {
        return Ok(());
    }

    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_level.as_str()));
    builder.format_timestamp_millis();

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file '{}'", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialize logging")?;
    Ok(())
}

fn load_request(path: &Path) -> Result<SequenceRequest> {
    let filename = path.to_string_lossy();
    let (request, _) = FileRepository::load_request(&filename)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to load request '{}'", path.display()))?;
    Ok(request)
}

fn eval(request: &SequenceRequest, config: CalculatorConfig, json: bool) -> Result<ExitCode> {
    let response = Calculator::new(config).calculate(request);

    if json {
        let output =
            serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
        println!("{output}");
    } else if response.is_error() {
        eprintln!("{}", response.display_text());
    } else {
        println!("{}", response.display_text());
    }

    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Runs the interactive calculator until the user quits.
///
/// The terminal is restored even when the event loop fails.
fn run_tui(config: CalculatorConfig) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("starting interactive calculator");
    let mut app = App::new(config);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("Terminal I/O failed")
}

/// Main application event loop.
///
/// Continues running until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
