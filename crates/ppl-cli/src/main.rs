mod common;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use owo_colors::{OwoColorize, Stream::Stderr, Stream::Stdout};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ppl_interpreter::{ExecStats, Interpreter, Outcome, Registers, OUTPUT};
use ppl_syntax::config::{Config, DecrementMode, DuplicateLabels, ZeroAssign};
use ppl_syntax::error::Error;

/// Run a PPL register-machine program.
#[derive(Parser, Debug)]
#[command(name = "ppl", version, about)]
struct Cli {
    /// Program file to run
    #[arg(default_value = "program.ppl", env = "PPL_PROGRAM")]
    file: PathBuf,

    /// Input value bound to x1, x2, ... in the order given
    #[arg(short = 'x', long = "input", value_name = "VALUE", allow_negative_numbers = true)]
    inputs: Vec<i64>,

    /// Extra initial register, as NAME=VALUE
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_register)]
    set: Vec<(String, i64)>,

    /// Label that halts the program when jumped to
    #[arg(long, value_name = "LABEL", env = "PPL_EXIT_LABEL", default_value = "e")]
    exit_label: String,

    /// Clamp decrements at zero
    #[arg(long, env = "PPL_SATURATING")]
    saturating: bool,

    /// Make `v <- 0` only initialize registers that are still unset
    #[arg(long)]
    init_only_zero: bool,

    /// Fail to load programs that define a label twice
    #[arg(long)]
    reject_duplicate_labels: bool,

    /// Log recoverable errors and skip the instruction instead of stopping
    #[arg(long, env = "PPL_LENIENT")]
    lenient: bool,

    /// Fail on lines outside the grammar and on calls to undeclared macros
    #[arg(long, env = "PPL_REJECT_UNKNOWN")]
    reject_unknown: bool,

    /// Maximum nesting of macro invocations (at most 4096)
    #[arg(long, value_name = "N", env = "PPL_MAX_DEPTH", default_value_t = 256)]
    max_depth: usize,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Print execution statistics after the result
    #[arg(long)]
    stats: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    pause: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default()
            .exit_label(self.exit_label.clone())
            .strict(!self.lenient)
            .reject_unknown(self.reject_unknown)
            .max_depth(self.max_depth);
        if self.saturating {
            config = config.decrement(DecrementMode::Saturating);
        }
        if self.init_only_zero {
            config = config.zero_assign(ZeroAssign::InitOnly);
        }
        if self.reject_duplicate_labels {
            config = config.duplicate_labels(DuplicateLabels::Reject);
        }
        config
    }

    fn registers(&self) -> Registers {
        let mut registers = Registers::with_inputs(&self.inputs);
        for (name, value) in &self.set {
            registers.set(name, *value);
        }
        registers
    }
}

fn parse_register(s: &str) -> Result<(String, i64), String> {
    let (name, value) = s.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid register name '{}'", name));
    }
    let value = value.trim().parse::<i64>().map_err(|e| format!("invalid value for '{}': {}", name, e))?;
    Ok((name.to_string(), value))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[derive(Serialize)]
struct Report {
    registers: BTreeMap<String, i64>,
    y: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<StatsReport>,
}

#[derive(Serialize)]
struct StatsReport {
    instructions: u64,
    invocations: u64,
    max_depth: usize,
    programs_loaded: usize,
}

impl From<&ExecStats> for StatsReport {
    fn from(s: &ExecStats) -> Self {
        Self {
            instructions: s.instructions,
            invocations: s.invocations,
            max_depth: s.max_depth,
            programs_loaded: s.programs_loaded,
        }
    }
}

fn print_json(outcome: &Outcome, with_stats: bool) -> Result<(), serde_json::Error> {
    let report = Report {
        registers: outcome.registers.snapshot().into_iter().collect(),
        y: outcome.value,
        stats: with_stats.then(|| StatsReport::from(&outcome.stats)),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_table(outcome: &Outcome, with_stats: bool) {
    let registers = outcome.registers.snapshot();
    let width = registers.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    println!("{}", "registers:".if_supports_color(Stdout, |t| t.bold()));
    for (name, value) in &registers {
        println!(
            "  {:<width$} = {}",
            name.if_supports_color(Stdout, |t| t.cyan()),
            value,
            width = width
        );
    }
    match outcome.value {
        Some(v) => println!("{} = {}", OUTPUT, v.if_supports_color(Stdout, |t| t.green())),
        None => println!("{} is unassigned", OUTPUT.if_supports_color(Stdout, |t| t.yellow())),
    }
    if with_stats {
        let s = &outcome.stats;
        println!(
            "{}",
            format!(
                "{} instruction(s), {} invocation(s), depth {}, {} macro file(s) loaded",
                s.instructions, s.invocations, s.max_depth, s.programs_loaded
            )
            .if_supports_color(Stdout, |t| t.bright_black())
        );
    }
}

fn render_error(kind: &str, err: &Error, config: &Config) {
    eprintln!(
        "{}: {}",
        kind.if_supports_color(Stderr, |t| t.red()),
        err.msg.if_supports_color(Stderr, |t| t.red())
    );
    eprintln!("  [{}]", err.kind);
    match (&err.path, err.line) {
        (Some(path), Some(line)) => {
            eprintln!("  --> {}:{}", path.display(), line);
            let source = fs::read_to_string(path).unwrap_or_default();
            if let Some(src_line) = source.lines().nth(line - 1) {
                let gutter = format!("{:3} | ", line);
                let indent = src_line.len() - src_line.trim_start().len();
                let width = src_line.trim().len().max(1);
                eprintln!("     |");
                eprintln!("{}{}", gutter.if_supports_color(Stderr, |t| t.bright_black()), src_line);
                let marker = format!("{}{}", " ".repeat(gutter.len() + indent), "^".repeat(width));
                eprintln!("{}", marker.if_supports_color(Stderr, |t| t.red()));
                eprintln!("     |");
            }
        }
        (Some(path), None) => eprintln!("  --> {}", path.display()),
        (None, Some(line)) => eprintln!("  --> line {}", line),
        (None, None) => {}
    }
    common::provide_error_suggestions(err.kind, &config.exit_label);
}

fn pause() {
    print!("Press Enter to continue...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

fn run(cli: &Cli) -> i32 {
    let config = cli.config();
    if !cli.file.exists() {
        eprintln!(
            "{}: {}",
            "error".if_supports_color(Stderr, |t| t.red()),
            format!("File not found: {}", cli.file.display()).if_supports_color(Stderr, |t| t.red())
        );
        return 1;
    }

    let resolution = ppl_parser::resolve_macros(&cli.file);
    if !resolution.is_complete() {
        eprintln!(
            "{}: macro directory is incomplete ({} problem(s)); affected macros fail when called",
            "warning".if_supports_color(Stderr, |t| t.yellow()),
            resolution.errors.len()
        );
    }

    let program = match ppl_parser::load(&cli.file, &config) {
        Ok(p) => p,
        Err(e) => {
            render_error("Load error", &e, &config);
            return 1;
        }
    };
    tracing::debug!(file = %cli.file.display(), arity = program.arity, lines = program.len(), "program loaded");

    let mut interp = Interpreter::new(config);
    match interp.run(&program, &resolution.directory, cli.registers()) {
        Ok(outcome) => {
            if cli.json {
                if let Err(e) = print_json(&outcome, cli.stats) {
                    eprintln!("{}: {}", "error".if_supports_color(Stderr, |t| t.red()), e);
                    return 1;
                }
            } else {
                print_table(&outcome, cli.stats);
            }
            0
        }
        Err(e) => {
            render_error("Runtime error", &e, interp.config());
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let code = run(&cli);
    if cli.pause {
        pause();
    }
    std::process::exit(code);
}
