//! Interpreter entry points and subroutine invocation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::{panic, thread};

use ppl_syntax::ast::{file_identity, MacroDescriptor, MacroDirectory, Program};
use ppl_syntax::config::Config;
use ppl_syntax::error::{Error, ErrorKind, Result};

use crate::env::{input_name, Registers, OUTPUT};
use crate::instance::Instance;

/// Native stack reserved per nested invocation.
const FRAME_STACK: usize = 64 * 1024;
/// Native stack for the top-level instance and the code around it.
const BASE_STACK: usize = 1024 * 1024;
/// Deepest nesting honoured whatever `Config::max_depth` says.
pub const DEPTH_CEILING: usize = 4096;

/// Stack size of the thread that runs a program allowing `max_depth` levels.
pub fn stack_size(max_depth: usize) -> usize {
    BASE_STACK + max_depth.min(DEPTH_CEILING) * FRAME_STACK
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ExecStats {
    /// Instructions dispatched across all instances
    pub instructions: u64,
    /// Macro invocations performed
    pub invocations: u64,
    /// Deepest instance nesting reached; the top-level instance is 1
    pub max_depth: usize,
    /// Distinct macro source files loaded
    pub programs_loaded: usize,
}

/// Result of running a top-level program.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Final register environment of the top-level instance
    pub registers: Registers,
    /// Final value of `y`, if the program ever assigned it
    pub value: Option<i64>,
    pub stats: ExecStats,
}

pub struct Interpreter {
    pub(crate) config: Config,
    pub(crate) stats: ExecStats,
    /// Macro sources already loaded during this run, by file identity
    programs: HashMap<PathBuf, Rc<Program>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Self { config, stats: ExecStats::default(), programs: HashMap::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> ExecStats {
        self.stats.clone()
    }

    pub fn reset(&mut self) {
        self.stats = ExecStats::default();
        self.programs.clear();
    }

    /// Runs `program` with `registers` as its initial environment.
    ///
    /// The directory is extended with the program's own header declarations
    /// before execution and is otherwise never modified. Execution happens on
    /// a dedicated thread whose stack is sized for the configured depth, so
    /// deep macro recursion ends in [`ErrorKind::RecursionLimit`] rather than
    /// a native stack overflow.
    pub fn run(&mut self, program: &Program, directory: &MacroDirectory, registers: Registers) -> Result<Outcome> {
        self.reset();
        if self.config.max_depth > DEPTH_CEILING {
            tracing::warn!(requested = self.config.max_depth, limit = DEPTH_CEILING, "max depth clamped");
        }
        let config = self.config.clone();
        let stack = stack_size(config.max_depth);
        let (result, stats) = thread::scope(|scope| -> Result<(Result<Outcome>, ExecStats)> {
            let worker = thread::Builder::new()
                .name("ppl-run".to_string())
                .stack_size(stack)
                .spawn_scoped(scope, move || {
                    let mut interp = Interpreter::new(config);
                    let result = interp.execute(program, directory, registers);
                    (result, interp.stats)
                })
                .map_err(|e| {
                    Error::new(
                        ErrorKind::RecursionLimit,
                        format!("cannot reserve {} bytes of stack for execution: {}", stack, e),
                    )
                })?;
            match worker.join() {
                Ok(done) => Ok(done),
                Err(payload) => panic::resume_unwind(payload),
            }
        })?;
        self.stats = stats;
        result
    }

    fn execute(&mut self, program: &Program, directory: &MacroDirectory, registers: Registers) -> Result<Outcome> {
        for i in 1..=program.arity {
            if !registers.contains(&input_name(i)) {
                tracing::debug!(register = %input_name(i), "input not supplied");
            }
        }
        let directory = directory.augmented(&program.macros);
        self.stats.max_depth = 1;
        let mut top = Instance::new(program, &directory, registers, 1);
        let value = top.run(self)?;
        Ok(Outcome { registers: top.into_registers(), value, stats: self.stats() })
    }

    /// Resolves, loads and runs the program stored at `path`.
    ///
    /// Resolver diagnostics are logged; the run proceeds with whatever part of
    /// the directory could be built.
    pub fn run_file(&mut self, path: impl AsRef<Path>, registers: Registers) -> Result<Outcome> {
        let path = path.as_ref();
        let resolution = ppl_parser::resolve_macros(path);
        let program = ppl_parser::load(path, &self.config)?;
        self.run(&program, &resolution.directory, registers)
    }

    /// Runs the macro `desc` as an isolated child instance bound to `args`
    /// and returns its `y`.
    pub(crate) fn invoke(
        &mut self,
        desc: &MacroDescriptor,
        args: &[i64],
        directory: &MacroDirectory,
        depth: usize,
    ) -> Result<i64> {
        let depth = depth + 1;
        let limit = self.config.max_depth.min(DEPTH_CEILING);
        if depth > limit {
            return Err(Error::new(
                ErrorKind::RecursionLimit,
                format!("calling '{}' exceeds the maximum nesting depth of {}", desc.name, limit),
            ));
        }

        let program = self.program(&desc.source)?;
        if args.len() != program.arity {
            let msg = format!(
                "macro '{}' expects {} argument(s), got {}",
                desc.name,
                program.arity,
                args.len()
            );
            if self.config.strict {
                return Err(Error::new(ErrorKind::ArityMismatch, msg));
            }
            tracing::warn!(kind = %ErrorKind::ArityMismatch, "{}", msg);
        }

        self.stats.invocations += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        tracing::debug!(name = %desc.name, source = %desc.source.display(), depth, ?args, "invoking macro");

        let directory = directory.augmented(&program.macros);
        let mut child = Instance::new(&program, &directory, Registers::with_inputs(args), depth);
        match child.run(self)? {
            Some(v) => Ok(v),
            None => {
                // located by the caller at the call site
                let err = Error::new(
                    ErrorKind::UnboundVariable,
                    format!("macro '{}' finished without assigning '{}'", desc.name, OUTPUT),
                );
                if self.config.strict {
                    return Err(err);
                }
                tracing::warn!(kind = %err.kind, "{}; using 0", err);
                Ok(0)
            }
        }
    }

    fn program(&mut self, path: &Path) -> Result<Rc<Program>> {
        let key = file_identity(path);
        if let Some(p) = self.programs.get(&key) {
            return Ok(Rc::clone(p));
        }
        let program = Rc::new(ppl_parser::load(path, &self.config)?);
        self.stats.programs_loaded += 1;
        self.programs.insert(key, Rc::clone(&program));
        Ok(program)
    }
}

/// Runs `program` under `config`; see [`Interpreter::run`].
pub fn run(program: &Program, directory: &MacroDirectory, registers: Registers, config: Config) -> Result<Outcome> {
    Interpreter::new(config).run(program, directory, registers)
}
