//! One execution instance: a program, a private register environment and a
//! program counter, run by a fetch-decode-execute loop.

use ppl_syntax::ast::{file_identity, Delta, Instruction, MacroDescriptor, MacroDirectory, MacroKind, Program};
use ppl_syntax::config::{Config, DecrementMode, ZeroAssign};
use ppl_syntax::error::{error, Error, ErrorKind, Result};

use crate::env::{Registers, OUTPUT};
use crate::flow::Flow;
use crate::interpreter::Interpreter;

pub(crate) struct Instance<'p> {
    program: &'p Program,
    directory: &'p MacroDirectory,
    registers: Registers,
    pc: usize,
    /// Nesting level; the top-level instance is 1
    depth: usize,
}

impl<'p> Instance<'p> {
    pub(crate) fn new(program: &'p Program, directory: &'p MacroDirectory, registers: Registers, depth: usize) -> Self {
        Self { program, directory, registers, pc: 0, depth }
    }

    pub(crate) fn into_registers(self) -> Registers {
        self.registers
    }

    /// Runs until the counter leaves the program or an exit jump is taken,
    /// and returns the final `y`.
    pub(crate) fn run(&mut self, interp: &mut Interpreter) -> Result<Option<i64>> {
        while self.pc < self.program.len() {
            interp.stats.instructions += 1;
            let flow = match self.step(interp) {
                Ok(flow) => flow,
                Err(e) => {
                    let line = &self.program.lines[self.pc];
                    let e = e.in_file(&self.program.path).at_line(line.number);
                    if interp.config.strict || e.kind.is_fatal() {
                        return Err(e);
                    }
                    tracing::warn!(kind = %e.kind, instruction = %line.text, "{}; skipping", e);
                    Flow::Next
                }
            };
            match flow {
                Flow::Next => self.pc += 1,
                Flow::Jump(target) => self.pc = target,
                Flow::Halt => break,
            }
        }
        Ok(self.registers.get(OUTPUT))
    }

    fn step(&mut self, interp: &mut Interpreter) -> Result<Flow> {
        let program = self.program;
        let line = &program.lines[self.pc];
        tracing::trace!(depth = self.depth, pc = self.pc, line = line.number, instruction = %line.text);

        match &line.instr {
            Instruction::Nop => Ok(Flow::Next),
            Instruction::Unknown { reason } => {
                let err = Error::new(
                    ErrorKind::MalformedInstruction,
                    format!("cannot decode '{}': {}", line.text, reason),
                );
                self.unrecognized(&interp.config, err).map(|()| Flow::Next)
            }
            Instruction::Zero { target } => {
                match interp.config.zero_assign {
                    ZeroAssign::Reset => self.registers.set(target, 0),
                    ZeroAssign::InitOnly => self.registers.init(target),
                }
                Ok(Flow::Next)
            }
            Instruction::Step { target, source, delta } => {
                let v = self.read(source)?;
                let next = match (delta, interp.config.decrement) {
                    (Delta::Increment, _) => v.checked_add(1),
                    (Delta::Decrement, DecrementMode::Unbounded) => v.checked_sub(1),
                    (Delta::Decrement, DecrementMode::Saturating) if v == 0 => Some(0),
                    (Delta::Decrement, DecrementMode::Saturating) => v.checked_sub(1),
                };
                let next = next.ok_or_else(|| {
                    Error::new(ErrorKind::Overflow, format!("register '{}' overflows when stepping {}", target, v))
                })?;
                self.registers.set(target, next);
                Ok(Flow::Next)
            }
            Instruction::Infix { target, lhs, op, rhs } => {
                let Some(desc) = self.lookup(op, MacroKind::Infix, &interp.config)? else {
                    return Ok(Flow::Next);
                };
                let args = [self.read(lhs)?, self.read(rhs)?];
                let v = interp.invoke(desc, &args, self.directory, self.depth)?;
                self.registers.set(target, v);
                Ok(Flow::Next)
            }
            Instruction::Call { target, name, args } => {
                let Some(desc) = self.lookup(name, MacroKind::Function, &interp.config)? else {
                    return Ok(Flow::Next);
                };
                let args = self.read_all(args)?;
                let v = interp.invoke(desc, &args, self.directory, self.depth)?;
                self.registers.set(target.as_deref().unwrap_or(OUTPUT), v);
                Ok(Flow::Next)
            }
            Instruction::IfCall { name, args, label } => {
                let Some(desc) = self.lookup(name, MacroKind::Function, &interp.config)? else {
                    return Ok(Flow::Next);
                };
                let args = self.read_all(args)?;
                if interp.invoke(desc, &args, self.directory, self.depth)? == 0 {
                    self.jump(label, &interp.config.exit_label)
                } else {
                    Ok(Flow::Next)
                }
            }
            Instruction::IfNonZero { register, label } => {
                if self.read(register)? != 0 {
                    self.jump(label, &interp.config.exit_label)
                } else {
                    Ok(Flow::Next)
                }
            }
            Instruction::Goto { label } => self.jump(label, &interp.config.exit_label),
        }
    }

    fn read(&self, name: &str) -> Result<i64> {
        self.registers.get(name).ok_or_else(|| {
            Error::new(ErrorKind::UnboundVariable, format!("register '{}' is not initialized", name))
        })
    }

    fn read_all(&self, names: &[String]) -> Result<Vec<i64>> {
        names.iter().map(|n| self.read(n)).collect()
    }

    /// Resolves a label to the next counter value, or `Halt` for the exit label.
    fn jump(&self, label: &str, exit_label: &str) -> Result<Flow> {
        if let Some(target) = self.program.label(label) {
            Ok(Flow::Jump(target))
        } else if label == exit_label {
            Ok(Flow::Halt)
        } else {
            error(ErrorKind::UnresolvedLabel, format!("label '{}' is not defined", label))
        }
    }

    /// Finds a callable macro. Names that are not registered, registered with
    /// the other kind, or implemented by this very file do not form a call, so
    /// the line is handled by [`Self::unrecognized`].
    fn lookup(&self, name: &str, kind: MacroKind, config: &Config) -> Result<Option<&'p MacroDescriptor>> {
        let err = match self.directory.get(name) {
            None => Error::new(ErrorKind::UnknownMacro, format!("macro '{}' is not declared", name)),
            Some(desc) if desc.kind != kind => Error::new(
                ErrorKind::MalformedInstruction,
                format!("macro '{}' is declared {} but used as {}", name, desc.kind, kind),
            ),
            Some(desc) if file_identity(&desc.source) == file_identity(&self.program.path) => Error::new(
                ErrorKind::SelfReferentialMacro,
                format!("macro '{}' cannot be called from its own source file", name),
            ),
            Some(desc) => return Ok(Some(desc)),
        };
        self.unrecognized(config, err).map(|()| None)
    }

    /// A line outside the grammar is a no-op unless `reject_unknown` is set.
    fn unrecognized(&self, config: &Config, err: Error) -> Result<()> {
        if config.reject_unknown {
            return Err(err);
        }
        let line = &self.program.lines[self.pc];
        tracing::warn!(
            kind = %err.kind,
            file = %self.program.path.display(),
            line = line.number,
            "{}; treated as a no-op",
            err
        );
        Ok(())
    }
}
