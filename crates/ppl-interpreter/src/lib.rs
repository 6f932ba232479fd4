//! PPL interpreter: runs loaded programs as execution instances.
//!
//! Each instance owns its registers and program counter and borrows its
//! program and the macro directory. A macro call runs the macro's source
//! program as a child instance whose only registers are the bound inputs
//! `x1..xk`; the child's final `y` becomes the call's value. Child instances
//! are plain nested calls, so they are gone by the time the caller resumes.

pub mod env;
mod flow;
mod instance;
pub mod interpreter;

pub use env::{input_name, Registers, OUTPUT};
pub use interpreter::{run, stack_size, ExecStats, Interpreter, Outcome, DEPTH_CEILING};
