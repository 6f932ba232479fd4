//! Control flow for the interpreter.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Advance to the next instruction
    Next,
    /// Continue at the given instruction index
    Jump(usize),
    /// Stop the instance and return `y`
    Halt,
}
