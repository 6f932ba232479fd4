//! Runtime configuration shared by the loader and the interpreter.

/// Behaviour of `v <- v - 1` when `v` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecrementMode {
    /// Registers are unbounded integers and may go negative.
    #[default]
    Unbounded,
    /// Decrement stops at 0, as in the classical register-machine model.
    Saturating,
}

/// Behaviour of `v <- 0` when `v` already holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroAssign {
    /// Always store 0.
    #[default]
    Reset,
    /// Only initialize an absent register; an existing value is kept.
    InitOnly,
}

/// What the loader does when a label is defined twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateLabels {
    /// The later definition overwrites the earlier one.
    #[default]
    LastWins,
    /// The second definition is a load error.
    Reject,
}

/// Knobs for loading and running programs.
///
/// ```rust
/// use ppl_syntax::config::{Config, DecrementMode};
///
/// let config = Config::default()
///     .exit_label("halt")
///     .decrement(DecrementMode::Saturating)
///     .strict(false);
/// assert_eq!(config.exit_label, "halt");
/// assert!(!config.strict);
/// assert!(!config.reject_unknown);
/// assert_eq!(config.max_depth, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Label whose jump target means "halt now"; cannot be defined by programs
    pub exit_label: String,
    pub decrement: DecrementMode,
    pub zero_assign: ZeroAssign,
    pub duplicate_labels: DuplicateLabels,
    /// Fail the execution instance on the first runtime error instead of
    /// logging it and treating the instruction as a no-op
    pub strict: bool,
    /// Treat lines outside the grammar, and calls to macros that are not
    /// registered for that use, as errors instead of logged no-ops
    pub reject_unknown: bool,
    /// Maximum nesting of macro invocations
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exit_label: "e".to_string(),
            decrement: DecrementMode::default(),
            zero_assign: ZeroAssign::default(),
            duplicate_labels: DuplicateLabels::default(),
            strict: true,
            reject_unknown: false,
            max_depth: 256,
        }
    }
}

impl Config {
    pub fn exit_label(mut self, label: impl Into<String>) -> Self {
        self.exit_label = label.into();
        self
    }

    pub fn decrement(mut self, mode: DecrementMode) -> Self {
        self.decrement = mode;
        self
    }

    pub fn zero_assign(mut self, mode: ZeroAssign) -> Self {
        self.zero_assign = mode;
        self
    }

    pub fn duplicate_labels(mut self, policy: DuplicateLabels) -> Self {
        self.duplicate_labels = policy;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn reject_unknown(mut self, reject: bool) -> Self {
        self.reject_unknown = reject;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
