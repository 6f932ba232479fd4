//! Program model for the PPL language: instructions, programs and macros.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Direction of a unit step `v <- a + 1` / `v <- a - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Increment,
    Decrement,
}

/// One decoded instruction line.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `v <- 0`
    Zero { target: String },
    /// `v <- a + 1` or `v <- a - 1`; `a == v` is the classic increment.
    Step {
        target: String,
        source: String,
        delta: Delta,
    },
    /// `v <- a OP b` with `OP` an infix macro.
    Infix {
        target: String,
        lhs: String,
        op: String,
        rhs: String,
    },
    /// `v <- P(a, b, ...)`, or a bare `P(a, b, ...)` when `target` is `None`.
    Call {
        target: Option<String>,
        name: String,
        args: Vec<String>,
    },
    /// `if P(a, ...) goto L`: jumps when the predicate yields 0.
    IfCall {
        name: String,
        args: Vec<String>,
        label: String,
    },
    /// `if v != 0 goto L`
    IfNonZero { register: String, label: String },
    /// `goto L`
    Goto { label: String },
    /// Blank line
    Nop,
    /// A line matching none of the shapes above
    Unknown { reason: String },
}

/// A body line together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// 1-based line number in the source file
    pub number: usize,
    /// The raw text, trimmed
    pub text: String,
    pub instr: Instruction,
}

/// A loaded program: the instruction sequence after the `program (n)` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// File the program was loaded from
    pub path: PathBuf,
    /// Declared input arity `n` (registers `x1..xn`)
    pub arity: usize,
    pub lines: Vec<Line>,
    /// Label name -> index of the instruction following the label marker
    pub labels: HashMap<String, usize>,
    /// Macros declared in this file's own header
    pub macros: Vec<MacroDescriptor>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }
}

/// How a macro is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    /// Binary operator: `v <- a OP b`
    Infix,
    /// N-ary call: `v <- P(a, b, ...)`
    Function,
}

impl MacroKind {
    /// Parses the kind field of a header line.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "infix" => Some(MacroKind::Infix),
            "function" => Some(MacroKind::Function),
            _ => None,
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroKind::Infix => write!(f, "infix"),
            MacroKind::Function => write!(f, "function"),
        }
    }
}

/// `(name, kind, source)` as declared in a header. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDescriptor {
    pub name: String,
    pub kind: MacroKind,
    pub source: PathBuf,
}

/// Macro name -> descriptor, shared read-only by every execution instance of
/// one top-level run.
///
/// Insertion never overwrites: the first declaration of a name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroDirectory {
    macros: HashMap<String, MacroDescriptor>,
}

impl MacroDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MacroDescriptor> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Inserts `desc` unless its name is already present. Returns whether it
    /// was inserted.
    pub fn insert(&mut self, desc: MacroDescriptor) -> bool {
        if self.macros.contains_key(&desc.name) {
            return false;
        }
        self.macros.insert(desc.name.clone(), desc);
        true
    }

    /// Merges `other` into `self`; names already present are kept.
    pub fn merge(&mut self, other: MacroDirectory) {
        for (_, desc) in other.macros {
            self.insert(desc);
        }
    }

    /// The directory extended with `decls`, borrowing `self` when nothing new
    /// would be added.
    pub fn augmented<'a>(&'a self, decls: &[MacroDescriptor]) -> Cow<'a, MacroDirectory> {
        if decls.iter().all(|d| self.contains(&d.name)) {
            return Cow::Borrowed(self);
        }
        let mut dir = self.clone();
        for d in decls {
            dir.insert(d.clone());
        }
        Cow::Owned(dir)
    }

    /// Descriptors sorted by name.
    pub fn descriptors(&self) -> Vec<&MacroDescriptor> {
        let mut v: Vec<&MacroDescriptor> = self.macros.values().collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }
}

/// Normalizes a path for identity comparisons between files.
///
/// Falls back to the path as given when it cannot be canonicalized (for
/// example because the file does not exist).
pub fn file_identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(name: &str, kind: MacroKind, source: &str) -> MacroDescriptor {
        MacroDescriptor { name: name.to_string(), kind, source: PathBuf::from(source) }
    }

    #[test]
    fn first_declaration_wins() {
        let mut dir = MacroDirectory::new();
        assert!(dir.insert(desc("add", MacroKind::Infix, "add.ppl")));
        assert!(!dir.insert(desc("add", MacroKind::Function, "other.ppl")));
        assert_eq!(dir.get("add").map(|d| d.kind), Some(MacroKind::Infix));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn merge_keeps_existing_names() {
        let mut a = MacroDirectory::new();
        a.insert(desc("add", MacroKind::Infix, "a/add.ppl"));
        let mut b = MacroDirectory::new();
        b.insert(desc("add", MacroKind::Infix, "b/add.ppl"));
        b.insert(desc("pred", MacroKind::Function, "b/pred.ppl"));
        a.merge(b);
        assert_eq!(a.get("add").map(|d| d.source.clone()), Some(PathBuf::from("a/add.ppl")));
        assert!(a.contains("pred"));
    }

    #[test]
    fn augmenting_with_known_names_borrows() {
        let mut dir = MacroDirectory::new();
        dir.insert(desc("add", MacroKind::Infix, "add.ppl"));
        let same = dir.augmented(&[desc("add", MacroKind::Infix, "elsewhere.ppl")]);
        assert!(matches!(same, Cow::Borrowed(_)));

        let grown = dir.augmented(&[desc("mul", MacroKind::Infix, "mul.ppl")]);
        assert!(matches!(grown, Cow::Owned(_)));
        assert_eq!(grown.len(), 2);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn kind_keywords() {
        assert_eq!(MacroKind::from_keyword("infix"), Some(MacroKind::Infix));
        assert_eq!(MacroKind::from_keyword("function"), Some(MacroKind::Function));
        assert_eq!(MacroKind::from_keyword("prefix"), None);
        assert_eq!(MacroKind::Function.to_string(), "function");
    }
}
