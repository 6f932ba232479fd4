//! Program loading: instruction sequence and label table.

use std::collections::HashMap;
use std::path::Path;

use ppl_syntax::ast::{Line, Program};
use ppl_syntax::config::{Config, DuplicateLabels};
use ppl_syntax::error::{Error, ErrorKind, Result};

use crate::header::declarations;
use crate::parser::parse_line;
use crate::source::SourceFile;

/// Loads the program stored at `path`.
pub fn load(path: impl AsRef<Path>, config: &Config) -> Result<Program> {
    let source = SourceFile::read(path.as_ref())?;
    build(source, config)
}

/// Loads a program from in-memory text, as if it had been read from `path`.
pub fn load_str(path: impl AsRef<Path>, text: &str, config: &Config) -> Result<Program> {
    build(SourceFile::parse(path.as_ref(), text), config)
}

fn build(source: SourceFile, config: &Config) -> Result<Program> {
    // header problems are reported by the resolver; here only the
    // well-formed declarations matter
    let (macros, _) = declarations(&source);
    let arity = source.arity();

    let mut lines = Vec::new();
    let mut labels: HashMap<String, usize> = HashMap::new();
    for sl in &source.body {
        let text = sl.text.trim();
        if text.is_empty() {
            continue;
        }
        if let Some(label) = label_marker(text) {
            let located = |kind, msg: String| Error::with_line(kind, msg, sl.number).in_file(&source.path);
            if label == config.exit_label {
                return Err(located(
                    ErrorKind::ReservedLabel,
                    format!("'{}' is the exit label and cannot be defined", label),
                ));
            }
            if let Some(previous) = labels.insert(label.to_string(), lines.len()) {
                match config.duplicate_labels {
                    DuplicateLabels::Reject => {
                        return Err(located(ErrorKind::DuplicateLabel, format!("label '{}' is defined twice", label)));
                    }
                    DuplicateLabels::LastWins => {
                        tracing::debug!(label, previous, current = lines.len(), "label redefined, last wins");
                    }
                }
            }
            continue;
        }
        lines.push(Line { number: sl.number, text: text.to_string(), instr: parse_line(text) });
    }

    tracing::debug!(
        path = %source.path.display(),
        arity,
        instructions = lines.len(),
        labels = labels.len(),
        "loaded program"
    );
    Ok(Program { path: source.path, arity, lines, labels, macros })
}

/// The name inside a `[identifier]` label line.
fn label_marker(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars();
    let first = chars.next()?;
    let ident = (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    ident.then_some(inner)
}
