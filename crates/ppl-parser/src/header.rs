//! Macro header parsing and recursive macro-directory resolution.
//!
//! A header is the block of `name kind source` lines in front of the
//! `program (n)` marker. Resolution walks a header line by line: each
//! declaration is inserted and its source file is resolved right away, before
//! the next line is read. The first declaration of a name wins, in that
//! depth-first order.
//!
//! Resolution is best effort. A declared source that cannot be opened or an
//! unknown macro kind ends the header of the file it appears in; the
//! directory built so far is kept and the problem is recorded in
//! [`Resolution::errors`] (and logged). Malformed and self-referential lines
//! are reported and skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ppl_syntax::ast::{file_identity, MacroDescriptor, MacroDirectory, MacroKind};
use ppl_syntax::error::{Error, ErrorKind};

use crate::source::{SourceFile, SourceLine};

/// A resolved macro directory plus every problem met while building it.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub directory: MacroDirectory,
    pub errors: Vec<Error>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolves the macro directory reachable from the header of `path`.
pub fn resolve_macros(path: impl AsRef<Path>) -> Resolution {
    let mut resolver = Resolver::default();
    resolver.resolve_file(path.as_ref());
    tracing::debug!(
        root = %path.as_ref().display(),
        macros = resolver.resolution.directory.len(),
        errors = resolver.resolution.errors.len(),
        "resolved macro directory"
    );
    resolver.resolution
}

/// Parses the header of one file into descriptors, without touching the
/// declared sources.
///
/// An unknown kind ends the header, as it does during resolution. Errors
/// carry the file and line.
pub fn declarations(source: &SourceFile) -> (Vec<MacroDescriptor>, Vec<Error>) {
    let mut decls = Vec::new();
    let mut errors = Vec::new();
    for line in &source.header {
        match declaration(source, line) {
            Ok(Some(d)) => decls.push(d),
            Ok(None) => {}
            Err(e) => {
                let stop = e.kind == ErrorKind::UnknownMacroKind;
                errors.push(e);
                if stop {
                    break;
                }
            }
        }
    }
    (decls, errors)
}

/// Parses one header line; blank lines yield `None`.
///
/// Relative source paths are taken relative to the declaring file's
/// directory.
fn declaration(source: &SourceFile, line: &SourceLine) -> Result<Option<MacroDescriptor>, Error> {
    let fields: Vec<&str> = line.text.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    let located = |kind, msg: String| Error::with_line(kind, msg, line.number).in_file(&source.path);

    let &[name, kind, file] = fields.as_slice() else {
        return Err(located(
            ErrorKind::MalformedHeader,
            format!("expected 'name kind source', found '{}'", line.text.trim()),
        ));
    };
    let Some(kind) = MacroKind::from_keyword(kind) else {
        return Err(located(
            ErrorKind::UnknownMacroKind,
            format!("macro '{}' has unknown kind '{}' (expected 'infix' or 'function')", name, kind),
        ));
    };
    let base = source.path.parent().unwrap_or_else(|| Path::new(""));
    let source_path = resolve_relative(base, file);
    if file_identity(&source_path) == file_identity(&source.path) {
        return Err(located(
            ErrorKind::SelfReferentialMacro,
            format!("macro '{}' names its own declaring file as source", name),
        ));
    }
    Ok(Some(MacroDescriptor { name: name.to_string(), kind, source: source_path }))
}

fn resolve_relative(base: &Path, file: &str) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

#[derive(Default)]
struct Resolver {
    resolution: Resolution,
    visited: HashSet<PathBuf>,
}

impl Resolver {
    fn report(&mut self, err: Error) {
        tracing::warn!(kind = %err.kind, "{}", err);
        self.resolution.errors.push(err);
    }

    /// Returns false when `path` itself could not be read.
    fn resolve_file(&mut self, path: &Path) -> bool {
        if !self.visited.insert(file_identity(path)) {
            return true;
        }
        let source = match SourceFile::read(path) {
            Ok(s) => s,
            Err(e) => {
                self.report(e);
                return false;
            }
        };

        for line in &source.header {
            let decl = match declaration(&source, line) {
                Ok(Some(d)) => d,
                Ok(None) => continue,
                Err(e) => {
                    let stop = e.kind == ErrorKind::UnknownMacroKind;
                    self.report(e);
                    if stop {
                        break;
                    }
                    continue;
                }
            };
            let name = decl.name.clone();
            let child = decl.source.clone();
            if !self.resolution.directory.insert(decl) {
                tracing::debug!(name = %name, file = %path.display(), "macro already declared, keeping first");
            }
            if !self.resolve_file(&child) {
                tracing::debug!(file = %path.display(), line = line.number, "header abandoned after unreadable source");
                break;
            }
        }
        true
    }
}
