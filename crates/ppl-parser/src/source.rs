//! Splits a program file into its macro header and its body.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ppl_syntax::error::{Error, ErrorKind, Result};

/// A source line with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

/// A program file read into memory and split at the `program (n)` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Lines before the marker
    pub header: Vec<SourceLine>,
    /// The marker line itself, if the file has one
    pub marker: Option<SourceLine>,
    /// Lines after the marker, or the whole file when there is no marker
    pub body: Vec<SourceLine>,
}

impl SourceFile {
    /// Reads `path` to completion; the handle is closed before returning.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| open_error(path, e))?;
        Ok(Self::parse(path, &text))
    }

    pub fn parse(path: &Path, text: &str) -> Self {
        let lines: Vec<SourceLine> = text
            .lines()
            .enumerate()
            .map(|(i, l)| SourceLine { number: i + 1, text: l.to_string() })
            .collect();

        match lines.iter().position(|l| is_marker(&l.text)) {
            Some(at) => {
                let mut header = lines;
                let mut body = header.split_off(at);
                let marker = body.remove(0);
                Self { path: path.to_path_buf(), header, marker: Some(marker), body }
            }
            // no marker: a header-less program
            None => Self { path: path.to_path_buf(), header: Vec::new(), marker: None, body: lines },
        }
    }

    /// Declared input arity; missing or malformed arities are 0.
    pub fn arity(&self) -> usize {
        self.marker.as_ref().map(|m| parse_arity(&m.text)).unwrap_or(0)
    }
}

fn open_error(path: &Path, e: io::Error) -> Error {
    Error::new(ErrorKind::FileNotFound, format!("cannot open '{}': {}", path.display(), e))
}

/// Whether the line is the `program (n)` marker.
///
/// The word must stand alone or be followed by the arity, so an instruction
/// on a register named `program` is not mistaken for it.
pub fn is_marker(line: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix("program") else {
        return false;
    };
    if rest.is_empty() || rest.starts_with('(') {
        return true;
    }
    let arity = rest.trim_start();
    rest.starts_with(char::is_whitespace) && (arity.starts_with('(') || arity.starts_with(|c: char| c.is_ascii_digit()))
}

/// Extracts `n` from `program (n)`.
pub fn parse_arity(line: &str) -> usize {
    let rest = line.trim().trim_start_matches("program").trim();
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .unwrap_or(rest)
        .trim();
    match inner.parse::<usize>() {
        Ok(n) => n,
        Err(_) => {
            tracing::debug!(marker = line.trim(), "unreadable arity, defaulting to 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_marker() {
        let src = SourceFile::parse(
            Path::new("main.ppl"),
            "add infix add.ppl\nprogram (2)\ny <- 0\n[L]\n",
        );
        assert_eq!(src.header.len(), 1);
        assert_eq!(src.header[0].text, "add infix add.ppl");
        assert_eq!(src.marker.as_ref().map(|m| m.number), Some(2));
        assert_eq!(src.body.iter().map(|l| l.number).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(src.arity(), 2);
    }

    #[test]
    fn test_no_marker_means_whole_body() {
        let src = SourceFile::parse(Path::new("legacy.ppl"), "x <- 0\nx <- x + 1\n");
        assert!(src.header.is_empty());
        assert!(src.marker.is_none());
        assert_eq!(src.body.len(), 2);
        assert_eq!(src.arity(), 0);
    }

    #[test]
    fn test_marker_shapes() {
        assert!(is_marker("program (3)"));
        assert!(is_marker("  program(3)"));
        assert!(is_marker("program"));
        assert!(is_marker("program 2"));
        assert!(!is_marker("programs (3)"));
        assert!(!is_marker("program <- 0"));
        assert!(!is_marker("program <- program + 1"));
        assert!(!is_marker("program1 <- 0"));
        assert!(!is_marker("y <- 0"));
    }

    #[test]
    fn test_register_named_program_is_body() {
        let src = SourceFile::parse(Path::new("legacy.ppl"), "y <- 0\nprogram <- 0\ny <- y + 1\n");
        assert!(src.marker.is_none());
        assert!(src.header.is_empty());
        assert_eq!(src.body.len(), 3);
    }

    #[test]
    fn test_arity_parsing() {
        assert_eq!(parse_arity("program (3)"), 3);
        assert_eq!(parse_arity("program(12)"), 12);
        assert_eq!(parse_arity("program 1"), 1);
        assert_eq!(parse_arity("program (n)"), 0);
        assert_eq!(parse_arity("program ()"), 0);
        assert_eq!(parse_arity("program"), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = SourceFile::read(Path::new("definitely/not/here.ppl")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileNotFound);
    }
}
