//! Token definitions for PPL instruction lines.
//!
//! PPL is line oriented: the lexer sees one instruction line at a time and
//! produces a flat token sequence ending in [`TokenKind::Eof`]. Tokens record
//! the 1-based column they start at so malformed lines can be pointed at.
//!
//! # Token Categories
//!
//! - **Identifiers**: register, macro and label names (`x1`, `y`, `add`, `loop`)
//! - **Literals**: decimal integers (`0`, `1`)
//! - **Keywords**: `if` and `goto`
//! - **Operators**: `<-`, `+`, `-`, `!=` and free-form operator symbols used
//!   as infix macro names (`*`, `**`, `%`)
//! - **Punctuation**: `(`, `)`, `,`, `[`, `]`
//!
//! # Examples
//!
//! ```rust
//! use ppl_syntax::{Token, TokenKind};
//!
//! let target = Token { kind: TokenKind::Ident("y".to_string()), col: 1 };
//! let arrow = Token { kind: TokenKind::Arrow, col: 3 };
//! assert_eq!(target.kind.describe(), "'y'");
//! assert_eq!(arrow.kind.describe(), "'<-'");
//! ```

/// Token types produced by the PPL lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===

    /// An identifier: register, macro or label name
    ///
    /// Examples: `x1`, `y`, `add`, `loop_start`
    Ident(String),

    /// A non-negative decimal integer literal
    Number(i64),

    // === Keywords ===

    /// The `if` keyword - starts a conditional jump
    If,

    /// The `goto` keyword - names a jump target
    Goto,

    // === Punctuation ===

    /// Comma separator `,`
    Comma,

    /// Left parenthesis `(`
    LParen,

    /// Right parenthesis `)`
    RParen,

    /// Left square bracket `[`
    LBracket,

    /// Right square bracket `]`
    RBracket,

    // === Operators ===

    /// Assignment arrow `<-`
    Arrow,

    /// Increment operator `+`
    Plus,

    /// Decrement operator `-`
    Minus,

    /// Inequality operator `!=`
    NotEq,

    /// Any other run of operator characters, usable as an infix macro name
    Symbol(String),

    /// End-of-line marker - indicates no more tokens
    Eof,
}

impl TokenKind {
    /// Short quoted rendering used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) | TokenKind::Symbol(s) => format!("'{}'", s),
            TokenKind::Number(n) => format!("'{}'", n),
            TokenKind::If => "'if'".to_string(),
            TokenKind::Goto => "'goto'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::Arrow => "'<-'".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::NotEq => "'!='".to_string(),
            TokenKind::Eof => "end of line".to_string(),
        }
    }

    /// Name carried by tokens that can name an infix macro.
    ///
    /// `+` and `-` qualify too: `v <- a + b` calls a macro named `+` when the
    /// right operand is a register rather than the literal `1`.
    pub fn operator_name(&self) -> Option<String> {
        match self {
            TokenKind::Ident(s) | TokenKind::Symbol(s) => Some(s.clone()),
            TokenKind::Plus => Some("+".to_string()),
            TokenKind::Minus => Some("-".to_string()),
            _ => None,
        }
    }
}

/// A token with the column it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type and semantic content of this token
    pub kind: TokenKind,

    /// Column in the instruction line (1-based)
    pub col: usize,
}
