//! PPL lexer: converts one instruction line into tokens.
use ppl_syntax::error::{Error, ErrorKind, Result};
use ppl_syntax::token::{Token, TokenKind};

/// Characters that make up operator tokens and symbolic macro names.
const OPERATOR_CHARS: &str = "<>-+!=*/%^&|~?@$.:";

/// Character scanner over a single instruction line.
pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    col: usize,
}

impl Lexer {
    /// Create a new lexer over the given line.
    pub fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
            self.col += 1;
        }
        ch
    }

    fn make_token(&self, kind: TokenKind, col: usize) -> Token {
        Token { kind, col }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token> {
        let start_col = self.col;
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let val: i64 = s.parse().map_err(|_| {
            Error::new(
                ErrorKind::MalformedInstruction,
                format!("invalid number '{}' at column {}", s, start_col),
            )
        })?;
        Ok(self.make_token(TokenKind::Number(val), start_col))
    }

    fn read_ident_or_keyword(&mut self) -> Token {
        let start_col = self.col;
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = match s.as_str() {
            "if" => TokenKind::If,
            "goto" => TokenKind::Goto,
            _ => TokenKind::Ident(s),
        };
        self.make_token(kind, start_col)
    }

    fn read_operator(&mut self) -> Token {
        let start_col = self.col;
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if OPERATOR_CHARS.contains(c) {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = match s.as_str() {
            "<-" => TokenKind::Arrow,
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "!=" => TokenKind::NotEq,
            _ => TokenKind::Symbol(s),
        };
        self.make_token(kind, start_col)
    }

    /// Tokenize the entire line into a vector of tokens ending with Eof.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let col = self.col;
            let tk = match self.peek() {
                None => {
                    tokens.push(self.make_token(TokenKind::Eof, col));
                    break;
                }
                Some('(') => {
                    self.advance();
                    self.make_token(TokenKind::LParen, col)
                }
                Some(')') => {
                    self.advance();
                    self.make_token(TokenKind::RParen, col)
                }
                Some(',') => {
                    self.advance();
                    self.make_token(TokenKind::Comma, col)
                }
                Some('[') => {
                    self.advance();
                    self.make_token(TokenKind::LBracket, col)
                }
                Some(']') => {
                    self.advance();
                    self.make_token(TokenKind::RBracket, col)
                }
                Some(c) if c.is_ascii_digit() => self.read_number()?,
                Some(c) if c.is_ascii_alphabetic() || c == '_' => self.read_ident_or_keyword(),
                Some(c) if OPERATOR_CHARS.contains(c) => self.read_operator(),
                Some(other) => {
                    return Err(Error::new(
                        ErrorKind::MalformedInstruction,
                        format!("unexpected character '{}' at column {}", other, col),
                    ));
                }
            };
            tokens.push(tk);
        }
        Ok(tokens)
    }
}
