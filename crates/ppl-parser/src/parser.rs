//! Decodes one instruction line into an [`Instruction`].

use ppl_lexer::Lexer;
use ppl_syntax::ast::{Delta, Instruction};
use ppl_syntax::error::{Error, ErrorKind, Result};
use ppl_syntax::token::{Token, TokenKind};

static EOF: TokenKind = TokenKind::Eof;

/// Recursive-descent parser over the tokens of a single line.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&EOF)
    }

    fn col(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.col)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn unexpected<T>(&self, expected: &str) -> Result<T> {
        Err(Error::new(
            ErrorKind::MalformedInstruction,
            format!(
                "expected {}, found {} at column {}",
                expected,
                self.peek().describe(),
                self.col()
            ),
        ))
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<()> {
        if *self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            self.unexpected(expected)
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String> {
        if let TokenKind::Ident(s) = self.peek() {
            let s = s.clone();
            self.advance();
            Ok(s)
        } else {
            self.unexpected(expected)
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        self.expect(TokenKind::Eof, "end of line")
    }

    /// Parses the whole line.
    pub fn parse_instruction(&mut self) -> Result<Instruction> {
        match self.peek() {
            TokenKind::Eof => Ok(Instruction::Nop),
            TokenKind::If => self.parse_if(),
            TokenKind::Goto => {
                self.advance();
                let label = self.expect_ident("label after 'goto'")?;
                self.expect_eof()?;
                Ok(Instruction::Goto { label })
            }
            TokenKind::Ident(_) if *self.peek_at(1) == TokenKind::LParen => {
                let name = self.expect_ident("macro name")?;
                let args = self.parse_args()?;
                self.expect_eof()?;
                Ok(Instruction::Call { target: None, name, args })
            }
            TokenKind::Ident(_) => self.parse_assignment(),
            _ => self.unexpected("register, 'if' or 'goto'"),
        }
    }

    fn parse_if(&mut self) -> Result<Instruction> {
        self.expect(TokenKind::If, "'if'")?;
        let name = self.expect_ident("register or predicate after 'if'")?;
        let instr = if *self.peek() == TokenKind::LParen {
            let args = self.parse_args()?;
            self.expect(TokenKind::Goto, "'goto'")?;
            let label = self.expect_ident("label after 'goto'")?;
            Instruction::IfCall { name, args, label }
        } else {
            self.expect(TokenKind::NotEq, "'!='")?;
            self.expect(TokenKind::Number(0), "'0'")?;
            self.expect(TokenKind::Goto, "'goto'")?;
            let label = self.expect_ident("label after 'goto'")?;
            Instruction::IfNonZero { register: name, label }
        };
        self.expect_eof()?;
        Ok(instr)
    }

    fn parse_assignment(&mut self) -> Result<Instruction> {
        let target = self.expect_ident("target register")?;
        self.expect(TokenKind::Arrow, "'<-'")?;

        if let TokenKind::Number(n) = self.peek() {
            if *n != 0 {
                return Err(Error::new(
                    ErrorKind::MalformedInstruction,
                    format!("only 0 can be assigned directly, found {} at column {}", n, self.col()),
                ));
            }
            self.advance();
            self.expect_eof()?;
            return Ok(Instruction::Zero { target });
        }

        let first = self.expect_ident("register, 0 or macro call after '<-'")?;
        if *self.peek() == TokenKind::LParen {
            let args = self.parse_args()?;
            self.expect_eof()?;
            return Ok(Instruction::Call { target: Some(target), name: first, args });
        }

        let op_col = self.col();
        let op = match self.peek().operator_name() {
            Some(op) => {
                self.advance();
                op
            }
            None => return self.unexpected("operator"),
        };

        let literal = match self.peek() {
            TokenKind::Number(n) => Some(*n),
            _ => None,
        };
        match (op.as_str(), literal) {
            ("+", Some(1)) | ("-", Some(1)) => {
                self.advance();
                self.expect_eof()?;
                let delta = if op == "+" { Delta::Increment } else { Delta::Decrement };
                Ok(Instruction::Step { target, source: first, delta })
            }
            (_, Some(n)) => Err(Error::new(
                ErrorKind::MalformedInstruction,
                format!("registers only step by 1, found '{} {}' at column {}", op, n, op_col),
            )),
            _ => {
                let rhs = self.expect_ident("right operand register")?;
                self.expect_eof()?;
                Ok(Instruction::Infix { target, lhs: first, op, rhs })
            }
        }
    }

    /// `( reg, reg, ... )`, possibly empty.
    fn parse_args(&mut self) -> Result<Vec<String>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if *self.peek() == TokenKind::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.expect_ident("argument register")?);
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return self.unexpected("',' or ')'"),
            }
        }
    }
}

/// Decodes `text` without failing: lines that do not parse become
/// [`Instruction::Unknown`] carrying the reason.
pub fn parse_line(text: &str) -> Instruction {
    let parsed = Lexer::new(text)
        .tokenize()
        .and_then(|tokens| Parser::new(tokens).parse_instruction());
    match parsed {
        Ok(instr) => instr,
        Err(e) => Instruction::Unknown { reason: e.msg },
    }
}
