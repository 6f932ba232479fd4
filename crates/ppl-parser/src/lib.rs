//! PPL front end: decodes instruction lines, resolves macro headers and loads
//! programs from disk.

pub mod header;
pub mod loader;
pub mod parser;
pub mod source;

pub use header::{declarations, resolve_macros, Resolution};
pub use loader::{load, load_str};
pub use parser::{parse_line, Parser};
pub use source::SourceFile;

#[cfg(test)]
mod tests {
    use super::*;
    use ppl_lexer::Lexer;
    use ppl_syntax::ast::*;

    fn parse_str(input: &str) -> Instruction {
        let tokens = Lexer::new(input).tokenize().expect("Lexing should succeed");
        let mut parser = Parser::new(tokens);
        parser.parse_instruction().expect("Parsing should succeed")
    }

    fn parse_err(input: &str) -> String {
        let tokens = Lexer::new(input).tokenize().expect("Lexing should succeed");
        let mut parser = Parser::new(tokens);
        parser.parse_instruction().expect_err("Parsing should fail").msg
    }

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn test_zero_assignment() {
        assert_eq!(parse_str("z1 <- 0"), Instruction::Zero { target: s("z1") });
    }

    #[test]
    fn test_steps() {
        assert_eq!(
            parse_str("y <- y + 1"),
            Instruction::Step { target: s("y"), source: s("y"), delta: Delta::Increment }
        );
        assert_eq!(
            parse_str("y <- x1 - 1"),
            Instruction::Step { target: s("y"), source: s("x1"), delta: Delta::Decrement }
        );
    }

    #[test]
    fn test_infix_macro() {
        assert_eq!(
            parse_str("z <- x1 add x2"),
            Instruction::Infix { target: s("z"), lhs: s("x1"), op: s("add"), rhs: s("x2") }
        );
        assert_eq!(
            parse_str("z <- a * b"),
            Instruction::Infix { target: s("z"), lhs: s("a"), op: s("*"), rhs: s("b") }
        );
        // '+' with a register operand is a macro call, not an increment
        assert_eq!(
            parse_str("z <- a + b"),
            Instruction::Infix { target: s("z"), lhs: s("a"), op: s("+"), rhs: s("b") }
        );
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            parse_str("y <- max(x1, x2, x3)"),
            Instruction::Call { target: Some(s("y")), name: s("max"), args: vec![s("x1"), s("x2"), s("x3")] }
        );
        assert_eq!(
            parse_str("reset()"),
            Instruction::Call { target: None, name: s("reset"), args: vec![] }
        );
        assert_eq!(
            parse_str("log(x1)"),
            Instruction::Call { target: None, name: s("log"), args: vec![s("x1")] }
        );
    }

    #[test]
    fn test_conditionals() {
        assert_eq!(
            parse_str("if x1 != 0 goto A"),
            Instruction::IfNonZero { register: s("x1"), label: s("A") }
        );
        assert_eq!(
            parse_str("if zero(x1) goto e"),
            Instruction::IfCall { name: s("zero"), args: vec![s("x1")], label: s("e") }
        );
    }

    #[test]
    fn test_goto() {
        assert_eq!(parse_str("goto e"), Instruction::Goto { label: s("e") });
        assert_eq!(parse_str("goto LOOP"), Instruction::Goto { label: s("LOOP") });
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parse_str(""), Instruction::Nop);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_err("y <- 3").contains("only 0"));
        assert!(parse_err("y <- y + 2").contains("step by 1"));
        assert!(parse_err("if x1 != 1 goto A").contains("'0'"));
        assert!(parse_err("if x1 == 0 goto A").contains("'!='"));
        assert!(parse_err("y <- f(x1,").contains("argument register"));
        assert!(parse_err("goto").contains("label"));
        assert!(parse_err("y <- y + 1 extra").contains("end of line"));
        assert!(parse_err("y x1").contains("'<-'"));
    }

    #[test]
    fn test_parse_line_never_fails() {
        assert!(matches!(parse_line("y <- \"1\""), Instruction::Unknown { .. }));
        assert!(matches!(parse_line("+ + +"), Instruction::Unknown { .. }));
        assert_eq!(parse_line("   "), Instruction::Nop);
    }
}
