use owo_colors::{OwoColorize, Stream::Stderr};
use ppl_syntax::error::ErrorKind;

fn help(text: &str) {
    eprintln!("{}", format!("Help: {}", text).if_supports_color(Stderr, |t| t.yellow()));
}

fn example(text: &str) {
    eprintln!("    {}", text.if_supports_color(Stderr, |t| t.bright_black()));
}

pub fn provide_error_suggestions(kind: ErrorKind, exit_label: &str) {
    match kind {
        ErrorKind::FileNotFound => {
            help("A program or macro source file could not be read.");
            example("Macro sources are resolved relative to the file that declares them");
        }
        ErrorKind::UnknownMacroKind => {
            help("Macro kinds are 'infix' or 'function'.");
            example("Example: add infix add.ppl");
        }
        ErrorKind::MalformedHeader => {
            help("Header lines take exactly three fields: name kind source.");
            example("Example: double function double.ppl");
        }
        ErrorKind::SelfReferentialMacro => {
            help("A macro cannot be implemented by the file that calls it.");
            example("Move the shared logic into its own file and declare it there");
        }
        ErrorKind::DuplicateLabel => {
            help("Each label may be defined once; rename one of the definitions.");
        }
        ErrorKind::ReservedLabel => {
            help(&format!("'{}' is the exit label and cannot be defined.", exit_label));
            example(&format!("Use 'goto {}' to stop the program instead", exit_label));
        }
        ErrorKind::UnboundVariable => {
            help("Registers must be assigned before they are read.");
            example("Initialize it first: z <- 0");
            example("Inputs are bound with: ppl file.ppl -x 3 -x 4");
        }
        ErrorKind::UnresolvedLabel => {
            help("Jump targets must be defined as [LABEL] lines in the same file.");
            example(&format!("The only other target is the exit label '{}'", exit_label));
        }
        ErrorKind::MalformedInstruction => {
            help("Supported instructions:");
            example("v <- 0    v <- a + 1    v <- a - 1");
            example("v <- a op b    v <- f(a, b)    f(a)");
            example("if v != 0 goto L    if f(a) goto L    goto L");
        }
        ErrorKind::UnknownMacro => {
            help("Declare the macro in a header before the 'program' line.");
            example("Example: add infix add.ppl");
        }
        ErrorKind::ArityMismatch => {
            help("Pass exactly as many arguments as the macro's 'program (n)' line declares.");
        }
        ErrorKind::RecursionLimit => {
            help("Macro calls nested too deeply; check for unbounded recursion.");
            example("Raise the limit with --max-depth N (at most 4096)");
        }
        ErrorKind::Overflow => {
            help("A register left the 64-bit signed integer range.");
        }
    }
}
