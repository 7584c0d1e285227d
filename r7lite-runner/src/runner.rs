use r7lite_core::lexer::Lexer;
use r7lite_core::parser::Parser;
use r7lite_interpreter::evaluator::Interpreter;

/// Runs a whole source text, one top-level form at a time. Errors of
/// any stage are printed to stderr and execution moves on to the next
/// form; values go to stdout.
pub fn execute(source: &str) {
    let mut interpreter = Interpreter::new();
    let mut parser = Parser::new(Lexer::new(source));

    while let Some(result) = parser.next() {
        for error in parser.take_lexical_errors() {
            eprintln!("Lexical Error: {}", error);
        }
        match result {
            Ok(expression) => {
                let value = interpreter.eval(&expression);
                for error in interpreter.take_diagnostics() {
                    eprintln!("Runtime Error: {}", error);
                }
                println!("{}", value);
            }
            Err(error) => eprintln!("Parse Error: {}", error),
        }
    }
    for error in parser.take_lexical_errors() {
        eprintln!("Lexical Error: {}", error);
    }
}
