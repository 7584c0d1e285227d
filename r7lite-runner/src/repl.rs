use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use r7lite_core::lexer::Lexer;
use r7lite_core::parser::Parser;
use r7lite_interpreter::evaluator::Interpreter;

const PROMPT: &str = ">> ";

pub fn start() -> Result<(), ReadlineError> {
    let mut interpreter = Interpreter::new();
    let mut rl = DefaultEditor::new()?;
    // lines keep counting up across reads so positions in diagnostics
    // stay meaningful
    let mut line_number = 1;

    loop {
        let readline = rl.readline(PROMPT);

        let line = match readline {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                continue; // Clear line
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                line
            }
        };

        let mut parser = Parser::new(Lexer::with_start_line(&line, line_number));
        line_number += 1;

        for result in parser.by_ref() {
            match result {
                Ok(expression) => {
                    let value = interpreter.eval(&expression);
                    for error in interpreter.take_diagnostics() {
                        println!("Runtime Error: {}", error);
                    }
                    println!("{}", value);
                }
                Err(error) => println!("Parse Error: {}", error),
            }
        }
        for error in parser.take_lexical_errors() {
            println!("Lexical Error: {}", error);
        }
    }
    Ok(())
}
