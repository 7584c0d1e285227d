mod repl;
mod runner;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    path: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match cli.path {
        None => {
            if let Err(error) = repl::start() {
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
        }
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(source) => runner::execute(&source),
            Err(error) => {
                eprintln!("Error reading {}: {}", path.display(), error);
                std::process::exit(1);
            }
        },
    }
}
