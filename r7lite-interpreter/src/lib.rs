pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod value;

mod numeric;
