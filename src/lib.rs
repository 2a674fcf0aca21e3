// Decoding
mod lexer;
pub use lexer::{decode, Instruction, Stmt};
mod parse;
pub use parse::{check_program, Operand};

// Running
mod runtime;
pub use runtime::{RunEnvironment, RunState, MEMORY_DEFAULT};

mod error;
pub use error::ErrorKind;

mod symbol;
pub use symbol::{InstrKind, Register};
