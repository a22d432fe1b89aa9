mod commands;
mod expr;
mod lexer;

pub use commands::{normalize_whitespace, parse_command, ShellCommand};
pub use expr::{parse_expression, BinaryOp, Expr, Literal, UnaryOp};
pub use lexer::{tokenize, Token};
