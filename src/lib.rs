//! Break into an interactive shell over a captured call stack.
//!
//! A [`debugger::Debugger`] captures the stack through a
//! [`debugger::StackWalker`], then runs a shell where the operator lists
//! frames (`backtrace`), picks one (`frame <n>`) and evaluates expressions
//! against its locals until `continue` or `exit`.

pub mod config;
pub mod debugger;
pub mod dump;
pub mod error;
pub mod eval;
pub mod parser;

pub use config::ShellConfig;
pub use error::{EvaluationError, ShellError, ShellResult};
