use std::fmt;
use std::io;
use thiserror::Error;

/// Why a `frame <n>` request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameIndexProblem {
    /// Missing, non-integer, negative or extra arguments.
    Malformed,
    /// Parsed fine but there is no frame with that index.
    OutOfRange { frames: usize },
}

impl fmt::Display for FrameIndexProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameIndexProblem::Malformed => write!(f, "expected exactly one integer argument"),
            FrameIndexProblem::OutOfRange { frames } => {
                write!(f, "expected 0..={}", frames.saturating_sub(1))
            }
        }
    }
}

/// Failure reported by an evaluator while processing one expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("could not capture call stack: {0}")]
    CaptureFailure(String),

    #[error("invalid frame index '{input}': {problem}")]
    InvalidFrameIndex {
        input: String,
        problem: FrameIndexProblem,
    },

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),

    /// An `exit` was issued in a nested session; the enclosing sessions
    /// are unwinding and no new session may open.
    #[error("exit requested (status {0})")]
    ExitRequested(i32),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid stack dump: {0}")]
    Dump(String),
}

impl ShellError {
    pub fn malformed_frame(input: impl Into<String>) -> Self {
        ShellError::InvalidFrameIndex {
            input: input.into(),
            problem: FrameIndexProblem::Malformed,
        }
    }

    pub fn frame_out_of_range(index: usize, frames: usize) -> Self {
        ShellError::InvalidFrameIndex {
            input: index.to_string(),
            problem: FrameIndexProblem::OutOfRange { frames },
        }
    }
}

/// Lets an evaluator surface a failed nested trigger as its own failure.
impl From<ShellError> for EvaluationError {
    fn from(err: ShellError) -> Self {
        match err {
            ShellError::Evaluation(e) => e,
            other => EvaluationError::new(other.to_string()),
        }
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
