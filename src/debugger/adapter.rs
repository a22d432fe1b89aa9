//! Collaborators the shell consumes but does not implement.

use super::bindings::Scope;
use crate::error::EvaluationError;

/// Executes one expression against a frame's binding set.
///
/// New names assigned through `scope` must be visible to later calls
/// against the same frame.
pub trait Evaluator<V> {
    fn evaluate(&self, expression: &str, scope: &mut Scope<'_, V>) -> Result<V, EvaluationError>;
}

/// Renders a value for display, like `inspect` in a REPL.
pub trait Inspector<V> {
    fn inspect(&self, value: &V) -> String;
}

impl<V, F> Inspector<V> for F
where
    F: Fn(&V) -> String,
{
    fn inspect(&self, value: &V) -> String {
        self(value)
    }
}
