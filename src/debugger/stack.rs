use super::snapshot::{CapturedFrame, Location, StackWalker};
use crate::error::{ShellError, ShellResult};
use std::cell::RefCell;
use std::collections::HashMap;

struct Activation<V> {
    location: Location,
    locals: HashMap<String, V>,
}

/// Call stack maintained by instrumented host code.
///
/// Activations are pushed on entry and popped on exit; the innermost
/// activation is the last one pushed.
pub struct ShadowStack<V> {
    records: RefCell<Vec<Activation<V>>>,
}

impl<V> ShadowStack<V> {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
        }
    }

    /// Returns the new depth.
    pub fn push(&self, location: Location) -> usize {
        let mut records = self.records.borrow_mut();
        records.push(Activation {
            location,
            locals: HashMap::new(),
        });
        records.len()
    }

    /// Unwind the innermost activation.
    pub fn pop(&self) -> Option<Location> {
        self.records.borrow_mut().pop().map(|a| a.location)
    }

    /// Pushes an activation that is popped again when the guard drops.
    pub fn enter(&self, location: Location) -> ActivationGuard<'_, V> {
        self.push(location);
        ActivationGuard { stack: self }
    }

    /// Set a local on the innermost activation. Ignored when nothing is pushed.
    pub fn set_local(&self, name: impl Into<String>, value: V) {
        let mut records = self.records.borrow_mut();
        match records.last_mut() {
            Some(top) => {
                top.locals.insert(name.into(), value);
            }
            None => tracing::warn!("set_local with no active frame"),
        }
    }

    pub fn depth(&self) -> usize {
        self.records.borrow().len()
    }
}

impl<V> Default for ShadowStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> StackWalker<V> for ShadowStack<V> {
    fn walk(&self) -> ShellResult<Vec<CapturedFrame<V>>> {
        let records = self.records.borrow();
        if records.is_empty() {
            return Err(ShellError::CaptureFailure(
                "shadow stack has no activations".to_string(),
            ));
        }

        Ok(records
            .iter()
            .rev()
            .map(|a| CapturedFrame {
                location: a.location.clone(),
                locals: a.locals.clone(),
            })
            .collect())
    }
}

pub struct ActivationGuard<'s, V> {
    stack: &'s ShadowStack<V>,
}

impl<V> Drop for ActivationGuard<'_, V> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}
