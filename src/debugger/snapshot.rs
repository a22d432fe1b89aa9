use crate::error::{ShellError, ShellResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Source position of one activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    /// Enclosing method or block name.
    pub label: String,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, label: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            label: label.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:in '{}'", self.file, self.line, self.label)
    }
}

/// One activation as reported by a stack walker, before indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame<V> {
    pub location: Location,
    pub locals: HashMap<String, V>,
}

impl<V> CapturedFrame<V> {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            locals: HashMap::new(),
        }
    }

    pub fn with_local(mut self, name: impl Into<String>, value: V) -> Self {
        self.locals.insert(name.into(), value);
        self
    }
}

/// Read-only activation record owned by a [`FrameSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<V> {
    index: usize,
    location: Location,
    bindings: HashMap<String, V>,
}

impl<V> Frame<V> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn binding(&self, name: &str) -> Option<&V> {
        self.bindings.get(name)
    }

    pub fn bindings(&self) -> &HashMap<String, V> {
        &self.bindings
    }
}

/// Call stack captured at suspension, innermost first.
///
/// Never empty: index 0 is the activation that fired the trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot<V> {
    frames: Vec<Frame<V>>,
}

impl<V> FrameSnapshot<V> {
    /// Index captured frames by position. An empty capture is a `CaptureFailure`.
    pub fn from_captured(captured: Vec<CapturedFrame<V>>) -> ShellResult<Self> {
        if captured.is_empty() {
            return Err(ShellError::CaptureFailure(
                "stack walker returned no frames".to_string(),
            ));
        }

        let frames = captured
            .into_iter()
            .enumerate()
            .map(|(index, c)| Frame {
                index,
                location: c.location,
                bindings: c.locals,
            })
            .collect();

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame<V>> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame<V>> {
        self.frames.iter()
    }
}

/// Stack-walk collaborator: reports the triggering thread's activations,
/// innermost first, with a stable copy of their locals.
pub trait StackWalker<V> {
    fn walk(&self) -> ShellResult<Vec<CapturedFrame<V>>>;
}

impl<V, W: StackWalker<V> + ?Sized> StackWalker<V> for &W {
    fn walk(&self) -> ShellResult<Vec<CapturedFrame<V>>> {
        (**self).walk()
    }
}

pub fn capture<V>(walker: &dyn StackWalker<V>) -> ShellResult<FrameSnapshot<V>> {
    let captured = walker.walk()?;
    tracing::debug!(frames = captured.len(), "captured call stack");
    FrameSnapshot::from_captured(captured)
}
