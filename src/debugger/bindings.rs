use super::snapshot::{Frame, Location};
use super::trigger::Suspend;
use crate::error::{EvaluationError, ShellError, ShellResult};
use std::collections::HashMap;

/// Per-frame working copies layered over an immutable snapshot.
///
/// Writes land in the overlay for the frame being evaluated; the captured
/// bindings are never touched.
pub struct BindingResolver<V> {
    overlays: HashMap<usize, HashMap<String, V>>,
}

impl<V> BindingResolver<V> {
    pub fn new() -> Self {
        Self {
            overlays: HashMap::new(),
        }
    }

    /// Evaluation view for `frame`, seeding its overlay on first use.
    pub fn scope<'a>(&'a mut self, frame: &'a Frame<V>) -> Scope<'a, V> {
        let overlay = self.overlays.entry(frame.index()).or_default();
        Scope {
            frame,
            overlay,
            trigger: None,
        }
    }

    /// Names assigned while `index` was active.
    pub fn overlay(&self, index: usize) -> Option<&HashMap<String, V>> {
        self.overlays.get(&index)
    }
}

impl<V> Default for BindingResolver<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// The binding set an evaluator reads from and extends.
pub struct Scope<'a, V> {
    frame: &'a Frame<V>,
    overlay: &'a mut HashMap<String, V>,
    trigger: Option<&'a dyn Suspend>,
}

impl<'a, V> Scope<'a, V> {
    pub fn with_trigger(mut self, trigger: &'a dyn Suspend) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.overlay
            .get(name)
            .or_else(|| self.frame.binding(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: impl Into<String>, value: V) {
        self.overlay.insert(name.into(), value);
    }

    /// Every visible name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .frame
            .bindings()
            .keys()
            .chain(self.overlay.keys().filter(|k| self.frame.binding(k).is_none()))
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn frame_index(&self) -> usize {
        self.frame.index()
    }

    pub fn location(&self) -> &Location {
        self.frame.location()
    }

    /// Fire the suspension trigger from inside an evaluation.
    pub fn suspend(&self) -> ShellResult<()> {
        match self.trigger {
            Some(trigger) => trigger.suspend(),
            None => Err(ShellError::Evaluation(EvaluationError::new(
                "breakpoint unavailable: no debugger attached to this scope",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::snapshot::{CapturedFrame, FrameSnapshot};

    fn snapshot() -> FrameSnapshot<i64> {
        FrameSnapshot::from_captured(vec![
            CapturedFrame::new(Location::new("t.rs", 4, "foo")).with_local("a", 1),
            CapturedFrame::new(Location::new("t.rs", 9, "bar")).with_local("b", 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_reads_fall_back_to_snapshot() {
        let snap = snapshot();
        let mut resolver = BindingResolver::new();
        let scope = resolver.scope(snap.get(0).unwrap());
        assert_eq!(scope.get("a"), Some(&1));
        assert_eq!(scope.get("b"), None);
    }

    #[test]
    fn test_assignments_persist_per_frame() {
        let snap = snapshot();
        let mut resolver = BindingResolver::new();

        resolver.scope(snap.get(0).unwrap()).set("x", 42);
        resolver.scope(snap.get(1).unwrap()).set("x", 7);

        assert_eq!(resolver.scope(snap.get(0).unwrap()).get("x"), Some(&42));
        assert_eq!(resolver.scope(snap.get(1).unwrap()).get("x"), Some(&7));
    }

    #[test]
    fn test_shadowing_never_touches_snapshot() {
        let snap = snapshot();
        let mut resolver = BindingResolver::new();

        resolver.scope(snap.get(0).unwrap()).set("a", 100);

        assert_eq!(resolver.scope(snap.get(0).unwrap()).get("a"), Some(&100));
        assert_eq!(snap.get(0).unwrap().binding("a"), Some(&1));
    }

    #[test]
    fn test_names_are_sorted_union() {
        let snap = snapshot();
        let mut resolver = BindingResolver::new();
        let mut scope = resolver.scope(snap.get(1).unwrap());
        scope.set("a", 0);
        scope.set("b", 3);
        assert_eq!(scope.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_suspend_without_debugger_fails() {
        let snap = snapshot();
        let mut resolver = BindingResolver::new();
        let scope = resolver.scope(snap.get(0).unwrap());
        match scope.suspend() {
            Err(ShellError::Evaluation(e)) => {
                assert!(e.message().contains("no debugger attached"), "got: {}", e)
            }
            other => panic!("expected an evaluation error, got {:?}", other),
        }
    }
}
