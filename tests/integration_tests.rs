use frame_shell::debugger::{
    Debugger, Evaluator, Location, ScriptedConsole, Scope, SessionEnd, ShadowStack, Transcript,
};
use frame_shell::{EvaluationError, ShellError};

/// Minimal host evaluator: `name` reads, `name = <int>` assigns.
struct LookupEvaluator;

impl Evaluator<i64> for LookupEvaluator {
    fn evaluate(&self, expression: &str, scope: &mut Scope<'_, i64>) -> Result<i64, EvaluationError> {
        if let Some((name, value)) = expression.split_once('=') {
            let value: i64 = value
                .trim()
                .parse()
                .map_err(|_| EvaluationError::new(format!("not an integer: {}", value.trim())))?;
            scope.set(name.trim(), value);
            return Ok(value);
        }

        scope
            .get(expression)
            .copied()
            .ok_or_else(|| EvaluationError::new(format!("undefined local '{}'", expression)))
    }
}

// Three frames: foo {a: 1} <- bar {b: 2} <- <main> {}
fn three_frame_stack() -> ShadowStack<i64> {
    let stack = ShadowStack::new();
    stack.push(Location::new("test.rb", 12, "<main>"));
    stack.push(Location::new("test.rb", 9, "bar"));
    stack.set_local("b", 2);
    stack.push(Location::new("test.rb", 4, "foo"));
    stack.set_local("a", 1);
    stack
}

fn run_session(stack: &ShadowStack<i64>, input: &[&str]) -> (Result<SessionEnd, ShellError>, Transcript) {
    let (console, transcript) = ScriptedConsole::new(input.iter().copied());
    let debugger = Debugger::new(stack, LookupEvaluator, |v: &i64| v.to_string(), console);
    let end = debugger.enter();
    assert_eq!(debugger.depth(), 0, "Session depth should unwind");
    (end, transcript)
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[test]
    fn test_three_frame_scenario() {
        let stack = three_frame_stack();
        let (end, transcript) = run_session(
            &stack,
            &["backtrace", "frame 1", "b", "frame 5", "backtrace", "continue"],
        );

        assert_eq!(end.unwrap(), SessionEnd::Continue);
        assert_eq!(
            transcript.lines(),
            vec![
                "▶  0  at test.rb:4:in 'foo'",
                "   1  at test.rb:9:in 'bar'",
                "   2  at test.rb:12:in '<main>'",
                "▶  1  at test.rb:9:in 'bar'",
                "2",
                "invalid frame index '5': expected 0..=2",
                "   0  at test.rb:4:in 'foo'",
                "▶  1  at test.rb:9:in 'bar'",
                "   2  at test.rb:12:in '<main>'",
            ]
        );
    }

    #[test]
    fn test_binding_continuity_per_frame() {
        let stack = three_frame_stack();
        let (end, transcript) = run_session(
            &stack,
            &["x = 42", "frame 1", "x", "x = 7", "frame 0", "x", "frame 1", "x"],
        );

        assert_eq!(end.unwrap(), SessionEnd::Continue);
        let lines = transcript.lines();
        assert_eq!(lines[0], "42");
        assert_eq!(lines[2], "error: undefined local 'x'");
        assert_eq!(lines[3], "7");
        assert_eq!(lines[5], "42", "Frame 0 keeps its own assignment");
        assert_eq!(lines[7], "7", "Frame 1 keeps its own assignment");
    }

    #[test]
    fn test_assignments_do_not_leak_into_real_stack() {
        let stack = three_frame_stack();
        let (_, _) = run_session(&stack, &["a = 100", "continue"]);

        let (_, transcript) = run_session(&stack, &["a"]);
        assert_eq!(transcript.lines(), vec!["1"], "New session sees captured value");
    }

    #[test]
    fn test_exit_ends_with_exit_status() {
        let stack = three_frame_stack();
        let (end, transcript) = run_session(&stack, &["exit", "a"]);

        assert_eq!(end.unwrap(), SessionEnd::Exit(0));
        assert!(transcript.lines().is_empty(), "Nothing after exit is processed");
    }

    #[test]
    fn test_input_exhausted_continues() {
        let stack = three_frame_stack();
        let (end, transcript) = run_session(&stack, &["a"]);

        assert_eq!(end.unwrap(), SessionEnd::Continue);
        assert_eq!(transcript.lines(), vec!["1"]);
    }

    #[test]
    fn test_bad_input_keeps_session_alive() {
        let stack = three_frame_stack();
        let (end, transcript) = run_session(
            &stack,
            &["missing", "frame", "frame one", "", "frame 2 3", "a", "continue"],
        );

        assert_eq!(end.unwrap(), SessionEnd::Continue);
        assert_eq!(
            transcript.lines(),
            vec![
                "error: undefined local 'missing'",
                "invalid frame index 'frame': expected exactly one integer argument",
                "invalid frame index 'frame one': expected exactly one integer argument",
                "invalid frame index 'frame 2 3': expected exactly one integer argument",
                "1",
            ]
        );
    }

    #[test]
    fn test_repeated_frame_is_idempotent() {
        let stack = three_frame_stack();
        let (_, transcript) = run_session(&stack, &["frame 2", "frame 2", "backtrace"]);

        let lines = transcript.lines();
        assert_eq!(lines[0], lines[1]);
        assert_eq!(lines[4], "▶  2  at test.rb:12:in '<main>'");
        assert_eq!(lines.iter().filter(|l| l.starts_with('▶')).count(), 3);
    }

    #[test]
    fn test_capture_failure_prevents_session() {
        let stack: ShadowStack<i64> = ShadowStack::new();
        let (end, transcript) = run_session(&stack, &["backtrace"]);

        assert!(matches!(end, Err(ShellError::CaptureFailure(_))));
        assert!(transcript.lines().is_empty());
    }
}
