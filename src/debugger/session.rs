use super::adapter::Evaluator;
use super::bindings::BindingResolver;
use super::snapshot::{Frame, FrameSnapshot};
use super::trigger::{Debugger, Suspend};
use crate::error::{EvaluationError, ShellError, ShellResult};
use crate::parser::{parse_command, ShellCommand};
use tracing::{debug, info};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Resume the suspended caller.
    Continue,
    /// Terminate the whole process with this status.
    Exit(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated(SessionEnd),
}

/// One interactive shell over a captured snapshot.
pub struct ShellSession<V> {
    snapshot: FrameSnapshot<V>,
    active_index: usize,
    resolver: BindingResolver<V>,
    depth: usize,
    state: SessionState,
}

impl<V> ShellSession<V> {
    /// Starts on frame 0, the caller of the trigger.
    pub fn new(snapshot: FrameSnapshot<V>, depth: usize) -> Self {
        Self {
            snapshot,
            active_index: 0,
            resolver: BindingResolver::new(),
            depth,
            state: SessionState::Running,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn snapshot(&self) -> &FrameSnapshot<V> {
        &self.snapshot
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn resolver(&self) -> &BindingResolver<V> {
        &self.resolver
    }

    /// Make `index` the active frame. Out-of-range leaves the cursor alone.
    pub fn select_frame(&mut self, index: usize) -> ShellResult<&Frame<V>> {
        match self.snapshot.get(index) {
            Some(frame) => {
                debug!(from = self.active_index, to = index, "frame switch");
                self.active_index = index;
                Ok(frame)
            }
            None => Err(ShellError::frame_out_of_range(index, self.snapshot.len())),
        }
    }

    /// One line per frame, innermost first, `marker` on the active one.
    pub fn backtrace(&self, marker: &str) -> Vec<String> {
        self.snapshot
            .frames()
            .map(|frame| frame_line(frame, self.active_index, marker))
            .collect()
    }

    /// Evaluate against the active frame's working bindings.
    pub fn evaluate(
        &mut self,
        expression: &str,
        evaluator: &dyn Evaluator<V>,
        trigger: Option<&dyn Suspend>,
    ) -> Result<V, EvaluationError> {
        let frame = self
            .snapshot
            .get(self.active_index)
            .ok_or_else(|| EvaluationError::new("no active frame"))?;

        let mut scope = self.resolver.scope(frame);
        if let Some(trigger) = trigger {
            scope = scope.with_trigger(trigger);
        }
        evaluator.evaluate(expression, &mut scope)
    }

    /// Interpret one line of operator input.
    ///
    /// Only console failures are returned as errors; frame and evaluation
    /// problems are printed and the session keeps running.
    pub fn handle_line(&mut self, line: &str, debugger: &Debugger<'_, V>) -> ShellResult<SessionState> {
        let marker = debugger.config().active_marker.clone();

        match parse_command(line) {
            Ok(ShellCommand::Blank) => {}
            Ok(ShellCommand::Continue) => {
                self.state = SessionState::Terminated(SessionEnd::Continue);
            }
            Ok(ShellCommand::Exit) => {
                self.state = SessionState::Terminated(SessionEnd::Exit(0));
            }
            Ok(ShellCommand::Backtrace) => {
                for line in self.backtrace(&marker) {
                    debugger.print(&line)?;
                }
            }
            Ok(ShellCommand::Frame(index)) => match self.select_frame(index) {
                Ok(frame) => {
                    let ack = frame_line(frame, index, &marker);
                    debugger.print(&ack)?;
                }
                Err(e) => {
                    debug!(error = %e, "frame switch rejected");
                    debugger.print(&e.to_string())?;
                }
            },
            Ok(ShellCommand::Expression(expression)) => {
                let outcome = self.evaluate(&expression, debugger.evaluator(), Some(debugger));

                // A nested session asked for exit: unwind without printing.
                if let Some(status) = debugger.take_pending_exit() {
                    self.state = SessionState::Terminated(SessionEnd::Exit(status));
                    return Ok(self.state);
                }

                match outcome {
                    Ok(value) => debugger.print(&debugger.inspect(&value))?,
                    Err(e) => {
                        debug!(error = %e, "evaluation failed");
                        debugger.print(&format!("error: {}", e))?;
                    }
                }
            }
            Err(e) => debugger.print(&e.to_string())?,
        }

        Ok(self.state)
    }

    /// Read and dispatch lines until a terminal command or end of input.
    pub fn run(mut self, debugger: &Debugger<'_, V>) -> ShellResult<SessionEnd> {
        info!(
            depth = self.depth,
            frames = self.snapshot.len(),
            "entering shell session"
        );
        let prompt = debugger.config().prompt_for(self.depth);

        loop {
            let Some(line) = debugger.read_line(&prompt)? else {
                debug!("input exhausted");
                return Ok(SessionEnd::Continue);
            };

            if let SessionState::Terminated(end) = self.handle_line(&line, debugger)? {
                info!(depth = self.depth, ?end, "leaving shell session");
                return Ok(end);
            }
        }
    }
}

fn frame_line<V>(frame: &Frame<V>, active_index: usize, marker: &str) -> String {
    let tag = if frame.index() == active_index {
        marker.to_string()
    } else {
        " ".repeat(marker.chars().count())
    };
    format!("{} {:>2}  at {}", tag, frame.index(), frame.location())
}
