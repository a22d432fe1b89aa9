use super::adapter::{Evaluator, Inspector};
use super::console::Console;
use super::session::{SessionEnd, ShellSession};
use super::snapshot::{capture, StackWalker};
use crate::config::ShellConfig;
use crate::error::{ShellError, ShellResult};
use std::cell::{Cell, RefCell};
use std::process;
use tracing::{debug, info, warn};

/// Something running code can call to break into a shell.
pub trait Suspend {
    fn suspend(&self) -> ShellResult<()>;
}

/// Suspension trigger: owns the collaborators and tracks nested sessions.
///
/// Sessions nest when an evaluation fires the trigger again; each nested
/// session gets its own snapshot and working bindings.
pub struct Debugger<'a, V> {
    walker: Box<dyn StackWalker<V> + 'a>,
    evaluator: Box<dyn Evaluator<V> + 'a>,
    inspector: Box<dyn Inspector<V> + 'a>,
    console: RefCell<Box<dyn Console + 'a>>,
    config: ShellConfig,
    depth: Cell<usize>,
    pending_exit: Cell<Option<i32>>,
}

impl<'a, V> Debugger<'a, V> {
    pub fn new(
        walker: impl StackWalker<V> + 'a,
        evaluator: impl Evaluator<V> + 'a,
        inspector: impl Inspector<V> + 'a,
        console: impl Console + 'a,
    ) -> Self {
        Self {
            walker: Box::new(walker),
            evaluator: Box::new(evaluator),
            inspector: Box::new(inspector),
            console: RefCell::new(Box::new(console)),
            config: ShellConfig::default(),
            depth: Cell::new(0),
            pending_exit: Cell::new(None),
        }
    }

    pub fn with_config(mut self, config: ShellConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Number of sessions currently running.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Capture the stack and run a session to completion.
    ///
    /// Never exits the process; the caller decides what `SessionEnd::Exit`
    /// means.
    pub fn enter(&self) -> ShellResult<SessionEnd> {
        if let Some(status) = self.pending_exit.get() {
            debug!(status, "exit pending, refusing to open a session");
            return Err(ShellError::ExitRequested(status));
        }

        let snapshot = capture(self.walker.as_ref())?;

        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        let result = ShellSession::new(snapshot, depth).run(self);
        self.depth.set(depth - 1);

        result
    }

    /// Break here: run a session, then resume the caller or end the process.
    ///
    /// Inside a nested session an `exit` is recorded for the enclosing
    /// session and returned as `ExitRequested`, so the evaluation that fired
    /// the trigger stops; only the outermost trigger terminates the process.
    pub fn break_here(&self) -> ShellResult<()> {
        match self.enter()? {
            SessionEnd::Continue => Ok(()),
            SessionEnd::Exit(status) if self.depth.get() > 0 => {
                self.pending_exit.set(Some(status));
                Err(ShellError::ExitRequested(status))
            }
            SessionEnd::Exit(status) => {
                info!(status, "exit requested from shell");
                process::exit(status)
            }
        }
    }

    pub(crate) fn take_pending_exit(&self) -> Option<i32> {
        self.pending_exit.take()
    }

    pub(crate) fn evaluator(&self) -> &dyn Evaluator<V> {
        self.evaluator.as_ref()
    }

    pub(crate) fn inspect(&self, value: &V) -> String {
        self.inspector.inspect(value)
    }

    pub(crate) fn read_line(&self, prompt: &str) -> ShellResult<Option<String>> {
        Ok(self.console.borrow_mut().read_line(prompt)?)
    }

    pub(crate) fn print(&self, text: &str) -> ShellResult<()> {
        Ok(self.console.borrow_mut().write_line(text)?)
    }
}

impl<V> Suspend for Debugger<'_, V> {
    fn suspend(&self) -> ShellResult<()> {
        self.break_here().map_err(|e| {
            if !matches!(e, ShellError::ExitRequested(_)) {
                warn!(error = %e, "nested trigger failed");
            }
            e
        })
    }
}

