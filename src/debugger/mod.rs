mod adapter;
mod bindings;
mod console;
mod session;
mod snapshot;
mod stack;
mod trigger;

pub use adapter::{Evaluator, Inspector};
pub use bindings::{BindingResolver, Scope};
pub use console::{Console, LineEditor, ScriptedConsole, StdioConsole, Transcript};
pub use session::{SessionEnd, SessionState, ShellSession};
pub use snapshot::{capture, CapturedFrame, Frame, FrameSnapshot, Location, StackWalker};
pub use stack::{ActivationGuard, ShadowStack};
pub use trigger::{Debugger, Suspend};
