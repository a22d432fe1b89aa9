//! JSON stack dumps: a captured stack written to disk and replayed later.
//!
//! ```json
//! { "frames": [ { "file": "test.rb", "line": 4, "label": "foo", "locals": { "x": 10 } } ] }
//! ```
//!
//! Frames are listed innermost first, the same order `backtrace` prints.

use crate::debugger::{CapturedFrame, Location, ShadowStack};
use crate::error::{ShellError, ShellResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDump {
    pub frames: Vec<DumpFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpFrame {
    pub file: String,
    pub line: u32,
    pub label: String,
    #[serde(default)]
    pub locals: Map<String, Value>,
}

impl StackDump {
    pub fn from_json(text: &str) -> ShellResult<Self> {
        let dump: StackDump =
            serde_json::from_str(text).map_err(|e| ShellError::Dump(e.to_string()))?;
        if dump.frames.is_empty() {
            return Err(ShellError::Dump("dump contains no frames".to_string()));
        }
        Ok(dump)
    }

    pub fn load(path: &Path) -> ShellResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ShellError::Dump(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> ShellResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ShellError::Dump(e.to_string()))
    }

    pub fn from_captured(frames: &[CapturedFrame<Value>]) -> Self {
        Self {
            frames: frames
                .iter()
                .map(|f| DumpFrame {
                    file: f.location.file.clone(),
                    line: f.location.line,
                    label: f.location.label.clone(),
                    locals: f
                        .locals
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Rebuild the stack as if the program were running, outermost pushed first.
    pub fn into_shadow_stack(self) -> ShadowStack<Value> {
        let stack = ShadowStack::new();
        for frame in self.frames.into_iter().rev() {
            stack.push(Location::new(frame.file, frame.line, frame.label));
            for (name, value) in frame.locals {
                stack.set_local(name, value);
            }
        }
        stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::StackWalker;
    use serde_json::json;

    const DUMP: &str = r#"{
        "frames": [
            { "file": "test.rb", "line": 4, "label": "foo", "locals": { "x": 10, "y": 100 } },
            { "file": "test.rb", "line": 9, "label": "bar", "locals": { "a": 99 } },
            { "file": "test.rb", "line": 12, "label": "<main>" }
        ]
    }"#;

    #[test]
    fn test_parse_dump() {
        let dump = StackDump::from_json(DUMP).unwrap();
        assert_eq!(dump.frames.len(), 3);
        assert_eq!(dump.frames[0].locals["y"], json!(100));
        assert!(dump.frames[2].locals.is_empty());
    }

    #[test]
    fn test_replay_keeps_innermost_first() {
        let stack = StackDump::from_json(DUMP).unwrap().into_shadow_stack();
        assert_eq!(stack.depth(), 3);

        let frames = stack.walk().unwrap();
        assert_eq!(frames[0].location.label, "foo");
        assert_eq!(frames[1].locals.get("a"), Some(&json!(99)));
        assert_eq!(frames[2].location.label, "<main>");

        assert_eq!(StackDump::from_captured(&frames), StackDump::from_json(DUMP).unwrap());
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        assert!(matches!(
            StackDump::from_json(r#"{"frames": []}"#),
            Err(ShellError::Dump(_))
        ));
        assert!(matches!(
            StackDump::from_json(r#"{"frames": [{"file": "x"}]}"#),
            Err(ShellError::Dump(_))
        ));
    }
}
