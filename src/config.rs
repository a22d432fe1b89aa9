use crate::error::{ShellError, ShellResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Shell presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    pub prompt: String,
    pub active_marker: String,
    /// Record entered lines in the line editor history.
    pub history: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            active_marker: "▶".to_string(),
            history: true,
        }
    }
}

impl ShellConfig {
    pub fn from_toml(text: &str) -> ShellResult<Self> {
        toml::from_str(text).map_err(|e| ShellError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ShellResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ShellError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Prompt for a session nested `depth` levels deep (1 = outermost).
    /// The leading marker repeats once per level: `> `, `>> `, ...
    pub fn prompt_for(&self, depth: usize) -> String {
        let trimmed = self.prompt.trim_end();
        let tail = &self.prompt[trimmed.len()..];
        format!("{}{}", trimmed.repeat(depth.max(1)), tail)
    }
}
