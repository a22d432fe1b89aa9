use crate::debugger::Inspector;
use serde_json::Value;

/// Renders values as JSON, compact by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonInspector {
    pretty: bool,
}

impl JsonInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Inspector<Value> for JsonInspector {
    fn inspect(&self, value: &Value) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    }
}
