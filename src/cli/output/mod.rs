//! Output formatting utilities for the CLI.

pub mod progress;
pub mod table;

use serde::Serialize;

/// A command result that renders as text or JSON.
pub trait CommandOutput: Serialize {
    /// Human-readable rendering.
    fn to_human(&self) -> String;

    /// JSON rendering; defaults to the serde form.
    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Print `result` in the selected mode.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}
