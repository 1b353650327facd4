//! Terminal output helpers

use colored::Colorize;
use hotstack_cloud::{CleanupOutcome, StackOutputs};

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn failure(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg.red());
}

pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg.yellow());
}

pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

pub fn cleanup(outcome: &CleanupOutcome) {
    let msg = format!("Cleanup: {}", outcome);
    if outcome.is_clean() {
        success(&msg);
    } else {
        warning(&msg);
    }
}

/// Render outputs one per line; nested mappings become indented sub-keys
pub fn format_outputs(outputs: &StackOutputs) -> Vec<String> {
    let mut lines = Vec::new();
    for (key, value) in outputs {
        push_value(&mut lines, 1, key, value);
    }
    lines
}

fn push_value(lines: &mut Vec<String>, depth: usize, key: &str, value: &serde_json::Value) {
    let indent = "  ".repeat(depth);
    match value {
        serde_json::Value::Object(map) => {
            lines.push(format!("{}{}:", indent, key));
            for (sub_key, sub_value) in map {
                push_value(lines, depth + 1, sub_key, sub_value);
            }
        }
        serde_json::Value::String(s) => lines.push(format!("{}{}: {}", indent, key, s)),
        other => lines.push(format!("{}{}: {}", indent, key, other)),
    }
}

pub fn outputs(outputs: &StackOutputs) {
    if outputs.is_empty() {
        info("Stack has no outputs");
        return;
    }
    println!("{}", "Stack outputs:".bold());
    for line in format_outputs(outputs) {
        println!("{}", line);
    }
}
