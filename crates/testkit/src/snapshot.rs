//! Golden files for stack documents and scenario reports.
//!
//! Values are written as pretty JSON with object keys sorted at every depth,
//! so a stack document's `tag` compound diffs the same way regardless of
//! insertion order. Set `STACKCRAFT_UPDATE_SNAPSHOTS=1` to rewrite goldens.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use stackcraft_core::{ItemRegistry, Stack};
use std::fs;
use std::path::Path;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "STACKCRAFT_UPDATE_SNAPSHOTS";

/// Compare `value` with the golden file at `path`, or rewrite it when
/// updates are enabled.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if should_update_snapshots() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create snapshot directory {}", parent.display())
            })?;
        }
        fs::write(path, &actual)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "updated snapshot");
        return Ok(());
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {UPDATE_SNAPSHOTS_ENV}=1 to create it)",
            path.display()
        )
    })?;

    if let Some((line, want, got)) = first_difference(&expected, &actual) {
        bail!(
            "Snapshot mismatch at {}:{line}\n  expected: {want}\n    actual: {got}\n(run with {UPDATE_SNAPSHOTS_ENV}=1 to update)",
            path.display()
        );
    }
    Ok(())
}

/// Snapshot the persisted document of `stack`, then check that decoding
/// the document against `items` gives back an equal stack.
pub fn assert_stack_snapshot<P: AsRef<Path>>(
    path: P,
    stack: &Stack,
    items: &ItemRegistry,
) -> Result<()> {
    let document = stack.encode();
    assert_json_snapshot(path, &document)?;

    let decoded = Stack::decode(&document, items);
    if decoded != *stack {
        bail!("Stack {stack} decoded as {decoded}");
    }
    Ok(())
}

fn should_update_snapshots() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn first_difference<'a>(expected: &'a str, actual: &'a str) -> Option<(usize, &'a str, &'a str)> {
    let mut want = expected.lines();
    let mut got = actual.lines();
    let mut line = 1;
    loop {
        match (want.next(), got.next()) {
            (None, None) => return None,
            (w, g) if w == g => line += 1,
            (w, g) => return Some((line, w.unwrap_or("<end>"), g.unwrap_or("<end>"))),
        }
    }
}

fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut text = serde_json::to_string_pretty(&sort_keys(value))
        .context("Failed to format snapshot JSON")?;
    text.push('\n');
    Ok(text)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let value = json!({ "tag": { "b": 1, "a": 2 }, "Count": 3 });
        let text = canonical_json(&value).unwrap();
        assert_eq!(
            text,
            "{\n  \"Count\": 3,\n  \"tag\": {\n    \"a\": 2,\n    \"b\": 1\n  }\n}\n"
        );
    }

    #[test]
    fn first_difference_names_the_line() {
        assert_eq!(first_difference("a\nb\n", "a\nb\n"), None);
        assert_eq!(first_difference("a\nb\n", "a\nc\n"), Some((2, "b", "c")));
        assert_eq!(first_difference("a\n", "a\nextra\n"), Some((2, "<end>", "extra")));
    }
}
