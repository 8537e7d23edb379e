//! JSON input rows.
//!
//! Input is either one JSON array of rows or NDJSON with one row per line.
//! A row is an array of strings, or an object whose keys (in document order)
//! form the sequence.

use anyhow::{bail, Context, Result};
use serde_json::Value;

fn row_tokens(v: Value, at: &str) -> Result<Vec<String>> {
    match v {
        Value::Object(map) => Ok(map.into_iter().map(|(k, _)| k).collect()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(j, item)| match item {
                Value::String(s) => Ok(s),
                other => bail!("{at}, item {j}: expected a string token, got {other}"),
            })
            .collect(),
        other => bail!("{at}: expected a JSON array or object, got {other}"),
    }
}

/// More than one non-empty line, each opening its own array or object.
fn looks_like_ndjson(input: &str) -> bool {
    let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());
    let mut count = 0;
    let shaped = lines.all(|l| {
        count += 1;
        l.starts_with('[') || l.starts_with('{')
    });
    shaped && count > 1
}

/// Parse the whole input into token sequences.
pub fn parse_rows(input: &str) -> Result<Vec<Vec<String>>> {
    if input.trim_start().starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(input) {
            Ok(vals) => {
                // A lone array of strings is a single row, not a list of rows.
                if vals.iter().all(Value::is_string) && !vals.is_empty() {
                    return Ok(vec![row_tokens(Value::Array(vals), "row 0")?]);
                }
                return vals
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| row_tokens(v, &format!("row {i}")))
                    .collect();
            }
            Err(e) if !looks_like_ndjson(input) => {
                return Err(e).context("parsing JSON array of rows");
            }
            Err(_) => {}
        }
    }
    input
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(n, l)| {
            let at = format!("line {}", n + 1);
            let v: Value =
                serde_json::from_str(l).with_context(|| format!("{at}: invalid JSON"))?;
            row_tokens(v, &at)
        })
        .collect()
}
