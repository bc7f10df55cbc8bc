//! Custom Tera filters for the documentation templates.

use super::files;
use super::toc;
use std::collections::HashMap;
use tera::{Result, Value};

fn expect_str<'a>(value: &'a Value, filter: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a string")))
}

/// Any value as YAML, without the trailing newline.
pub(crate) fn to_yaml(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(files::to_yaml(value)))
}

pub(crate) fn trim_lead(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = expect_str(value, "trim_lead")?;
    Ok(Value::String(s.trim_start().to_string()))
}

pub(crate) fn to_yaml_code_block(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = expect_str(value, "to_yaml_code_block")?;
    Ok(Value::String(format!("```yaml\n{s}\n```")))
}

pub(crate) fn to_markdown_link(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = expect_str(value, "to_markdown_link")?;
    Ok(Value::String(toc::markdown_link(s)))
}

/// Re-indent a JSON string; text that isn't JSON passes through.
pub(crate) fn to_pretty_json(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = expect_str(value, "to_pretty_json")?;
    let pretty = serde_json::from_str::<Value>(s)
        .ok()
        .and_then(|parsed| serde_json::to_string_pretty(&parsed).ok())
        .unwrap_or_else(|| s.to_string());
    Ok(Value::String(pretty))
}
