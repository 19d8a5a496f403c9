#![allow(dead_code)]

use brrtaction::capabilities::Capabilities;
use brrtaction::config::ActionConfig;
use serde_json::{Map, Value};

/// Object literal to parameter map
pub fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

/// URL generator used across tests: `location` with `{name}` placeholders
/// filled from the parameters, failing for unknown placeholders.
pub fn generate_url(location: &str, params: &Map<String, Value>) -> anyhow::Result<String> {
    let mut out = String::new();
    let mut rest = location;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let end = rest[start..]
            .find('}')
            .ok_or_else(|| anyhow::anyhow!("unterminated placeholder in {}", location))?;
        let key = &rest[start + 1..start + end];
        let value = params
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("missing route parameter {}", key))?;
        match value {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

pub fn capabilities() -> Capabilities {
    Capabilities::builder().url_generator(generate_url).build()
}

pub fn debug_capabilities() -> Capabilities {
    Capabilities::builder()
        .url_generator(generate_url)
        .config(ActionConfig {
            debug: true,
            ..ActionConfig::default()
        })
        .build()
}
